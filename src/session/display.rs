//! Region overlays for visual inspection of a run.

use std::fs;
use std::path::{Path, PathBuf};

use image::Rgb;
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;

use crate::error::{Error, Result};
use crate::tracker::{Frame, Region};

/// Overlay color for tracked regions.
pub const BOX_COLOR: Rgb<u8> = Rgb([255, 0, 0]);
pub const BOX_THICKNESS: u32 = 2;

/// Receives every frame with the current region already drawn on it.
pub trait FrameDisplay {
    fn show(&mut self, index: usize, frame: &Frame) -> Result<()>;
}

/// Draw `region` as a hollow rectangle, `thickness` pixels wide, growing inward.
///
/// The region may lie partly or wholly outside the frame; only the visible
/// part of the outline is drawn.
pub fn draw_region(frame: &mut Frame, region: &Region, color: Rgb<u8>, thickness: u32) {
    // One pixel beyond each edge, so clipped sides stay off-frame.
    let max_x = i64::from(frame.width()) + 1;
    let max_y = i64::from(frame.height()) + 1;

    // Float to int casts saturate; NaN becomes 0.
    let left = region.x.round() as i64;
    let top = region.y.round() as i64;
    let right = left.saturating_add(region.width.round() as i64);
    let bottom = top.saturating_add(region.height.round() as i64);

    for ring in 0..i64::from(thickness) {
        let (x0, y0) = (left.saturating_add(ring), top.saturating_add(ring));
        let (x1, y1) = (right.saturating_sub(ring), bottom.saturating_sub(ring));
        if x1 <= x0 || y1 <= y0 {
            break;
        }

        let (x0, y0) = (x0.max(-1), y0.max(-1));
        let (x1, y1) = (x1.min(max_x), y1.min(max_y));
        if x1 <= x0 || y1 <= y0 {
            continue;
        }
        let (Ok(x), Ok(y), Ok(width), Ok(height)) = (
            i32::try_from(x0),
            i32::try_from(y0),
            u32::try_from(x1 - x0),
            u32::try_from(y1 - y0),
        ) else {
            continue;
        };
        draw_hollow_rect_mut(frame, Rect::at(x, y).of_size(width, height), color);
    }
}

/// Saves each overlay frame as `<dir>/<index>.png`.
#[derive(Debug, Clone)]
pub struct OverlayWriter {
    dir: PathBuf,
}

impl OverlayWriter {
    /// Create the output directory if needed.
    pub fn new<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)
            .map_err(|e| Error::io(format!("failed to create {}", dir.display()), e))?;
        Ok(Self { dir })
    }

    /// File the frame at `index` is written to.
    pub fn frame_path(&self, index: usize) -> PathBuf {
        self.dir.join(format!("{index:06}.png"))
    }
}

impl FrameDisplay for OverlayWriter {
    fn show(&mut self, index: usize, frame: &Frame) -> Result<()> {
        let path = self.frame_path(index);
        frame
            .save(&path)
            .map_err(|source| Error::Image { path, source })
    }
}
