//! Template-matching single-object tracker.

use ndarray::{Array3, Zip};
use thiserror::Error;

use crate::tracker::features::{FeatureMode, IntegralMap};
use crate::tracker::kalman_filter::MotionFilter;
use crate::tracker::{Frame, Region, VisualTracker};

/// Context added around the object when sampling the template.
const PADDING: f32 = 1.5;
/// Pixels per template cell in adaptive-window mode.
const CELL_SIZE: f32 = 4.0;
const MIN_GRID: usize = 4;
const MAX_GRID: usize = 32;
const FIXED_GRID: usize = 32;
const SCALE_STEP: f32 = 1.05;
const SCALES: [f32; 3] = [1.0, 1.0 / SCALE_STEP, SCALE_STEP];
/// Match costs at non-unit scales are divided by this.
const SCALE_WEIGHT: f32 = 0.95;

/// Configuration for the [`TemplateTracker`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackerConfig {
    pub features: FeatureMode,
    /// Sample the template on a fixed grid instead of one sized by the ROI.
    pub fixed_window: bool,
    /// Also search slightly smaller and larger scales.
    pub multiscale: bool,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            features: FeatureMode::Hog,
            fixed_window: false,
            multiscale: true,
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum TemplateTrackerError {
    #[error("update called before init")]
    NotInitialized,
    #[error("seed region {0:?} is degenerate")]
    InvalidRegion(Region),
    #[error("frame has no pixels")]
    EmptyFrame,
}

/// Tracks one object by matching a feature template around a
/// motion-predicted position.
#[derive(Debug, Clone)]
pub struct TemplateTracker {
    config: TrackerConfig,
    motion: MotionFilter,
    template: Option<Array3<f32>>,
    grid: (usize, usize),
    region: Region,
}

impl Default for TemplateTracker {
    fn default() -> Self {
        Self::new(TrackerConfig::default())
    }
}

impl TemplateTracker {
    /// Unseeded tracker; `init` must run before the first `update`.
    pub fn new(config: TrackerConfig) -> Self {
        Self {
            config,
            motion: MotionFilter::new(),
            template: None,
            grid: (FIXED_GRID, FIXED_GRID),
            region: Region::default(),
        }
    }

    fn grid_for(&self, window: &Region) -> (usize, usize) {
        if self.config.fixed_window {
            return (FIXED_GRID, FIXED_GRID);
        }
        let cells = |len: f32| ((len / CELL_SIZE).round() as usize).clamp(MIN_GRID, MAX_GRID);
        (cells(window.width), cells(window.height))
    }

    fn scales(&self) -> &'static [f32] {
        if self.config.multiscale {
            &SCALES
        } else {
            &SCALES[..1]
        }
    }
}

impl VisualTracker for TemplateTracker {
    type Error = TemplateTrackerError;

    fn init(&mut self, region: Region, frame: &Frame) -> Result<(), Self::Error> {
        if frame.width() == 0 || frame.height() == 0 {
            return Err(TemplateTrackerError::EmptyFrame);
        }
        if !(region.width >= 1.0 && region.height >= 1.0) {
            return Err(TemplateTrackerError::InvalidRegion(region));
        }

        let window = region.scaled(PADDING);
        self.grid = self.grid_for(&window);

        let map = IntegralMap::from_frame(frame, self.config.features);
        self.template = Some(map.sample(&window, self.grid));
        self.motion.initiate(&region);
        self.region = region;
        Ok(())
    }

    fn update(&mut self, frame: &Frame) -> Result<Region, Self::Error> {
        if frame.width() == 0 || frame.height() == 0 {
            return Err(TemplateTrackerError::EmptyFrame);
        }
        let template = self
            .template
            .as_ref()
            .ok_or(TemplateTrackerError::NotInitialized)?;

        let map = IntegralMap::from_frame(frame, self.config.features);
        let (cx, cy) = self.motion.predict().center();
        let (gw, gh) = self.grid;
        let radius_x = (gw / 4).max(2) as i32;
        let radius_y = (gh / 4).max(2) as i32;

        let mut best: Option<(f32, Region, Array3<f32>)> = None;
        for &scale in self.scales() {
            let width = self.region.width * scale;
            let height = self.region.height * scale;
            let base = Region::centered(cx, cy, width, height);
            let window = base.scaled(PADDING);
            let cell_w = window.width / gw as f32;
            let cell_h = window.height / gh as f32;

            for dy in -radius_y..=radius_y {
                for dx in -radius_x..=radius_x {
                    let shift_x = dx as f32 * cell_w;
                    let shift_y = dy as f32 * cell_h;
                    let candidate = Region::new(
                        window.x + shift_x,
                        window.y + shift_y,
                        window.width,
                        window.height,
                    );
                    let patch = map.sample(&candidate, self.grid);
                    let mut cost = mean_squared_difference(template, &patch);
                    if scale != 1.0 {
                        cost /= SCALE_WEIGHT;
                    }
                    if best.as_ref().is_none_or(|(best_cost, _, _)| cost < *best_cost) {
                        let found = Region::new(base.x + shift_x, base.y + shift_y, width, height);
                        best = Some((cost, found, patch));
                    }
                }
            }
        }

        // The scale list is never empty, so a candidate always exists.
        let Some((cost, found, patch)) = best else {
            return Ok(self.region);
        };
        log::trace!("template match cost {cost:.5} at {found:?}");

        let rate = self.config.features.interp_factor();
        if let Some(template) = self.template.as_mut() {
            Zip::from(template)
                .and(&patch)
                .for_each(|t, &p| *t = (1.0 - rate) * *t + rate * p);
        }

        self.motion.correct(&found);
        self.region = found;
        Ok(found)
    }
}

fn mean_squared_difference(a: &Array3<f32>, b: &Array3<f32>) -> f32 {
    let mut sum = 0.0;
    Zip::from(a).and(b).for_each(|&x, &y| {
        let d = x - y;
        sum += d * d;
    });
    sum / a.len().max(1) as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn iou(a: &Region, b: &Region) -> f32 {
        let w = ((a.x + a.width).min(b.x + b.width) - a.x.max(b.x)).max(0.0);
        let h = ((a.y + a.height).min(b.y + b.height) - a.y.max(b.y)).max(0.0);
        let inter = w * h;
        inter / (a.width * a.height + b.width * b.height - inter)
    }

    /// Textured 40x40 square on a dark background with its top-left at (x, y).
    fn frame_with_square(x: u32, y: u32) -> RgbImage {
        RgbImage::from_fn(160, 120, |px, py| {
            if px >= x && px < x + 40 && py >= y && py < y + 40 {
                let shade = 100 + ((px - x) / 10 + (py - y) / 10) as u8 * 20;
                Rgb([shade, shade / 2, 255 - shade])
            } else {
                Rgb([20, 20, 20])
            }
        })
    }

    fn track_moving_square(config: TrackerConfig) -> (Region, Region) {
        let mut tracker = TemplateTracker::new(config);
        tracker
            .init(Region::new(20.0, 30.0, 40.0, 40.0), &frame_with_square(20, 30))
            .unwrap();

        let mut last = Region::default();
        for step in 1..=8 {
            last = tracker.update(&frame_with_square(20 + step * 4, 30)).unwrap();
        }
        (last, Region::new(52.0, 30.0, 40.0, 40.0))
    }

    #[test]
    fn test_update_before_init() {
        let mut tracker = TemplateTracker::default();
        let err = tracker.update(&frame_with_square(0, 0)).unwrap_err();
        assert_eq!(err, TemplateTrackerError::NotInitialized);
    }

    #[test]
    fn test_rejects_degenerate_seed() {
        let mut tracker = TemplateTracker::default();
        let seed = Region::new(10.0, 10.0, 0.0, 20.0);
        assert_eq!(
            tracker.init(seed, &frame_with_square(0, 0)),
            Err(TemplateTrackerError::InvalidRegion(seed))
        );
    }

    #[test]
    fn test_static_object_stays_put() {
        let mut tracker = TemplateTracker::default();
        let seed = Region::new(20.0, 30.0, 40.0, 40.0);
        let frame = frame_with_square(20, 30);
        tracker.init(seed, &frame).unwrap();
        for _ in 0..3 {
            let region = tracker.update(&frame).unwrap();
            assert!(iou(&region, &seed) > 0.9, "{region:?}");
        }
    }

    #[test]
    fn test_follows_translation_gray() {
        let config = TrackerConfig {
            features: FeatureMode::Gray,
            fixed_window: false,
            multiscale: false,
        };
        let (last, truth) = track_moving_square(config);
        assert!(iou(&last, &truth) > 0.6, "{last:?}");
    }

    #[test]
    fn test_follows_translation_default_config() {
        let (last, truth) = track_moving_square(TrackerConfig::default());
        assert!(iou(&last, &truth) > 0.5, "{last:?}");
    }

    #[test]
    fn test_fixed_window_grid() {
        let config = TrackerConfig {
            fixed_window: true,
            ..TrackerConfig::default()
        };
        let mut tracker = TemplateTracker::new(config);
        tracker
            .init(Region::new(20.0, 30.0, 40.0, 40.0), &frame_with_square(20, 30))
            .unwrap();
        assert_eq!(tracker.grid, (FIXED_GRID, FIXED_GRID));
    }
}
