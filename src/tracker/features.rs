//! Dense per-pixel feature planes used by the template tracker.

use std::f32::consts::PI;

use ndarray::Array3;

use crate::tracker::{Frame, Region};

/// Number of unsigned orientation bins in the gradient channels.
const ORIENTATION_BINS: usize = 4;

/// Feature representation the tracker matches on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FeatureMode {
    /// Raw luminance.
    Gray,
    /// Gradient magnitude split into orientation channels.
    #[default]
    Hog,
    /// Orientation channels plus CIELAB color.
    Lab,
}

impl FeatureMode {
    /// Feature planes produced per pixel.
    pub fn channels(self) -> usize {
        match self {
            Self::Gray => 1,
            Self::Hog => ORIENTATION_BINS,
            Self::Lab => ORIENTATION_BINS + 3,
        }
    }

    /// Template learning rate for this representation.
    pub fn interp_factor(self) -> f32 {
        match self {
            Self::Gray => 0.075,
            Self::Hog => 0.012,
            Self::Lab => 0.005,
        }
    }
}

/// Compute a `(channels, height, width)` feature map for the whole frame.
pub(crate) fn extract(frame: &Frame, mode: FeatureMode) -> Array3<f32> {
    let (width, height) = frame.dimensions();
    let (w, h) = (width as usize, height as usize);
    let mut map = Array3::zeros((mode.channels(), h, w));

    let luma = luminance(frame);
    if mode == FeatureMode::Gray {
        map.index_axis_mut(ndarray::Axis(0), 0).assign(&luma);
        return map;
    }

    for y in 0..h {
        for x in 0..w {
            let gx = luma[[y, (x + 1).min(w - 1)]] - luma[[y, x.saturating_sub(1)]];
            let gy = luma[[(y + 1).min(h - 1), x]] - luma[[y.saturating_sub(1), x]];
            let magnitude = (gx * gx + gy * gy).sqrt();
            if magnitude > 0.0 {
                map[[orientation_bin(gx, gy), y, x]] = magnitude;
            }
        }
    }

    if mode == FeatureMode::Lab {
        for (x, y, pixel) in frame.enumerate_pixels() {
            let [l, a, b] = srgb_to_lab(pixel.0);
            let (x, y) = (x as usize, y as usize);
            map[[ORIENTATION_BINS, y, x]] = l / 100.0;
            map[[ORIENTATION_BINS + 1, y, x]] = a / 128.0;
            map[[ORIENTATION_BINS + 2, y, x]] = b / 128.0;
        }
    }

    map
}

/// Summed-area table over a feature map, for constant-time cell means.
#[derive(Debug, Clone)]
pub(crate) struct IntegralMap {
    sums: Array3<f64>,
}

impl IntegralMap {
    /// Sum a `(channels, height, width)` map.
    pub fn new(map: &Array3<f32>) -> Self {
        let (channels, h, w) = map.dim();
        let mut sums = Array3::zeros((channels, h + 1, w + 1));
        for c in 0..channels {
            for y in 0..h {
                let mut row = 0.0f64;
                for x in 0..w {
                    row += map[[c, y, x]] as f64;
                    sums[[c, y + 1, x + 1]] = sums[[c, y, x + 1]] + row;
                }
            }
        }
        Self { sums }
    }

    /// Build directly from a frame.
    pub fn from_frame(frame: &Frame, mode: FeatureMode) -> Self {
        Self::new(&extract(frame, mode))
    }

    /// Mean of each channel over a `grid` of cells laid over `window`.
    ///
    /// Cells are clipped to the frame; a cell entirely outside collapses onto
    /// the nearest border pixel.
    pub fn sample(&self, window: &Region, grid: (usize, usize)) -> Array3<f32> {
        let (channels, h1, w1) = self.sums.dim();
        let (w, h) = (w1 - 1, h1 - 1);
        let (gw, gh) = grid;
        let cell_w = window.width / gw as f32;
        let cell_h = window.height / gh as f32;

        let mut patch = Array3::zeros((channels, gh, gw));
        if w == 0 || h == 0 {
            return patch;
        }
        for gy in 0..gh {
            let top = window.y + gy as f32 * cell_h;
            let (y0, y1) = cell_span(top, top + cell_h, h);
            for gx in 0..gw {
                let left = window.x + gx as f32 * cell_w;
                let (x0, x1) = cell_span(left, left + cell_w, w);
                let area = ((x1 - x0) * (y1 - y0)) as f64;
                for c in 0..channels {
                    let sum = self.sums[[c, y1, x1]] - self.sums[[c, y0, x1]]
                        - self.sums[[c, y1, x0]]
                        + self.sums[[c, y0, x0]];
                    patch[[c, gy, gx]] = (sum / area) as f32;
                }
            }
        }
        patch
    }
}

/// Pixel span `[start, end)` covered by `[from, to)`, clipped to `0..len`
/// and never empty.
fn cell_span(from: f32, to: f32, len: usize) -> (usize, usize) {
    let clip = |v: f32| {
        if v.is_finite() {
            v.max(0.0).min(len as f32) as usize
        } else {
            0
        }
    };
    let start = clip(from.floor()).min(len - 1);
    let end = clip(to.ceil()).max(start + 1);
    (start, end)
}

/// BT.601 luma in `[0, 1]`, kept in floating point unlike `imageops::grayscale`.
fn luminance(frame: &Frame) -> ndarray::Array2<f32> {
    let (width, height) = frame.dimensions();
    let mut luma = ndarray::Array2::zeros((height as usize, width as usize));
    for (x, y, pixel) in frame.enumerate_pixels() {
        let [r, g, b] = pixel.0;
        luma[[y as usize, x as usize]] =
            (0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32) / 255.0;
    }
    luma
}

fn orientation_bin(gx: f32, gy: f32) -> usize {
    // unsigned orientation in [0, pi)
    let mut theta = gy.atan2(gx);
    if theta < 0.0 {
        theta += PI;
    }
    ((theta / PI * ORIENTATION_BINS as f32) as usize).min(ORIENTATION_BINS - 1)
}

/// sRGB (D65) to CIELAB.
fn srgb_to_lab(rgb: [u8; 3]) -> [f32; 3] {
    let linear = rgb.map(|c| {
        let c = c as f32 / 255.0;
        if c <= 0.04045 {
            c / 12.92
        } else {
            ((c + 0.055) / 1.055).powf(2.4)
        }
    });
    let [r, g, b] = linear;

    let x = (0.4124 * r + 0.3576 * g + 0.1805 * b) / 0.95047;
    let y = 0.2126 * r + 0.7152 * g + 0.0722 * b;
    let z = (0.0193 * r + 0.1192 * g + 0.9505 * b) / 1.08883;

    let f = |t: f32| {
        if t > 0.008856 {
            t.cbrt()
        } else {
            7.787 * t + 16.0 / 116.0
        }
    };
    let (fx, fy, fz) = (f(x), f(y), f(z));

    [116.0 * fy - 16.0, 500.0 * (fx - fy), 200.0 * (fy - fz)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    #[test]
    fn test_channel_counts() {
        let frame = RgbImage::from_pixel(8, 6, Rgb([10, 20, 30]));
        assert_eq!(extract(&frame, FeatureMode::Gray).dim(), (1, 6, 8));
        assert_eq!(extract(&frame, FeatureMode::Hog).dim(), (4, 6, 8));
        assert_eq!(extract(&frame, FeatureMode::Lab).dim(), (7, 6, 8));
    }

    #[test]
    fn test_flat_frame_has_no_gradient() {
        let frame = RgbImage::from_pixel(8, 8, Rgb([200, 200, 200]));
        let map = extract(&frame, FeatureMode::Hog);
        assert!(map.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_vertical_edge_lands_in_horizontal_gradient_bin() {
        let frame = RgbImage::from_fn(8, 8, |x, _| {
            if x < 4 { Rgb([0, 0, 0]) } else { Rgb([255, 255, 255]) }
        });
        let map = extract(&frame, FeatureMode::Hog);
        assert!(map[[0, 4, 4]] > 0.5);
        assert_eq!(map[[2, 4, 4]], 0.0);
    }

    #[test]
    fn test_lab_white_and_black() {
        let [l, a, b] = srgb_to_lab([255, 255, 255]);
        assert!((l - 100.0).abs() < 0.5);
        assert!(a.abs() < 0.5 && b.abs() < 0.5);
        assert!(srgb_to_lab([0, 0, 0])[0].abs() < 1e-3);
    }

    #[test]
    fn test_cell_means() {
        let frame = RgbImage::from_fn(4, 4, |x, _| Rgb([x as u8 * 60; 3]));
        let map = extract(&frame, FeatureMode::Gray);
        let integral = IntegralMap::new(&map);
        let patch = integral.sample(&Region::new(0.0, 0.0, 4.0, 4.0), (2, 1));
        let left = (map[[0, 0, 0]] + map[[0, 0, 1]]) / 2.0;
        assert!((patch[[0, 0, 0]] - left).abs() < 1e-6);
    }

    #[test]
    fn test_sample_clamps_outside_frame() {
        let frame = RgbImage::from_fn(4, 4, |x, _| Rgb([x as u8 * 60; 3]));
        let map = extract(&frame, FeatureMode::Gray);
        let integral = IntegralMap::new(&map);
        let patch = integral.sample(&Region::new(-8.0, 0.0, 16.0, 4.0), (4, 1));
        assert!((patch[[0, 0, 0]] - map[[0, 0, 0]]).abs() < 1e-6);
        assert!((patch[[0, 0, 3]] - map[[0, 0, 3]]).abs() < 1e-6);
    }
}
