//! Constant-velocity motion prior for a single tracked region.
//!
//! State is `(cx, cy, aspect, h)` plus their velocities, stored in ndarray;
//! the 4x4 innovation inverse goes through nalgebra.

use ndarray::{Array1, Array2};

use crate::tracker::Region;

const NDIM: usize = 4;

/// Kalman filter over one region's center, aspect ratio and height.
///
/// `initiate` once, then alternate `predict` and `correct` every frame.
#[derive(Debug, Clone)]
pub struct MotionFilter {
    motion_mat: Array2<f64>,
    update_mat: Array2<f64>,
    std_weight_position: f64,
    std_weight_velocity: f64,
    mean: Array1<f64>,
    covariance: Array2<f64>,
}

impl Default for MotionFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl MotionFilter {
    /// Filter at the origin with unit covariance; call `initiate` before use.
    pub fn new() -> Self {
        let mut motion_mat = Array2::eye(2 * NDIM);
        for i in 0..NDIM {
            motion_mat[[i, NDIM + i]] = 1.0;
        }

        let mut update_mat = Array2::zeros((NDIM, 2 * NDIM));
        for i in 0..NDIM {
            update_mat[[i, i]] = 1.0;
        }

        Self {
            motion_mat,
            update_mat,
            std_weight_position: 1.0 / 20.0,
            std_weight_velocity: 1.0 / 160.0,
            mean: Array1::zeros(2 * NDIM),
            covariance: Array2::eye(2 * NDIM),
        }
    }

    /// Reset the state to `region` with zero velocity.
    pub fn initiate(&mut self, region: &Region) {
        let measurement = measurement_of(region);
        let mut mean = Array1::zeros(2 * NDIM);
        for i in 0..NDIM {
            mean[i] = measurement[i];
        }

        let h = measurement[3];
        let std = [
            2.0 * self.std_weight_position * h,
            2.0 * self.std_weight_position * h,
            1e-2,
            2.0 * self.std_weight_position * h,
            10.0 * self.std_weight_velocity * h,
            10.0 * self.std_weight_velocity * h,
            1e-5,
            10.0 * self.std_weight_velocity * h,
        ];

        self.mean = mean;
        self.covariance = diagonal(&std);
    }

    /// Advance the state one frame and return the predicted region.
    pub fn predict(&mut self) -> Region {
        let h = self.mean[3];
        let std = [
            self.std_weight_position * h,
            self.std_weight_position * h,
            1e-2,
            self.std_weight_position * h,
            self.std_weight_velocity * h,
            self.std_weight_velocity * h,
            1e-5,
            self.std_weight_velocity * h,
        ];

        self.mean = self.motion_mat.dot(&self.mean);
        self.covariance =
            self.motion_mat.dot(&self.covariance).dot(&self.motion_mat.t()) + diagonal(&std);

        self.region()
    }

    /// Fold an observed region into the state.
    pub fn correct(&mut self, observed: &Region) {
        let h = self.mean[3];
        let std = [
            self.std_weight_position * h,
            self.std_weight_position * h,
            1e-1,
            self.std_weight_position * h,
        ];

        let projected_mean = self.update_mat.dot(&self.mean);
        let projected_cov =
            self.update_mat.dot(&self.covariance).dot(&self.update_mat.t()) + diagonal(&std);

        // Singular innovation: keep the prediction.
        let Some(s_inv) = invert_4x4(&projected_cov) else {
            log::warn!("innovation covariance is singular, skipping correction");
            return;
        };

        let innovation = Array1::from_vec(measurement_of(observed).to_vec()) - projected_mean;

        // K = P * H^T * S^-1, with H = [I 0]
        let pht = self.covariance.dot(&self.update_mat.t());
        let kalman_gain = pht.dot(&s_inv);

        self.mean = &self.mean + &kalman_gain.dot(&innovation);
        self.covariance =
            &self.covariance - &kalman_gain.dot(&projected_cov).dot(&kalman_gain.t());
    }

    /// Region described by the current mean.
    pub fn region(&self) -> Region {
        let height = self.mean[3] as f32;
        let width = self.mean[2] as f32 * height;
        Region::centered(self.mean[0] as f32, self.mean[1] as f32, width, height)
    }
}

fn measurement_of(region: &Region) -> [f64; NDIM] {
    let (cx, cy) = region.center();
    [
        cx as f64,
        cy as f64,
        region.aspect_ratio() as f64,
        region.height as f64,
    ]
}

fn diagonal(std: &[f64]) -> Array2<f64> {
    let mut m = Array2::zeros((std.len(), std.len()));
    for (i, s) in std.iter().enumerate() {
        m[[i, i]] = s * s;
    }
    m
}

fn invert_4x4(m: &Array2<f64>) -> Option<Array2<f64>> {
    let nm = nalgebra::Matrix4::from_fn(|i, j| m[[i, j]]);
    let inv = nm.try_inverse()?;
    Some(Array2::from_shape_fn((NDIM, NDIM), |(i, j)| inv[(i, j)]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initiate_reproduces_region() {
        let mut kf = MotionFilter::new();
        let seed = Region::new(100.0, 200.0, 40.0, 80.0);
        kf.initiate(&seed);
        let region = kf.region();
        assert!((region.x - seed.x).abs() < 1e-3);
        assert!((region.height - seed.height).abs() < 1e-3);
    }

    #[test]
    fn test_predict_without_velocity_stays_put() {
        let mut kf = MotionFilter::new();
        let seed = Region::new(10.0, 10.0, 20.0, 20.0);
        kf.initiate(&seed);
        let predicted = kf.predict();
        assert!((predicted.x - seed.x).abs() < 1e-3);
        assert!((predicted.y - seed.y).abs() < 1e-3);
    }

    #[test]
    fn test_learns_constant_velocity() {
        let mut kf = MotionFilter::new();
        kf.initiate(&Region::new(0.0, 0.0, 20.0, 20.0));
        for step in 1..=20 {
            kf.predict();
            kf.correct(&Region::new(step as f32 * 4.0, 0.0, 20.0, 20.0));
        }
        let (cx, _) = kf.predict().center();
        // last observed center is 90, next expected near 94
        assert!(cx > 90.5 && cx < 98.0, "cx = {cx}");
    }
}
