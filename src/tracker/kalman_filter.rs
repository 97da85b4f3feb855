//! Per-track Kalman filter over bounding box motion.
//!
//! State is 8-dimensional: (cx, cy, a, h) plus their velocities, a
//! constant-velocity model in image space. Each track owns exactly one
//! filter instance; it is created from the track's first observation and
//! dropped with the track. The 4x4 innovation covariance is inverted
//! with nalgebra to avoid a BLAS/LAPACK dependency.

use ndarray::{Array1, Array2};

use crate::tracker::rect::Rect;

// Observation noise scales with the box height, following the standard
// deep-SORT weighting.
const STD_WEIGHT_POSITION: f64 = 1.0 / 20.0;
const STD_WEIGHT_VELOCITY: f64 = 1.0 / 160.0;

/// Constant-velocity motion model of a single tracked bounding box.
#[derive(Debug, Clone)]
pub struct KalmanFilter {
    mean: Array1<f64>,
    covariance: Array2<f64>,
    motion_mat: Array2<f64>,
    update_mat: Array2<f64>,
}

impl KalmanFilter {
    /// Initialize the filter from the first observed box. Velocities
    /// start at zero with high uncertainty.
    pub fn new(rect: Rect) -> Self {
        let ndim = 4;
        let mut motion_mat = Array2::eye(2 * ndim);
        for i in 0..ndim {
            motion_mat[[i, ndim + i]] = 1.0;
        }

        let mut update_mat = Array2::zeros((ndim, 2 * ndim));
        for i in 0..ndim {
            update_mat[[i, i]] = 1.0;
        }

        let measurement = xyah_f64(rect);
        let mut mean = Array1::zeros(8);
        for i in 0..4 {
            mean[i] = measurement[i];
        }

        let h = measurement[3];
        let std = [
            2.0 * STD_WEIGHT_POSITION * h,
            2.0 * STD_WEIGHT_POSITION * h,
            1e-2,
            2.0 * STD_WEIGHT_POSITION * h,
            10.0 * STD_WEIGHT_VELOCITY * h,
            10.0 * STD_WEIGHT_VELOCITY * h,
            1e-5,
            10.0 * STD_WEIGHT_VELOCITY * h,
        ];

        let mut covariance = Array2::zeros((8, 8));
        for i in 0..8 {
            covariance[[i, i]] = std[i] * std[i];
        }

        Self {
            mean,
            covariance,
            motion_mat,
            update_mat,
        }
    }

    /// Advance the state one time step: mean <- F*mean,
    /// cov <- F*cov*F^T + Q with Q diagonal, scaled by the box height.
    pub fn predict(&mut self) {
        let h = self.mean[3];
        let std = [
            STD_WEIGHT_POSITION * h,
            STD_WEIGHT_POSITION * h,
            1e-2,
            STD_WEIGHT_POSITION * h,
            STD_WEIGHT_VELOCITY * h,
            STD_WEIGHT_VELOCITY * h,
            1e-5,
            STD_WEIGHT_VELOCITY * h,
        ];

        let mut motion_cov = Array2::zeros((8, 8));
        for i in 0..8 {
            motion_cov[[i, i]] = std[i] * std[i];
        }

        self.mean = self.motion_mat.dot(&self.mean);
        self.covariance =
            self.motion_mat.dot(&self.covariance).dot(&self.motion_mat.t()) + motion_cov;
    }

    /// Standard linear correction step with a new observed box.
    pub fn update(&mut self, rect: Rect) {
        let (projected_mean, projected_cov) = self.project();

        let measurement = Array1::from_vec(xyah_f64(rect).to_vec());
        let innovation = measurement - projected_mean;

        // K = P * H^T * S^-1, with H = [I 0] so P*H^T is the first four
        // columns of P (8x4) and S is the projected covariance (4x4).
        let s_inv = invert_4x4(&projected_cov);
        let kalman_gain = self.covariance.dot(&self.update_mat.t()).dot(&s_inv);

        self.mean = &self.mean + &kalman_gain.dot(&innovation);
        self.covariance =
            &self.covariance - &kalman_gain.dot(&projected_cov).dot(&kalman_gain.t());
    }

    /// Current state estimate as a TLBR box.
    pub fn bbox(&self) -> Rect {
        Rect::from_xyah(
            self.mean[0] as f32,
            self.mean[1] as f32,
            self.mean[2] as f32,
            self.mean[3] as f32,
        )
    }

    /// Project the state distribution to measurement space.
    fn project(&self) -> (Array1<f64>, Array2<f64>) {
        let h = self.mean[3];
        let std = [
            STD_WEIGHT_POSITION * h,
            STD_WEIGHT_POSITION * h,
            1e-1,
            STD_WEIGHT_POSITION * h,
        ];

        let mut innovation_cov = Array2::zeros((4, 4));
        for i in 0..4 {
            innovation_cov[[i, i]] = std[i] * std[i];
        }

        let mean = self.update_mat.dot(&self.mean);
        let covariance =
            self.update_mat.dot(&self.covariance).dot(&self.update_mat.t()) + innovation_cov;

        (mean, covariance)
    }
}

#[inline]
fn xyah_f64(rect: Rect) -> [f64; 4] {
    let xyah = rect.to_xyah();
    [
        xyah[0] as f64,
        xyah[1] as f64,
        xyah[2] as f64,
        xyah[3] as f64,
    ]
}

/// Invert a 4x4 matrix through nalgebra (pure Rust). The innovation
/// covariance carries a strictly positive diagonal noise term, so the
/// inverse exists for any finite state.
fn invert_4x4(m: &Array2<f64>) -> Array2<f64> {
    let mut nm = nalgebra::Matrix4::zeros();
    for i in 0..4 {
        for j in 0..4 {
            nm[(i, j)] = m[[i, j]];
        }
    }
    let inv = nm.try_inverse().unwrap_or_else(nalgebra::Matrix4::identity);
    let mut res = Array2::zeros((4, 4));
    for i in 0..4 {
        for j in 0..4 {
            res[[i, j]] = inv[(i, j)];
        }
    }
    res
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state_matches_observation() {
        let kf = KalmanFilter::new(Rect::new(100.0, 100.0, 200.0, 300.0));
        let bbox = kf.bbox();
        assert!((bbox.x1 - 100.0).abs() < 1e-3);
        assert!((bbox.y2 - 300.0).abs() < 1e-3);
    }

    #[test]
    fn test_predict_keeps_stationary_box() {
        let mut kf = KalmanFilter::new(Rect::new(100.0, 100.0, 200.0, 300.0));
        kf.predict();
        // Zero initial velocity: predicted position is unchanged.
        let bbox = kf.bbox();
        assert!((bbox.x1 - 100.0).abs() < 1e-3);
    }

    #[test]
    fn test_update_pulls_toward_observation() {
        let mut kf = KalmanFilter::new(Rect::new(100.0, 100.0, 200.0, 300.0));
        for _ in 0..10 {
            kf.predict();
            kf.update(Rect::new(150.0, 100.0, 250.0, 300.0));
        }
        let bbox = kf.bbox();
        assert!((bbox.x1 - 150.0).abs() < 5.0);
    }

    #[test]
    fn test_learns_constant_velocity() {
        let mut kf = KalmanFilter::new(Rect::new(0.0, 0.0, 50.0, 100.0));
        for i in 1..=20 {
            kf.predict();
            let dx = (i * 5) as f32;
            kf.update(Rect::new(dx, 0.0, dx + 50.0, 100.0));
        }
        // Next prediction should extrapolate roughly 5px further right.
        let before = kf.bbox();
        kf.predict();
        let after = kf.bbox();
        assert!(after.x1 > before.x1 + 2.0);
    }

    #[test]
    fn test_degenerate_box_stays_finite() {
        let mut kf = KalmanFilter::new(Rect::new(10.0, 10.0, 10.0, 10.0));
        kf.predict();
        kf.update(Rect::new(10.0, 10.0, 10.0, 10.0));
        let bbox = kf.bbox();
        assert!(bbox.x1.is_finite() && bbox.y2.is_finite());
    }
}
