//! Collaborator contracts for the pretrained models.
//!
//! Each stage is a stateless forward pass behind a narrow trait; the
//! pipeline never inspects weights, devices, or input preprocessing.
//! Implementations surface failures through their own error type, which
//! the driver boxes into [`crate::Error`].

use ndarray::{Array1, Array2, ArrayView3};

use crate::pipeline::frame::Frame;
use crate::tracker::Rect;

/// A detector candidate box before pose estimation.
#[derive(Debug, Clone, Copy)]
pub struct BoxDetection {
    /// Bounding box in TLBR format
    pub bbox: Rect,
    /// Detection confidence
    pub score: f32,
}

/// One estimated skeleton: (N, 2) joint coordinates plus an (N,) score
/// per joint.
#[derive(Debug, Clone)]
pub struct Pose {
    pub keypoints: Array2<f32>,
    pub kp_scores: Array1<f32>,
}

/// Person detector: boxes + scores from one frame. May return none.
pub trait Detector {
    type Error: std::error::Error + Send + Sync + 'static;

    fn detect(&mut self, frame: &Frame) -> Result<Vec<BoxDetection>, Self::Error>;
}

/// Pose estimator: one skeleton per input box, order-preserving.
///
/// Estimators run pose-level NMS internally, so near-duplicate boxes
/// (as produced by the predicted-box merge policy) collapse to a single
/// skeleton and the output may be shorter than the input.
pub trait PoseEstimator {
    type Error: std::error::Error + Send + Sync + 'static;

    fn estimate(&mut self, frame: &Frame, boxes: &[BoxDetection]) -> Result<Vec<Pose>, Self::Error>;
}

/// Action classifier over a full keypoint history window.
///
/// `classify` receives a (T, N, 3) window (oldest frame first) together
/// with the frame shape, and returns one probability per class, aligned
/// with `class_names`. Only called once a track's window is full.
pub trait ActionClassifier {
    type Error: std::error::Error + Send + Sync + 'static;

    fn class_names(&self) -> &[String];

    fn classify(
        &mut self,
        history: ArrayView3<'_, f32>,
        frame_shape: (u32, u32),
    ) -> Result<Array1<f32>, Self::Error>;
}
