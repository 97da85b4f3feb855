//! Pipeline layer: collaborator contracts, the per-frame driver, and
//! the annotated output stream boundary.

mod config;
mod driver;
mod frame;
mod models;
mod stream;

pub use config::PipelineConfig;
pub use driver::{ActionLabel, FrameObserver, FrameReport, PipelineDriver, TrackReport};
pub use frame::{Frame, FrameSource};
pub use models::{ActionClassifier, BoxDetection, Detector, Pose, PoseEstimator};
pub use stream::{FrameEncoder, MultipartStream};
