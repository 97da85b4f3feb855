//! Pose-aware multi-object tracking for real-time human action
//! recognition.
//!
//! The tracking core fuses per-frame person detections with
//! Kalman-predicted motion, resolves frame-to-frame identity through
//! min-cost bipartite matching, manages track lifecycles
//! (tentative/confirmed/deleted), and keeps a bounded window of pose
//! keypoints per track. Once a confirmed track accumulates a full
//! window, the pipeline hands it to an action classifier and reports
//! the label alongside the track.
//!
//! Detector, pose estimator, action classifier, frame capture, and
//! frame encoding are collaborators behind narrow traits in
//! [`pipeline`]; the core in [`tracker`] is pure, synchronous, and
//! frame-at-a-time.
//!
//! ```no_run
//! use posetrack_rs::tracker::{Detection, Rect, Tracker, TrackerConfig};
//! use ndarray::Array2;
//!
//! let mut tracker = Tracker::new(TrackerConfig::default());
//! // Once per frame, in this order:
//! tracker.predict();
//! let detections = vec![Detection::new(
//!     Rect::new(100.0, 100.0, 200.0, 300.0),
//!     Array2::zeros((13, 3)),
//!     0.9,
//! )];
//! tracker.update(&detections);
//! for track in tracker.tracks() {
//!     if track.is_confirmed() {
//!         println!("track {} at {:?}", track.track_id, track.bbox());
//!     }
//! }
//! ```

pub mod error;
pub mod pipeline;
pub mod tracker;

pub use error::Error;
pub use pipeline::{Frame, FrameReport, PipelineConfig, PipelineDriver};
pub use tracker::{Detection, Rect, Track, TrackState, Tracker, TrackerConfig};
