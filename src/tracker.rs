//! Tracking core: Kalman motion model, track lifecycle, association.

mod kalman_filter;
mod matching;
mod pose_history;
mod rect;
mod track;
mod track_state;
#[allow(clippy::module_inception)]
mod tracker;

pub use kalman_filter::KalmanFilter;
pub use matching::{AssignmentResult, Detection, GATED_COST, iou_cost, matching_cascade, min_cost_matching};
pub use pose_history::PoseHistory;
pub use rect::{MIN_BOX_DIM, Rect};
pub use track::Track;
pub use track_state::TrackState;
pub use tracker::{Tracker, TrackerConfig};
