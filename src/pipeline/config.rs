//! Pipeline configuration, passed into the driver at startup.

use serde::{Deserialize, Serialize};

use crate::tracker::TrackerConfig;

/// All pipeline-level knobs in one explicit struct.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Tracking core configuration
    pub tracker: TrackerConfig,
    /// Pixel margin around keypoint extents when deriving track boxes
    pub bbox_margin: f32,
    /// Feed each track's predicted box back into the candidate list as a
    /// pseudo-detection. Recall heuristic for known tracks; the Tracker
    /// itself never does this.
    pub merge_predicted: bool,
    /// Neutral confidence assigned to merged pseudo-detections
    pub pseudo_score: f32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            tracker: TrackerConfig::default(),
            bbox_margin: 20.0,
            merge_predicted: true,
            pseudo_score: 0.5,
        }
    }
}
