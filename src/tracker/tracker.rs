//! Multi-object tracker: predict, associate, update, prune.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::tracker::matching::{self, AssignmentResult, Detection};
use crate::tracker::track::Track;

/// Tracker tuning knobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackerConfig {
    /// Association gate: pairs with 1 - IoU above this never match
    pub max_iou_distance: f32,
    /// Consecutive missed frames before a confirmed track is deleted
    pub max_age: u32,
    /// Consecutive hits required to confirm a tentative track
    pub n_init: u32,
    /// Keypoint frames retained per track for action classification
    pub history_len: usize,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            max_iou_distance: 0.7,
            max_age: 30,
            n_init: 3,
            history_len: 30,
        }
    }
}

/// Owns the set of live [`Track`]s and drives their per-frame protocol.
///
/// The caller invokes [`predict`](Tracker::predict) then
/// [`update`](Tracker::update) exactly once per frame, in that order.
/// Track ids are allocated monotonically and never reused; a person who
/// drops out and reappears gets a fresh identity.
pub struct Tracker {
    config: TrackerConfig,
    tracks: Vec<Track>,
    next_id: u64,
}

impl Tracker {
    pub fn new(config: TrackerConfig) -> Self {
        Self {
            config,
            tracks: Vec::new(),
            next_id: 1,
        }
    }

    /// Live tracks, including tentative ones.
    #[inline]
    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    #[inline]
    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Advance every track's state distribution one time step.
    ///
    /// Call once per frame, before [`update`](Tracker::update).
    pub fn predict(&mut self) {
        for track in &mut self.tracks {
            track.predict();
        }
    }

    /// Fold this frame's detections into the track set: associate,
    /// update matches, age out misses, spawn tracks for leftovers, and
    /// prune everything deleted.
    pub fn update(&mut self, detections: &[Detection]) {
        let AssignmentResult {
            matches,
            unmatched_tracks,
            unmatched_detections,
        } = matching::matching_cascade(
            &self.tracks,
            detections,
            self.config.max_age,
            self.config.max_iou_distance,
        );

        debug!(
            matched = matches.len(),
            missed = unmatched_tracks.len(),
            new = unmatched_detections.len(),
            "association"
        );

        for (track_idx, det_idx) in matches {
            self.tracks[track_idx].update(&detections[det_idx]);
        }
        for track_idx in unmatched_tracks {
            self.tracks[track_idx].mark_missed();
        }
        for det_idx in unmatched_detections {
            self.initiate_track(&detections[det_idx]);
        }

        self.tracks.retain(|t| !t.is_deleted());
    }

    fn initiate_track(&mut self, detection: &Detection) {
        debug!(track_id = self.next_id, "new tentative track");
        self.tracks.push(Track::new(
            self.next_id,
            detection,
            self.config.n_init,
            self.config.max_age,
            self.config.history_len,
        ));
        self.next_id += 1;
    }
}
