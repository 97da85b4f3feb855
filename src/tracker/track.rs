//! A single tracked identity across frames.

use ndarray::Array2;
use tracing::debug;

use crate::tracker::kalman_filter::KalmanFilter;
use crate::tracker::matching::Detection;
use crate::tracker::pose_history::PoseHistory;
use crate::tracker::rect::Rect;
use crate::tracker::track_state::TrackState;

/// One tracked person: lifecycle state, an exclusively owned motion
/// filter, and a bounded history of recent pose keypoint frames.
///
/// All mutation flows through [`predict`](Track::predict),
/// [`update`](Track::update) and [`mark_missed`](Track::mark_missed),
/// driven by the owning [`Tracker`](crate::tracker::Tracker).
#[derive(Debug, Clone)]
pub struct Track {
    /// Unique identifier, monotonically assigned by the tracker
    pub track_id: u64,
    state: TrackState,
    filter: KalmanFilter,
    history: PoseHistory,
    hits: u32,
    age: u32,
    time_since_update: u32,
    n_init: u32,
    max_age: u32,
}

impl Track {
    /// Create a new tentative track seeded from an unmatched detection.
    pub fn new(track_id: u64, detection: &Detection, n_init: u32, max_age: u32, history_len: usize) -> Self {
        let mut history = PoseHistory::with_capacity(history_len);
        history.push(detection.keypoints.clone());
        Self {
            track_id,
            state: TrackState::Tentative,
            filter: KalmanFilter::new(detection.bbox),
            history,
            hits: 1,
            age: 1,
            time_since_update: 0,
            n_init,
            max_age,
        }
    }

    /// Advance the motion filter one time step. Ages the track and
    /// counts one more frame without a match; no-op once deleted.
    pub fn predict(&mut self) {
        if self.state == TrackState::Deleted {
            return;
        }
        self.filter.predict();
        self.age += 1;
        self.time_since_update += 1;
    }

    /// Fold a matched detection into the track: Kalman correction,
    /// history append, lifecycle bookkeeping.
    pub fn update(&mut self, detection: &Detection) {
        self.filter.update(detection.bbox);
        self.history.push(detection.keypoints.clone());

        self.hits += 1;
        self.time_since_update = 0;

        if self.state == TrackState::Tentative && self.hits >= self.n_init {
            debug!(track_id = self.track_id, hits = self.hits, "track confirmed");
            self.state = TrackState::Confirmed;
        }
    }

    /// Record that no detection matched this track this frame.
    ///
    /// A tentative track dies on its first miss; a confirmed track
    /// survives until `time_since_update` exceeds `max_age`.
    pub fn mark_missed(&mut self) {
        if self.state == TrackState::Tentative {
            self.state = TrackState::Deleted;
        } else if self.time_since_update > self.max_age {
            debug!(
                track_id = self.track_id,
                time_since_update = self.time_since_update,
                "track aged out"
            );
            self.state = TrackState::Deleted;
        }
    }

    /// Current box estimate in TLBR form.
    #[inline]
    pub fn bbox(&self) -> Rect {
        self.filter.bbox()
    }

    /// Center of the current box estimate.
    #[inline]
    pub fn center(&self) -> (f32, f32) {
        self.bbox().center()
    }

    #[inline]
    pub fn state(&self) -> TrackState {
        self.state
    }

    #[inline]
    pub fn is_tentative(&self) -> bool {
        self.state == TrackState::Tentative
    }

    #[inline]
    pub fn is_confirmed(&self) -> bool {
        self.state == TrackState::Confirmed
    }

    #[inline]
    pub fn is_deleted(&self) -> bool {
        self.state == TrackState::Deleted
    }

    #[inline]
    pub fn hits(&self) -> u32 {
        self.hits
    }

    #[inline]
    pub fn age(&self) -> u32 {
        self.age
    }

    /// Frames since the last successful match; 0 means matched this frame.
    #[inline]
    pub fn time_since_update(&self) -> u32 {
        self.time_since_update
    }

    /// Sliding window of recent keypoint frames.
    #[inline]
    pub fn history(&self) -> &PoseHistory {
        &self.history
    }

    /// Keypoints from the most recent matched detection.
    #[inline]
    pub fn latest_keypoints(&self) -> Option<&Array2<f32>> {
        self.history.latest()
    }
}
