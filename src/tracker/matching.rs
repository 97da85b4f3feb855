//! Association engine: matches current-frame detections to tracks.
//!
//! Cost is 1 - IoU between a track's Kalman-predicted box and the
//! detection box, gated by a maximum distance. The assignment is solved
//! as a min-cost bipartite matching (Jonker-Volgenant via `lapjv`),
//! cascaded over track freshness so recently seen tracks claim
//! detections before stale ones.

use ndarray::{Array2, ArrayView1, ArrayView2};

use crate::tracker::rect::Rect;
use crate::tracker::track::Track;

/// Sentinel cost for gated-out pairs; large enough that the solver
/// never prefers one over any real assignment.
pub const GATED_COST: f32 = 1e5;

/// A person candidate produced from one frame: keypoint-derived box,
/// (N, 3) keypoints with per-joint confidence, and aggregate score.
/// Consumed by exactly one tracker update cycle.
#[derive(Debug, Clone)]
pub struct Detection {
    /// Bounding box in TLBR format
    pub bbox: Rect,
    /// Keypoints with per-joint confidence, shape (N, 3)
    pub keypoints: Array2<f32>,
    /// Aggregate confidence score
    pub score: f32,
}

impl Detection {
    pub fn new(bbox: Rect, keypoints: Array2<f32>, score: f32) -> Self {
        Self {
            bbox,
            keypoints,
            score,
        }
    }

    /// Build a detection from an (N, 2) keypoint array and (N,) joint
    /// scores: the box is the keypoint extent expanded by `margin`, the
    /// aggregate score the mean joint confidence.
    pub fn from_pose(
        keypoints: ArrayView2<'_, f32>,
        kp_scores: ArrayView1<'_, f32>,
        margin: f32,
    ) -> Self {
        let bbox = Rect::from_keypoints(keypoints, margin);
        let n = keypoints.nrows();
        let mut merged = Array2::zeros((n, 3));
        for i in 0..n {
            merged[[i, 0]] = keypoints[[i, 0]];
            merged[[i, 1]] = keypoints[[i, 1]];
            merged[[i, 2]] = kp_scores[i];
        }
        let score = if n > 0 {
            kp_scores.sum() / n as f32
        } else {
            0.0
        };
        Self::new(bbox, merged, score)
    }
}

/// Outcome of one association round, as indices into the caller's
/// track and detection slices.
#[derive(Debug, Clone, Default)]
pub struct AssignmentResult {
    pub matches: Vec<(usize, usize)>,
    pub unmatched_tracks: Vec<usize>,
    pub unmatched_detections: Vec<usize>,
}

/// 1 - IoU cost matrix over the given track/detection index subsets.
pub fn iou_cost(
    tracks: &[Track],
    detections: &[Detection],
    track_indices: &[usize],
    detection_indices: &[usize],
) -> Array2<f32> {
    let track_boxes: Vec<Rect> = track_indices.iter().map(|&i| tracks[i].bbox()).collect();
    let mut costs = Array2::zeros((track_indices.len(), detection_indices.len()));
    for (row, tbox) in track_boxes.iter().enumerate() {
        for (col, &d) in detection_indices.iter().enumerate() {
            costs[[row, col]] = 1.0 - tbox.iou(&detections[d].bbox);
        }
    }
    costs
}

/// Solve one min-cost matching round over index subsets.
///
/// Pairs with cost above `max_distance` are gated out before solving
/// and rejected afterwards, so a fully gated matrix yields no matches.
pub fn min_cost_matching(
    tracks: &[Track],
    detections: &[Detection],
    track_indices: &[usize],
    detection_indices: &[usize],
    max_distance: f32,
) -> AssignmentResult {
    if track_indices.is_empty() || detection_indices.is_empty() {
        return AssignmentResult {
            matches: vec![],
            unmatched_tracks: track_indices.to_vec(),
            unmatched_detections: detection_indices.to_vec(),
        };
    }

    let mut costs = iou_cost(tracks, detections, track_indices, detection_indices);
    costs.mapv_inplace(|c| if c > max_distance { GATED_COST } else { c });

    let (num_rows, num_cols) = costs.dim();
    let size = num_rows.max(num_cols);
    let mut padded = Array2::<f64>::from_elem((size, size), GATED_COST as f64);
    for i in 0..num_rows {
        for j in 0..num_cols {
            padded[[i, j]] = costs[[i, j]] as f64;
        }
    }

    let mut matches = vec![];
    let mut unmatched_tracks = vec![];
    let mut matched_cols = vec![false; num_cols];

    match lapjv::lapjv(&padded) {
        Ok((row_to_col, _)) => {
            for (row, &col) in row_to_col.iter().enumerate() {
                if row >= num_rows {
                    continue;
                }
                if col < num_cols && costs[[row, col]] <= max_distance {
                    matches.push((track_indices[row], detection_indices[col]));
                    matched_cols[col] = true;
                } else {
                    unmatched_tracks.push(track_indices[row]);
                }
            }
        }
        Err(_) => {
            unmatched_tracks = track_indices.to_vec();
        }
    }

    let unmatched_detections = detection_indices
        .iter()
        .enumerate()
        .filter(|(col, _)| !matched_cols[*col])
        .map(|(_, &d)| d)
        .collect();

    AssignmentResult {
        matches,
        unmatched_tracks,
        unmatched_detections,
    }
}

/// Full per-frame association.
///
/// Confirmed tracks are matched in ascending order of
/// `time_since_update`, one cascade level per value up to `max_age`, so
/// a fresher track always gets first claim on the detections. Tentative
/// tracks, together with confirmed tracks missed exactly once by the
/// cascade, get a final IoU round over the leftovers.
pub fn matching_cascade(
    tracks: &[Track],
    detections: &[Detection],
    max_age: u32,
    max_distance: f32,
) -> AssignmentResult {
    let confirmed: Vec<usize> = (0..tracks.len())
        .filter(|&i| tracks[i].is_confirmed())
        .collect();
    let tentative: Vec<usize> = (0..tracks.len())
        .filter(|&i| tracks[i].is_tentative())
        .collect();

    let mut matches = vec![];
    let mut unmatched_detections: Vec<usize> = (0..detections.len()).collect();

    for level in 0..max_age {
        if unmatched_detections.is_empty() {
            break;
        }
        let level_tracks: Vec<usize> = confirmed
            .iter()
            .copied()
            .filter(|&i| tracks[i].time_since_update() == 1 + level)
            .collect();
        if level_tracks.is_empty() {
            continue;
        }
        let round = min_cost_matching(
            tracks,
            detections,
            &level_tracks,
            &unmatched_detections,
            max_distance,
        );
        matches.extend(round.matches);
        unmatched_detections = round.unmatched_detections;
    }

    let matched_tracks: std::collections::HashSet<usize> =
        matches.iter().map(|&(t, _)| t).collect();

    // Confirmed tracks the cascade left behind: those missed exactly
    // once still join the final IoU round, the rest stay unmatched.
    let (fresh_misses, mut unmatched_tracks): (Vec<usize>, Vec<usize>) = confirmed
        .iter()
        .copied()
        .filter(|i| !matched_tracks.contains(i))
        .partition(|&i| tracks[i].time_since_update() == 1);

    let iou_candidates: Vec<usize> = tentative.into_iter().chain(fresh_misses).collect();
    let round = min_cost_matching(
        tracks,
        detections,
        &iou_candidates,
        &unmatched_detections,
        max_distance,
    );
    matches.extend(round.matches);
    unmatched_tracks.extend(round.unmatched_tracks);

    AssignmentResult {
        matches,
        unmatched_tracks,
        unmatched_detections: round.unmatched_detections,
    }
}
