//! Per-frame pipeline driver.
//!
//! Fixed order per frame: detect, tracker predict, candidate merge,
//! pose estimation, tracker update, action classification of confirmed
//! tracks with a full history window. The driver owns the tracker and
//! the three model collaborators; visualization stays outside, behind
//! an optional observer callback.

use ndarray::Array2;
use tracing::debug;

use crate::error::Error;
use crate::pipeline::config::PipelineConfig;
use crate::pipeline::frame::{Frame, FrameSource};
use crate::pipeline::models::{ActionClassifier, BoxDetection, Detector, PoseEstimator};
use crate::tracker::{Detection, Rect, Tracker};

/// Predicted action for one track.
#[derive(Debug, Clone)]
pub struct ActionLabel {
    pub name: String,
    pub confidence: f32,
}

/// Per-track output of one processed frame.
#[derive(Debug, Clone)]
pub struct TrackReport {
    pub track_id: u64,
    pub bbox: Rect,
    pub center: (f32, f32),
    /// Matched this very frame. Presentation layers typically only
    /// draw fresh tracks.
    pub fresh: bool,
    pub keypoints: Option<Array2<f32>>,
    pub action: Option<ActionLabel>,
}

/// All confirmed-track outputs of one processed frame.
#[derive(Debug, Clone)]
pub struct FrameReport {
    pub frame_index: u64,
    pub tracks: Vec<TrackReport>,
}

/// Observer invoked after each tracker update, for drawing/annotation.
pub type FrameObserver = Box<dyn FnMut(&Frame, &FrameReport)>;

/// Binds detector, pose estimator, action classifier, and the tracking
/// core into the per-frame protocol.
pub struct PipelineDriver<D, P, A> {
    config: PipelineConfig,
    detector: D,
    pose: P,
    classifier: A,
    tracker: Tracker,
    frame_index: u64,
    observer: Option<FrameObserver>,
}

impl<D, P, A> PipelineDriver<D, P, A>
where
    D: Detector,
    P: PoseEstimator,
    A: ActionClassifier,
{
    pub fn new(config: PipelineConfig, detector: D, pose: P, classifier: A) -> Self {
        let tracker = Tracker::new(config.tracker.clone());
        Self {
            config,
            detector,
            pose,
            classifier,
            tracker,
            frame_index: 0,
            observer: None,
        }
    }

    /// Register a presentation-layer callback receiving every report.
    pub fn with_observer(mut self, observer: FrameObserver) -> Self {
        self.observer = Some(observer);
        self
    }

    #[inline]
    pub fn tracker(&self) -> &Tracker {
        &self.tracker
    }

    /// Run one frame through the full protocol.
    pub fn process_frame(&mut self, frame: &Frame) -> Result<FrameReport, Error> {
        self.frame_index += 1;

        let mut candidates = self.detector.detect(frame).map_err(Error::detector)?;

        self.tracker.predict();

        // Pipeline-level recall heuristic: re-offer each live track's
        // predicted box as a pseudo-detection with neutral confidence,
        // so the pose estimator revisits known people the detector
        // missed this frame.
        if self.config.merge_predicted {
            for track in self.tracker.tracks() {
                candidates.push(BoxDetection {
                    bbox: track.bbox(),
                    score: self.config.pseudo_score,
                });
            }
        }

        let detections: Vec<Detection> = if candidates.is_empty() {
            Vec::new()
        } else {
            let poses = self
                .pose
                .estimate(frame, &candidates)
                .map_err(Error::pose)?;
            poses
                .iter()
                .map(|p| {
                    Detection::from_pose(
                        p.keypoints.view(),
                        p.kp_scores.view(),
                        self.config.bbox_margin,
                    )
                })
                .collect()
        };

        self.tracker.update(&detections);

        let mut reports = Vec::new();
        for track in self.tracker.tracks() {
            if !track.is_confirmed() {
                continue;
            }

            // The classifier needs the full 30-frame window.
            let action = if track.history().is_full() {
                let window = track.history().to_array();
                let probs = self
                    .classifier
                    .classify(window.view(), frame.shape())
                    .map_err(Error::classifier)?;
                argmax(probs.as_slice().unwrap_or(&[])).map(|(idx, confidence)| ActionLabel {
                    name: self.classifier.class_names()[idx].clone(),
                    confidence,
                })
            } else {
                None
            };

            reports.push(TrackReport {
                track_id: track.track_id,
                bbox: track.bbox(),
                center: track.center(),
                fresh: track.time_since_update() == 0,
                keypoints: track.latest_keypoints().cloned(),
                action,
            });
        }

        debug!(
            frame = self.frame_index,
            tracks = reports.len(),
            detections = detections.len(),
            "frame processed"
        );

        let report = FrameReport {
            frame_index: self.frame_index,
            tracks: reports,
        };
        if let Some(observer) = &mut self.observer {
            observer(frame, &report);
        }
        Ok(report)
    }

    /// Pump a frame source to exhaustion, handing each frame and its
    /// report to `sink`. Stops cleanly between frames when the source
    /// ends; any error terminates the session.
    pub fn run<S, F>(&mut self, source: &mut S, mut sink: F) -> Result<(), Error>
    where
        S: FrameSource,
        F: FnMut(&Frame, &FrameReport) -> Result<(), Error>,
    {
        while let Some(frame) = source.next_frame().map_err(Error::source)? {
            let report = self.process_frame(&frame)?;
            sink(&frame, &report)?;
        }
        Ok(())
    }
}

fn argmax(probs: &[f32]) -> Option<(usize, f32)> {
    probs
        .iter()
        .copied()
        .enumerate()
        .max_by(|a, b| a.1.total_cmp(&b.1))
}
