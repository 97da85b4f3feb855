//! Driver protocol scenarios with mock model collaborators.

use std::convert::Infallible;

use ndarray::{Array1, Array2, ArrayView3};
use posetrack_rs::pipeline::{
    ActionClassifier, BoxDetection, Detector, Frame, FrameSource, Pose, PoseEstimator,
};
use posetrack_rs::tracker::Rect;
use posetrack_rs::{Error, PipelineConfig, PipelineDriver};

const JOINTS: usize = 13;
const MARGIN: f32 = 20.0;

fn blank_frame() -> Frame {
    Frame::new(vec![0; 64 * 48 * 3], 64, 48)
}

/// Scripted detector: pops one pre-programmed detection list per frame.
struct ScriptedDetector {
    script: Vec<Vec<BoxDetection>>,
    cursor: usize,
}

impl ScriptedDetector {
    fn new(script: Vec<Vec<BoxDetection>>) -> Self {
        Self { script, cursor: 0 }
    }
}

impl Detector for ScriptedDetector {
    type Error = Infallible;

    fn detect(&mut self, _frame: &Frame) -> Result<Vec<BoxDetection>, Self::Error> {
        let step = self.script.get(self.cursor).cloned().unwrap_or_default();
        self.cursor += 1;
        Ok(step)
    }
}

/// Synthesizes one skeleton per distinct box, joints spread inside the
/// box inset by the pipeline margin so the keypoint-extent box
/// reproduces the input box. Near-duplicate boxes collapse to one
/// skeleton, mirroring a real estimator's pose NMS.
struct SyntheticPose;

impl PoseEstimator for SyntheticPose {
    type Error = Infallible;

    fn estimate(&mut self, _frame: &Frame, boxes: &[BoxDetection]) -> Result<Vec<Pose>, Self::Error> {
        let mut distinct: Vec<BoxDetection> = Vec::new();
        for b in boxes {
            if !distinct.iter().any(|d| d.bbox.iou(&b.bbox) > 0.5) {
                distinct.push(*b);
            }
        }
        Ok(distinct
            .iter()
            .map(|b| {
                let inner = Rect::new(
                    b.bbox.x1 + MARGIN,
                    b.bbox.y1 + MARGIN,
                    b.bbox.x2 - MARGIN,
                    b.bbox.y2 - MARGIN,
                );
                let mut keypoints = Array2::zeros((JOINTS, 2));
                for (i, mut row) in keypoints.rows_mut().into_iter().enumerate() {
                    let t = i as f32 / (JOINTS - 1) as f32;
                    row[0] = inner.x1 + t * inner.width();
                    row[1] = inner.y1 + t * inner.height();
                }
                Pose {
                    keypoints,
                    kp_scores: Array1::from_elem(JOINTS, 0.9),
                }
            })
            .collect())
    }
}

/// Counts invocations and always answers with a fixed distribution.
struct FixedClassifier {
    names: Vec<String>,
    calls: std::rc::Rc<std::cell::Cell<usize>>,
}

impl FixedClassifier {
    fn new(calls: std::rc::Rc<std::cell::Cell<usize>>) -> Self {
        Self {
            names: vec![
                "Walking".to_string(),
                "Fall Down".to_string(),
                "Lying Down".to_string(),
            ],
            calls,
        }
    }
}

impl ActionClassifier for FixedClassifier {
    type Error = Infallible;

    fn class_names(&self) -> &[String] {
        &self.names
    }

    fn classify(
        &mut self,
        history: ArrayView3<'_, f32>,
        _frame_shape: (u32, u32),
    ) -> Result<Array1<f32>, Self::Error> {
        assert_eq!(history.dim(), (30, JOINTS, 3));
        self.calls.set(self.calls.get() + 1);
        Ok(Array1::from_vec(vec![0.15, 0.8, 0.05]))
    }
}

fn person_box() -> BoxDetection {
    BoxDetection {
        bbox: Rect::new(100.0, 100.0, 200.0, 300.0),
        score: 0.9,
    }
}

#[test]
fn action_fires_once_history_window_fills() {
    let calls = std::rc::Rc::new(std::cell::Cell::new(0));
    let detector = ScriptedDetector::new(vec![vec![person_box()]; 40]);
    let mut driver = PipelineDriver::new(
        PipelineConfig::default(),
        detector,
        SyntheticPose,
        FixedClassifier::new(calls.clone()),
    );

    let frame = blank_frame();
    for i in 1..=29 {
        let report = driver.process_frame(&frame).unwrap();
        if i >= 3 {
            // Confirmed from frame 3, but the window is still filling.
            assert_eq!(report.tracks.len(), 1);
            assert!(report.tracks[0].action.is_none());
        }
    }
    assert_eq!(calls.get(), 0);

    // Frame 30 completes the 30-entry window.
    let report = driver.process_frame(&frame).unwrap();
    assert_eq!(calls.get(), 1);
    let action = report.tracks[0].action.as_ref().unwrap();
    assert_eq!(action.name, "Fall Down");
    assert!((action.confidence - 0.8).abs() < 1e-6);

    // Subsequent frames keep classifying on the sliding window.
    driver.process_frame(&frame).unwrap();
    assert_eq!(calls.get(), 2);
}

#[test]
fn merged_predictions_bridge_detector_dropouts() {
    // Detector sees the person for 5 frames, then goes blind. The merge
    // policy keeps offering the track's predicted box to the pose
    // estimator, so the track keeps matching instead of coasting.
    let calls = std::rc::Rc::new(std::cell::Cell::new(0));
    let mut script = vec![vec![person_box()]; 5];
    script.extend(std::iter::repeat_n(Vec::new(), 10));
    let mut driver = PipelineDriver::new(
        PipelineConfig::default(),
        ScriptedDetector::new(script),
        SyntheticPose,
        FixedClassifier::new(calls),
    );

    let frame = blank_frame();
    let mut last = None;
    for _ in 0..15 {
        last = Some(driver.process_frame(&frame).unwrap());
    }
    let report = last.unwrap();
    assert_eq!(report.tracks.len(), 1);
    assert!(report.tracks[0].fresh);
    assert_eq!(report.tracks[0].track_id, 1);
}

#[test]
fn dropouts_coast_when_merge_disabled() {
    let calls = std::rc::Rc::new(std::cell::Cell::new(0));
    let mut script = vec![vec![person_box()]; 5];
    script.extend(std::iter::repeat_n(Vec::new(), 10));
    let config = PipelineConfig {
        merge_predicted: false,
        ..PipelineConfig::default()
    };
    let mut driver = PipelineDriver::new(
        config,
        ScriptedDetector::new(script),
        SyntheticPose,
        FixedClassifier::new(calls),
    );

    let frame = blank_frame();
    let mut last = None;
    for _ in 0..15 {
        last = Some(driver.process_frame(&frame).unwrap());
    }
    let report = last.unwrap();
    // Track survives (max_age 30) but has not matched for 10 frames.
    assert_eq!(report.tracks.len(), 1);
    assert!(!report.tracks[0].fresh);
}

#[test]
fn detector_failure_terminates_session() {
    #[derive(Debug)]
    struct BrokenDetector;

    impl Detector for BrokenDetector {
        type Error = std::io::Error;

        fn detect(&mut self, _frame: &Frame) -> Result<Vec<BoxDetection>, Self::Error> {
            Err(std::io::Error::other("device lost"))
        }
    }

    let calls = std::rc::Rc::new(std::cell::Cell::new(0));
    let mut driver = PipelineDriver::new(
        PipelineConfig::default(),
        BrokenDetector,
        SyntheticPose,
        FixedClassifier::new(calls),
    );
    let err = driver.process_frame(&blank_frame()).unwrap_err();
    assert!(matches!(err, Error::Detector(_)));
}

#[test]
fn run_drains_a_finite_source() {
    struct CountedSource {
        remaining: usize,
    }

    impl FrameSource for CountedSource {
        type Error = std::io::Error;

        fn next_frame(&mut self) -> Result<Option<Frame>, Self::Error> {
            if self.remaining == 0 {
                return Ok(None);
            }
            self.remaining -= 1;
            Ok(Some(blank_frame()))
        }
    }

    let calls = std::rc::Rc::new(std::cell::Cell::new(0));
    let mut driver = PipelineDriver::new(
        PipelineConfig::default(),
        ScriptedDetector::new(vec![vec![person_box()]; 8]),
        SyntheticPose,
        FixedClassifier::new(calls),
    );

    let mut source = CountedSource { remaining: 8 };
    let mut frames_seen = 0;
    driver
        .run(&mut source, |_, _| {
            frames_seen += 1;
            Ok(())
        })
        .unwrap();
    assert_eq!(frames_seen, 8);
    assert_eq!(driver.tracker().tracks().len(), 1);
}
