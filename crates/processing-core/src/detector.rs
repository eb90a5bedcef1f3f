//! The pose detector seam.
//!
//! The model itself lives outside the engine. A detector advertises which
//! parts it can report; the rest are never requested and end up as
//! zero-confidence placeholders during normalization.

use rayon::prelude::*;

use flowstate_pose_model::detection::{DetectionRecord, DetectorCapabilities, RawKeypoint};

/// Left and right hand keypoints from a single frame. Either side may be
/// missing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HandDetection {
    pub left: Option<Vec<RawKeypoint>>,
    pub right: Option<Vec<RawKeypoint>>,
}

/// A frame handed over by the frame source.
#[derive(Debug, Clone)]
pub struct SourceFrame<F> {
    pub frame_idx: u64,
    /// Seconds since the start of the video.
    pub timestamp: f64,
    pub image: F,
}

/// A pose estimation model.
///
/// Only [`capabilities`](PoseDetector::capabilities) is required. The
/// per-part methods default to "nothing detected", so a body-only model
/// implements `detect_body` and nothing else.
pub trait PoseDetector: Sync {
    /// Image type this detector consumes.
    type Frame: Sync;

    fn capabilities(&self) -> DetectorCapabilities;

    fn detect_body(&self, _frame: &Self::Frame) -> Option<Vec<RawKeypoint>> {
        None
    }

    fn detect_hands(&self, _frame: &Self::Frame) -> HandDetection {
        HandDetection::default()
    }

    fn detect_face(&self, _frame: &Self::Frame) -> Option<Vec<RawKeypoint>> {
        None
    }
}

/// Run `detector` over every frame, calling only the capabilities it
/// advertises. Frames are processed in parallel; the result is ordered by
/// `frame_idx`.
pub fn detect_sequence<D: PoseDetector>(
    detector: &D,
    frames: &[SourceFrame<D::Frame>],
) -> Vec<DetectionRecord> {
    let caps = detector.capabilities();

    let mut records: Vec<DetectionRecord> = frames
        .par_iter()
        .map(|frame| {
            let hands = if caps.hands {
                detector.detect_hands(&frame.image)
            } else {
                HandDetection::default()
            };
            DetectionRecord {
                frame_idx: frame.frame_idx,
                timestamp: frame.timestamp,
                body: caps
                    .body
                    .then(|| detector.detect_body(&frame.image))
                    .flatten(),
                left_hand: hands.left,
                right_hand: hands.right,
                face: caps
                    .face
                    .then(|| detector.detect_face(&frame.image))
                    .flatten(),
            }
        })
        .collect();

    records.sort_by_key(|r| r.frame_idx);
    tracing::debug!(
        frames = records.len(),
        detected = records.iter().filter(|r| !r.is_empty()).count(),
        "Detector pass complete"
    );
    records
}
