//! Keypoint normalization: detector output to the canonical schema.
//!
//! Purely per-frame. Parts the detector does not support, and parts it did
//! not report for a frame, become zero-confidence placeholders. A supported
//! part with the wrong keypoint count means an incompatible detector and
//! aborts the run.

use rayon::prelude::*;

use flowstate_common::error::{FlowstateError, FlowstateResult};
use flowstate_pose_model::detection::{DetectionRecord, DetectorCapabilities, RawKeypoint};
use flowstate_pose_model::frame::{PoseFrame, PoseSequence};
use flowstate_pose_model::keypoint::{BodyPart, Keypoint};

const STAGE: &str = "normalize";

/// Bound on relative depth, in image widths.
pub const DEPTH_LIMIT: f64 = 10.0;

/// Normalize a detection feed into a pose sequence with one frame per
/// record, ordered by `frame_idx`.
pub fn normalize(
    records: &[DetectionRecord],
    capabilities: DetectorCapabilities,
) -> FlowstateResult<PoseSequence> {
    let mut ordered: Vec<&DetectionRecord> = records.iter().collect();
    ordered.sort_by_key(|r| r.frame_idx);
    check_ordering(&ordered)?;

    let frames = ordered
        .par_iter()
        .map(|record| normalize_frame(record, capabilities))
        .collect::<FlowstateResult<Vec<_>>>()?;

    let sequence = PoseSequence::new(frames);
    if !sequence.is_empty() && !sequence.iter().any(PoseFrame::has_any_detection) {
        tracing::warn!(
            frames = sequence.len(),
            "No frame carries a detection; scores will be neutral"
        );
    }
    Ok(sequence)
}

/// Normalize a single record.
pub fn normalize_frame(
    record: &DetectionRecord,
    capabilities: DetectorCapabilities,
) -> FlowstateResult<PoseFrame> {
    let mut frame = PoseFrame::placeholder(record.frame_idx, record.timestamp);

    for part in BodyPart::ALL {
        if !capabilities.supports(part) {
            continue;
        }
        let Some(raw) = record.part(part) else {
            continue;
        };

        let expected = part.canonical_len();
        if raw.len() != expected {
            return Err(FlowstateError::schema_mismatch(
                STAGE,
                part.as_str(),
                record.frame_idx,
                expected,
                raw.len(),
            ));
        }

        for (slot, kp) in frame.part_mut(part).iter_mut().zip(raw) {
            *slot = sanitize(kp);
        }
    }

    Ok(frame)
}

/// Non-finite values become a placeholder. Positions are pinned to the
/// image (`[0, 1]`), depth to `±DEPTH_LIMIT`, confidence to `[0, 1]`.
fn sanitize(raw: &RawKeypoint) -> Keypoint {
    let finite = [raw.x, raw.y, raw.z, raw.confidence]
        .iter()
        .all(|v| v.is_finite());
    if !finite {
        return Keypoint::PLACEHOLDER;
    }
    Keypoint::new(
        raw.x.clamp(0.0, 1.0),
        raw.y.clamp(0.0, 1.0),
        raw.z.clamp(-DEPTH_LIMIT, DEPTH_LIMIT),
        raw.confidence.clamp(0.0, 1.0),
    )
}

/// Frame indices must be unique and timestamps finite and strictly
/// increasing once ordered by frame index.
fn check_ordering(ordered: &[&DetectionRecord]) -> FlowstateResult<()> {
    if let Some(bad) = ordered.iter().find(|r| !r.timestamp.is_finite()) {
        return Err(FlowstateError::invalid_sequence(
            STAGE,
            format!("frame {} has a non-finite timestamp", bad.frame_idx),
        ));
    }

    for pair in ordered.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        if a.frame_idx == b.frame_idx {
            return Err(FlowstateError::invalid_sequence(
                STAGE,
                format!("duplicate frame_idx {}", a.frame_idx),
            ));
        }
        if b.timestamp <= a.timestamp {
            return Err(FlowstateError::invalid_sequence(
                STAGE,
                format!(
                    "timestamp of frame {} ({}) does not follow frame {} ({})",
                    b.frame_idx, b.timestamp, a.frame_idx, a.timestamp
                ),
            ));
        }
    }
    Ok(())
}

/// Normalizer bound to one detector's capability set.
#[derive(Debug, Clone, Copy)]
pub struct KeypointNormalizer {
    capabilities: DetectorCapabilities,
}

impl KeypointNormalizer {
    pub fn new(capabilities: DetectorCapabilities) -> Self {
        Self { capabilities }
    }

    pub fn capabilities(&self) -> DetectorCapabilities {
        self.capabilities
    }

    pub fn normalize(&self, records: &[DetectionRecord]) -> FlowstateResult<PoseSequence> {
        normalize(records, self.capabilities)
    }
}
