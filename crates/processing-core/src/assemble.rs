//! Final assembly of the viewer output object.

use flowstate_pose_model::frame::PoseSequence;
use flowstate_pose_model::keypoint::BodyPart;
use flowstate_pose_model::output::{
    AnalysisOutput, DetectionSummary, Features, OverallScores, PoseData, StickFigureData,
};

/// What the temporal stages actually did on this run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StageReport {
    pub interpolation_factor: usize,
    pub smoothing_radius: usize,
}

/// Merge stage outputs into the output contract.
///
/// `normalized` is the per-source-frame sequence, used for feature flags
/// and detection statistics; `smoothed` becomes `pose_frames`.
pub fn assemble(
    normalized: &PoseSequence,
    smoothed: PoseSequence,
    overall_scores: OverallScores,
    stick_figure_data: StickFigureData,
    stages: StageReport,
) -> AnalysisOutput {
    let features = detect_features(normalized, stages);
    let detection_summary = summarize(normalized, &smoothed);

    AnalysisOutput {
        pose_data: PoseData {
            pose_frames: smoothed,
            stick_figure_data,
            overall_scores,
            features,
            detection_summary,
        },
    }
}

/// Feature flags reflect non-placeholder input, not configuration: a stage
/// that ran over nothing but placeholders is reported as off.
pub fn detect_features(normalized: &PoseSequence, stages: StageReport) -> Features {
    let full_body_detection = normalized.has_detection(BodyPart::Body);
    let hand_detection = normalized.has_detection(BodyPart::LeftHand)
        || normalized.has_detection(BodyPart::RightHand);
    let face_detection = normalized.has_detection(BodyPart::Face);
    let has_signal = full_body_detection || hand_detection || face_detection;
    let has_pairs = normalized.len() >= 2;

    Features {
        full_body_detection,
        hand_detection,
        face_detection,
        motion_interpolation: has_signal && has_pairs && stages.interpolation_factor > 1,
        temporal_smoothing: has_signal && has_pairs && stages.smoothing_radius > 0,
    }
}

pub fn summarize(normalized: &PoseSequence, output: &PoseSequence) -> DetectionSummary {
    let source_frame_count = normalized.len();
    let detected_frame_count = normalized
        .iter()
        .filter(|f| f.has_any_detection())
        .count();
    let detection_rate = if source_frame_count == 0 {
        0.0
    } else {
        detected_frame_count as f64 / source_frame_count as f64
    };

    DetectionSummary {
        source_frame_count,
        detected_frame_count,
        detection_rate,
        output_frame_count: output.len(),
        duration_secs: output.duration_secs(),
    }
}

/// Collects the per-run stage report and produces the output object.
#[derive(Debug, Clone, Copy, Default)]
pub struct SequenceAssembler {
    stages: StageReport,
}

impl SequenceAssembler {
    pub fn new(stages: StageReport) -> Self {
        Self { stages }
    }

    pub fn assemble(
        &self,
        normalized: &PoseSequence,
        smoothed: PoseSequence,
        overall_scores: OverallScores,
        stick_figure_data: StickFigureData,
    ) -> AnalysisOutput {
        assemble(
            normalized,
            smoothed,
            overall_scores,
            stick_figure_data,
            self.stages,
        )
    }
}
