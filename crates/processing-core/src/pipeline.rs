//! End-to-end pose sequence pipeline.
//!
//! raw detections → normalize → interpolate → smooth → {metrics, stick
//! figure} → assemble. Each stage allocates a new sequence; the two final
//! analyses read the smoothed sequence concurrently.

use std::time::Instant;

use flowstate_common::config::PipelineConfig;
use flowstate_common::error::FlowstateResult;
use flowstate_pose_model::detection::{DetectionRecord, DetectorCapabilities};
use flowstate_pose_model::frame::PoseSequence;
use flowstate_pose_model::output::AnalysisOutput;

use crate::assemble::{SequenceAssembler, StageReport};
use crate::detector::{detect_sequence, PoseDetector, SourceFrame};
use crate::interpolate::TemporalInterpolator;
use crate::metrics::MetricsCalculator;
use crate::normalize::KeypointNormalizer;
use crate::smooth::MotionSmoother;
use crate::stick_figure::StickFigureBuilder;

/// A configured, re-runnable pipeline. Runs are deterministic and share no
/// state.
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    /// Create a pipeline, rejecting invalid configuration up front.
    pub fn new(config: PipelineConfig) -> FlowstateResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn with_defaults() -> Self {
        Self {
            config: PipelineConfig::default(),
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run every stage on a recorded detection feed.
    ///
    /// Fails only when the feed violates the input contract, including
    /// sequences that cannot be upsampled with their ordering intact. In
    /// that case no output is produced at all.
    pub fn run(
        &self,
        records: &[DetectionRecord],
        capabilities: DetectorCapabilities,
    ) -> FlowstateResult<AnalysisOutput> {
        let started = Instant::now();
        let normalized = KeypointNormalizer::new(capabilities).normalize(records)?;
        TemporalInterpolator::new(self.config.interpolation.clone()).check(&normalized)?;
        let output = self.process(&normalized);

        tracing::info!(
            source_frames = normalized.len(),
            output_frames = output.pose_data.pose_frames.len(),
            detection_rate = output.pose_data.detection_summary.detection_rate,
            flow = output.pose_data.overall_scores.flow,
            "Pose sequence processed in {:?}",
            started.elapsed()
        );
        Ok(output)
    }

    /// Run a detector over source frames, then the full pipeline.
    pub fn run_detector<D: PoseDetector>(
        &self,
        detector: &D,
        frames: &[SourceFrame<D::Frame>],
    ) -> FlowstateResult<AnalysisOutput> {
        let records = detect_sequence(detector, frames);
        self.run(&records, detector.capabilities())
    }

    /// Run the stages after normalization. Infallible: degraded input
    /// only lowers confidences and scores. Ordering is only guaranteed for
    /// sequences that pass [`TemporalInterpolator::check`].
    pub fn process(&self, normalized: &PoseSequence) -> AnalysisOutput {
        let interpolator = TemporalInterpolator::new(self.config.interpolation.clone());
        let smoother = MotionSmoother::new(self.config.smoothing.clone());

        let interpolated = interpolator.interpolate(normalized);
        let smoothing_radius = smoother.radius_for(&interpolated);
        let smoothed = smoother.smooth(&interpolated);
        drop(interpolated);

        let metrics = MetricsCalculator::new(self.config.metrics.clone());
        let stick_figure = StickFigureBuilder::new(self.config.stick_figure.clone());
        let (scores, stick_figure_data) = rayon::join(
            || metrics.score(&smoothed),
            || stick_figure.build(&smoothed),
        );

        let stages = StageReport {
            interpolation_factor: interpolator.factor(),
            smoothing_radius,
        };
        tracing::debug!(?stages, ?scores, "Stages complete");

        SequenceAssembler::new(stages).assemble(normalized, smoothed, scores, stick_figure_data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowstate_common::error::FlowstateError;
    use flowstate_pose_model::detection::RawKeypoint;

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut config = PipelineConfig::default();
        config.interpolation.factor = 0;
        assert!(matches!(
            Pipeline::new(config),
            Err(FlowstateError::Config { .. })
        ));
    }

    #[test]
    fn test_empty_input_is_well_formed() {
        let output = Pipeline::with_defaults()
            .run(&[], DetectorCapabilities::all())
            .unwrap();
        let data = &output.pose_data;
        assert!(data.pose_frames.is_empty());
        assert!(data.stick_figure_data.frames.is_empty());
        assert_eq!(data.stick_figure_data.keypoint_names.body.len(), 17);
        assert!(data.overall_scores.is_within_bounds());
        assert!(!data.features.full_body_detection);
    }

    #[test]
    fn test_schema_error_yields_no_output() {
        let records = vec![
            DetectionRecord::empty(0, 0.0),
            DetectionRecord {
                body: Some(vec![RawKeypoint::new(0.5, 0.5, 0.9); 33]),
                ..DetectionRecord::empty(1, 0.1)
            },
        ];
        let err = Pipeline::with_defaults()
            .run(&records, DetectorCapabilities::all())
            .unwrap_err();
        assert!(err.to_string().contains("body"));
        assert!(err.to_string().contains("normalize"));
    }
}
