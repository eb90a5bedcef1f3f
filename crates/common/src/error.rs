//! Error types shared across FlowState crates.

/// Top-level error type for FlowState operations.
///
/// Only `SchemaMismatch` and `InvalidSequence` can come out of a pipeline
/// run on a valid configuration; everything degraded about the input
/// travels as low confidence instead.
#[derive(Debug, thiserror::Error)]
pub enum FlowstateError {
    #[error(
        "Schema mismatch in {stage} stage: frame {frame_idx} {part} has {actual} keypoints, expected {expected}"
    )]
    SchemaMismatch {
        stage: &'static str,
        part: String,
        frame_idx: u64,
        expected: usize,
        actual: usize,
    },

    #[error("Invalid sequence in {stage} stage: {message}")]
    InvalidSequence {
        stage: &'static str,
        message: String,
    },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using FlowstateError.
pub type FlowstateResult<T> = Result<T, FlowstateError>;

impl FlowstateError {
    pub fn schema_mismatch(
        stage: &'static str,
        part: impl Into<String>,
        frame_idx: u64,
        expected: usize,
        actual: usize,
    ) -> Self {
        Self::SchemaMismatch {
            stage,
            part: part.into(),
            frame_idx,
            expected,
            actual,
        }
    }

    pub fn invalid_sequence(stage: &'static str, msg: impl Into<String>) -> Self {
        Self::InvalidSequence {
            stage,
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Whether this error aborts a pipeline run (as opposed to a setup problem).
    pub fn is_fatal_input_error(&self) -> bool {
        matches!(
            self,
            Self::SchemaMismatch { .. } | Self::InvalidSequence { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_mismatch_names_stage_and_part() {
        let err = FlowstateError::schema_mismatch("normalize", "left_hand", 12, 21, 20);
        let msg = err.to_string();
        assert!(msg.contains("normalize"));
        assert!(msg.contains("left_hand"));
        assert!(msg.contains("frame 12"));
        assert!(msg.contains("expected 21"));
        assert!(err.is_fatal_input_error());
    }

    #[test]
    fn only_feed_errors_abort_a_run() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "feed.jsonl");
        let errors = [
            FlowstateError::schema_mismatch("normalize", "body", 0, 17, 33),
            FlowstateError::invalid_sequence("interpolate", "frames too close"),
            FlowstateError::config("bad"),
            FlowstateError::from(io),
            FlowstateError::from(anyhow::anyhow!("other")),
        ];
        for err in &errors {
            let expected = match err {
                FlowstateError::SchemaMismatch { .. } | FlowstateError::InvalidSequence { .. } => {
                    true
                }
                FlowstateError::Config { .. }
                | FlowstateError::Io(_)
                | FlowstateError::Json(_)
                | FlowstateError::Other(_) => false,
            };
            assert_eq!(err.is_fatal_input_error(), expected, "{err}");
        }
    }

    #[test]
    fn config_error_is_not_an_input_error() {
        let err = FlowstateError::config("factor must be >= 1");
        assert!(!err.is_fatal_input_error());
        assert_eq!(err.to_string(), "Configuration error: factor must be >= 1");
    }
}
