//! Application and pipeline configuration.
//!
//! Every processing stage receives its slice of [`PipelineConfig`] as an
//! explicit, immutable value. Nothing in the engine reads process-wide
//! state; only [`AppConfig::load`] touches the filesystem and environment.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{FlowstateError, FlowstateResult};

/// Prefix for environment variable overrides.
pub const ENV_PREFIX: &str = "FLOWSTATE_";

/// Global application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Directory where analysis output is written.
    pub output_dir: PathBuf,

    /// Pose sequence processing settings.
    pub pipeline: PipelineConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Settings for every stage of the pose sequence pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub interpolation: InterpolationConfig,
    pub smoothing: SmoothingConfig,
    pub metrics: MetricsConfig,
    pub stick_figure: StickFigureConfig,
}

/// Temporal upsampling parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterpolationConfig {
    /// Output frames emitted per consecutive input pair. `1` is identity.
    pub factor: usize,

    /// Keypoints below this confidence at both ends of a pair are
    /// interpolated with zero confidence.
    pub min_confidence: f64,
}

/// Gaussian temporal smoothing parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmoothingConfig {
    /// Disable to pass the interpolated sequence through untouched.
    pub enabled: bool,

    /// Neighbors on each side. `None` derives it from `window_secs` and
    /// the sequence frame interval.
    pub window_radius: Option<usize>,

    /// Half-window duration used when `window_radius` is `None`.
    pub window_secs: f64,

    /// Kernel standard deviation in frames. `None` uses `radius / 2`.
    pub sigma: Option<f64>,
}

/// Movement-quality scoring parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Keypoints below this confidence are ignored by every metric.
    pub min_confidence: f64,

    /// Fraction dropped from each end before a trimmed mean.
    pub trim_fraction: f64,

    /// Weights of the flow score.
    pub flow_weights: FlowWeights,
}

/// Linear weights combining sub-scores into the flow score.
///
/// Weights are normalized by their sum, so only their ratio matters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowWeights {
    pub smoothness: f64,
    pub balance: f64,
    pub energy: f64,
}

/// Stick figure rendering parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StickFigureConfig {
    /// Connections weaker than this are left out of a frame.
    pub render_threshold: f64,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "flowstate=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("./output"),
            pipeline: PipelineConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for InterpolationConfig {
    fn default() -> Self {
        Self {
            factor: 10,
            min_confidence: 0.1,
        }
    }
}

impl Default for SmoothingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            window_radius: None,
            window_secs: 0.1,
            sigma: None,
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            min_confidence: 0.1,
            trim_fraction: 0.1,
            flow_weights: FlowWeights::default(),
        }
    }
}

impl Default for FlowWeights {
    fn default() -> Self {
        Self {
            smoothness: 0.4,
            balance: 0.3,
            energy: 0.3,
        }
    }
}

impl Default for StickFigureConfig {
    fn default() -> Self {
        Self {
            render_threshold: 0.2,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl SmoothingConfig {
    /// A configuration that leaves every frame untouched.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// A fixed-radius configuration.
    pub fn with_radius(radius: usize) -> Self {
        Self {
            window_radius: Some(radius),
            ..Self::default()
        }
    }
}

impl FlowWeights {
    pub fn total(&self) -> f64 {
        self.smoothness + self.balance + self.energy
    }
}

impl PipelineConfig {
    /// Reject values no stage can work with.
    pub fn validate(&self) -> FlowstateResult<()> {
        if self.interpolation.factor == 0 {
            return Err(FlowstateError::config(
                "interpolation.factor must be at least 1",
            ));
        }
        check_unit("interpolation.min_confidence", self.interpolation.min_confidence)?;
        check_unit("metrics.min_confidence", self.metrics.min_confidence)?;
        check_unit("stick_figure.render_threshold", self.stick_figure.render_threshold)?;

        if !(0.0..0.5).contains(&self.metrics.trim_fraction) {
            return Err(FlowstateError::config(format!(
                "metrics.trim_fraction must be in [0, 0.5), got {}",
                self.metrics.trim_fraction
            )));
        }

        let w = self.metrics.flow_weights;
        for (name, value) in [
            ("smoothness", w.smoothness),
            ("balance", w.balance),
            ("energy", w.energy),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(FlowstateError::config(format!(
                    "metrics.flow_weights.{name} must be a non-negative number, got {value}"
                )));
            }
        }

        if !self.smoothing.window_secs.is_finite() || self.smoothing.window_secs < 0.0 {
            return Err(FlowstateError::config(format!(
                "smoothing.window_secs must be non-negative, got {}",
                self.smoothing.window_secs
            )));
        }
        if let Some(sigma) = self.smoothing.sigma {
            if !sigma.is_finite() || sigma <= 0.0 {
                return Err(FlowstateError::config(format!(
                    "smoothing.sigma must be positive, got {sigma}"
                )));
            }
        }

        Ok(())
    }
}

fn check_unit(name: &str, value: f64) -> FlowstateResult<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(FlowstateError::config(format!(
            "{name} must be between 0 and 1, got {value}"
        )))
    }
}

impl AppConfig {
    /// Load config from the standard location, falling back to defaults,
    /// then apply `FLOWSTATE_*` environment overrides.
    pub fn load() -> Self {
        let config_path = config_file_path();
        let mut config = Self::default();
        if config_path.exists() {
            match std::fs::read_to_string(&config_path) {
                Ok(content) => match serde_json::from_str(&content) {
                    Ok(parsed) => config = parsed,
                    Err(e) => {
                        tracing::warn!("Failed to parse config at {:?}: {}", config_path, e);
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read config at {:?}: {}", config_path, e);
                }
            }
        }
        config.apply_overrides(|key| std::env::var(key).ok());
        config
    }

    /// Save config to the standard location.
    pub fn save(&self) -> Result<PathBuf, std::io::Error> {
        let config_path = config_file_path();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(&config_path, json)?;
        Ok(config_path)
    }

    /// Apply overrides resolved through `lookup` (normally the process
    /// environment). Values that fail to parse are ignored with a warning.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |name: &str| lookup(&format!("{ENV_PREFIX}{name}"));

        if let Some(v) = get("INTERPOLATION_FACTOR") {
            match v.parse::<usize>() {
                Ok(factor) => self.pipeline.interpolation.factor = factor,
                Err(e) => warn_override("INTERPOLATION_FACTOR", &v, e),
            }
        }
        if let Some(v) = get("MIN_CONFIDENCE") {
            match v.parse::<f64>() {
                Ok(c) => {
                    self.pipeline.interpolation.min_confidence = c;
                    self.pipeline.metrics.min_confidence = c;
                }
                Err(e) => warn_override("MIN_CONFIDENCE", &v, e),
            }
        }
        if let Some(v) = get("SMOOTHING_WINDOW") {
            match v.parse::<usize>() {
                Ok(radius) => self.pipeline.smoothing.window_radius = Some(radius),
                Err(e) => warn_override("SMOOTHING_WINDOW", &v, e),
            }
        }
        if let Some(v) = get("RENDER_THRESHOLD") {
            match v.parse::<f64>() {
                Ok(t) => self.pipeline.stick_figure.render_threshold = t,
                Err(e) => warn_override("RENDER_THRESHOLD", &v, e),
            }
        }
        if let Some(v) = get("LOG_LEVEL") {
            self.logging.level = v;
        }
        if let Some(v) = get("OUTPUT_DIR") {
            self.output_dir = PathBuf::from(v);
        }
    }
}

fn warn_override(name: &str, value: &str, err: impl std::fmt::Display) {
    tracing::warn!("Ignoring {ENV_PREFIX}{name}={value:?}: {err}");
}

/// Standard config file location.
pub fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("flowstate").join("config.json")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults_are_valid() {
        let config = AppConfig::default();
        assert!(config.pipeline.validate().is_ok());
        assert_eq!(config.pipeline.interpolation.factor, 10);
        assert_eq!(config.pipeline.stick_figure.render_threshold, 0.2);
    }

    #[test]
    fn zero_factor_is_rejected() {
        let mut config = PipelineConfig::default();
        config.interpolation.factor = 0;
        assert!(matches!(
            config.validate(),
            Err(FlowstateError::Config { .. })
        ));
    }

    #[test]
    fn out_of_range_threshold_is_rejected() {
        let mut config = PipelineConfig::default();
        config.stick_figure.render_threshold = 1.5;
        assert!(config.validate().is_err());

        let mut config = PipelineConfig::default();
        config.metrics.flow_weights.energy = -0.1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn partial_json_fills_defaults() {
        let json = r#"{ "pipeline": { "interpolation": { "factor": 4 } } }"#;
        let config: AppConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.pipeline.interpolation.factor, 4);
        assert_eq!(config.pipeline.interpolation.min_confidence, 0.1);
        assert!(config.pipeline.smoothing.enabled);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn overrides_apply_and_bad_values_are_ignored() {
        let env: HashMap<&str, &str> = [
            ("FLOWSTATE_INTERPOLATION_FACTOR", "3"),
            ("FLOWSTATE_SMOOTHING_WINDOW", "not-a-number"),
            ("FLOWSTATE_LOG_LEVEL", "debug"),
        ]
        .into_iter()
        .collect();

        let mut config = AppConfig::default();
        config.apply_overrides(|k| env.get(k).map(|v| v.to_string()));

        assert_eq!(config.pipeline.interpolation.factor, 3);
        assert_eq!(config.pipeline.smoothing.window_radius, None);
        assert_eq!(config.logging.level, "debug");
    }
}
