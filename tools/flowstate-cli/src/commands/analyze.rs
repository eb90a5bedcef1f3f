//! Run the pose pipeline on a detection feed.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, ValueEnum};

use flowstate_common::config::{AppConfig, PipelineConfig};
use flowstate_pose_model::detection::DetectorCapabilities;
use flowstate_pose_model::output::AnalysisOutput;
use flowstate_processing_core::Pipeline;

#[derive(Args)]
pub struct AnalyzeArgs {
    /// Path to the JSONL detection feed
    pub feed: PathBuf,

    /// Output file path (defaults to the configured output directory)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output frames per consecutive input pair
    #[arg(long)]
    pub factor: Option<usize>,

    /// Confidence below which keypoints are treated as unreliable
    #[arg(long)]
    pub min_confidence: Option<f64>,

    /// Smoothing neighbors on each side (default: derived from frame rate)
    #[arg(long)]
    pub smoothing_radius: Option<usize>,

    /// Disable temporal smoothing
    #[arg(long)]
    pub no_smoothing: bool,

    /// Minimum connection confidence drawn by the viewer
    #[arg(long)]
    pub render_threshold: Option<f64>,

    /// Ignore body keypoints in the feed
    #[arg(long)]
    pub no_body: bool,

    /// Ignore hand keypoints in the feed
    #[arg(long)]
    pub no_hands: bool,

    /// Ignore face keypoints in the feed
    #[arg(long)]
    pub no_face: bool,

    /// Output format
    #[arg(long, value_enum, default_value = "json")]
    pub format: OutputFormat,

    /// Write compact instead of pretty-printed output
    #[arg(long)]
    pub compact: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// The output object as JSON
    Json,
    /// A viewer data script assigning the output object
    Js,
}

impl OutputFormat {
    fn default_file_name(self) -> &'static str {
        match self {
            Self::Json => "pose_data.json",
            Self::Js => "data.js",
        }
    }

    fn render(self, output: &AnalysisOutput, pretty: bool) -> serde_json::Result<String> {
        match self {
            Self::Json => output.to_json(pretty),
            Self::Js => output.to_viewer_script(pretty),
        }
    }
}

impl AnalyzeArgs {
    /// Layer command-line flags over the loaded pipeline configuration.
    fn pipeline_config(&self, base: &PipelineConfig) -> PipelineConfig {
        let mut config = base.clone();
        if let Some(factor) = self.factor {
            config.interpolation.factor = factor;
        }
        if let Some(min_confidence) = self.min_confidence {
            config.interpolation.min_confidence = min_confidence;
            config.metrics.min_confidence = min_confidence;
        }
        if let Some(radius) = self.smoothing_radius {
            config.smoothing.window_radius = Some(radius);
        }
        if self.no_smoothing {
            config.smoothing.enabled = false;
        }
        if let Some(threshold) = self.render_threshold {
            config.stick_figure.render_threshold = threshold;
        }
        config
    }

    fn requested_parts(&self) -> DetectorCapabilities {
        DetectorCapabilities {
            body: !self.no_body,
            hands: !self.no_hands,
            face: !self.no_face,
        }
    }
}

pub fn run(args: AnalyzeArgs, app: &AppConfig) -> anyhow::Result<()> {
    println!("Analyzing detection feed: {}", args.feed.display());

    let records = super::load_feed(&args.feed)?;
    let capabilities = DetectorCapabilities::infer(&records).restrict(args.requested_parts());
    tracing::debug!(?capabilities, records = records.len(), "Feed loaded");
    println!("  Loaded {} frames", records.len());
    println!(
        "  Parts: body={} hands={} face={}",
        capabilities.body, capabilities.hands, capabilities.face
    );

    let pipeline = Pipeline::new(args.pipeline_config(&app.pipeline))
        .map_err(|e| anyhow::anyhow!("Invalid pipeline configuration: {e}"))?;
    let output = pipeline
        .run(&records, capabilities)
        .map_err(|e| anyhow::anyhow!("Analysis failed: {e}"))?;

    let data = &output.pose_data;
    println!(
        "  Detected poses in {}/{} frames ({:.1}%)",
        data.detection_summary.detected_frame_count,
        data.detection_summary.source_frame_count,
        data.detection_summary.detection_rate * 100.0
    );
    println!(
        "  Generated {} frames ({:.2}s)",
        data.detection_summary.output_frame_count, data.detection_summary.duration_secs
    );

    let path = args
        .output
        .clone()
        .unwrap_or_else(|| app.output_dir.join(args.format.default_file_name()));
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let rendered = args
        .format
        .render(&output, !args.compact)
        .context("Failed to serialize analysis output")?;
    std::fs::write(&path, rendered)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    println!("  Output written to: {}", path.display());

    println!();
    super::info::print_scores(&output);
    println!("\nAnalysis complete.");

    Ok(())
}
