//! FlowState Processing Core: the pose sequence engine
//!
//! Turns raw per-frame detector output into the viewer's analysis object:
//! - **Normalize:** map detections onto the canonical 17/21/21/5 schema
//! - **Interpolate:** upsample the sequence by an integer factor
//! - **Smooth:** Gaussian temporal averaging of positions and confidence
//! - **Metrics:** movement-quality scores on a 0-100 scale
//! - **Stick figure:** per-frame skeletal edges for rendering
//!
//! This crate is pure computation. No I/O, no platform dependencies.
//! All inputs are data; all outputs are data.

pub mod assemble;
pub mod detector;
pub mod interpolate;
pub mod metrics;
pub mod normalize;
pub mod pipeline;
pub mod smooth;
pub mod stick_figure;

pub use assemble::{SequenceAssembler, StageReport};
pub use detector::{PoseDetector, SourceFrame};
pub use interpolate::TemporalInterpolator;
pub use metrics::MetricsCalculator;
pub use normalize::KeypointNormalizer;
pub use pipeline::Pipeline;
pub use smooth::MotionSmoother;
pub use stick_figure::StickFigureBuilder;
