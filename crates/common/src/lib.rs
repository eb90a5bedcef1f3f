//! FlowState Common Utilities
//!
//! Shared infrastructure for all FlowState crates:
//! - Error types and result aliases
//! - Tracing/logging initialization
//! - Configuration loading and per-stage pipeline settings

pub mod config;
pub mod error;
pub mod logging;

pub use config::*;
pub use error::*;
