pub mod analyze;
pub mod config;
pub mod info;
pub mod validate;

use std::path::Path;

use anyhow::Context;

use flowstate_pose_model::detection::{parse_feed, DetectionRecord};

/// Read and parse a JSONL detection feed.
pub fn load_feed(path: &Path) -> anyhow::Result<Vec<DetectionRecord>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read detection feed: {}", path.display()))?;
    parse_feed(&content).map_err(|e| anyhow::anyhow!("Failed to parse detection feed: {e}"))
}
