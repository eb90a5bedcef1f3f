//! Tracing setup for the engine and the CLI.
//!
//! A bare level such as `"debug"` applies to FlowState crates only; other
//! crates stay at `warn` so rayon and friends do not drown out the stage
//! logs. Full directive strings are passed through untouched.

use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

/// Crates whose spans and events follow the configured level.
pub const FLOWSTATE_TARGETS: [&str; 4] = [
    "flowstate",
    "flowstate_common",
    "flowstate_pose_model",
    "flowstate_processing_core",
];

/// Build the event filter for `level`.
///
/// Unparsable directives fall back to `info` for FlowState crates.
pub fn build_filter(level: &str) -> EnvFilter {
    let level = level.trim();
    if level.contains('=') || level.contains(',') {
        if let Ok(filter) = EnvFilter::try_new(level) {
            return filter;
        }
        return scoped_filter("info");
    }
    if level.is_empty() {
        return scoped_filter("info");
    }
    scoped_filter(level)
}

fn scoped_filter(level: &str) -> EnvFilter {
    let directives = FLOWSTATE_TARGETS
        .iter()
        .map(|target| format!("{target}={level}"))
        .collect::<Vec<_>>()
        .join(",");
    EnvFilter::try_new(format!("warn,{directives}"))
        .unwrap_or_else(|_| EnvFilter::new("warn,flowstate_processing_core=info"))
}

/// Install the global subscriber, writing to stderr so stdout stays free
/// for command output.
///
/// `RUST_LOG` takes precedence over `config.level`. Returns `false` when a
/// subscriber was already installed, in which case nothing changes.
pub fn init_logging(config: &LoggingConfig) -> bool {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| build_filter(&config.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    let installed = if config.json {
        builder.json().try_init().is_ok()
    } else {
        builder.with_target(true).try_init().is_ok()
    };
    if installed {
        tracing::debug!(level = %config.level, json = config.json, "Logging initialized");
    }
    installed
}

/// Initialize logging with defaults (used by tests).
pub fn init_default_logging() -> bool {
    init_logging(&LoggingConfig::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_level_is_scoped_to_flowstate_crates() {
        let filter = build_filter("debug").to_string();
        assert!(filter.contains("flowstate_processing_core=debug"));
        assert!(filter.contains("flowstate=debug"));
        assert!(filter.contains("warn"));
    }

    #[test]
    fn directive_strings_pass_through() {
        let filter = build_filter("rayon=trace,flowstate_common=info").to_string();
        assert!(filter.contains("rayon=trace"));
        assert!(!filter.contains("flowstate_pose_model"));
    }

    #[test]
    fn empty_or_broken_levels_fall_back_to_info() {
        assert!(build_filter("").to_string().contains("flowstate_pose_model=info"));
        assert!(build_filter("flowstate=loud")
            .to_string()
            .contains("flowstate_processing_core=info"));
    }

    #[test]
    fn second_init_is_a_no_op() {
        init_default_logging();
        assert!(!init_default_logging());
    }
}
