//! Show or persist the effective configuration.

use anyhow::Context;

use flowstate_common::config::{config_file_path, AppConfig};

pub fn run(config: &AppConfig, write: bool) -> anyhow::Result<()> {
    config
        .pipeline
        .validate()
        .map_err(|e| anyhow::anyhow!("Effective configuration is invalid: {e}"))?;

    let json =
        serde_json::to_string_pretty(config).context("Failed to serialize configuration")?;
    println!("{json}");

    if write {
        let path = config.save().context("Failed to save configuration")?;
        println!("\nConfiguration written to: {}", path.display());
    } else {
        println!("\nConfig file: {}", config_file_path().display());
    }

    Ok(())
}
