//! `ogxctl config`: default and validated engine configuration.

use std::path::Path;

use anyhow::{Context, Result};
use ogx_bridge::BridgeConfig;

pub fn print_default() -> Result<()> {
    let json = serde_json::to_string_pretty(&BridgeConfig::default())
        .context("Failed to serialize the default configuration")?;
    println!("{json}");
    Ok(())
}

pub fn validate(path: &Path) -> Result<BridgeConfig> {
    BridgeConfig::load(path)
        .with_context(|| format!("Configuration '{}' is not usable", path.display()))
}
