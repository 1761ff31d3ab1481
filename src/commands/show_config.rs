//! Config command - prints the effective configuration

use anyhow::Result;
use colored::Colorize;
use std::path::Path;

use crate::config::LifecycleConfig;

pub fn execute(config_path: Option<&Path>) -> Result<()> {
    let config = LifecycleConfig::load(config_path)?;
    let mut shown = config.clone();
    if shown.cloud_key.is_some() {
        shown.cloud_key = Some("********".to_string());
    }

    println!("{}", shown.to_toml()?);
    println!("{} {}", "Resolved provider:".bold(), config.provider());
    Ok(())
}
