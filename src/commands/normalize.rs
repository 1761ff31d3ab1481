//! Normalize command - prints the filesystem-safe form of a scenario name

use anyhow::Result;

use crate::models::normalize_scenario_name;

pub fn execute(name: &str) -> Result<()> {
    println!("{}", normalize_scenario_name(name));
    Ok(())
}
