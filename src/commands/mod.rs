//! CLI command implementations.

pub mod normalize;
pub mod show_config;
pub mod simulate;
