//! Per-run context and device-session lifecycle for concurrent scenario
//! execution.
//!
//! The [`lifecycle::ScenarioLifecycleOrchestrator`] reacts to runner
//! notifications (run started, case started, case finished, run finished)
//! and keeps one [`context::ExecutionContext`] per execution unit while a
//! run is in flight.

pub mod capture;
pub mod commands;
pub mod config;
pub mod context;
pub mod counter;
pub mod device;
pub mod error;
pub mod lifecycle;
pub mod logging;
pub mod models;
pub mod report;
pub mod telemetry;
pub mod utils;

pub use config::LifecycleConfig;
pub use error::{LifecycleError, Result};
pub use lifecycle::{CaseReport, LifecycleEvent, ScenarioLifecycleOrchestrator};
