//! Scenario lifecycle orchestration.
//!
//! The orchestrator reacts to the four test-runner notifications and
//! sequences run counting, device allocation, log capture, report links,
//! teardown and context cleanup for each execution unit.

mod events;
mod orchestrator;

pub use events::{CaseReport, EventOutcome, LifecycleEvent};
pub use orchestrator::ScenarioLifecycleOrchestrator;
