use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::models::{CaseStatus, ExecutionUnit, RunResult};

/// Notifications delivered by the test runner.
///
/// Ordering is FIFO per execution unit; nothing is guaranteed across units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum LifecycleEvent {
    RunStarted,
    CaseStarted {
        unit: ExecutionUnit,
        scenario: String,
    },
    CaseFinished {
        unit: ExecutionUnit,
        scenario: String,
        status: CaseStatus,
    },
    RunFinished {
        result: RunResult,
    },
}

/// What the orchestrator did with one finished case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseReport {
    pub unit: ExecutionUnit,
    pub scenario: String,
    pub status: CaseStatus,
    pub run_count: u32,
    pub report_link: Option<String>,
    pub device_log: Option<PathBuf>,
    /// The run was aborted at start because no device session was available.
    pub aborted: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EventOutcome {
    RunStarted,
    CaseStarted { run_count: u32 },
    CaseFinished(CaseReport),
    RunFinished { launch_url: Option<String> },
}
