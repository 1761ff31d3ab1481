use serde::{Deserialize, Serialize};

/// Lifecycle phase of one scenario run on one execution unit.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum RunPhase {
    #[default]
    Idle,
    /// Counting, device allocation, capture and context registration.
    Starting,
    /// Scenario body executing outside the orchestrator.
    Running,
    /// Report link, teardown, artifact hand-off and context removal.
    Finishing,
}

impl std::fmt::Display for RunPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunPhase::Idle => write!(f, "Idle"),
            RunPhase::Starting => write!(f, "Starting"),
            RunPhase::Running => write!(f, "Running"),
            RunPhase::Finishing => write!(f, "Finishing"),
        }
    }
}
