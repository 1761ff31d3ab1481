//! Error types for the scenario lifecycle.
//!
//! Only failures that must stop something live here: a run that could not get a
//! device, and protocol violations in the event sequencing. Degraded capabilities
//! (log capture, report links, teardown) never surface as errors; they are logged
//! and collapse to an absent value at the call site.

use thiserror::Error;

use crate::models::{ExecutionUnit, RunPhase};

#[derive(Debug, Error)]
pub enum LifecycleError {
    /// Fatal for a single run: no scenario body executes without a live session.
    #[error("Failed to allocate a device session for scenario '{scenario}': {source:#}")]
    DeviceAllocation {
        scenario: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("No execution context registered for {unit}")]
    ContextNotFound { unit: ExecutionUnit },

    #[error("Execution context already registered for {unit}; previous run was never finished")]
    DuplicateContext { unit: ExecutionUnit },

    #[error("Invalid run phase transition for {unit}: {from} -> {to}")]
    InvalidPhaseTransition {
        unit: ExecutionUnit,
        from: RunPhase,
        to: RunPhase,
    },
}

impl LifecycleError {
    /// Create a device allocation error.
    pub fn allocation(scenario: impl Into<String>, source: anyhow::Error) -> Self {
        Self::DeviceAllocation {
            scenario: scenario.into(),
            source,
        }
    }

    /// Returns true for errors caused by broken event sequencing rather than
    /// the environment.
    pub fn is_protocol_violation(&self) -> bool {
        matches!(
            self,
            Self::ContextNotFound { .. }
                | Self::DuplicateContext { .. }
                | Self::InvalidPhaseTransition { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, LifecycleError>;
