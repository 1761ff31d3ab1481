use super::types::RunPhase;
use crate::error::{LifecycleError, Result};
use crate::models::ExecutionUnit;

impl RunPhase {
    /// Check if transitioning from the current phase to the new phase is valid.
    ///
    /// Valid transitions:
    /// - `Idle` -> `Starting`
    /// - `Starting` -> `Running` | `Idle` (device allocation failed)
    /// - `Running` -> `Finishing`
    /// - `Finishing` -> `Idle`
    pub fn can_transition_to(&self, new_phase: &RunPhase) -> bool {
        match self {
            RunPhase::Idle => matches!(new_phase, RunPhase::Starting),
            RunPhase::Starting => matches!(new_phase, RunPhase::Running | RunPhase::Idle),
            RunPhase::Running => matches!(new_phase, RunPhase::Finishing),
            RunPhase::Finishing => matches!(new_phase, RunPhase::Idle),
        }
    }

    /// Attempt to transition to a new phase, returning a protocol violation if invalid.
    pub fn try_transition(&self, unit: ExecutionUnit, new_phase: RunPhase) -> Result<RunPhase> {
        if self.can_transition_to(&new_phase) {
            Ok(new_phase)
        } else {
            Err(LifecycleError::InvalidPhaseTransition {
                unit,
                from: *self,
                to: new_phase,
            })
        }
    }

    pub fn valid_transitions(&self) -> Vec<RunPhase> {
        match self {
            RunPhase::Idle => vec![RunPhase::Starting],
            RunPhase::Starting => vec![RunPhase::Running, RunPhase::Idle],
            RunPhase::Running => vec![RunPhase::Finishing],
            RunPhase::Finishing => vec![RunPhase::Idle],
        }
    }
}
