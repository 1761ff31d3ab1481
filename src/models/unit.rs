//! Execution-unit handles.
//!
//! Every per-run structure is keyed by an [`ExecutionUnit`] that the caller
//! passes explicitly. Thread-per-scenario runners can use
//! [`ExecutionUnit::current_thread`]; task-based runners mint their own ids.

use serde::{Deserialize, Serialize};
use std::cell::Cell;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_THREAD_UNIT: AtomicU64 = AtomicU64::new(1);

thread_local! {
    static THREAD_UNIT: Cell<Option<u64>> = const { Cell::new(None) };
}

/// Identity of one concurrently executing unit (a worker thread or task).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ExecutionUnit(u64);

impl ExecutionUnit {
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn id(&self) -> u64 {
        self.0
    }

    /// Handle for the calling thread, stable for the thread's lifetime and
    /// unique within the process.
    pub fn current_thread() -> Self {
        THREAD_UNIT.with(|slot| match slot.get() {
            Some(id) => Self(id),
            None => {
                let id = NEXT_THREAD_UNIT.fetch_add(1, Ordering::Relaxed);
                slot.set(Some(id));
                Self(id)
            }
        })
    }
}

impl fmt::Display for ExecutionUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unit-{}", self.0)
    }
}
