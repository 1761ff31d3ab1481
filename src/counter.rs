//! Per-scenario run counting.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

/// Counts how many times each scenario has started in this process.
///
/// Counts only grow. Concurrent increments for different scenarios are
/// serialized by a single lock; the critical section is one map update.
#[derive(Debug, Default)]
pub struct RunCounter {
    counts: Mutex<HashMap<String, u32>>,
}

impl RunCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new run of `scenario` and return its 1-based run number.
    pub fn increment(&self, scenario: &str) -> u32 {
        let mut counts = self.counts.lock().unwrap_or_else(PoisonError::into_inner);
        let count = counts.entry(scenario.to_string()).or_insert(0);
        *count += 1;
        *count
    }

    /// Current run number for `scenario`, 0 if it never started.
    pub fn get(&self, scenario: &str) -> u32 {
        self.counts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(scenario)
            .copied()
            .unwrap_or(0)
    }
}
