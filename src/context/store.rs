use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::types::ExecutionContext;
use crate::error::{LifecycleError, Result};
use crate::models::constants::CONTEXT_STORE_SHARDS;
use crate::models::ExecutionUnit;

/// Registry of live execution contexts keyed by execution unit.
///
/// Entries are spread over independently locked shards so that units working
/// on different keys rarely contend. At most one entry exists per unit.
pub struct ExecutionContextStore {
    shards: Vec<Mutex<HashMap<ExecutionUnit, ExecutionContext>>>,
}

impl Default for ExecutionContextStore {
    fn default() -> Self {
        Self::with_shards(CONTEXT_STORE_SHARDS)
    }
}

impl ExecutionContextStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_shards(shards: usize) -> Self {
        Self {
            shards: (0..shards.max(1)).map(|_| Mutex::new(HashMap::new())).collect(),
        }
    }

    fn shard(&self, unit: ExecutionUnit) -> MutexGuard<'_, HashMap<ExecutionUnit, ExecutionContext>> {
        let index = (unit.id() % self.shards.len() as u64) as usize;
        self.shards[index]
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Register the context for `unit`; rejects a second live entry.
    pub fn create(&self, unit: ExecutionUnit, context: ExecutionContext) -> Result<()> {
        let mut shard = self.shard(unit);
        if shard.contains_key(&unit) {
            return Err(LifecycleError::DuplicateContext { unit });
        }
        shard.insert(unit, context);
        Ok(())
    }

    /// Snapshot of the unit's context.
    pub fn get(&self, unit: ExecutionUnit) -> Result<ExecutionContext> {
        self.shard(unit)
            .get(&unit)
            .cloned()
            .ok_or(LifecycleError::ContextNotFound { unit })
    }

    pub fn contains(&self, unit: ExecutionUnit) -> bool {
        self.shard(unit).contains_key(&unit)
    }

    /// Mutate the unit's context in place.
    pub fn update<R>(
        &self,
        unit: ExecutionUnit,
        f: impl FnOnce(&mut ExecutionContext) -> R,
    ) -> Result<R> {
        let mut shard = self.shard(unit);
        let context = shard
            .get_mut(&unit)
            .ok_or(LifecycleError::ContextNotFound { unit })?;
        Ok(f(context))
    }

    /// Remove and return the unit's context.
    pub fn remove(&self, unit: ExecutionUnit) -> Result<ExecutionContext> {
        self.shard(unit)
            .remove(&unit)
            .ok_or(LifecycleError::ContextNotFound { unit })
    }

    pub fn len(&self) -> usize {
        self.shards
            .iter()
            .map(|s| s.lock().unwrap_or_else(PoisonError::into_inner).len())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Units that currently hold a context.
    pub fn units(&self) -> Vec<ExecutionUnit> {
        let mut units: Vec<_> = self
            .shards
            .iter()
            .flat_map(|s| {
                s.lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .keys()
                    .copied()
                    .collect::<Vec<_>>()
            })
            .collect();
        units.sort();
        units
    }
}
