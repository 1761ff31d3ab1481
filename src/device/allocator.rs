use std::sync::Arc;
use tracing::{debug, info, warn};

use super::pool::{DevicePool, DriverHandle};
use crate::error::{LifecycleError, Result};
use crate::models::ExecutionUnit;

/// Guarantees a live driver session before a scenario body runs and releases
/// it afterwards.
#[derive(Clone)]
pub struct DeviceSessionAllocator {
    pool: Arc<dyn DevicePool>,
}

impl DeviceSessionAllocator {
    pub fn new(pool: Arc<dyn DevicePool>) -> Self {
        Self { pool }
    }

    /// Return the unit's live session, starting a new one if there is none or
    /// the bound driver no longer reports a session id.
    pub fn ensure_session(&self, unit: ExecutionUnit, scenario: &str) -> Result<DriverHandle> {
        if let Some(driver) = self.pool.current_session(unit) {
            if let Some(session_id) = driver.session_id() {
                debug!(%unit, scenario, %session_id, "Reusing live driver session");
                return Ok(driver);
            }
            info!(%unit, scenario, "Bound driver has no live session, reallocating");
        }

        let driver = self.pool.start_session(unit, scenario).map_err(|e| {
            warn!(%unit, scenario, error = %format!("{e:#}"), "Device allocation failed");
            LifecycleError::allocation(scenario, e)
        })?;

        let Some(session_id) = driver.session_id() else {
            self.teardown_session(unit);
            return Err(LifecycleError::allocation(
                scenario,
                anyhow::anyhow!("driver started without a session id"),
            ));
        };

        info!(
            %unit,
            scenario,
            %session_id,
            udid = driver.device().udid_or_unknown(),
            platform = %driver.device().platform,
            "Driver session started"
        );
        Ok(driver)
    }

    /// Release the unit's session. Failures are logged and swallowed so that
    /// context cleanup always proceeds.
    pub fn teardown_session(&self, unit: ExecutionUnit) {
        match self.pool.stop_session(unit) {
            Ok(()) => debug!(%unit, "Driver session stopped"),
            Err(e) => warn!(%unit, error = %format!("{e:#}"), "Failed to stop driver session"),
        }
    }
}
