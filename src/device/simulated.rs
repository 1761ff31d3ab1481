//! In-memory device farm.
//!
//! Backs the `simulate` command and the test suites. Failures can be injected
//! per scenario (allocation) or globally (log fetch, script calls, stop).

use anyhow::{bail, Result};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tracing::debug;

use super::pool::{DevicePool, DriverHandle, DriverSession};
use crate::models::{DeviceInfo, ExecutionUnit};

/// Failure injection and canned responses for [`SimulatedDevicePool`].
#[derive(Debug, Clone)]
pub struct SimulatedBehavior {
    /// Scenario names whose allocation fails.
    pub fail_allocation_for: HashSet<String>,
    pub fail_native_logs: bool,
    /// Delay before the native log buffer is returned.
    pub native_log_delay: Option<Duration>,
    pub native_log_lines: Vec<String>,
    pub fail_script: bool,
    pub fail_stop: bool,
}

impl Default for SimulatedBehavior {
    fn default() -> Self {
        Self {
            fail_allocation_for: HashSet::new(),
            fail_native_logs: false,
            native_log_delay: None,
            native_log_lines: vec![
                "I/ActivityManager: Start proc com.example.app".to_string(),
                "D/AppLifecycle: onResume".to_string(),
            ],
            fail_script: false,
            fail_stop: false,
        }
    }
}

/// Driver session handed out by [`SimulatedDevicePool`].
#[derive(Debug)]
pub struct SimulatedSession {
    session_id: Mutex<Option<String>>,
    device: DeviceInfo,
    behavior: Arc<SimulatedBehavior>,
}

impl SimulatedSession {
    fn new(device: DeviceInfo, behavior: Arc<SimulatedBehavior>) -> Self {
        Self {
            session_id: Mutex::new(Some(uuid::Uuid::new_v4().to_string())),
            device,
            behavior,
        }
    }

    /// Drop the remote session while keeping the local handle around.
    pub fn expire(&self) {
        *self.session_id.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

impl DriverSession for SimulatedSession {
    fn session_id(&self) -> Option<String> {
        self.session_id
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn device(&self) -> &DeviceInfo {
        &self.device
    }

    fn execute_script(&self, script: &str) -> Result<serde_json::Value> {
        let Some(session_id) = self.session_id() else {
            bail!("session is no longer active");
        };
        if self.behavior.fail_script {
            bail!("script '{script}' failed on session {session_id}");
        }
        Ok(serde_json::Value::String(format!(
            "https://device.pcloudy.com/reports/{session_id}"
        )))
    }

    fn native_logs(&self, log_type: &str) -> Result<Vec<String>> {
        if let Some(delay) = self.behavior.native_log_delay {
            std::thread::sleep(delay);
        }
        if self.behavior.fail_native_logs {
            bail!("log type '{log_type}' is not available");
        }
        Ok(self.behavior.native_log_lines.clone())
    }
}

struct Binding {
    device_index: usize,
    session: Arc<SimulatedSession>,
}

/// Device pool that hands out sessions on a fixed set of in-memory devices.
pub struct SimulatedDevicePool {
    devices: Vec<DeviceInfo>,
    behavior: Arc<SimulatedBehavior>,
    bindings: Mutex<HashMap<ExecutionUnit, Binding>>,
    started: AtomicUsize,
    stopped: AtomicUsize,
    shut_down: AtomicBool,
}

impl SimulatedDevicePool {
    pub fn new(devices: Vec<DeviceInfo>) -> Self {
        Self::with_behavior(devices, SimulatedBehavior::default())
    }

    pub fn with_behavior(devices: Vec<DeviceInfo>, behavior: SimulatedBehavior) -> Self {
        Self {
            devices,
            behavior: Arc::new(behavior),
            bindings: Mutex::new(HashMap::new()),
            started: AtomicUsize::new(0),
            stopped: AtomicUsize::new(0),
            shut_down: AtomicBool::new(false),
        }
    }

    pub fn started_count(&self) -> usize {
        self.started.load(Ordering::SeqCst)
    }

    pub fn stopped_count(&self) -> usize {
        self.stopped.load(Ordering::SeqCst)
    }

    pub fn active_count(&self) -> usize {
        self.bindings
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down.load(Ordering::SeqCst)
    }

    /// Expire the remote session bound to `unit`, if any.
    pub fn expire_session(&self, unit: ExecutionUnit) {
        if let Some(binding) = self
            .bindings
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&unit)
        {
            binding.session.expire();
        }
    }
}

impl DevicePool for SimulatedDevicePool {
    fn start_session(&self, unit: ExecutionUnit, scenario: &str) -> Result<DriverHandle> {
        if self.shut_down.load(Ordering::SeqCst) {
            bail!("device pool has been shut down");
        }
        if self.behavior.fail_allocation_for.contains(scenario) {
            bail!("no device could be allocated for '{scenario}'");
        }

        let mut bindings = self.bindings.lock().unwrap_or_else(PoisonError::into_inner);
        // A stale binding on this unit gives its device back before reallocating.
        bindings.remove(&unit);

        let in_use: HashSet<usize> = bindings.values().map(|b| b.device_index).collect();
        let Some(device_index) = (0..self.devices.len()).find(|i| !in_use.contains(i)) else {
            bail!(
                "all {} devices are busy; cannot allocate for '{scenario}'",
                self.devices.len()
            );
        };

        let session = Arc::new(SimulatedSession::new(
            self.devices[device_index].clone(),
            Arc::clone(&self.behavior),
        ));
        bindings.insert(
            unit,
            Binding {
                device_index,
                session: Arc::clone(&session),
            },
        );
        self.started.fetch_add(1, Ordering::SeqCst);
        debug!(%unit, scenario, device_index, "Simulated device allocated");

        let handle: DriverHandle = session;
        Ok(handle)
    }

    fn current_session(&self, unit: ExecutionUnit) -> Option<DriverHandle> {
        self.bindings
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&unit)
            .map(|b| Arc::clone(&b.session) as DriverHandle)
    }

    fn stop_session(&self, unit: ExecutionUnit) -> Result<()> {
        if self.behavior.fail_stop {
            bail!("driver for {unit} did not acknowledge quit");
        }
        let removed = self
            .bindings
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&unit);
        if let Some(binding) = removed {
            binding.session.expire();
            self.stopped.fetch_add(1, Ordering::SeqCst);
        }
        Ok(())
    }

    fn shutdown(&self) -> Result<()> {
        self.shut_down.store(true, Ordering::SeqCst);
        let mut bindings = self.bindings.lock().unwrap_or_else(PoisonError::into_inner);
        for (_, binding) in bindings.drain() {
            binding.session.expire();
            self.stopped.fetch_add(1, Ordering::SeqCst);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn devices(n: usize) -> Vec<DeviceInfo> {
        (0..n)
            .map(|i| DeviceInfo::new(format!("emulator-{}", 5554 + 2 * i), "android"))
            .collect()
    }

    #[test]
    fn test_each_unit_gets_a_distinct_device() {
        let pool = SimulatedDevicePool::new(devices(2));
        let a = pool.start_session(ExecutionUnit::new(1), "A").unwrap();
        let b = pool.start_session(ExecutionUnit::new(2), "B").unwrap();
        assert_ne!(a.device().udid, b.device().udid);
        assert_eq!(pool.active_count(), 2);
    }

    #[test]
    fn test_exhausted_pool_fails_allocation() {
        let pool = SimulatedDevicePool::new(devices(1));
        pool.start_session(ExecutionUnit::new(1), "A").unwrap();
        let err = pool.start_session(ExecutionUnit::new(2), "B").unwrap_err();
        assert!(err.to_string().contains("busy"));
    }

    #[test]
    fn test_stop_releases_device() {
        let pool = SimulatedDevicePool::new(devices(1));
        let unit = ExecutionUnit::new(1);
        let driver = pool.start_session(unit, "A").unwrap();
        pool.stop_session(unit).unwrap();

        assert!(driver.session_id().is_none());
        assert!(pool.current_session(unit).is_none());
        assert!(pool.start_session(ExecutionUnit::new(2), "B").is_ok());
    }

    #[test]
    fn test_restart_on_same_unit_reuses_its_device() {
        let pool = SimulatedDevicePool::new(devices(1));
        let unit = ExecutionUnit::new(1);
        pool.start_session(unit, "A").unwrap();
        pool.expire_session(unit);
        assert!(pool.start_session(unit, "A").is_ok());
        assert_eq!(pool.active_count(), 1);
    }

    #[test]
    fn test_shutdown_stops_everything() {
        let pool = SimulatedDevicePool::new(devices(2));
        pool.start_session(ExecutionUnit::new(1), "A").unwrap();
        pool.start_session(ExecutionUnit::new(2), "B").unwrap();
        pool.shutdown().unwrap();

        assert!(pool.is_shut_down());
        assert_eq!(pool.active_count(), 0);
        assert_eq!(pool.stopped_count(), 2);
        assert!(pool.start_session(ExecutionUnit::new(3), "C").is_err());
    }

    #[test]
    fn test_script_requires_live_session() {
        let pool = SimulatedDevicePool::new(devices(1));
        let unit = ExecutionUnit::new(1);
        let driver = pool.start_session(unit, "A").unwrap();
        assert!(driver.execute_script("pCloudy_getReportLink").is_ok());
        pool.expire_session(unit);
        assert!(driver.execute_script("pCloudy_getReportLink").is_err());
    }
}
