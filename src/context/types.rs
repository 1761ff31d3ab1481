use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use crate::device::DriverHandle;
use crate::models::{DeviceInfo, RunPhase};

/// State of one scenario run, visible to test code for the run's duration.
#[derive(Clone)]
pub struct ExecutionContext {
    pub scenario_name: String,
    pub normalized_name: String,
    /// 1-based run number of this scenario within the process.
    pub run_count: u32,
    pub driver: DriverHandle,
    pub device: DeviceInfo,
    /// Native device log for this run; absent when capture is unsupported or failed.
    pub device_log: Option<PathBuf>,
    pub scenario_directory: PathBuf,
    pub screenshots_directory: PathBuf,
    pub phase: RunPhase,
    pub started_at: DateTime<Utc>,
    state: BTreeMap<String, serde_json::Value>,
}

impl ExecutionContext {
    pub fn new(
        scenario_name: impl Into<String>,
        normalized_name: impl Into<String>,
        run_count: u32,
        driver: DriverHandle,
    ) -> Self {
        let device = driver.device().clone();
        Self {
            scenario_name: scenario_name.into(),
            normalized_name: normalized_name.into(),
            run_count,
            driver,
            device,
            device_log: None,
            scenario_directory: PathBuf::new(),
            screenshots_directory: PathBuf::new(),
            phase: RunPhase::Starting,
            started_at: Utc::now(),
            state: BTreeMap::new(),
        }
    }

    pub fn device_id(&self) -> Option<&str> {
        self.device.udid.as_deref()
    }

    pub fn session_id(&self) -> Option<String> {
        self.driver.session_id()
    }

    /// Attach a free-form value for downstream test code.
    pub fn set_state(&mut self, key: impl Into<String>, value: serde_json::Value) {
        self.state.insert(key.into(), value);
    }

    pub fn state(&self, key: &str) -> Option<&serde_json::Value> {
        self.state.get(key)
    }

    pub fn state_as_str(&self, key: &str) -> Option<&str> {
        self.state.get(key).and_then(|v| v.as_str())
    }
}

impl fmt::Debug for ExecutionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutionContext")
            .field("scenario_name", &self.scenario_name)
            .field("run_count", &self.run_count)
            .field("session_id", &self.driver.session_id())
            .field("udid", &self.device.udid)
            .field("device_log", &self.device_log)
            .field("phase", &self.phase)
            .finish_non_exhaustive()
    }
}
