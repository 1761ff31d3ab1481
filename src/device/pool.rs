use anyhow::Result;
use std::fmt;
use std::sync::Arc;

use crate::models::{DeviceInfo, ExecutionUnit};

/// A live automation driver bound to one device.
pub trait DriverSession: Send + Sync + fmt::Debug {
    /// Remote session id, `None` once the remote side dropped the session.
    fn session_id(&self) -> Option<String>;

    fn device(&self) -> &DeviceInfo;

    /// Run a driver-side script command on the live session.
    fn execute_script(&self, script: &str) -> Result<serde_json::Value>;

    /// Fetch the device's native log buffer of the given type.
    fn native_logs(&self, log_type: &str) -> Result<Vec<String>>;
}

/// Shared handle to a driver session. The execution context holds one for the
/// duration of a run; the pool holds the other.
pub type DriverHandle = Arc<dyn DriverSession>;

/// Process-wide device/driver pool.
///
/// Implementations serialize allocation per physical device; callers only
/// guarantee that a unit never asks for two sessions at once.
pub trait DevicePool: Send + Sync {
    /// Allocate a device and start a new driver for `unit`.
    fn start_session(&self, unit: ExecutionUnit, scenario: &str) -> Result<DriverHandle>;

    /// Driver currently bound to `unit`, if any.
    fn current_session(&self, unit: ExecutionUnit) -> Option<DriverHandle>;

    /// Stop the driver bound to `unit` and release its device.
    fn stop_session(&self, unit: ExecutionUnit) -> Result<()>;

    /// Tear down every remaining session and the pool itself.
    fn shutdown(&self) -> Result<()>;
}
