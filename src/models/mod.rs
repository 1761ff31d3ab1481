pub mod constants;
pub mod device;
pub mod phase;
pub mod scenario;
pub mod unit;

pub use device::{DeviceInfo, Platform};
pub use phase::RunPhase;
pub use scenario::{normalize_scenario_name, CaseStatus, RunResult};
pub use unit::ExecutionUnit;
