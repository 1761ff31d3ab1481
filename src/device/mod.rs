//! Device sessions: the collaborator boundary to the device/driver pool and
//! the allocator that binds one live session to each execution unit.

mod allocator;
mod pool;
mod simulated;

pub use allocator::DeviceSessionAllocator;
pub use pool::{DevicePool, DriverHandle, DriverSession};
pub use simulated::{SimulatedBehavior, SimulatedDevicePool, SimulatedSession};
