//! End-to-end tests for the scenario lifecycle
//!
//! These drive the public orchestrator API the way a test runner would,
//! against the simulated device farm and local stub services.

pub mod cloud;
pub mod concurrency;
pub mod helpers;
pub mod lifecycle;
pub mod simulate;

pub use helpers::*;
