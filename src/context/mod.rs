//! Per-run execution contexts and the process-wide registry that owns them.

mod store;
mod types;

pub use store::ExecutionContextStore;
pub use types::ExecutionContext;
