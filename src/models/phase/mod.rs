mod transitions;
mod types;

pub use types::RunPhase;
