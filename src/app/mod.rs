pub mod attempt_log;
pub mod backoff;
pub mod cli;
pub mod config;
pub mod controller;
pub mod executor;
pub mod pipeline;

pub use backoff::BackoffPolicy;
pub use controller::{StageController, StageOutcome};
pub use executor::{StageCall, StageExecutor};
pub use pipeline::Pipeline;
