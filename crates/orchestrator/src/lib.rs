//! Resilient task execution: per-attempt timeouts, bounded retries with
//! linear backoff, progress reporting, and error classification into the
//! `AgentError` taxonomy.

pub mod classifier;
pub mod config;
pub mod error_log;
pub mod outcome;
pub mod runner;

pub use classifier::ErrorClassifier;
pub use config::{ProgressCallback, TaskConfig};
pub use error_log::{ErrorLog, RingBufferErrorLog};
pub use outcome::TaskOutcome;
pub use runner::Orchestrator;
