//! # Events
//!
//! This crate defines the caller-facing structures every analysis task resolves
//! to: the response envelope and the progress updates emitted while it runs.
//!
//! As a Layer 0 crate, it depends only on `core-types` and provides the definitive
//! wire format between the pipeline and whatever UI or service consumes it.

// Declare the modules that make up this crate.
pub mod error;
pub mod messages;

// Re-export the core types to provide a clean public API.
pub use error::EventsError;
pub use messages::{Envelope, ProgressUpdate, TaskStatus};
