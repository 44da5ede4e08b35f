//! Background job scheduler.
//!
//! A single [`JobScheduler`] polls the store for the oldest queued job,
//! claims it, runs the configured analyzer and persists the artifacts.
//! Failures are recorded on the job and video; they never stop the loop.

pub mod config;
pub mod error;
pub mod scheduler;

pub use config::WorkerConfig;
pub use error::ProcessError;
pub use scheduler::{CycleOutcome, JobScheduler, INTERRUPTED_REASON};
