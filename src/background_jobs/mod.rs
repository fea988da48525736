//! Background job scheduling and execution system.
//!
//! Jobs run on fixed intervals alongside the HTTP server and are cancelled
//! through a shared token when the process shuts down.

mod context;
mod job;
pub mod jobs;
mod scheduler;

pub use context::JobContext;
pub use job::{BackgroundJob, JobError};
pub use scheduler::{JobScheduler, SchedulerHandle};
