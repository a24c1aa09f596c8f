//! Pipeline scheduling
//!
//! Each pipeline runs from its own cron loop. A `PipelineGuard` makes a tick
//! that overlaps an unfinished invocation a no-op.

pub mod guard;
pub mod scheduler;

pub use guard::PipelineGuard;
pub use scheduler::{Pipeline, SchedulerService};
