//! Messaging between the service catalog and the probing scheduler.
//!
//! - [`CheckQueue`]: sending half; implements
//!   [`uptime_core::scheduler::CheckScheduler`] so the catalog can request
//!   checks without knowing about channels.
//! - [`CheckReceiver`]: receiving half, drained by the scheduler task.
//! - [`CheckRequest`]: the message itself.

pub mod queue;

pub use queue::{CheckQueue, CheckReceiver, CheckRequest};
