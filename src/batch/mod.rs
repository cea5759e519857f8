//! Concurrent batch rendering and progress reporting.

pub mod progress;
pub mod scheduler;

pub use progress::{ProgressBroadcaster, ProgressEvent, WireEvent, WireStatus};
pub use scheduler::{BatchReport, BatchScheduler, BatchSettings};
