//! Daily scan that warns holders of passes expiring tomorrow.

pub mod scheduler;
pub mod sweep;

pub use scheduler::{ExpirySweepScheduler, SchedulerError};
pub use sweep::{ExpirySweep, SweepError, SweepOutcome};
