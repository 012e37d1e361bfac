//! Scheduler configuration.

pub mod scheduler;

pub use scheduler::{PlacementMode, SchedulerConfig};
