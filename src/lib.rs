//! # Prometheus Placement
//!
//! Capacity-aware placement of workflow tasks onto compute resources.
//!
//! Workflow engines expand loops and parallel-for constructs into replicas of
//! an original task, and each original declares the resources it may run on
//! (its *mappings*). This crate decides, for one task at a time, which of
//! those mappings to commit without overcommitting any resource, even when
//! many tasks are scheduled concurrently.
//!
//! ## Request Flow
//!
//! 1. **Resolution**: replicas are traced back to their original task
//!    through parent links or loop references, and the original's mapping
//!    options are looked up (falling back to ancestors).
//! 2. **Locking**: a single named capacity lock serializes every admission
//!    and commit in the process.
//! 3. **Admission**: options whose limited target resource would exceed a
//!    total fraction of `1.0` are dropped.
//! 4. **Selection**: a pluggable [`core::SelectionPolicy`] picks the schedule.
//! 5. **Commit**: the task is recorded on every chosen resource, then the
//!    lock is released.
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use prometheus_placement::builders::SchedulerBuilder;
//! use prometheus_placement::config::SchedulerConfig;
//! use prometheus_placement::core::{CapacityTable, Task};
//! use prometheus_placement::runtime::TokioSpawner;
//!
//! let scheduler = SchedulerBuilder::new(SchedulerConfig::from_env()?)
//!     .specification(Arc::new(spec))
//!     .calculator(Arc::new(CapacityTable::new().with_default(0.25)?))
//!     .build(TokioSpawner::current())?;
//!
//! let handle = scheduler.schedule_task(&Task::user("resize"))?;
//! let schedule = handle.wait().await?;
//! ```
//!
//! For complete scenarios, see `tests/scheduling_test.rs`.

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Core placement abstractions and capacity accounting.
pub mod core;
/// Configuration models for the scheduler.
pub mod config;
/// Builders to construct schedulers from configuration.
pub mod builders;
/// Infrastructure adapters for scheduler collaborators.
pub mod infra;
/// Runtime adapters and API surface.
pub mod runtime;
/// Shared utilities.
pub mod util;
