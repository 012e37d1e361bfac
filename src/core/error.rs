//! Error types for placement operations.

use thiserror::Error;

use crate::core::model::{ResourceId, TaskId};

/// Errors produced by placement components.
///
/// Every variant except [`SchedulerError::Internal`] describes a configuration
/// defect that no retry fixes. The enum is `Clone` so a single failed
/// completion can be observed by any number of [`crate::core::ScheduleHandle`]s.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchedulerError {
    /// No mapping is declared for the task or any of its ancestors.
    #[error("no mapping options provided for the task {task}")]
    MissingMapping {
        /// Key of the original task that was looked up.
        task: TaskId,
    },
    /// A task id could not be found in the enactment graph.
    #[error("task {task} not found in the enactment graph")]
    GraphLookup {
        /// The unresolved task id.
        task: TaskId,
    },
    /// A mapping targets a resource the specification does not know.
    #[error("resource {resource} not found in the specification")]
    UnknownResource {
        /// The unresolved resource id.
        resource: ResourceId,
    },
    /// The capacity lock could not be obtained.
    #[error("failed to get lock `{lock}`: {reason}")]
    LockAcquisition {
        /// Name of the lock.
        lock: String,
        /// Provider-specific reason.
        reason: String,
    },
    /// The selection policy broke its contract.
    #[error("selection policy contract violated: {0}")]
    PolicyContract(String),
    /// A schedule was expected to hold exactly one mapping.
    #[error("schedule for task {task} has {count} mappings, expected exactly one")]
    InvalidSchedule {
        /// Task the schedule belongs to.
        task: TaskId,
        /// Number of mappings found.
        count: usize,
    },
    /// Configuration failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// Scheduling was abandoned before a result was delivered.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Application-facing result using anyhow for higher-level contexts.
pub type AppResult<T> = Result<T, anyhow::Error>;
