//! Named mutual exclusion for the capacity-sensitive critical section.

use async_trait::async_trait;

use crate::core::SchedulerError;

/// Well-known name of the process-wide capacity lock.
pub const CAPACITY_LOCK_NAME: &str = "capacity-query";

/// Provider of named asynchronous locks.
///
/// An acquisition either yields a [`CapacityLock`] or fails; the scheduler
/// never retries a failed acquisition.
#[async_trait]
pub trait LockProvider: Send + Sync {
    /// Acquire the lock called `name`.
    async fn acquire(&self, name: &str) -> Result<CapacityLock, SchedulerError>;
}

/// A held lock. Dropping it releases the lock.
pub struct CapacityLock {
    name: String,
    _guard: Box<dyn Send>,
}

impl CapacityLock {
    /// Wrap a provider guard whose drop releases the underlying lock.
    pub fn new(name: impl Into<String>, guard: impl Send + 'static) -> Self {
        Self {
            name: name.into(),
            _guard: Box::new(guard),
        }
    }

    /// Name of the held lock.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Release the lock.
    pub fn release(self) {
        tracing::trace!("releasing lock `{}`", self.name);
    }
}

impl std::fmt::Debug for CapacityLock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CapacityLock")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}
