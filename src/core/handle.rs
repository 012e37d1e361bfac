//! Single-assignment result channel for scheduling requests.

use tokio::sync::watch;

use crate::core::{Schedule, SchedulerError};

/// Final outcome of a scheduling request.
pub type ScheduleOutcome = Result<Schedule, SchedulerError>;

/// Observer side of a scheduling request.
///
/// Clones observe the same completion, and the outcome stays readable after
/// it has been delivered.
#[derive(Debug, Clone)]
pub struct ScheduleHandle {
    rx: watch::Receiver<Option<ScheduleOutcome>>,
}

/// Completion side; consumed by the single call to [`Self::complete`].
#[derive(Debug)]
pub(crate) struct ScheduleCompleter {
    tx: watch::Sender<Option<ScheduleOutcome>>,
}

pub(crate) fn channel() -> (ScheduleCompleter, ScheduleHandle) {
    let (tx, rx) = watch::channel(None);
    (ScheduleCompleter { tx }, ScheduleHandle { rx })
}

impl ScheduleCompleter {
    pub(crate) fn complete(self, outcome: ScheduleOutcome) {
        self.tx.send_replace(Some(outcome));
    }
}

impl ScheduleHandle {
    /// Handle that is already complete.
    pub fn ready(outcome: ScheduleOutcome) -> Self {
        let (completer, handle) = channel();
        completer.complete(outcome);
        handle
    }

    /// Wait for the outcome.
    pub async fn wait(&self) -> ScheduleOutcome {
        let mut rx = self.rx.clone();
        let outcome = match rx.wait_for(Option::is_some).await {
            Ok(outcome) => (*outcome).clone(),
            Err(_) => None,
        };
        outcome.unwrap_or_else(|| Err(abandoned()))
    }

    /// The outcome if it has been delivered.
    pub fn try_outcome(&self) -> Option<ScheduleOutcome> {
        self.rx.borrow().clone()
    }

    /// True once the outcome has been delivered.
    pub fn is_complete(&self) -> bool {
        self.rx.borrow().is_some()
    }
}

fn abandoned() -> SchedulerError {
    SchedulerError::Internal("scheduling request dropped before completion".into())
}
