//! Audit trail of scheduling decisions.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::core::model::{ResourceId, TaskId};
use crate::util::clock::now_ms;

/// What happened to a scheduling request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleAction {
    /// Non-user task; nothing to place.
    NotApplicable,
    /// Mappings were committed.
    Scheduled,
    /// No admissible option was chosen; the task has to wait.
    Backpressure,
    /// The request failed.
    Failed,
}

/// Audit event structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    /// Event identifier.
    pub event_id: String,
    /// Requested task.
    pub task_id: TaskId,
    /// Outcome of the request.
    pub action: ScheduleAction,
    /// Resources the task was committed to.
    pub resources: Vec<ResourceId>,
    /// Timestamp milliseconds.
    pub created_at_ms: u128,
    /// Additional context, e.g. the error message.
    pub detail: Option<String>,
}

/// Audit sink abstraction.
pub trait AuditSink: Send + Sync {
    /// Record an audit event.
    fn record(&self, event: AuditEvent);
}

/// Bounded in-memory audit sink for testing and dev. Clones share storage.
#[derive(Debug, Clone)]
pub struct InMemoryAuditSink {
    events: Arc<Mutex<VecDeque<AuditEvent>>>,
    max_events: usize,
}

impl InMemoryAuditSink {
    /// Create a new in-memory sink with a bounded buffer.
    pub fn new(max_events: usize) -> Self {
        Self {
            events: Arc::new(Mutex::new(VecDeque::with_capacity(max_events))),
            max_events,
        }
    }

    /// Retrieve a snapshot of stored events, oldest first.
    pub fn events(&self) -> Vec<AuditEvent> {
        self.events.lock().iter().cloned().collect()
    }
}

impl AuditSink for InMemoryAuditSink {
    fn record(&self, event: AuditEvent) {
        let mut events = self.events.lock();
        if events.len() >= self.max_events {
            events.pop_front();
        }
        events.push_back(event);
    }
}

/// Helper to build an audit event with a fresh id and timestamp.
pub fn build_audit_event(
    task_id: impl Into<TaskId>,
    action: ScheduleAction,
    resources: Vec<ResourceId>,
    detail: Option<String>,
) -> AuditEvent {
    AuditEvent {
        event_id: uuid::Uuid::new_v4().to_string(),
        task_id: task_id.into(),
        action,
        resources,
        created_at_ms: now_ms(),
        detail,
    }
}
