//! API-facing request/response models.

use serde::{Deserialize, Serialize};

use crate::core::{Mapping, Scheduler, SchedulerError, TaskId};

/// Request to place a task already present in the enactment graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleRequest {
    /// Task identifier.
    pub task_id: TaskId,
}

/// Outcome category reported to API clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleStatus {
    /// Mappings were committed.
    Scheduled,
    /// Non-user task; nothing was placed.
    NotApplicable,
    /// No capacity right now; retry later.
    Backpressure,
    /// Configuration or lock failure.
    Failed,
}

/// Schedule response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleResponse {
    /// Task identifier.
    pub task_id: TaskId,
    /// Outcome category.
    pub status: ScheduleStatus,
    /// Committed mappings.
    pub mappings: Vec<Mapping>,
    /// Failure reason.
    pub reason: Option<String>,
}

impl ScheduleResponse {
    fn failed(task_id: TaskId, err: &SchedulerError) -> Self {
        Self {
            task_id,
            status: ScheduleStatus::Failed,
            mappings: Vec::new(),
            reason: Some(err.to_string()),
        }
    }
}

/// Health response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Health {
    /// Healthy flag.
    pub ok: bool,
}

/// Look up the requested task and schedule it inline.
pub async fn schedule_by_id<S>(scheduler: &Scheduler<S>, req: ScheduleRequest) -> ScheduleResponse {
    let task = match scheduler.specification().graph().lookup(&req.task_id) {
        Ok(task) => task.clone(),
        Err(e) => return ScheduleResponse::failed(req.task_id, &e),
    };
    match scheduler.schedule(&task).await {
        Ok(schedule) => {
            let status = if !task.is_user() {
                ScheduleStatus::NotApplicable
            } else if schedule.is_empty() {
                ScheduleStatus::Backpressure
            } else {
                ScheduleStatus::Scheduled
            };
            ScheduleResponse {
                task_id: req.task_id,
                status,
                mappings: schedule.into_mappings(),
                reason: None,
            }
        }
        Err(e) => ScheduleResponse::failed(req.task_id, &e),
    }
}

/// Return a health payload.
pub const fn health() -> Health {
    Health { ok: true }
}
