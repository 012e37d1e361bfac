//! Runtime adapters and API surface.

pub mod api;
pub mod tokio_spawner;

pub use api::{health, schedule_by_id, Health, ScheduleRequest, ScheduleResponse, ScheduleStatus};
pub use tokio_spawner::TokioSpawner;
