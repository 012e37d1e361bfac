//! Core placement abstractions and capacity accounting.

pub mod admission;
pub mod audit;
pub mod capacity;
pub mod error;
pub mod handle;
pub mod lock;
pub mod model;
pub mod policy;
pub mod resolver;
pub mod schedule;
pub mod scheduler;
pub mod specification;

pub use admission::AdmissionFilter;
pub use audit::{build_audit_event, AuditEvent, AuditSink, InMemoryAuditSink, ScheduleAction};
pub use capacity::{CapacityCalculator, CapacityTable, UniformCapacity};
pub use error::{AppResult, SchedulerError};
pub use handle::{ScheduleHandle, ScheduleOutcome};
pub use lock::{CapacityLock, LockProvider, CAPACITY_LOCK_NAME};
pub use model::{EnactmentMode, Mapping, Resource, ResourceId, Task, TaskId, UsageType};
pub use policy::{enforce_contract, AllOptionsPolicy, FirstFitPolicy, SelectionPolicy};
pub use resolver::{MappingResolver, ResolvedMappings};
pub use schedule::Schedule;
pub use scheduler::{Scheduler, Spawn};
pub use specification::{EnactmentGraph, MappingCatalog, Specification, SpecificationProvider};
