//! Domain model: tasks, resources, and the mappings between them.

use std::collections::BTreeSet;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

/// Task identifier, unique within an enactment graph.
pub type TaskId = String;
/// Resource identifier, unique within a specification.
pub type ResourceId = String;

/// How a task participates in the workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UsageType {
    /// User function; the only kind that gets placed on resources.
    User,
    /// Structural or control node (data flow, conditions, aggregation).
    Other,
}

/// How the implementation behind a mapping is enacted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnactmentMode {
    /// Run on the local machine (native or container).
    Local,
    /// Run as a serverless function.
    Serverless,
    /// Demo implementation for testing.
    Demo,
}

/// A node of the hierarchical workflow structure.
///
/// Tasks refer to each other by id only; the owning [`crate::core::EnactmentGraph`]
/// is the single place where `TaskId`s become `&Task`s.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Unique identifier.
    pub id: TaskId,
    /// Usage type; only [`UsageType::User`] tasks are scheduled.
    pub usage: UsageType,
    /// Enclosing task for replicas created by parallel-for distribution.
    #[serde(default)]
    pub parent: Option<TaskId>,
    /// Tasks with negligible workload never count against resource capacity.
    #[serde(default)]
    pub negligible_workload: bool,
    /// Original task this one replicates when produced by loop expansion.
    #[serde(default)]
    pub loop_reference: Option<TaskId>,
}

impl Task {
    /// Create a user task.
    pub fn user(id: impl Into<TaskId>) -> Self {
        Self::with_usage(id, UsageType::User)
    }

    /// Create a non-user (structural) task.
    pub fn other(id: impl Into<TaskId>) -> Self {
        Self::with_usage(id, UsageType::Other)
    }

    fn with_usage(id: impl Into<TaskId>, usage: UsageType) -> Self {
        Self {
            id: id.into(),
            usage,
            parent: None,
            negligible_workload: false,
            loop_reference: None,
        }
    }

    /// Set the enclosing task.
    #[must_use]
    pub fn with_parent(mut self, parent: impl Into<TaskId>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    /// Mark the task as a loop replica of `original`.
    #[must_use]
    pub fn replica_of(mut self, original: impl Into<TaskId>) -> Self {
        self.loop_reference = Some(original.into());
        self
    }

    /// Exempt the task from capacity accounting.
    #[must_use]
    pub const fn with_negligible_workload(mut self) -> Self {
        self.negligible_workload = true;
        self
    }

    /// True for user tasks.
    pub fn is_user(&self) -> bool {
        self.usage == UsageType::User
    }

    /// True if the task was produced by loop expansion.
    pub const fn is_loop_replica(&self) -> bool {
        self.loop_reference.is_some()
    }
}

/// A schedulable compute target.
///
/// `using_tasks` is the only state the scheduler writes. It grows while the
/// capacity lock is held and is never shrunk here.
#[derive(Debug)]
pub struct Resource {
    id: ResourceId,
    limited_capacity: bool,
    using_tasks: RwLock<BTreeSet<TaskId>>,
}

impl Resource {
    /// Create a resource without a capacity limit.
    pub fn new(id: impl Into<ResourceId>) -> Self {
        Self {
            id: id.into(),
            limited_capacity: false,
            using_tasks: RwLock::new(BTreeSet::new()),
        }
    }

    /// Create a resource whose capacity is accounted for.
    pub fn limited(id: impl Into<ResourceId>) -> Self {
        Self {
            limited_capacity: true,
            ..Self::new(id)
        }
    }

    /// Resource identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Whether capacity accounting applies to this resource.
    pub const fn has_limited_capacity(&self) -> bool {
        self.limited_capacity
    }

    /// Snapshot of the ids of tasks committed to this resource.
    pub fn using_tasks(&self) -> Vec<TaskId> {
        self.using_tasks.read().iter().cloned().collect()
    }

    /// True if `task` has been committed to this resource.
    pub fn is_used_by(&self, task: &str) -> bool {
        self.using_tasks.read().contains(task)
    }

    pub(crate) fn add_using_task(&self, task: &str) {
        self.using_tasks.write().insert(task.to_owned());
    }
}

/// A declared legal pairing of a task with a resource, plus the
/// implementation to use there.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Mapping {
    /// Mapping identifier.
    pub id: String,
    /// Task the mapping is declared for.
    pub source: TaskId,
    /// Resource the task may run on.
    pub target: ResourceId,
    /// Enactment mode of the implementation.
    pub mode: EnactmentMode,
    /// Implementation selector within the mode.
    pub implementation_id: String,
}

impl Mapping {
    /// Create a mapping with an id derived from its endpoints and implementation.
    pub fn new(
        source: impl Into<TaskId>,
        target: impl Into<ResourceId>,
        mode: EnactmentMode,
        implementation_id: impl Into<String>,
    ) -> Self {
        let source = source.into();
        let target = target.into();
        let implementation_id = implementation_id.into();
        Self {
            id: format!("{source}--{target}--{implementation_id}"),
            source,
            target,
            mode,
            implementation_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_builders() {
        let task = Task::user("t").with_parent("p").with_negligible_workload();
        assert!(task.is_user());
        assert_eq!(task.parent.as_deref(), Some("p"));
        assert!(task.negligible_workload);
        assert!(!task.is_loop_replica());

        let replica = Task::user("t#1").replica_of("t");
        assert!(replica.is_loop_replica());
        assert!(!Task::other("cond").is_user());
    }

    #[test]
    fn resource_records_using_tasks_once() {
        let res = Resource::limited("gpu");
        assert!(res.has_limited_capacity());
        res.add_using_task("a");
        res.add_using_task("a");
        res.add_using_task("b");
        assert_eq!(res.using_tasks(), vec!["a".to_string(), "b".to_string()]);
        assert!(res.is_used_by("b"));
        assert!(!Resource::new("cpu").has_limited_capacity());
    }

    #[test]
    fn mapping_id_is_derived() {
        let m = Mapping::new("t", "r", EnactmentMode::Serverless, "fn-1");
        assert_eq!(m.id, "t--r--fn-1");
    }

    #[test]
    fn task_deserializes_with_defaults() {
        let task: Task = serde_json::from_str(r#"{"id":"t","usage":"user"}"#).unwrap();
        assert_eq!(task, Task::user("t"));
    }
}
