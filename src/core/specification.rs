//! Read side of record: enactment graph, mapping catalog, and resource table.

use std::collections::HashMap;
use std::sync::Arc;

use crate::core::model::{Mapping, Resource, ResourceId, Task, TaskId};
use crate::core::SchedulerError;

/// Id-keyed arena of all tasks, replicas included.
#[derive(Debug, Clone, Default)]
pub struct EnactmentGraph {
    tasks: HashMap<TaskId, Task>,
}

impl EnactmentGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a task, replacing any task with the same id.
    pub fn insert(&mut self, task: Task) {
        self.tasks.insert(task.id.clone(), task);
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with_task(mut self, task: Task) -> Self {
        self.insert(task);
        self
    }

    /// Look up a task by id.
    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.get(id)
    }

    /// Look up a task by id, failing if it is absent.
    pub fn lookup(&self, id: &str) -> Result<&Task, SchedulerError> {
        self.get(id)
            .ok_or_else(|| SchedulerError::GraphLookup { task: id.to_owned() })
    }

    /// Number of tasks.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// True if the graph holds no task.
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

/// Mapping declarations keyed by the original task they belong to.
#[derive(Debug, Clone, Default)]
pub struct MappingCatalog {
    mappings: HashMap<TaskId, Vec<Mapping>>,
}

impl MappingCatalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a mapping for its source task. Duplicates are ignored and
    /// declaration order is preserved.
    pub fn add(&mut self, mapping: Mapping) {
        let entry = self.mappings.entry(mapping.source.clone()).or_default();
        if !entry.contains(&mapping) {
            entry.push(mapping);
        }
    }

    /// Builder-style add.
    #[must_use]
    pub fn with_mapping(mut self, mapping: Mapping) -> Self {
        self.add(mapping);
        self
    }

    /// Mappings declared for `task`; empty if none.
    pub fn mappings_for(&self, task: &str) -> &[Mapping] {
        self.mappings.get(task).map_or(&[], Vec::as_slice)
    }
}

/// The specification the scheduler reads from.
#[derive(Debug, Default)]
pub struct Specification {
    graph: EnactmentGraph,
    catalog: MappingCatalog,
    resources: HashMap<ResourceId, Arc<Resource>>,
}

impl Specification {
    /// Create a specification without resources.
    pub fn new(graph: EnactmentGraph, catalog: MappingCatalog) -> Self {
        Self {
            graph,
            catalog,
            resources: HashMap::new(),
        }
    }

    /// Register a resource.
    #[must_use]
    pub fn with_resource(mut self, resource: Resource) -> Self {
        self.resources
            .insert(resource.id().to_owned(), Arc::new(resource));
        self
    }

    /// The enactment graph.
    pub const fn graph(&self) -> &EnactmentGraph {
        &self.graph
    }

    /// The mapping catalog.
    pub const fn catalog(&self) -> &MappingCatalog {
        &self.catalog
    }

    /// Look up a resource by id.
    pub fn resource(&self, id: &str) -> Result<&Arc<Resource>, SchedulerError> {
        self.resources
            .get(id)
            .ok_or_else(|| SchedulerError::UnknownResource {
                resource: id.to_owned(),
            })
    }

    /// Iterate over all registered resources.
    pub fn resources(&self) -> impl Iterator<Item = &Arc<Resource>> {
        self.resources.values()
    }
}

/// Source of the specification handed to the scheduler.
pub trait SpecificationProvider: Send + Sync {
    /// Return the current specification.
    fn specification(&self) -> Arc<Specification>;
}

impl SpecificationProvider for Arc<Specification> {
    fn specification(&self) -> Arc<Specification> {
        Arc::clone(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::EnactmentMode;

    #[test]
    fn graph_lookup_reports_missing_task() {
        let graph = EnactmentGraph::new().with_task(Task::user("a"));
        assert_eq!(graph.lookup("a").map(|t| t.id.as_str()), Ok("a"));
        assert_eq!(
            graph.lookup("b"),
            Err(SchedulerError::GraphLookup { task: "b".into() })
        );
    }

    #[test]
    fn catalog_ignores_duplicates() {
        let m = Mapping::new("a", "r", EnactmentMode::Local, "native");
        let catalog = MappingCatalog::new()
            .with_mapping(m.clone())
            .with_mapping(m.clone());
        assert_eq!(catalog.mappings_for("a"), &[m]);
        assert!(catalog.mappings_for("b").is_empty());
    }

    #[test]
    fn unknown_resource_is_an_error() {
        let spec = Specification::default().with_resource(Resource::new("r"));
        assert!(spec.resource("r").is_ok());
        assert!(matches!(
            spec.resource("x"),
            Err(SchedulerError::UnknownResource { .. })
        ));
    }
}
