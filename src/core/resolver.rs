//! Identity and mapping resolution over the task hierarchy.
//!
//! Replicas created by parallel-for distribution sit below their original in
//! the parent chain; replicas created by loop expansion are parentless and
//! point at their original through `loop_reference`. Both are scheduled with
//! the mappings of the original task.

use std::collections::HashSet;

use crate::core::model::{Mapping, Task, TaskId};
use crate::core::specification::Specification;
use crate::core::SchedulerError;

/// Mapping options resolved for one scheduling request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedMappings {
    /// Canonical task the request resolved to.
    pub original: TaskId,
    /// Task whose declarations were used; differs from `original` only after
    /// falling back to an ancestor.
    pub owner: TaskId,
    /// Declared mapping options, in declaration order. Never empty.
    pub options: Vec<Mapping>,
}

/// Pure lookups against a specification.
#[derive(Debug, Clone, Copy)]
pub struct MappingResolver<'a> {
    spec: &'a Specification,
}

impl<'a> MappingResolver<'a> {
    /// Create a resolver reading from `spec`.
    pub const fn new(spec: &'a Specification) -> Self {
        Self { spec }
    }

    /// Resolve the original task whose mapping declarations apply to `task`.
    pub fn original_task(&self, task: &'a Task) -> Result<&'a Task, SchedulerError> {
        let graph = self.spec.graph();
        let mut current = task;
        let mut seen = HashSet::new();
        while let Some(parent) = current.parent.as_deref() {
            if !seen.insert(current.id.as_str()) {
                return Err(SchedulerError::InvalidConfig(format!(
                    "parent cycle through task {}",
                    current.id
                )));
            }
            current = graph.lookup(parent)?;
        }
        match current.loop_reference.as_deref() {
            Some(reference) => graph.lookup(reference),
            None => Ok(current),
        }
    }

    /// Resolve the non-empty set of mapping options for `task`.
    ///
    /// Declarations of the original task win. Without any, the structural
    /// ancestors of the requested task are tried from the nearest upward.
    pub fn mapping_options(&self, task: &'a Task) -> Result<ResolvedMappings, SchedulerError> {
        let (original, owner) = self.resolve(task)?;
        let options = self.spec.catalog().mappings_for(&owner.id).to_vec();
        if owner.id == original.id {
            tracing::debug!(
                "task {} resolved to original {} with {} mapping options",
                task.id,
                original.id,
                options.len()
            );
        } else {
            tracing::debug!(
                "task {} falls back to mappings of ancestor {}",
                task.id,
                owner.id
            );
        }
        Ok(ResolvedMappings {
            original: original.id.clone(),
            owner: owner.id.clone(),
            options,
        })
    }

    /// Task whose mapping declarations apply to `task`.
    ///
    /// Capacity is accounted against this task, so a replica weighs exactly
    /// what its original weighs on a resource.
    pub fn declaring_task(&self, task: &'a Task) -> Result<&'a Task, SchedulerError> {
        self.resolve(task).map(|(_, owner)| owner)
    }

    fn resolve(&self, task: &'a Task) -> Result<(&'a Task, &'a Task), SchedulerError> {
        let original = self.original_task(task)?;
        let catalog = self.spec.catalog();
        if !catalog.mappings_for(&original.id).is_empty() {
            return Ok((original, original));
        }

        // The walk starts at the requested task's parent, not the original's:
        // intermediate branches of a nested parallel-for may carry their own
        // declarations, while the original's ancestors belong to an enclosing
        // structure.
        let mut seen = HashSet::from([original.id.as_str()]);
        let mut next = task.parent.as_deref();
        while let Some(id) = next {
            if !seen.insert(id) {
                break;
            }
            let ancestor = self.spec.graph().lookup(id)?;
            if !catalog.mappings_for(&ancestor.id).is_empty() {
                return Ok((original, ancestor));
            }
            next = ancestor.parent.as_deref();
        }

        Err(SchedulerError::MissingMapping {
            task: original.id.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::EnactmentMode;
    use crate::core::specification::{EnactmentGraph, MappingCatalog};

    fn mapping(task: &str, res: &str) -> Mapping {
        Mapping::new(task, res, EnactmentMode::Local, "native")
    }

    fn spec() -> Specification {
        let graph = EnactmentGraph::new()
            .with_task(Task::user("orig"))
            .with_task(Task::user("orig#0").with_parent("orig"))
            .with_task(Task::user("orig#0#1").with_parent("orig#0"))
            .with_task(Task::user("loop").replica_of("orig"))
            .with_task(Task::user("bare"));
        let catalog = MappingCatalog::new()
            .with_mapping(mapping("orig", "r1"))
            .with_mapping(mapping("orig", "r2"));
        Specification::new(graph, catalog)
    }

    #[test]
    fn parentless_task_is_its_own_original() {
        let spec = spec();
        let resolver = MappingResolver::new(&spec);
        let task = spec.graph().lookup("orig").unwrap();
        assert_eq!(resolver.original_task(task).unwrap().id, "orig");
    }

    #[test]
    fn nested_replica_resolves_through_parents() {
        let spec = spec();
        let resolver = MappingResolver::new(&spec);
        let task = spec.graph().lookup("orig#0#1").unwrap();
        assert_eq!(resolver.original_task(task).unwrap().id, "orig");
        let resolved = resolver.mapping_options(task).unwrap();
        assert_eq!(resolved.original, "orig");
        assert_eq!(resolved.options, vec![mapping("orig", "r1"), mapping("orig", "r2")]);
    }

    #[test]
    fn loop_replica_resolves_through_reference() {
        let spec = spec();
        let resolver = MappingResolver::new(&spec);
        let task = spec.graph().lookup("loop").unwrap();
        assert_eq!(resolver.original_task(task).unwrap().id, "orig");
        assert_eq!(resolver.mapping_options(task).unwrap().options.len(), 2);
    }

    #[test]
    fn dangling_loop_reference_is_a_graph_error() {
        let spec = spec();
        let resolver = MappingResolver::new(&spec);
        let task = Task::user("ghost").replica_of("nowhere");
        assert_eq!(
            resolver.original_task(&task),
            Err(SchedulerError::GraphLookup { task: "nowhere".into() })
        );
    }

    #[test]
    fn missing_mappings_are_fatal() {
        let spec = spec();
        let resolver = MappingResolver::new(&spec);
        let task = spec.graph().lookup("bare").unwrap();
        assert_eq!(
            resolver.mapping_options(task),
            Err(SchedulerError::MissingMapping { task: "bare".into() })
        );
    }

    #[test]
    fn falls_back_to_ancestor_declarations() {
        // Only the intermediate parallel-for branch carries declarations.
        let graph = EnactmentGraph::new()
            .with_task(Task::user("body"))
            .with_task(Task::user("body#0").with_parent("body"))
            .with_task(Task::user("body#0#1").with_parent("body#0"));
        let catalog = MappingCatalog::new().with_mapping(mapping("body#0", "r1"));
        let spec = Specification::new(graph, catalog);
        let resolver = MappingResolver::new(&spec);

        let task = spec.graph().lookup("body#0#1").unwrap();
        let resolved = resolver.mapping_options(task).unwrap();
        assert_eq!(resolved.original, "body");
        assert_eq!(resolved.owner, "body#0");
        assert_eq!(resolved.options, vec![mapping("body#0", "r1")]);
        assert_eq!(resolver.declaring_task(task).unwrap().id, "body#0");
    }

    #[test]
    fn replicas_declare_through_their_original() {
        let spec = spec();
        let resolver = MappingResolver::new(&spec);
        for id in ["orig", "orig#0#1", "loop"] {
            let task = spec.graph().lookup(id).unwrap();
            assert_eq!(resolver.declaring_task(task).unwrap().id, "orig");
        }
    }

    #[test]
    fn parent_cycle_is_rejected() {
        let graph = EnactmentGraph::new()
            .with_task(Task::user("a").with_parent("b"))
            .with_task(Task::user("b").with_parent("a"));
        let spec = Specification::new(graph, MappingCatalog::new());
        let resolver = MappingResolver::new(&spec);
        let task = spec.graph().lookup("a").unwrap();
        assert!(matches!(
            resolver.original_task(task),
            Err(SchedulerError::InvalidConfig(_))
        ));
    }
}
