//! Capacity admission: which mapping options fit right now.

use crate::core::capacity::CapacityCalculator;
use crate::core::model::{Mapping, Resource};
use crate::core::resolver::MappingResolver;
use crate::core::specification::Specification;
use crate::core::SchedulerError;

/// Checks mapping options against the live usage of their target resources.
///
/// Reads `using_tasks`, so callers must hold the capacity lock for the
/// answer to stay valid until commit.
pub struct AdmissionFilter<'a> {
    spec: &'a Specification,
    calculator: &'a dyn CapacityCalculator,
}

impl<'a> AdmissionFilter<'a> {
    /// Create a filter over `spec` using `calculator`.
    pub fn new(spec: &'a Specification, calculator: &'a dyn CapacityCalculator) -> Self {
        Self { spec, calculator }
    }

    /// True iff the mapping counts against its target's capacity: the target
    /// is limited and the source task's workload is not negligible.
    pub fn is_capacity_relevant(&self, mapping: &Mapping) -> Result<bool, SchedulerError> {
        let target = self.spec.resource(&mapping.target)?;
        if !target.has_limited_capacity() {
            return Ok(false);
        }
        let source = self.spec.graph().lookup(&mapping.source)?;
        Ok(!source.negligible_workload)
    }

    /// Sum of the fractions consumed by the tasks committed to `resource`.
    ///
    /// Committed replicas are weighed as the task that declares their
    /// mappings, the same task `required` is computed for.
    pub fn unavailable_capacity(&self, resource: &Resource) -> Result<f64, SchedulerError> {
        let graph = self.spec.graph();
        let resolver = MappingResolver::new(self.spec);
        resource
            .using_tasks()
            .iter()
            .map(|id| -> Result<f64, SchedulerError> {
                let owner = resolver.declaring_task(graph.lookup(id)?)?;
                Ok(self.calculator.capacity_fraction(owner, resource))
            })
            .sum()
    }

    /// True iff the mapping can be used at the current moment.
    ///
    /// The bound is closed: a mapping filling the resource to exactly 1.0 is
    /// admissible.
    pub fn is_valid_mapping(&self, mapping: &Mapping) -> Result<bool, SchedulerError> {
        if !self.is_capacity_relevant(mapping)? {
            return Ok(true);
        }
        let target = self.spec.resource(&mapping.target)?;
        let source = self.spec.graph().lookup(&mapping.source)?;
        let unavailable = self.unavailable_capacity(target)?;
        let required = self.calculator.capacity_fraction(source, target);
        let fits = required + unavailable <= 1.0;
        tracing::debug!(
            "mapping {}: required {required} + unavailable {unavailable} on {} -> {}",
            mapping.id,
            target.id(),
            if fits { "admissible" } else { "over capacity" }
        );
        Ok(fits)
    }

    /// Keep the admissible options, preserving order. The result may be empty.
    pub fn filter(&self, options: &[Mapping]) -> Result<Vec<Mapping>, SchedulerError> {
        let mut admissible = Vec::with_capacity(options.len());
        for mapping in options {
            if self.is_valid_mapping(mapping)? {
                admissible.push(mapping.clone());
            }
        }
        Ok(admissible)
    }
}
