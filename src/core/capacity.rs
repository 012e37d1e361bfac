//! Capacity fraction calculation.
//!
//! A [`CapacityCalculator`] answers one question: what share of a resource's
//! total capacity does a task consume when placed there. It must be pure and
//! return values in `[0, 1]`.

use std::collections::HashMap;

use crate::core::model::{Resource, ResourceId, Task, TaskId};
use crate::core::SchedulerError;

/// Computes the fraction of a resource a task occupies.
pub trait CapacityCalculator: Send + Sync {
    /// Fraction of `resource`'s capacity consumed by `task`, in `[0, 1]`.
    fn capacity_fraction(&self, task: &Task, resource: &Resource) -> f64;
}

impl<F> CapacityCalculator for F
where
    F: Fn(&Task, &Resource) -> f64 + Send + Sync,
{
    fn capacity_fraction(&self, task: &Task, resource: &Resource) -> f64 {
        self(task, resource)
    }
}

fn check_fraction(fraction: f64) -> Result<f64, SchedulerError> {
    if (0.0..=1.0).contains(&fraction) {
        Ok(fraction)
    } else {
        Err(SchedulerError::InvalidConfig(format!(
            "capacity fraction {fraction} outside [0, 1]"
        )))
    }
}

/// Explicit fraction per (task, resource) pair.
#[derive(Debug, Clone, Default)]
pub struct CapacityTable {
    fractions: HashMap<(TaskId, ResourceId), f64>,
    default_fraction: f64,
}

impl CapacityTable {
    /// Empty table; unlisted pairs consume nothing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fraction used for pairs not listed explicitly.
    pub fn with_default(mut self, fraction: f64) -> Result<Self, SchedulerError> {
        self.default_fraction = check_fraction(fraction)?;
        Ok(self)
    }

    /// Record the fraction `task` consumes on `resource`.
    pub fn with_fraction(
        mut self,
        task: impl Into<TaskId>,
        resource: impl Into<ResourceId>,
        fraction: f64,
    ) -> Result<Self, SchedulerError> {
        self.fractions
            .insert((task.into(), resource.into()), check_fraction(fraction)?);
        Ok(self)
    }
}

impl CapacityCalculator for CapacityTable {
    fn capacity_fraction(&self, task: &Task, resource: &Resource) -> f64 {
        self.fractions
            .get(&(task.id.clone(), resource.id().to_owned()))
            .copied()
            .unwrap_or(self.default_fraction)
    }
}

/// Every task takes one slot: `1 / slots` of the resource.
#[derive(Debug, Clone)]
pub struct UniformCapacity {
    default_slots: u32,
    slots: HashMap<ResourceId, u32>,
}

impl UniformCapacity {
    /// Resources hold `default_slots` tasks unless overridden.
    pub fn new(default_slots: u32) -> Result<Self, SchedulerError> {
        if default_slots == 0 {
            return Err(SchedulerError::InvalidConfig(
                "slot count must be greater than 0".into(),
            ));
        }
        Ok(Self {
            default_slots,
            slots: HashMap::new(),
        })
    }

    /// Override the slot count of one resource.
    pub fn with_slots(
        mut self,
        resource: impl Into<ResourceId>,
        slots: u32,
    ) -> Result<Self, SchedulerError> {
        let resource = resource.into();
        if slots == 0 {
            return Err(SchedulerError::InvalidConfig(format!(
                "slot count for `{resource}` must be greater than 0"
            )));
        }
        self.slots.insert(resource, slots);
        Ok(self)
    }
}

impl CapacityCalculator for UniformCapacity {
    fn capacity_fraction(&self, _task: &Task, resource: &Resource) -> f64 {
        let slots = self
            .slots
            .get(resource.id())
            .copied()
            .unwrap_or(self.default_slots);
        1.0 / f64::from(slots)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_falls_back_to_default() {
        let table = CapacityTable::new()
            .with_default(0.1)
            .unwrap()
            .with_fraction("a", "r", 0.6)
            .unwrap();
        let res = Resource::limited("r");
        assert!((table.capacity_fraction(&Task::user("a"), &res) - 0.6).abs() < f64::EPSILON);
        assert!((table.capacity_fraction(&Task::user("b"), &res) - 0.1).abs() < f64::EPSILON);
    }

    #[test]
    fn table_rejects_out_of_range() {
        assert!(CapacityTable::new().with_fraction("a", "r", 1.5).is_err());
        assert!(CapacityTable::new().with_default(-0.1).is_err());
    }

    #[test]
    fn uniform_divides_by_slots() {
        let calc = UniformCapacity::new(4).unwrap().with_slots("big", 8).unwrap();
        let task = Task::user("a");
        assert!((calc.capacity_fraction(&task, &Resource::limited("small")) - 0.25).abs() < f64::EPSILON);
        assert!((calc.capacity_fraction(&task, &Resource::limited("big")) - 0.125).abs() < f64::EPSILON);
        assert!(UniformCapacity::new(0).is_err());
    }

    #[test]
    fn closures_are_calculators() {
        let calc = |_: &Task, _: &Resource| 0.5;
        assert!((calc.capacity_fraction(&Task::user("a"), &Resource::new("r")) - 0.5).abs() < f64::EPSILON);
    }
}
