//! The outcome of a scheduling request.

use serde::{Deserialize, Serialize};

use crate::core::model::{Mapping, TaskId};
use crate::core::SchedulerError;

/// Mappings committed for one task. Empty means the task is not applicable
/// for scheduling or could not be placed at the moment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    /// Requested task.
    pub task: TaskId,
    mappings: Vec<Mapping>,
}

impl Schedule {
    /// Create a schedule.
    pub fn new(task: impl Into<TaskId>, mappings: Vec<Mapping>) -> Self {
        Self {
            task: task.into(),
            mappings,
        }
    }

    /// Schedule without mappings.
    pub fn empty(task: impl Into<TaskId>) -> Self {
        Self::new(task, Vec::new())
    }

    /// True if no mapping was committed.
    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }

    /// Number of committed mappings.
    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    /// Committed mappings.
    pub fn mappings(&self) -> &[Mapping] {
        &self.mappings
    }

    /// Iterate over committed mappings.
    pub fn iter(&self) -> std::slice::Iter<'_, Mapping> {
        self.mappings.iter()
    }

    /// Consume into the committed mappings.
    pub fn into_mappings(self) -> Vec<Mapping> {
        self.mappings
    }

    /// The single mapping of a single-target schedule.
    pub fn single(&self) -> Result<&Mapping, SchedulerError> {
        match self.mappings.as_slice() {
            [mapping] => Ok(mapping),
            other => Err(SchedulerError::InvalidSchedule {
                task: self.task.clone(),
                count: other.len(),
            }),
        }
    }
}

impl<'a> IntoIterator for &'a Schedule {
    type Item = &'a Mapping;
    type IntoIter = std::slice::Iter<'a, Mapping>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::EnactmentMode;

    #[test]
    fn single_requires_exactly_one() {
        let m1 = Mapping::new("task", "res", EnactmentMode::Local, "native");
        let m2 = Mapping::new("task", "res2", EnactmentMode::Local, "native");

        assert_eq!(Schedule::new("task", vec![m1.clone()]).single(), Ok(&m1));
        assert_eq!(
            Schedule::new("task", vec![m1, m2]).single(),
            Err(SchedulerError::InvalidSchedule { task: "task".into(), count: 2 })
        );
        assert_eq!(
            Schedule::empty("task").single(),
            Err(SchedulerError::InvalidSchedule { task: "task".into(), count: 0 })
        );
    }
}
