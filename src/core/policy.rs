//! Selection policies and the contract they must honor.

use crate::config::PlacementMode;
use crate::core::model::{Mapping, Task};
use crate::core::SchedulerError;

/// Picks the committed schedule out of the admissible mapping options.
///
/// Invoked once per request while the capacity lock is held, so every
/// policy sees a race-free view of resource usage.
///
/// Contract:
/// - the returned mappings are a subset of `options`, without duplicates;
/// - returning nothing means the task cannot be placed right now;
/// - more than one mapping is only allowed in [`PlacementMode::Multi`].
pub trait SelectionPolicy: Send + Sync {
    /// Choose the mappings to commit for `task`.
    fn choose_mappings(&self, task: &Task, options: &[Mapping]) -> Vec<Mapping>;

    /// Policy name used in logs.
    fn name(&self) -> &'static str {
        "custom"
    }
}

/// Takes the first admissible option in declaration order.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstFitPolicy;

impl SelectionPolicy for FirstFitPolicy {
    fn choose_mappings(&self, _task: &Task, options: &[Mapping]) -> Vec<Mapping> {
        options.first().cloned().into_iter().collect()
    }

    fn name(&self) -> &'static str {
        "first_fit"
    }
}

/// Takes every admissible option. Only meaningful for multi-placement.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllOptionsPolicy;

impl SelectionPolicy for AllOptionsPolicy {
    fn choose_mappings(&self, _task: &Task, options: &[Mapping]) -> Vec<Mapping> {
        options.to_vec()
    }

    fn name(&self) -> &'static str {
        "all_options"
    }
}

/// Validate a policy's choice against the options it was given.
pub fn enforce_contract(
    policy: &str,
    task: &Task,
    options: &[Mapping],
    chosen: Vec<Mapping>,
    placement: PlacementMode,
) -> Result<Vec<Mapping>, SchedulerError> {
    if placement == PlacementMode::Single && chosen.len() > 1 {
        return Err(SchedulerError::PolicyContract(format!(
            "policy `{policy}` chose {} mappings for task {} in single placement mode",
            chosen.len(),
            task.id
        )));
    }
    for (idx, mapping) in chosen.iter().enumerate() {
        if !options.contains(mapping) {
            return Err(SchedulerError::PolicyContract(format!(
                "policy `{policy}` chose mapping {} which is not an admissible option for task {}",
                mapping.id, task.id
            )));
        }
        if chosen[..idx].contains(mapping) {
            return Err(SchedulerError::PolicyContract(format!(
                "policy `{policy}` chose mapping {} twice",
                mapping.id
            )));
        }
    }
    Ok(chosen)
}
