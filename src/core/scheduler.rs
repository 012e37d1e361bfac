//! Scheduling orchestrator.
//!
//! A request moves through resolution, lock acquisition, admission filtering,
//! policy selection and commit. Everything between acquiring and releasing the
//! capacity lock is synchronous, so the lock is never held across an await
//! point other than its own acquisition.

use std::future::Future;
use std::sync::Arc;

use tracing::Instrument;

use crate::config::SchedulerConfig;
use crate::core::admission::AdmissionFilter;
use crate::core::audit::{build_audit_event, AuditSink, ScheduleAction};
use crate::core::capacity::CapacityCalculator;
use crate::core::handle::{self, ScheduleHandle};
use crate::core::lock::LockProvider;
use crate::core::model::{Mapping, Resource, Task};
use crate::core::policy::{enforce_contract, SelectionPolicy};
use crate::core::resolver::MappingResolver;
use crate::core::specification::{Specification, SpecificationProvider};
use crate::core::{Schedule, SchedulerError};

/// Abstraction for spawning scheduling work on a runtime.
pub trait Spawn {
    /// Spawn an async task that returns a future.
    fn spawn<F>(&self, fut: F)
    where
        F: Future<Output = ()> + Send + 'static;
}

#[derive(Clone)]
struct SchedulerInner {
    spec: Arc<Specification>,
    calculator: Arc<dyn CapacityCalculator>,
    policy: Arc<dyn SelectionPolicy>,
    locks: Arc<dyn LockProvider>,
    config: SchedulerConfig,
    audit: Option<Arc<dyn AuditSink>>,
}

/// Capacity-aware task-to-resource scheduler.
///
/// Cheap to clone; clones share the specification, collaborators and lock
/// provider.
#[derive(Clone)]
pub struct Scheduler<S> {
    inner: Arc<SchedulerInner>,
    spawner: S,
}

impl<S> Scheduler<S> {
    /// Create a scheduler with default configuration.
    pub fn new(
        specs: &dyn SpecificationProvider,
        calculator: Arc<dyn CapacityCalculator>,
        policy: Arc<dyn SelectionPolicy>,
        locks: Arc<dyn LockProvider>,
        spawner: S,
    ) -> Self {
        Self {
            inner: Arc::new(SchedulerInner {
                spec: specs.specification(),
                calculator,
                policy,
                locks,
                config: SchedulerConfig::default(),
                audit: None,
            }),
            spawner,
        }
    }

    /// Replace the configuration.
    #[must_use]
    pub fn with_config(mut self, config: SchedulerConfig) -> Self {
        Arc::make_mut(&mut self.inner).config = config;
        self
    }

    /// Attach an audit sink.
    #[must_use]
    pub fn with_audit(mut self, audit: Arc<dyn AuditSink>) -> Self {
        Arc::make_mut(&mut self.inner).audit = Some(audit);
        self
    }

    /// The specification this scheduler reads.
    pub fn specification(&self) -> &Arc<Specification> {
        &self.inner.spec
    }

    /// Active configuration.
    pub fn config(&self) -> &SchedulerConfig {
        &self.inner.config
    }

    /// Committed capacity fraction of a resource.
    pub fn resource_load(&self, resource: &str) -> Result<f64, SchedulerError> {
        let inner = &*self.inner;
        let resource = inner.spec.resource(resource)?;
        AdmissionFilter::new(&inner.spec, inner.calculator.as_ref()).unavailable_capacity(resource)
    }

    /// Schedule `task` inline, returning once the placement is committed.
    ///
    /// Non-user tasks complete with an empty schedule. Resolution errors,
    /// including a task missing from the enactment graph, are returned before
    /// the capacity lock is requested.
    pub async fn schedule(&self, task: &Task) -> Result<Schedule, SchedulerError> {
        let Some(options) = self.inner.prepare(task)? else {
            return Ok(Schedule::empty(task.id.clone()));
        };
        let span = tracing::debug_span!("schedule", task = %task.id);
        self.inner.place(task, options).instrument(span).await
    }
}

impl<S> Scheduler<S>
where
    S: Spawn,
{
    /// Schedule `task` on the spawner and return a handle to the outcome.
    ///
    /// Resolution errors (unknown task, missing mappings, dangling references)
    /// are returned synchronously; nothing is spawned and no lock is taken for
    /// them. The lock is acquired on the spawner, so a `LockAcquisition`
    /// failure arrives through the handle together with policy and commit
    /// failures. Use [`Self::schedule`] to receive lock failures directly.
    pub fn schedule_task(&self, task: &Task) -> Result<ScheduleHandle, SchedulerError> {
        let Some(options) = self.inner.prepare(task)? else {
            return Ok(ScheduleHandle::ready(Ok(Schedule::empty(task.id.clone()))));
        };
        let (completer, handle) = handle::channel();
        let inner = Arc::clone(&self.inner);
        let task = task.clone();
        let span = tracing::debug_span!("schedule_task", task = %task.id);
        self.spawner.spawn(
            async move {
                let outcome = inner.place(&task, options).await;
                completer.complete(outcome);
            }
            .instrument(span),
        );
        Ok(handle)
    }
}

impl SchedulerInner {
    /// Resolve the mapping options of a user task; `None` for other tasks.
    fn prepare(&self, task: &Task) -> Result<Option<Vec<Mapping>>, SchedulerError> {
        if !task.is_user() {
            tracing::debug!("task {} is not a user task, nothing to schedule", task.id);
            self.audit(&task.id, ScheduleAction::NotApplicable, &[], None);
            return Ok(None);
        }
        // The committed id must resolve later, when other requests sum usage.
        let resolved = self
            .spec
            .graph()
            .lookup(&task.id)
            .and_then(|_| MappingResolver::new(&self.spec).mapping_options(task));
        match resolved {
            Ok(resolved) => Ok(Some(resolved.options)),
            Err(e) => {
                tracing::error!("cannot resolve mappings for task {}: {e}", task.id);
                self.audit(&task.id, ScheduleAction::Failed, &[], Some(e.to_string()));
                Err(e)
            }
        }
    }

    /// Run the locked admission, selection and commit sequence.
    async fn place(&self, task: &Task, options: Vec<Mapping>) -> Result<Schedule, SchedulerError> {
        let outcome = match self.locks.acquire(&self.config.lock_name).await {
            Ok(lock) => {
                let outcome = self.select_and_commit(task, &options);
                lock.release();
                outcome
            }
            Err(e) => Err(e),
        };

        match &outcome {
            Ok(schedule) if schedule.is_empty() => {
                tracing::warn!("task {} cannot be placed at the moment", task.id);
                self.audit(&task.id, ScheduleAction::Backpressure, &[], None);
            }
            Ok(schedule) => {
                tracing::info!(
                    "task {} scheduled on {:?}",
                    task.id,
                    schedule.iter().map(|m| m.target.as_str()).collect::<Vec<_>>()
                );
                self.audit(&task.id, ScheduleAction::Scheduled, schedule.mappings(), None);
            }
            Err(e) => {
                tracing::error!("scheduling task {} failed: {e}", task.id);
                self.audit(&task.id, ScheduleAction::Failed, &[], Some(e.to_string()));
            }
        }
        outcome
    }

    /// Must only be called while holding the capacity lock.
    fn select_and_commit(&self, task: &Task, options: &[Mapping]) -> Result<Schedule, SchedulerError> {
        let admissible =
            AdmissionFilter::new(&self.spec, self.calculator.as_ref()).filter(options)?;
        tracing::debug!(
            "{} of {} mapping options admissible for task {}",
            admissible.len(),
            options.len(),
            task.id
        );

        let chosen = self.policy.choose_mappings(task, &admissible);
        let chosen = enforce_contract(
            self.policy.name(),
            task,
            &admissible,
            chosen,
            self.config.placement,
        )?;

        // Resolve every target before touching any, so the commit is all or nothing.
        let targets = chosen
            .iter()
            .map(|m| self.spec.resource(&m.target).map(Arc::clone))
            .collect::<Result<Vec<Arc<Resource>>, _>>()?;
        for resource in &targets {
            resource.add_using_task(&task.id);
        }
        Ok(Schedule::new(task.id.clone(), chosen))
    }

    fn audit(&self, task: &str, action: ScheduleAction, mappings: &[Mapping], detail: Option<String>) {
        if let Some(sink) = &self.audit {
            let resources = mappings.iter().map(|m| m.target.clone()).collect();
            sink.record(build_audit_event(task, action, resources, detail));
        }
    }
}
