//! Builder that assembles a [`Scheduler`] from configuration and collaborators.

use std::sync::Arc;

use crate::config::SchedulerConfig;
use crate::core::{
    AuditSink, CapacityCalculator, FirstFitPolicy, InMemoryAuditSink, LockProvider, Scheduler,
    SchedulerError, SelectionPolicy, SpecificationProvider,
};
use crate::infra::LocalLockProvider;

/// Collects scheduler collaborators and validates configuration on build.
///
/// The specification and capacity calculator are required. The policy
/// defaults to [`FirstFitPolicy`] and the lock provider to a
/// [`LocalLockProvider`] configured from the scheduler configuration.
pub struct SchedulerBuilder {
    config: SchedulerConfig,
    specs: Option<Arc<dyn SpecificationProvider>>,
    calculator: Option<Arc<dyn CapacityCalculator>>,
    policy: Option<Arc<dyn SelectionPolicy>>,
    locks: Option<Arc<dyn LockProvider>>,
    audit: Option<Arc<dyn AuditSink>>,
}

impl SchedulerBuilder {
    /// Start from `config`.
    pub fn new(config: SchedulerConfig) -> Self {
        Self {
            config,
            specs: None,
            calculator: None,
            policy: None,
            locks: None,
            audit: None,
        }
    }

    /// Configuration the scheduler will be built with.
    pub const fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Specification source.
    #[must_use]
    pub fn specification(mut self, specs: Arc<dyn SpecificationProvider>) -> Self {
        self.specs = Some(specs);
        self
    }

    /// Capacity calculator.
    #[must_use]
    pub fn calculator(mut self, calculator: Arc<dyn CapacityCalculator>) -> Self {
        self.calculator = Some(calculator);
        self
    }

    /// Selection policy.
    #[must_use]
    pub fn policy(mut self, policy: Arc<dyn SelectionPolicy>) -> Self {
        self.policy = Some(policy);
        self
    }

    /// Lock provider.
    #[must_use]
    pub fn lock_provider(mut self, locks: Arc<dyn LockProvider>) -> Self {
        self.locks = Some(locks);
        self
    }

    /// Audit sink.
    #[must_use]
    pub fn audit(mut self, audit: Arc<dyn AuditSink>) -> Self {
        self.audit = Some(audit);
        self
    }

    /// Attach a bounded in-memory audit sink sized from the configuration and
    /// return a handle to read it.
    #[must_use]
    pub fn in_memory_audit(self) -> (Self, InMemoryAuditSink) {
        let sink = InMemoryAuditSink::new(self.config.audit_capacity);
        (self.audit(Arc::new(sink.clone())), sink)
    }

    /// Validate and build.
    pub fn build<S>(self, spawner: S) -> Result<Scheduler<S>, SchedulerError> {
        self.config.validate()?;
        let specs = self.specs.ok_or_else(|| {
            SchedulerError::InvalidConfig("a specification provider is required".into())
        })?;
        let calculator = self.calculator.ok_or_else(|| {
            SchedulerError::InvalidConfig("a capacity calculator is required".into())
        })?;
        let policy = self
            .policy
            .unwrap_or_else(|| Arc::new(FirstFitPolicy));
        let locks = self
            .locks
            .unwrap_or_else(|| Arc::new(LocalLockProvider::from_config(&self.config)));

        tracing::debug!(
            "building scheduler: policy `{}`, lock `{}`, placement {:?}",
            policy.name(),
            self.config.lock_name,
            self.config.placement
        );

        let scheduler = Scheduler::new(specs.as_ref(), calculator, policy, locks, spawner)
            .with_config(self.config);
        Ok(match self.audit {
            Some(audit) => scheduler.with_audit(audit),
            None => scheduler,
        })
    }
}

impl Default for SchedulerBuilder {
    fn default() -> Self {
        Self::new(SchedulerConfig::default())
    }
}
