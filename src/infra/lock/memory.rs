//! In-process named lock provider.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::config::SchedulerConfig;
use crate::core::{CapacityLock, LockProvider, SchedulerError};

/// Named locks backed by `tokio::sync::Mutex`, one per name.
///
/// Waiters are served in FIFO order. With a timeout configured, an
/// acquisition that waits longer fails instead of blocking forever.
#[derive(Debug, Default)]
pub struct LocalLockProvider {
    locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
    timeout: Option<Duration>,
}

impl LocalLockProvider {
    /// Provider whose acquisitions wait indefinitely.
    pub fn new() -> Self {
        Self::default()
    }

    /// Provider whose acquisitions fail after `timeout`.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            locks: Mutex::new(HashMap::new()),
            timeout: Some(timeout),
        }
    }

    /// Provider configured from the scheduler configuration.
    pub fn from_config(cfg: &SchedulerConfig) -> Self {
        cfg.lock_timeout_ms
            .map_or_else(Self::new, |ms| Self::with_timeout(Duration::from_millis(ms)))
    }

    fn named(&self, name: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.locks.lock();
        Arc::clone(locks.entry(name.to_owned()).or_default())
    }
}

#[async_trait]
impl LockProvider for LocalLockProvider {
    async fn acquire(&self, name: &str) -> Result<CapacityLock, SchedulerError> {
        let lock = self.named(name);
        let guard = match self.timeout {
            Some(timeout) => tokio::time::timeout(timeout, lock.lock_owned())
                .await
                .map_err(|_| SchedulerError::LockAcquisition {
                    lock: name.to_owned(),
                    reason: format!("timed out after {}ms", timeout.as_millis()),
                })?,
            None => lock.lock_owned().await,
        };
        tracing::trace!("acquired lock `{name}`");
        Ok(CapacityLock::new(name, guard))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn lock_is_exclusive_until_dropped() {
        let provider = LocalLockProvider::with_timeout(Duration::from_millis(20));
        let held = provider.acquire("capacity").await.unwrap();
        assert_eq!(held.name(), "capacity");

        let err = provider.acquire("capacity").await.unwrap_err();
        assert!(matches!(err, SchedulerError::LockAcquisition { .. }));

        held.release();
        assert!(provider.acquire("capacity").await.is_ok());
    }

    #[tokio::test]
    async fn distinct_names_do_not_contend() {
        let provider = LocalLockProvider::with_timeout(Duration::from_millis(20));
        let _a = provider.acquire("a").await.unwrap();
        assert!(provider.acquire("b").await.is_ok());
    }

    #[test]
    fn config_timeout_is_applied() {
        let cfg = SchedulerConfig {
            lock_timeout_ms: Some(250),
            ..SchedulerConfig::default()
        };
        assert_eq!(
            LocalLockProvider::from_config(&cfg).timeout,
            Some(Duration::from_millis(250))
        );
        assert_eq!(LocalLockProvider::from_config(&SchedulerConfig::default()).timeout, None);
    }
}
