//! Scheduler configuration structures.

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::core::lock::CAPACITY_LOCK_NAME;
use crate::core::{AppResult, SchedulerError};

/// Environment variable overriding [`SchedulerConfig::lock_name`].
pub const ENV_LOCK_NAME: &str = "PLACEMENT_LOCK_NAME";
/// Environment variable overriding [`SchedulerConfig::lock_timeout_ms`].
pub const ENV_LOCK_TIMEOUT_MS: &str = "PLACEMENT_LOCK_TIMEOUT_MS";
/// Environment variable overriding [`SchedulerConfig::placement`].
pub const ENV_PLACEMENT_MODE: &str = "PLACEMENT_MODE";
/// Environment variable overriding [`SchedulerConfig::audit_capacity`].
pub const ENV_AUDIT_CAPACITY: &str = "PLACEMENT_AUDIT_CAPACITY";

/// How many mappings a single schedule may hold.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlacementMode {
    /// At most one mapping per task.
    #[default]
    Single,
    /// A task may be placed on several resources at once.
    Multi,
}

impl std::str::FromStr for PlacementMode {
    type Err = SchedulerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "single" => Ok(Self::Single),
            "multi" => Ok(Self::Multi),
            other => Err(SchedulerError::InvalidConfig(format!(
                "unknown placement mode `{other}`"
            ))),
        }
    }
}

/// Root scheduler configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Name of the process-wide capacity lock.
    pub lock_name: String,
    /// Upper bound on lock acquisition, enforced by the lock provider.
    pub lock_timeout_ms: Option<u64>,
    /// Single or multi placement.
    pub placement: PlacementMode,
    /// Bound of the in-memory audit buffer.
    pub audit_capacity: usize,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            lock_name: CAPACITY_LOCK_NAME.to_owned(),
            lock_timeout_ms: None,
            placement: PlacementMode::Single,
            audit_capacity: 1024,
        }
    }
}

impl SchedulerConfig {
    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), SchedulerError> {
        if self.lock_name.trim().is_empty() {
            return Err(SchedulerError::InvalidConfig(
                "lock_name must not be empty".into(),
            ));
        }
        if self.lock_timeout_ms == Some(0) {
            return Err(SchedulerError::InvalidConfig(
                "lock_timeout_ms must be greater than 0".into(),
            ));
        }
        if self.audit_capacity == 0 {
            return Err(SchedulerError::InvalidConfig(
                "audit_capacity must be greater than 0".into(),
            ));
        }
        Ok(())
    }

    /// Parse scheduler configuration from a JSON string and validate.
    pub fn from_json_str(input: &str) -> Result<Self, SchedulerError> {
        let cfg: Self = serde_json::from_str(input)
            .map_err(|e| SchedulerError::InvalidConfig(format!("parse error: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Build configuration from the environment, loading `.env` first if present.
    /// Unset variables keep their defaults.
    pub fn from_env() -> AppResult<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();
        if let Some(name) = lookup(ENV_LOCK_NAME) {
            cfg.lock_name = name;
        }
        if let Some(ms) = lookup(ENV_LOCK_TIMEOUT_MS) {
            cfg.lock_timeout_ms = Some(
                ms.parse()
                    .with_context(|| format!("{ENV_LOCK_TIMEOUT_MS}=`{ms}` is not a number"))?,
            );
        }
        if let Some(mode) = lookup(ENV_PLACEMENT_MODE) {
            cfg.placement = mode.parse()?;
        }
        if let Some(cap) = lookup(ENV_AUDIT_CAPACITY) {
            cfg.audit_capacity = cap
                .parse()
                .with_context(|| format!("{ENV_AUDIT_CAPACITY}=`{cap}` is not a number"))?;
        }
        cfg.validate()?;
        Ok(cfg)
    }
}
