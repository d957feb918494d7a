//! Engine limits and policy switches shared by every game.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::seed::DEFAULT_MAX_SEED_LEN;

/// What to do when a run outlives the submitted trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShortTracePolicy {
    /// Keep simulating with neutral input until a terminal state.
    #[default]
    ContinueNeutral,
    /// Reject runs whose terminal tick lies beyond the trace.
    Reject,
}

/// Resource ceilings and policies applied to every verification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub max_seed_len: usize,
    pub max_trace_bytes: usize,
    pub max_trace_events: usize,
    pub max_ticks: u32,
    pub short_trace: ShortTracePolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_seed_len: DEFAULT_MAX_SEED_LEN,
            max_trace_bytes: 4 * 1024 * 1024,
            max_trace_events: 36_000,
            max_ticks: 36_000,
            short_trace: ShortTracePolicy::ContinueNeutral,
        }
    }
}

/// Errors raised when engine configuration invariants are violated.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{field} must be at least {min} (got {value})")]
    MinViolation {
        field: &'static str,
        min: u64,
        value: u64,
    },
    #[error("config is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

impl EngineConfig {
    /// Parse a configuration document; missing fields keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the text is not valid JSON or a limit is zero.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let cfg: Self = serde_json::from_str(text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Check that every ceiling admits at least one unit of work.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MinViolation`] naming the first zero limit.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let checks: [(&'static str, u64); 4] = [
            ("max_seed_len", u64::try_from(self.max_seed_len).unwrap_or(u64::MAX)),
            ("max_trace_bytes", u64::try_from(self.max_trace_bytes).unwrap_or(u64::MAX)),
            ("max_trace_events", u64::try_from(self.max_trace_events).unwrap_or(u64::MAX)),
            ("max_ticks", u64::from(self.max_ticks)),
        ];
        for (field, value) in checks {
            if value < 1 {
                return Err(ConfigError::MinViolation {
                    field,
                    min: 1,
                    value,
                });
            }
        }
        Ok(())
    }
}
