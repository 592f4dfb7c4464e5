//! Configuration for the audit pipeline.

use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

/// Configuration for field and record audits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditConfig {
    /// Model used for per-field audits (e.g. "gpt-4o-mini")
    pub model: String,

    /// Independent model used for whole-record validation (e.g. "gpt-4o")
    pub validator_model: String,

    /// Maximum tokens for model responses
    pub max_tokens: usize,

    /// Minimum delay between calls within one field-audit batch, in
    /// milliseconds. Rate-limit throttle, not a correctness requirement.
    pub field_delay_ms: u64,
}

impl AuditConfig {
    /// Create configuration from environment variables.
    ///
    /// Environment variables:
    /// - `MEDSCRIBE_AUDIT_MODEL`: field-audit model (default: "gpt-4o-mini")
    /// - `MEDSCRIBE_VALIDATOR_MODEL`: record-audit model (default: "gpt-4o")
    /// - `MEDSCRIBE_MAX_TOKENS`: max response tokens (default: 2048)
    /// - `MEDSCRIBE_FIELD_DELAY_MS`: inter-call batch delay (default: 500)
    #[must_use = "creates config from environment variables"]
    pub fn from_env() -> Self {
        let model =
            env::var("MEDSCRIBE_AUDIT_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string());

        let validator_model =
            env::var("MEDSCRIBE_VALIDATOR_MODEL").unwrap_or_else(|_| "gpt-4o".to_string());

        let max_tokens = env::var("MEDSCRIBE_MAX_TOKENS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(2048);

        let field_delay_ms = env::var("MEDSCRIBE_FIELD_DELAY_MS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(500);

        Self {
            model,
            validator_model,
            max_tokens,
            field_delay_ms,
        }
    }

    /// Inter-call delay as a [`Duration`].
    #[inline]
    #[must_use]
    pub const fn field_delay(&self) -> Duration {
        Duration::from_millis(self.field_delay_ms)
    }
}

impl Default for AuditConfig {
    #[inline]
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            validator_model: "gpt-4o".to_string(),
            max_tokens: 2048,
            field_delay_ms: 500,
        }
    }
}
