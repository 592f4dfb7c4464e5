//! The per-field correction produced by a field audit.

use serde::{Deserialize, Serialize};

/// Outcome of asking the second model to check one field.
///
/// Created by the field auditor, mutated only by the reconciler when a human
/// accepts or rejects it, retained indefinitely as part of the record's audit
/// trail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Correction {
    /// Value the auditor was asked to check
    pub original: String,
    /// Auditor's proposed value; equal to `original` when it found no issue
    pub suggested: String,
    /// Free-text justification; never empty. For degraded corrections this
    /// names the failure class (e.g. "model unavailable"), so a failed audit
    /// is visually distinguishable from a genuine confirmation.
    pub reason: String,
    /// Auditor's own confidence in its suggestion (0.0-1.0), distinct from
    /// the field's extraction confidence
    pub confidence: f64,
    /// Whether a human has approved applying `suggested`
    pub accepted: bool,
}

impl Correction {
    /// A correction confirming the original value.
    #[must_use = "creates a confirming correction"]
    pub fn confirmed(original: impl Into<String>, reason: impl Into<String>, confidence: f64) -> Self {
        let original = original.into();
        Self {
            suggested: original.clone(),
            original,
            reason: reason.into(),
            confidence: confidence.clamp(0.0, 1.0),
            accepted: false,
        }
    }

    /// A correction proposing a different value.
    #[must_use = "creates a suggesting correction"]
    pub fn suggesting(
        original: impl Into<String>,
        suggested: impl Into<String>,
        reason: impl Into<String>,
        confidence: f64,
    ) -> Self {
        Self {
            original: original.into(),
            suggested: suggested.into(),
            reason: reason.into(),
            confidence: confidence.clamp(0.0, 1.0),
            accepted: false,
        }
    }

    /// The degraded no-op correction used when the audit itself failed.
    ///
    /// `suggested == original`, confidence parked at the uncertainty default.
    #[must_use = "creates a degraded no-op correction"]
    pub fn degraded(original: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::confirmed(original, reason, 0.5)
    }

    /// Whether applying this correction would leave the value unchanged.
    #[inline]
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.suggested == self.original
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confirmed_is_noop() {
        let correction = Correction::confirmed("no", "matches transcript", 0.9);
        assert!(correction.is_noop());
        assert_eq!(correction.suggested, "no");
        assert!(!correction.accepted);
    }

    #[test]
    fn test_suggesting_is_not_noop() {
        let correction = Correction::suggesting("yes", "no", "transcript says nekouří", 0.85);
        assert!(!correction.is_noop());
        assert_eq!(correction.original, "yes");
        assert_eq!(correction.suggested, "no");
    }

    #[test]
    fn test_degraded_defaults() {
        let correction = Correction::degraded("value", "model unavailable: timeout");
        assert!(correction.is_noop());
        assert_eq!(correction.confidence, 0.5);
        assert!(!correction.accepted);
        assert!(!correction.reason.is_empty());
    }

    #[test]
    fn test_confidence_clamped() {
        assert_eq!(Correction::confirmed("v", "r", 1.7).confidence, 1.0);
        assert_eq!(Correction::confirmed("v", "r", -0.2).confidence, 0.0);
    }

    #[test]
    fn test_serde_camel_case() {
        let correction = Correction::suggesting("a", "b", "r", 0.5);
        let json = serde_json::to_value(&correction).unwrap();
        assert!(json.get("original").is_some());
        assert!(json.get("suggested").is_some());
        assert!(json.get("accepted").is_some());
    }
}
