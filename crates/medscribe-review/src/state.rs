//! Per-record review state.

use chrono::{DateTime, Utc};
use medscribe_audit::{Correction, ValidationReport};
use medscribe_core::{FieldName, PatientRecord};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Review state of one correction instance.
///
/// `Pending -> Accepted | Rejected`; there is no transition back. A fresh
/// audit produces a new correction instance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewStatus {
    /// Audited, awaiting a human decision
    #[default]
    Pending,
    /// Suggestion applied to the live value
    Accepted,
    /// Suggestion discarded
    Rejected,
}

/// Which auditor produced a pending correction.
///
/// A field may carry corrections from both sources at once; each is
/// reviewed separately, never merged by implied agreement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CorrectionSource {
    /// Per-field audit
    FieldAudit,
    /// Whole-record audit finding
    RecordAudit,
}

/// One correction waiting in (or resolved from) the review queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingCorrection {
    /// Auditor that produced the suggestion
    pub source: CorrectionSource,
    /// The suggestion itself
    pub correction: Correction,
    /// Where it sits in the review state machine
    pub status: ReviewStatus,
    /// User who accepted or rejected the correction; `None` while pending
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved_by: Option<String>,
}

impl PendingCorrection {
    /// A fresh pending entry.
    #[inline]
    #[must_use]
    pub fn new(source: CorrectionSource, correction: Correction) -> Self {
        Self {
            source,
            correction,
            status: ReviewStatus::Pending,
            resolved_by: None,
        }
    }
}

/// Immutable record of one accepted correction.
///
/// Append-only; retained for audit trail and later model retraining.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEntry {
    /// Field that was corrected
    pub field: FieldName,
    /// Value before the correction
    pub original: String,
    /// Value the auditor suggested
    pub suggested: String,
    /// Value actually applied
    pub applied: String,
    /// Opaque identifier of the accepting user
    pub accepted_by: String,
    /// UTC timestamp of the acceptance
    pub accepted_at: DateTime<Utc>,
    /// Stored extraction confidence at acceptance time, when one existed.
    /// Accepting does not rewrite the stored confidence.
    pub prior_confidence: Option<f64>,
    /// The auditor's justification
    pub reason: String,
}

/// Outcome of the durable ledger write.
///
/// A failed write is non-fatal (the in-memory state already carries the
/// entry) but is reported instead of swallowed so the caller can retry or
/// warn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerWrite {
    /// The persistence collaborator stored the entry
    Persisted,
    /// The write failed; the message names the cause
    Failed(String),
}

/// Everything the review layer tracks for one record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordState {
    /// Opaque record identifier
    pub id: String,
    /// Live field values
    pub record: PatientRecord,
    /// Stored extraction confidences; not recomputed when corrections land
    pub confidences: BTreeMap<FieldName, f64>,
    /// Per-field correction queue, both auditor sources interleaved
    pub pending: BTreeMap<FieldName, Vec<PendingCorrection>>,
    /// Append-only correction history
    pub ledger: Vec<LedgerEntry>,
    /// Append-only validation report history
    pub reports: Vec<ValidationReport>,
}

impl RecordState {
    /// Fresh state around an extracted record.
    #[must_use]
    pub fn new(id: impl Into<String>, record: PatientRecord) -> Self {
        Self {
            id: id.into(),
            record,
            ..Default::default()
        }
    }

    /// Fields that still have at least one pending correction.
    #[must_use = "returns the fields awaiting review"]
    pub fn pending_fields(&self) -> BTreeSet<FieldName> {
        self.pending
            .iter()
            .filter(|(_, corrections)| {
                corrections
                    .iter()
                    .any(|c| c.status == ReviewStatus::Pending)
            })
            .map(|(field, _)| *field)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_fields_ignores_resolved() {
        let mut state = RecordState::new("r-1", PatientRecord::default());
        state.pending.insert(
            FieldName::IsSmoker,
            vec![PendingCorrection {
                source: CorrectionSource::FieldAudit,
                correction: Correction::suggesting("yes", "no", "negated", 0.9),
                status: ReviewStatus::Rejected,
                resolved_by: Some("user-7".to_string()),
            }],
        );
        state.pending.insert(
            FieldName::Allergies,
            vec![PendingCorrection::new(
                CorrectionSource::RecordAudit,
                Correction::suggesting("penicilin", "bez alergií", "contradicted", 0.9),
            )],
        );

        let fields = state.pending_fields();
        assert!(fields.contains(&FieldName::Allergies));
        assert!(!fields.contains(&FieldName::IsSmoker));
    }

    #[test]
    fn test_review_status_default_is_pending() {
        assert_eq!(ReviewStatus::default(), ReviewStatus::Pending);
    }

    #[test]
    fn test_state_serde_roundtrip() {
        let mut state = RecordState::new("r-2", PatientRecord::default());
        state.confidences.insert(FieldName::Diagnosis, 0.15);
        let json = serde_json::to_string(&state).unwrap();
        let parsed: RecordState = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, state);
    }
}
