//! Merging auditor outputs and applying human review decisions.

use crate::state::{
    CorrectionSource, LedgerEntry, LedgerWrite, PendingCorrection, RecordState, ReviewStatus,
};
use crate::store::RecordStore;
use chrono::Utc;
use medscribe_audit::{Correction, ValidationReport};
use medscribe_core::{FieldName, MedscribeError, Result};

/// Outcome of an accept call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AcceptOutcome {
    /// The suggestion was applied; carries the durable-write outcome
    Applied(LedgerWrite),
    /// The correction was already accepted; nothing changed, no duplicate
    /// ledger entry
    AlreadyAccepted,
}

/// Applies review decisions to per-record state.
///
/// Holds no per-record state itself; all operations are request-scoped and
/// act on a [`RecordState`] the caller owns.
#[derive(Debug, Clone)]
pub struct Reconciler<S: RecordStore> {
    store: S,
}

impl<S: RecordStore> Reconciler<S> {
    /// Create a reconciler over a persistence collaborator.
    #[inline]
    #[must_use = "this function returns a reconciler that should be used"]
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Merge a batch of field-audit results into the pending map.
    ///
    /// Every correction is queued, including confirmations; the review UI
    /// decides what to show. Nothing is applied here.
    pub fn merge_field_audits(
        &self,
        state: &mut RecordState,
        results: Vec<(FieldName, Correction)>,
    ) {
        for (field, correction) in results {
            state
                .pending
                .entry(field)
                .or_default()
                .push(PendingCorrection::new(
                    CorrectionSource::FieldAudit,
                    correction,
                ));
        }
        tracing::debug!(
            record = %state.id,
            pending = state.pending_fields().len(),
            "merged field audits"
        );
    }

    /// Merge a whole-record validation report.
    ///
    /// The report joins the append-only history and each disputed finding
    /// becomes a pending correction with source [`CorrectionSource::RecordAudit`].
    /// A field may end up carrying corrections from both auditors; they are
    /// reviewed independently.
    pub fn merge_report(&self, state: &mut RecordState, report: ValidationReport) {
        for h in &report.hallucinations {
            state
                .pending
                .entry(h.field)
                .or_default()
                .push(PendingCorrection::new(
                    CorrectionSource::RecordAudit,
                    Correction::suggesting(
                        h.primary_value.clone(),
                        h.expected_value.clone(),
                        h.reason.clone(),
                        report.confidence,
                    ),
                ));
        }
        for m in &report.missing_data {
            state
                .pending
                .entry(m.field)
                .or_default()
                .push(PendingCorrection::new(
                    CorrectionSource::RecordAudit,
                    Correction::suggesting(
                        m.primary_value.clone(),
                        m.transcript_evidence.clone(),
                        m.reason.clone(),
                        report.confidence,
                    ),
                ));
        }
        for n in &report.negation_errors {
            state
                .pending
                .entry(n.field)
                .or_default()
                .push(PendingCorrection::new(
                    CorrectionSource::RecordAudit,
                    Correction::suggesting(
                        n.primary_extracted.clone(),
                        n.correct_value.clone(),
                        n.reason.clone(),
                        report.confidence,
                    ),
                ));
        }

        tracing::info!(
            record = %state.id,
            findings = report.finding_count(),
            reports = state.reports.len() + 1,
            "merged validation report"
        );
        state.reports.push(report);
    }

    /// Accept a pending correction: apply the suggested value and append one
    /// ledger entry.
    ///
    /// Idempotent: accepting an already-accepted correction changes nothing
    /// and writes no duplicate entry.
    ///
    /// # Errors
    /// - [`MedscribeError::CorrectionNotFound`] when no correction exists at
    ///   `(field, index)`.
    /// - [`MedscribeError::ResolvedCorrection`] when the correction was
    ///   rejected; there is no transition back.
    pub fn accept(
        &self,
        state: &mut RecordState,
        field: FieldName,
        index: usize,
        accepted_by: &str,
    ) -> Result<AcceptOutcome> {
        let pending = Self::lookup(state, field, index)?;

        match pending.status {
            ReviewStatus::Accepted => return Ok(AcceptOutcome::AlreadyAccepted),
            ReviewStatus::Rejected => {
                return Err(MedscribeError::ResolvedCorrection(field.to_string()))
            }
            ReviewStatus::Pending => {}
        }

        pending.status = ReviewStatus::Accepted;
        pending.correction.accepted = true;
        pending.resolved_by = Some(accepted_by.to_string());
        let correction = pending.correction.clone();

        let applied = correction.suggested.clone();
        state.record.set(field, applied.clone());

        let entry = LedgerEntry {
            field,
            original: correction.original,
            suggested: correction.suggested,
            applied,
            accepted_by: accepted_by.to_string(),
            accepted_at: Utc::now(),
            // Confidence before the correction; deliberately not recomputed
            prior_confidence: state.confidences.get(&field).copied(),
            reason: correction.reason,
        };
        state.ledger.push(entry.clone());

        let write = match self.store.append_ledger(&state.id, &entry) {
            Ok(()) => LedgerWrite::Persisted,
            Err(e) => {
                tracing::warn!(record = %state.id, field = %field, error = %e, "ledger write failed");
                LedgerWrite::Failed(e.to_string())
            }
        };

        Ok(AcceptOutcome::Applied(write))
    }

    /// Reject a pending correction: discard the suggestion.
    ///
    /// The correction history is untouched (no ledger entry) and the field
    /// leaves the pending-review set once no pending corrections remain. The
    /// rejecting user is recorded on the correction itself.
    ///
    /// # Errors
    /// Same lookup errors as [`Reconciler::accept`];
    /// [`MedscribeError::ResolvedCorrection`] when already accepted or
    /// rejected.
    pub fn reject(
        &self,
        state: &mut RecordState,
        field: FieldName,
        index: usize,
        rejected_by: &str,
    ) -> Result<()> {
        let pending = Self::lookup(state, field, index)?;

        if pending.status != ReviewStatus::Pending {
            return Err(MedscribeError::ResolvedCorrection(field.to_string()));
        }
        pending.status = ReviewStatus::Rejected;
        pending.resolved_by = Some(rejected_by.to_string());
        tracing::debug!(field = %field, user = rejected_by, "correction rejected");
        Ok(())
    }

    fn lookup(
        state: &mut RecordState,
        field: FieldName,
        index: usize,
    ) -> Result<&mut PendingCorrection> {
        state
            .pending
            .get_mut(&field)
            .and_then(|list| list.get_mut(index))
            .ok_or_else(|| MedscribeError::CorrectionNotFound {
                field: field.to_string(),
                index,
            })
    }
}
