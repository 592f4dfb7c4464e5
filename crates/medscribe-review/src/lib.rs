//! Human-in-the-loop reconciliation of audit corrections.
//!
//! Both auditors propose changes; nothing is ever applied automatically.
//! This crate merges their outputs into a per-field pending-correction map,
//! walks each correction through the review state machine
//! (`Pending -> Accepted | Rejected`, no way back), applies accepted values
//! to the live record, and appends immutable ledger entries for later model
//! retraining.
//!
//! Durable storage is a collaborator behind [`RecordStore`]; a failed ledger
//! write is reported as [`LedgerWrite::Failed`] rather than swallowed, so the
//! calling layer decides whether to retry or warn.

pub mod reconciler;
pub mod state;
pub mod store;

pub use reconciler::{AcceptOutcome, Reconciler};
pub use state::{
    CorrectionSource, LedgerEntry, LedgerWrite, PendingCorrection, RecordState, ReviewStatus,
};
pub use store::{InMemoryStore, RecordStore};
