//! Error types for the extraction-audit pipeline.

use thiserror::Error;

/// Error conditions surfaced by the audit pipeline.
///
/// Per-field audit failures are deliberately *not* represented here: the
/// field auditor degrades to a no-op correction instead of erroring, so only
/// failures with no safe default (whole-record audits, integrity violations,
/// illegal review transitions) reach this enum.
#[derive(Error, Debug)]
pub enum MedscribeError {
    /// The model-call collaborator failed outright (timeout, auth, quota).
    #[error("model call failed: {0}")]
    Model(String),

    /// A whole-record audit response could not be parsed into a report.
    ///
    /// This is a hard error: a record-level audit has no safe partial
    /// result, so an unusable response must block the report rather than
    /// produce an empty one.
    #[error("audit response parse error: {0}")]
    AuditParse(String),

    /// A finding or correction referenced a field outside the schema.
    ///
    /// Surfaced, never skipped: a silent skip would hide a corrupted
    /// pipeline stage.
    #[error("unknown field: '{0}' is not in the record schema")]
    UnknownField(String),

    /// A pending correction index did not exist for the given field.
    #[error("no pending correction for field '{field}' at index {index}")]
    CorrectionNotFound {
        /// Wire name of the field being reconciled.
        field: String,
        /// Index into the field's pending-correction list.
        index: usize,
    },

    /// An accept/reject was attempted on an already-resolved correction.
    ///
    /// There is no transition back from accepted/rejected; a fresh audit
    /// produces a new correction instance.
    #[error("correction for field '{0}' is already resolved")]
    ResolvedCorrection(String),

    /// The persistence collaborator failed a read or write.
    #[error("storage error: {0}")]
    Storage(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Type alias for [`Result<T, MedscribeError>`].
pub type Result<T> = std::result::Result<T, MedscribeError>;
