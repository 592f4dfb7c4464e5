//! Whole-record validation report types.

use chrono::{DateTime, Utc};
use medscribe_core::FieldName;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Severity of a hallucination finding.
///
/// Drives UI styling only. No finding is ever auto-applied because of its
/// severity; every suggestion waits for an explicit accept.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FindingSeverity {
    /// Value contradicted outright by the transcript
    High,
    /// Value unsupported, plausible harm if wrong
    #[default]
    Medium,
    /// Cosmetic or low-impact discrepancy
    Low,
}

impl std::fmt::Display for FindingSeverity {
    #[inline]
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::High => write!(f, "high"),
            Self::Medium => write!(f, "medium"),
            Self::Low => write!(f, "low"),
        }
    }
}

impl std::str::FromStr for FindingSeverity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "high" => Ok(Self::High),
            "medium" => Ok(Self::Medium),
            "low" => Ok(Self::Low),
            _ => Err(format!(
                "unknown finding severity: '{s}' (expected: high, medium, low)"
            )),
        }
    }
}

/// A field value unsupported or contradicted by the transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hallucination {
    /// Schema field the finding refers to
    pub field: FieldName,
    /// What the primary extraction put there
    pub primary_value: String,
    /// What the validator believes it should be
    pub expected_value: String,
    /// Free-text justification
    pub reason: String,
    /// UI severity
    pub severity: FindingSeverity,
    /// Supporting transcript quote, when the validator cites one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transcript_quote: Option<String>,
}

/// Something the transcript clearly states that the extraction left blank
/// or generic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MissingData {
    /// Schema field the finding refers to
    pub field: FieldName,
    /// Transcript evidence for the missing content
    pub transcript_evidence: String,
    /// What the primary extraction put there (often empty)
    pub primary_value: String,
    /// Free-text justification
    pub reason: String,
}

/// Extraction asserting the logical opposite of the transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NegationError {
    /// Schema field the finding refers to
    pub field: FieldName,
    /// What the transcript asserts
    pub transcript_says: String,
    /// What the primary model extracted
    pub primary_extracted: String,
    /// The corrected value
    pub correct_value: String,
    /// Free-text justification
    pub reason: String,
}

/// Provenance attached to each audit run.
///
/// Lives on the report, not on the original extraction: one report per audit
/// run, reports accumulate as history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportMetadata {
    /// Identifier of the validator model that produced the report
    pub validator_model: String,
    /// ISO-8601 UTC timestamp of the audit call
    pub validated_at: DateTime<Utc>,
    /// Identifier of the primary model whose extraction was audited
    pub primary_model: String,
}

/// Outcome of one whole-record audit pass. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    /// Validator's boolean summary of the extraction
    pub is_valid: bool,
    /// Validator's overall confidence (0.0-1.0)
    pub confidence: f64,
    /// Fraction of fields the two models agree on (0-100)
    pub agreement_percentage: f64,
    /// Free-text overall assessment
    pub overall_assessment: String,
    /// Values unsupported or contradicted by the transcript
    pub hallucinations: Vec<Hallucination>,
    /// Transcript content the extraction dropped
    pub missing_data: Vec<MissingData>,
    /// Logical-opposite extractions
    pub negation_errors: Vec<NegationError>,
    /// Fields the validator explicitly confirmed correct
    pub correct_fields: BTreeSet<FieldName>,
    /// Audit-run provenance
    pub metadata: ReportMetadata,
}

impl ValidationReport {
    /// Total number of disputed findings across all three lists.
    #[inline]
    #[must_use]
    pub fn finding_count(&self) -> usize {
        self.hallucinations.len() + self.missing_data.len() + self.negation_errors.len()
    }

    /// All fields referenced by any finding list, deduplicated.
    #[must_use = "returns the fields referenced by findings"]
    pub fn disputed_fields(&self) -> BTreeSet<FieldName> {
        self.hallucinations
            .iter()
            .map(|h| h.field)
            .chain(self.missing_data.iter().map(|m| m.field))
            .chain(self.negation_errors.iter().map(|n| n.field))
            .collect()
    }
}
