//! Whole-record adversarial audit.

use crate::client::ModelClient;
use crate::config::AuditConfig;
use crate::report::{
    FindingSeverity, Hallucination, MissingData, NegationError, ReportMetadata, ValidationReport,
};
use crate::response::strip_code_fences;
use chrono::Utc;
use medscribe_core::{FieldName, MedscribeError, PatientRecord, Result};
use serde::Deserialize;
use std::collections::BTreeSet;
use std::str::FromStr;

/// Audits a complete extraction in one adversarial pass.
///
/// Unlike the field auditor there is no graceful degradation here: a
/// whole-record audit has no safe partial result, so an unusable model
/// response is surfaced as an error and blocks the report.
#[derive(Debug, Clone)]
pub struct ExtractionAuditor<C: ModelClient> {
    client: C,
    config: AuditConfig,
}

/// Wire shape of the validator's response, field names still unchecked.
#[derive(Debug, Clone, Deserialize)]
struct RawReport {
    is_valid: bool,
    confidence: f64,
    #[serde(default)]
    agreement_percentage: f64,
    #[serde(default)]
    overall_assessment: String,
    #[serde(default)]
    hallucinations: Vec<RawHallucination>,
    #[serde(default)]
    missing_data: Vec<RawMissingData>,
    #[serde(default)]
    negation_errors: Vec<RawNegationError>,
    #[serde(default)]
    correct_fields: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct RawHallucination {
    field: String,
    #[serde(default)]
    primary_value: String,
    #[serde(default)]
    expected_value: String,
    #[serde(default)]
    reason: String,
    severity: String,
    #[serde(default)]
    transcript_quote: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct RawMissingData {
    field: String,
    #[serde(default)]
    transcript_evidence: String,
    #[serde(default)]
    primary_value: String,
    #[serde(default)]
    reason: String,
}

#[derive(Debug, Clone, Deserialize)]
struct RawNegationError {
    field: String,
    #[serde(default)]
    transcript_says: String,
    #[serde(default)]
    primary_extracted: String,
    #[serde(default)]
    correct_value: String,
    #[serde(default)]
    reason: String,
}

impl<C: ModelClient> ExtractionAuditor<C> {
    /// Create an auditor over an explicitly constructed client.
    #[inline]
    #[must_use = "this function returns an auditor that should be used"]
    pub fn new(client: C, config: AuditConfig) -> Self {
        Self { client, config }
    }

    /// Run one whole-record audit.
    ///
    /// `primary_model` identifies which model produced the extraction; it is
    /// recorded in the report metadata together with the validator model and
    /// the UTC timestamp of this run.
    ///
    /// # Errors
    /// - [`MedscribeError::Model`] when the model-call collaborator fails.
    /// - [`MedscribeError::AuditParse`] when the response is not a usable
    ///   report.
    /// - [`MedscribeError::UnknownField`] when any finding references a field
    ///   outside the record schema.
    pub async fn validate(
        &self,
        transcript: &str,
        record: &PatientRecord,
        primary_model: &str,
    ) -> Result<ValidationReport> {
        let prompt = build_record_prompt(transcript, record, primary_model)?;

        let raw = self
            .client
            .generate(&prompt, &self.config.validator_model)
            .await
            .map_err(|e| MedscribeError::Model(e.to_string()))?;

        let metadata = ReportMetadata {
            validator_model: self.config.validator_model.clone(),
            validated_at: Utc::now(),
            primary_model: primary_model.to_string(),
        };

        let report = parse_record_response(&raw, metadata)?;

        tracing::info!(
            is_valid = report.is_valid,
            agreement = report.agreement_percentage,
            findings = report.finding_count(),
            "record audit complete"
        );

        Ok(report)
    }
}

/// Build the adversarial whole-record prompt.
fn build_record_prompt(
    transcript: &str,
    record: &PatientRecord,
    primary_model: &str,
) -> Result<String> {
    let record_json = serde_json::to_string_pretty(record)?;

    Ok(format!(
        r#"You are an adversarial reviewer. Another model ({primary_model}) extracted a
structured clinical record from a dictated transcript. Your job is to find its
mistakes, and to explicitly confirm what it got right.

TRANSCRIPT:
{transcript}

EXTRACTED RECORD:
{record_json}

Look for exactly three failure classes:

1. **Hallucination**: a field holds a value the transcript does not support or
   outright contradicts.
2. **Omission**: the transcript clearly states something but the extraction
   left the field blank or generic.
3. **Negation error**: the extraction asserts the logical opposite of the
   transcript (e.g. transcript says the patient does not smoke, extraction
   says "yes").

Also list every field you positively confirm as correct, not only the fields
you dispute. Use only these field names: {field_names}.

Return JSON ONLY:
{{
  "is_valid": true|false,
  "confidence": 0.0-1.0,
  "agreement_percentage": 0-100,
  "overall_assessment": "one or two sentences",
  "hallucinations": [
    {{"field": "...", "primary_value": "...", "expected_value": "...",
      "reason": "...", "severity": "high|medium|low", "transcript_quote": "..."}}
  ],
  "missing_data": [
    {{"field": "...", "transcript_evidence": "...", "primary_value": "...", "reason": "..."}}
  ],
  "negation_errors": [
    {{"field": "...", "transcript_says": "...", "primary_extracted": "...",
      "correct_value": "...", "reason": "..."}}
  ],
  "correct_fields": ["..."]
}}"#,
        field_names = FieldName::ALL
            .iter()
            .map(|f| f.wire_name())
            .collect::<Vec<_>>()
            .join(", "),
    ))
}

/// Parse a field name arriving from the validator, surfacing orphans.
fn parse_field(name: &str) -> Result<FieldName> {
    FieldName::from_str(name).map_err(|_| MedscribeError::UnknownField(name.to_string()))
}

/// Parse the raw validator response into a typed report.
fn parse_record_response(raw: &str, metadata: ReportMetadata) -> Result<ValidationReport> {
    let stripped = strip_code_fences(raw);
    let parsed: RawReport = serde_json::from_str(stripped)
        .map_err(|e| MedscribeError::AuditParse(format!("validator response was not JSON: {e}")))?;

    if !(0.0..=1.0).contains(&parsed.confidence) {
        return Err(MedscribeError::AuditParse(format!(
            "confidence {} out of range 0.0-1.0",
            parsed.confidence
        )));
    }
    if !(0.0..=100.0).contains(&parsed.agreement_percentage) {
        return Err(MedscribeError::AuditParse(format!(
            "agreement_percentage {} out of range 0-100",
            parsed.agreement_percentage
        )));
    }

    let hallucinations = parsed
        .hallucinations
        .into_iter()
        .map(|h| {
            Ok(Hallucination {
                field: parse_field(&h.field)?,
                primary_value: h.primary_value,
                expected_value: h.expected_value,
                reason: h.reason,
                severity: FindingSeverity::from_str(&h.severity)
                    .map_err(MedscribeError::AuditParse)?,
                transcript_quote: h.transcript_quote,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let missing_data = parsed
        .missing_data
        .into_iter()
        .map(|m| {
            Ok(MissingData {
                field: parse_field(&m.field)?,
                transcript_evidence: m.transcript_evidence,
                primary_value: m.primary_value,
                reason: m.reason,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let negation_errors = parsed
        .negation_errors
        .into_iter()
        .map(|n| {
            Ok(NegationError {
                field: parse_field(&n.field)?,
                transcript_says: n.transcript_says,
                primary_extracted: n.primary_extracted,
                correct_value: n.correct_value,
                reason: n.reason,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let correct_fields = parsed
        .correct_fields
        .iter()
        .map(|name| parse_field(name))
        .collect::<Result<BTreeSet<_>>>()?;

    Ok(ValidationReport {
        is_valid: parsed.is_valid,
        confidence: parsed.confidence,
        agreement_percentage: parsed.agreement_percentage,
        overall_assessment: parsed.overall_assessment,
        hallucinations,
        missing_data,
        negation_errors,
        correct_fields,
        metadata,
    })
}
