//! Per-field adversarial audit against the source transcript.

use crate::client::ModelClient;
use crate::config::AuditConfig;
use crate::correction::Correction;
use crate::response::extract_json_block;
use medscribe_core::{FieldName, PatientRecord};
use serde::Deserialize;

/// Audits individual extracted fields with a second model.
///
/// Every entry point returns a [`Correction`] — never an error. A transport
/// failure or an unparseable response degrades to a no-op correction whose
/// reason names the failure class; the caller is never blocked by a bad
/// response, and the auditor's low confidence propagates as signal.
#[derive(Debug, Clone)]
pub struct FieldAuditor<C: ModelClient> {
    client: C,
    config: AuditConfig,
}

/// Shape the auditing model is asked to return.
#[derive(Debug, Clone, Deserialize)]
struct RawCorrection {
    #[serde(default)]
    is_correct: bool,
    #[serde(default)]
    suggested_value: Option<String>,
    #[serde(default)]
    reason: Option<String>,
    #[serde(default)]
    confidence: Option<f64>,
}

impl<C: ModelClient> FieldAuditor<C> {
    /// Create an auditor over an explicitly constructed client.
    #[inline]
    #[must_use = "this function returns an auditor that should be used"]
    pub fn new(client: C, config: AuditConfig) -> Self {
        Self { client, config }
    }

    /// Audit one field against the transcript.
    ///
    /// `context` optionally supplies the sibling fields, dumped as JSON into
    /// the prompt so the model can resolve cross-field ambiguity.
    pub async fn audit_field(
        &self,
        field: FieldName,
        value: &str,
        transcript: &str,
        context: Option<&PatientRecord>,
    ) -> Correction {
        let prompt = build_field_prompt(field, value, transcript, context);

        let raw = match self.client.generate(&prompt, &self.config.model).await {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(field = %field, error = %e, "field audit model call failed");
                return Correction::degraded(value, format!("model unavailable: {e}"));
            }
        };

        match parse_field_response(&raw, value) {
            Some(correction) => {
                tracing::debug!(
                    field = %field,
                    noop = correction.is_noop(),
                    confidence = correction.confidence,
                    "field audit complete"
                );
                correction
            }
            None => {
                tracing::warn!(field = %field, "field audit response unparseable");
                Correction::degraded(value, "auditor returned an unparseable response")
            }
        }
    }

    /// Audit a batch of fields, strictly sequentially.
    ///
    /// Calls are spaced by the configured inter-call delay to stay inside the
    /// downstream model's rate limit; concurrency across fields is
    /// deliberately disallowed. Aborting a batch mid-flight means dropping
    /// the future; an already-issued call runs to completion.
    pub async fn audit_fields(
        &self,
        fields: &[FieldName],
        record: &PatientRecord,
        transcript: &str,
    ) -> Vec<(FieldName, Correction)> {
        let mut results = Vec::with_capacity(fields.len());
        for (i, &field) in fields.iter().enumerate() {
            if i > 0 {
                tokio::time::sleep(self.config.field_delay()).await;
            }
            let correction = self
                .audit_field(field, record.get(field), transcript, Some(record))
                .await;
            results.push((field, correction));
        }
        results
    }
}

/// Build the prompt for one field audit.
fn build_field_prompt(
    field: FieldName,
    value: &str,
    transcript: &str,
    context: Option<&PatientRecord>,
) -> String {
    let context_section = context
        .and_then(|record| serde_json::to_string_pretty(record).ok())
        .map_or_else(String::new, |json| {
            format!("\nOTHER EXTRACTED FIELDS (context only, do not audit these):\n{json}\n")
        });

    format!(
        r#"A primary model extracted one field from a dictated clinical note. Check it.

TRANSCRIPT:
{transcript}

FIELD: {field}
This field holds {description}.
CURRENT VALUE: {value}
{context_section}
Rules:
- Be conservative. Prefer confirming the current value over inventing a correction.
- Respect structured formats: national birth numbers keep their NNNNNN/NNN(N) shape,
  composite index notations in diagnoses stay as dictated.
- Never introduce information that is not present in the transcript.
- If the transcript does not mention this field at all, confirm the current value.

Return JSON ONLY:
{{
  "is_correct": true|false,
  "suggested_value": "corrected value, or the current value if correct",
  "reason": "short justification grounded in the transcript",
  "confidence": 0.0-1.0
}}"#,
        description = field.description(),
    )
}

/// Parse a raw field-audit response into a correction.
///
/// Pulls the first balanced JSON block out of the reply (models wrap JSON in
/// prose and code fences), then applies the response contract. Returns `None`
/// when no usable block exists.
fn parse_field_response(raw: &str, original: &str) -> Option<Correction> {
    let block = extract_json_block(raw)?;
    let parsed: RawCorrection = serde_json::from_str(block).ok()?;

    let confidence = parsed.confidence.unwrap_or(0.5);
    let reason = match parsed.reason {
        Some(r) if !r.trim().is_empty() => r,
        _ => "auditor gave no justification".to_string(),
    };

    if parsed.is_correct {
        return Some(Correction::confirmed(original, reason, confidence));
    }

    match parsed.suggested_value {
        Some(suggested) if !suggested.trim().is_empty() => {
            Some(Correction::suggesting(original, suggested, reason, confidence))
        }
        // Disputed but no replacement offered: treat as confirmation, the
        // reason still carries the auditor's doubt
        _ => Some(Correction::confirmed(original, reason, confidence)),
    }
}
