//! Field confidence scoring from token log-probabilities.
//!
//! The primary extraction model reports a natural-log probability for each
//! generated token (always <= 0). `exp` of each gives a per-token probability
//! in (0, 1]; the arithmetic mean of those is the field's confidence. The
//! math is numerically stable for realistic inputs and `exp(-inf) == 0.0`
//! needs no special-casing.

use medscribe_core::{record::is_blank, FieldName, PatientRecord};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Confidence assigned when no log-probabilities are available.
///
/// A missing score means "confidence unknown", not "confidence zero".
pub const DEFAULT_FALLBACK_CONFIDENCE: f64 = 0.5;

/// Fields scoring strictly below this are queued for secondary audit.
///
/// The boundary value itself is not low-confidence. Calibrated against the
/// coarse whole-response attribution in [`score_record`]; re-derive before
/// changing either.
pub const LOW_CONFIDENCE_THRESHOLD: f64 = 0.20;

/// Derived confidence for one extracted field.
///
/// Invariants: `value` lies in [0, 1] and equals the arithmetic mean of
/// `token_confidences`; `token_confidences[i] == exp(source_logprobs[i])`.
/// Computed once per extraction pass and immutable afterward.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldConfidence {
    /// Aggregate confidence (0.0-1.0)
    pub value: f64,
    /// Per-token probabilities, same length and order as the inputs
    pub token_confidences: Vec<f64>,
    /// Raw log-probabilities, preserved for audit and debugging
    pub source_logprobs: Vec<f64>,
}

/// Severity tier for presenting a confidence value.
///
/// Fixed breakpoints, used purely for UI classification; nothing in the
/// pipeline branches on the tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceTier {
    /// >= 0.8
    Good,
    /// [0.5, 0.8)
    Caution,
    /// [0.2, 0.5)
    Warning,
    /// < 0.2
    Critical,
}

impl ConfidenceTier {
    /// Classify a confidence value into its presentation tier.
    #[inline]
    #[must_use = "returns the presentation tier for a confidence value"]
    pub fn from_value(value: f64) -> Self {
        if value >= 0.8 {
            Self::Good
        } else if value >= 0.5 {
            Self::Caution
        } else if value >= 0.2 {
            Self::Warning
        } else {
            Self::Critical
        }
    }
}

impl std::fmt::Display for ConfidenceTier {
    #[inline]
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Good => write!(f, "good"),
            Self::Caution => write!(f, "caution"),
            Self::Warning => write!(f, "warning"),
            Self::Critical => write!(f, "critical"),
        }
    }
}

impl std::str::FromStr for ConfidenceTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "good" => Ok(Self::Good),
            "caution" => Ok(Self::Caution),
            "warning" => Ok(Self::Warning),
            "critical" => Ok(Self::Critical),
            _ => Err(format!(
                "unknown confidence tier: '{s}' (expected: good, caution, warning, critical)"
            )),
        }
    }
}

/// Scores for one extraction pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractionScores {
    /// Per-field confidence, keyed by schema field
    pub scores: BTreeMap<FieldName, FieldConfidence>,
    /// Fields whose confidence is strictly below [`LOW_CONFIDENCE_THRESHOLD`]
    pub low_confidence: BTreeSet<FieldName>,
    /// Overall confidence of the full response token stream
    pub overall: f64,
}

impl ExtractionScores {
    /// Scores representing "confidence unknown": empty maps, overall 0.5.
    ///
    /// Returned when the extraction JSON is malformed or no log-probabilities
    /// were provided. Callers must treat this as unknown, not as zero.
    #[must_use = "returns the declared-unknown score set"]
    pub fn unknown() -> Self {
        Self {
            scores: BTreeMap::new(),
            low_confidence: BTreeSet::new(),
            overall: DEFAULT_FALLBACK_CONFIDENCE,
        }
    }
}

/// Whether a confidence value belongs in the low-confidence set.
///
/// Strict comparison: the threshold value itself is not low-confidence.
#[inline]
#[must_use]
pub fn is_low_confidence(value: f64) -> bool {
    value < LOW_CONFIDENCE_THRESHOLD
}

/// Compute a field's confidence from its token log-probabilities.
///
/// Empty input yields `value == fallback` with empty derived sequences.
/// That is a declared uncertainty default, not an error.
#[must_use = "returns the computed field confidence"]
pub fn calculate_field_confidence(logprobs: &[f64], fallback: f64) -> FieldConfidence {
    if logprobs.is_empty() {
        return FieldConfidence {
            value: fallback,
            token_confidences: Vec::new(),
            source_logprobs: Vec::new(),
        };
    }

    let token_confidences: Vec<f64> = logprobs.iter().map(|lp| lp.exp()).collect();
    let value = token_confidences.iter().sum::<f64>() / token_confidences.len() as f64;

    FieldConfidence {
        value,
        token_confidences,
        source_logprobs: logprobs.to_vec(),
    }
}

/// Score every non-empty field of a parsed record from the response's full
/// token stream.
///
/// The same overall confidence is assigned to every non-empty field: the
/// pipeline does not yet attribute tokens to individual fields. This is a
/// known, named simplification; the low-confidence threshold is calibrated
/// against it.
///
/// `logprobs == None` (the log-probability source returned nothing) yields
/// [`ExtractionScores::unknown`].
#[must_use = "returns the extraction score set"]
pub fn score_record(record: &PatientRecord, logprobs: Option<&[f64]>) -> ExtractionScores {
    let Some(logprobs) = logprobs else {
        tracing::debug!("no log-probabilities present, scores unknown");
        return ExtractionScores::unknown();
    };
    if logprobs.is_empty() {
        tracing::debug!("empty log-probability stream, scores unknown");
        return ExtractionScores::unknown();
    }

    let overall_confidence = calculate_field_confidence(logprobs, DEFAULT_FALLBACK_CONFIDENCE);
    let overall = overall_confidence.value;

    let mut scores = BTreeMap::new();
    let mut low_confidence = BTreeSet::new();

    for (field, value) in record.fields() {
        if is_blank(value) {
            continue;
        }
        if is_low_confidence(overall) {
            low_confidence.insert(field);
        }
        scores.insert(field, overall_confidence.clone());
    }

    tracing::debug!(
        overall,
        scored = scores.len(),
        flagged = low_confidence.len(),
        "scored extraction"
    );

    ExtractionScores {
        scores,
        low_confidence,
        overall,
    }
}

/// Score a raw extraction response.
///
/// Parses `raw_json` as a record and delegates to [`score_record`]. A
/// response that does not parse as the expected shape yields
/// [`ExtractionScores::unknown`] rather than an error.
#[must_use = "returns the extraction score set"]
pub fn score_extraction(raw_json: &str, logprobs: Option<&[f64]>) -> ExtractionScores {
    match serde_json::from_str::<PatientRecord>(raw_json) {
        Ok(record) => score_record(&record, logprobs),
        Err(e) => {
            tracing::warn!(error = %e, "extraction JSON unparseable, scores unknown");
            ExtractionScores::unknown()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn record_with(field: FieldName, value: &str) -> PatientRecord {
        let mut record = PatientRecord::default();
        record.set(field, value.to_string());
        record
    }

    #[test]
    fn test_confidence_is_mean_of_exp() {
        let logprobs = [-0.5, -1.0, -0.25];
        let confidence = calculate_field_confidence(&logprobs, 0.5);

        let expected: f64 = logprobs.iter().map(|lp| lp.exp()).sum::<f64>() / 3.0;
        assert!((confidence.value - expected).abs() < 1e-12);
        assert!(confidence.value > 0.0 && confidence.value <= 1.0);
        assert_eq!(confidence.token_confidences.len(), 3);
        assert_eq!(confidence.source_logprobs, logprobs.to_vec());
    }

    #[test]
    fn test_empty_logprobs_yield_fallback() {
        let confidence = calculate_field_confidence(&[], 0.5);
        assert_eq!(confidence.value, 0.5);
        assert!(confidence.token_confidences.is_empty());
        assert!(confidence.source_logprobs.is_empty());

        let confidence = calculate_field_confidence(&[], 0.7);
        assert_eq!(confidence.value, 0.7);
    }

    #[test]
    fn test_neg_infinity_logprob() {
        let confidence = calculate_field_confidence(&[f64::NEG_INFINITY, 0.0], 0.5);
        // exp(-inf) == 0, exp(0) == 1
        assert!((confidence.value - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_high_confidence_scenario() {
        // Scenario: [-0.05, -0.10, -0.02] -> ~0.945, tier "good"
        let confidence = calculate_field_confidence(&[-0.05, -0.10, -0.02], 0.5);
        assert!((confidence.value - 0.945).abs() < 0.001);
        assert_eq!(ConfidenceTier::from_value(confidence.value), ConfidenceTier::Good);
    }

    #[test]
    fn test_low_confidence_scenario() {
        // Scenario: [-2.0, -1.8] -> ~0.150, tier "critical", flagged
        let confidence = calculate_field_confidence(&[-2.0, -1.8], 0.5);
        assert!((confidence.value - 0.150).abs() < 0.001);
        assert_eq!(
            ConfidenceTier::from_value(confidence.value),
            ConfidenceTier::Critical
        );

        let record = record_with(FieldName::Diagnosis, "K02.1");
        let scores = score_record(&record, Some(&[-2.0, -1.8]));
        assert!(scores.low_confidence.contains(&FieldName::Diagnosis));
    }

    #[test]
    fn test_tier_breakpoints() {
        assert_eq!(ConfidenceTier::from_value(0.8), ConfidenceTier::Good);
        assert_eq!(ConfidenceTier::from_value(0.79), ConfidenceTier::Caution);
        assert_eq!(ConfidenceTier::from_value(0.5), ConfidenceTier::Caution);
        assert_eq!(ConfidenceTier::from_value(0.49), ConfidenceTier::Warning);
        assert_eq!(ConfidenceTier::from_value(0.2), ConfidenceTier::Warning);
        assert_eq!(ConfidenceTier::from_value(0.19), ConfidenceTier::Critical);
        assert_eq!(ConfidenceTier::from_value(0.0), ConfidenceTier::Critical);
    }

    #[test]
    fn test_tier_roundtrip() {
        for tier in [
            ConfidenceTier::Good,
            ConfidenceTier::Caution,
            ConfidenceTier::Warning,
            ConfidenceTier::Critical,
        ] {
            let s = tier.to_string();
            assert_eq!(ConfidenceTier::from_str(&s).unwrap(), tier);
        }
        assert!(ConfidenceTier::from_str("excellent").is_err());
    }

    #[test]
    fn test_threshold_boundary_not_low_confidence() {
        // 0.20 exactly is not low-confidence (strict comparison)
        assert!(!is_low_confidence(0.20));
        assert!(is_low_confidence(0.199_999));
        assert!(!is_low_confidence(0.200_001));

        let record = record_with(FieldName::Notes, "controlled");
        let scores = score_record(&record, Some(&[(0.25f64).ln()]));
        assert!(scores.low_confidence.is_empty());
        assert_eq!(scores.scores.len(), 1);
    }

    #[test]
    fn test_score_record_assigns_same_value_to_all_fields() {
        let record = PatientRecord {
            first_name: "Jan".to_string(),
            last_name: "Novak".to_string(),
            diagnosis: "K02.1".to_string(),
            ..Default::default()
        };
        let scores = score_record(&record, Some(&[-0.1, -0.2]));

        assert_eq!(scores.scores.len(), 3);
        let values: BTreeSet<String> = scores
            .scores
            .values()
            .map(|c| format!("{:.12}", c.value))
            .collect();
        assert_eq!(values.len(), 1, "all fields share the overall confidence");
        assert!(scores.scores.contains_key(&FieldName::Diagnosis));
        assert!(!scores.scores.contains_key(&FieldName::Allergies));
    }

    #[test]
    fn test_score_record_skips_whitespace_fields() {
        let record = record_with(FieldName::Notes, "   ");
        let scores = score_record(&record, Some(&[-0.1]));
        assert!(scores.scores.is_empty());
    }

    #[test]
    fn test_missing_logprobs_are_unknown() {
        let record = record_with(FieldName::Diagnosis, "K02.1");

        let scores = score_record(&record, None);
        assert!(scores.scores.is_empty());
        assert!(scores.low_confidence.is_empty());
        assert_eq!(scores.overall, 0.5);

        let scores = score_record(&record, Some(&[]));
        assert_eq!(scores.overall, 0.5);
        assert!(scores.scores.is_empty());
    }

    #[test]
    fn test_score_extraction_malformed_json_is_unknown() {
        let scores = score_extraction("not json at all", Some(&[-0.1]));
        assert!(scores.scores.is_empty());
        assert!(scores.low_confidence.is_empty());
        assert_eq!(scores.overall, 0.5);
    }

    #[test]
    fn test_score_extraction_happy_path() {
        let raw = r#"{"diagnosis": "K02.1", "isSmoker": "no"}"#;
        let scores = score_extraction(raw, Some(&[-0.05, -0.10, -0.02]));
        assert_eq!(scores.scores.len(), 2);
        assert!((scores.overall - 0.945).abs() < 0.001);
        assert!(scores.low_confidence.is_empty());
    }
}
