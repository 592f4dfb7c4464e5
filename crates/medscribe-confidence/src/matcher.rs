//! Transcript usage matching.
//!
//! Aligns the source transcript against the extracted field values and marks
//! each transcript token as used or unused. Matching is a case-insensitive
//! substring check against the concatenation of all non-empty field values.
//! This is deliberately coarse: short tokens can match inside longer ones
//! (a lone "1" matches inside "12"). Known source of false positives, kept
//! for compatibility; do not tighten without a behavior change upstream.

use medscribe_core::{record::is_blank, FieldName, PatientRecord};
use serde::{Deserialize, Serialize};

/// Punctuation stripped from token edges before matching.
///
/// The original token text keeps its punctuation for display.
const STRIP_PUNCTUATION: &[char] = &[
    '.', ',', '!', '?', ';', ':', '"', '\'', '(', ')', '[', ']', '„', '“', '”',
];

/// One transcript token and its usage classification.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordMatch {
    /// Original token text, punctuation intact
    pub word: String,
    /// Whether any extracted field contains this token
    pub used: bool,
    /// First field (in enumeration order) that contains the token, if used
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<FieldName>,
}

/// Maximal run of consecutive tokens sharing the same usage classification.
///
/// Purely a display compaction; segmentation never changes which words
/// count as used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextSegment {
    /// Tokens of the run joined with single spaces
    pub text: String,
    /// Usage classification shared by the run
    pub used: bool,
    /// Field attribution shared by the run
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<FieldName>,
}

/// Aggregate usage counts for one transcript.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct UsageStats {
    /// Tokens found in some extracted field
    pub used: usize,
    /// Tokens found in no extracted field
    pub unused: usize,
    /// `100 * used / total`, or 0 when the transcript has no tokens
    pub percentage: f64,
}

/// Full matching result for one transcript against one record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TranscriptMatch {
    /// Per-token classification, in transcript order
    pub words: Vec<WordMatch>,
    /// Display segments; concatenating their tokens reproduces the
    /// transcript's token sequence exactly
    pub segments: Vec<TextSegment>,
    /// Aggregate usage statistic
    pub usage: UsageStats,
}

/// Normalize a token for matching: strip edge punctuation, lowercase.
fn normalize(token: &str) -> String {
    token.trim_matches(STRIP_PUNCTUATION).to_lowercase()
}

/// Match a transcript against a record's extracted values.
///
/// Total function: never fails. A record with no non-empty string fields
/// yields 0% usage, which is a valid, meaningful result.
#[must_use = "returns the transcript match result"]
pub fn match_transcript(transcript: &str, record: &PatientRecord) -> TranscriptMatch {
    // Haystack per the matching rule: all non-empty values joined with spaces
    let haystack = record
        .non_empty_fields()
        .map(|(_, v)| v.to_lowercase())
        .collect::<Vec<_>>()
        .join(" ");

    let lowered_fields: Vec<(FieldName, String)> = record
        .non_empty_fields()
        .map(|(f, v)| (f, v.to_lowercase()))
        .collect();

    let mut words = Vec::new();
    for token in transcript.split_whitespace() {
        let normalized = normalize(token);
        // A token that is nothing but punctuation matches everything as an
        // empty substring; treat it as unused instead.
        let used = !normalized.is_empty() && haystack.contains(&normalized);
        let field = if used {
            lowered_fields
                .iter()
                .find(|(_, v)| v.contains(&normalized))
                .map(|(f, _)| *f)
        } else {
            None
        };
        words.push(WordMatch {
            word: token.to_string(),
            used,
            field,
        });
    }

    let segments = segment(&words);
    let used = words.iter().filter(|w| w.used).count();
    let unused = words.len() - used;
    let percentage = if words.is_empty() {
        0.0
    } else {
        used as f64 / words.len() as f64 * 100.0
    };

    TranscriptMatch {
        words,
        segments,
        usage: UsageStats {
            used,
            unused,
            percentage,
        },
    }
}

/// Group consecutive word matches with identical `(used, field)` into
/// printable segments.
fn segment(words: &[WordMatch]) -> Vec<TextSegment> {
    let mut segments: Vec<TextSegment> = Vec::new();
    for word in words {
        match segments.last_mut() {
            Some(last) if last.used == word.used && last.field == word.field => {
                last.text.push(' ');
                last.text.push_str(&word.word);
            }
            _ => segments.push(TextSegment {
                text: word.word.clone(),
                used: word.used,
                field: word.field,
            }),
        }
    }
    segments
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> PatientRecord {
        PatientRecord {
            first_name: "Jan".to_string(),
            last_name: "Novák".to_string(),
            diagnosis: "zubní kaz K02.1".to_string(),
            allergies: "bez alergií".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_basic_matching() {
        let result = match_transcript("Pacient Jan Novák, zubní kaz.", &record());

        assert_eq!(result.words.len(), 5);
        assert!(!result.words[0].used); // "Pacient"
        assert!(result.words[1].used); // "Jan"
        assert!(result.words[2].used); // "Novák," strips comma
        assert!(result.words[3].used); // "zubní"
        assert!(result.words[4].used); // "kaz." strips period
        assert_eq!(result.words[1].field, Some(FieldName::FirstName));
        assert_eq!(result.words[2].field, Some(FieldName::LastName));
        assert_eq!(result.words[3].field, Some(FieldName::Diagnosis));
    }

    #[test]
    fn test_original_token_text_preserved() {
        let result = match_transcript("Novák,", &record());
        assert_eq!(result.words[0].word, "Novák,");
    }

    #[test]
    fn test_first_field_attribution_order() {
        // "Jan" appears in both firstName and a later field; the first
        // field in enumeration order wins
        let mut rec = record();
        rec.notes = "Jan".to_string();
        let result = match_transcript("Jan", &rec);
        assert_eq!(result.words[0].field, Some(FieldName::FirstName));
    }

    #[test]
    fn test_substring_false_positive_preserved() {
        // Coarse substring matching: "1" matches inside "12"
        let rec = PatientRecord {
            insurance_company: "12".to_string(),
            ..Default::default()
        };
        let result = match_transcript("1", &rec);
        assert!(result.words[0].used);
    }

    #[test]
    fn test_segments_reconstruct_token_sequence() {
        let transcript = "Pacient Jan Novák přišel na kontrolu, zubní kaz bez alergií.";
        let result = match_transcript(transcript, &record());

        let rebuilt = result
            .segments
            .iter()
            .map(|s| s.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        let expected = transcript.split_whitespace().collect::<Vec<_>>().join(" ");
        assert_eq!(rebuilt, expected);
    }

    #[test]
    fn test_segments_group_same_classification() {
        let result = match_transcript("zubní kaz", &record());
        assert_eq!(result.segments.len(), 1);
        assert_eq!(result.segments[0].text, "zubní kaz");
        assert!(result.segments[0].used);
        assert_eq!(result.segments[0].field, Some(FieldName::Diagnosis));
    }

    #[test]
    fn test_usage_counts_total() {
        let transcript = "Pacient Jan Novák nekouří";
        let result = match_transcript(transcript, &record());
        let total = transcript.split_whitespace().count();
        assert_eq!(result.usage.used + result.usage.unused, total);
        let expected = result.usage.used as f64 / total as f64 * 100.0;
        assert!((result.usage.percentage - expected).abs() < 1e-12);
    }

    #[test]
    fn test_empty_transcript() {
        let result = match_transcript("", &record());
        assert!(result.words.is_empty());
        assert!(result.segments.is_empty());
        assert_eq!(result.usage.used, 0);
        assert_eq!(result.usage.unused, 0);
        assert_eq!(result.usage.percentage, 0.0);
    }

    #[test]
    fn test_empty_record_yields_zero_usage() {
        let result = match_transcript("Pacient přišel na kontrolu", &PatientRecord::default());
        assert_eq!(result.usage.used, 0);
        assert_eq!(result.usage.percentage, 0.0);
        assert!(result.words.iter().all(|w| !w.used));
    }

    #[test]
    fn test_punctuation_only_token_is_unused() {
        let rec = PatientRecord {
            notes: "anything".to_string(),
            ..Default::default()
        };
        let result = match_transcript("slovo ...", &rec);
        assert!(!result.words[1].used, "bare punctuation must not match");
    }

    #[test]
    fn test_case_insensitive_matching() {
        let result = match_transcript("JAN novák", &record());
        assert!(result.words[0].used);
        assert!(result.words[1].used);
    }
}
