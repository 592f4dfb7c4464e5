//! Confidence scoring and transcript usage matching for primary extractions.
//!
//! Both halves of this crate are pure, synchronous, CPU-only computations:
//! deterministic for identical inputs, no suspension points, safe on any
//! thread.
//!
//! - [`scorer`] turns a generative model's token log-probabilities into
//!   per-field trust scores and flags fields that need a second opinion.
//! - [`matcher`] aligns transcript tokens against extracted field values to
//!   show which source words were never used by the extraction.
//!
//! # Example
//!
//! ```
//! use medscribe_confidence::scorer::{calculate_field_confidence, ConfidenceTier};
//!
//! let confidence = calculate_field_confidence(&[-0.05, -0.10, -0.02], 0.5);
//! assert!(confidence.value > 0.9);
//! assert_eq!(ConfidenceTier::from_value(confidence.value), ConfidenceTier::Good);
//! ```

pub mod matcher;
pub mod scorer;

pub use matcher::{match_transcript, TextSegment, TranscriptMatch, UsageStats, WordMatch};
pub use scorer::{
    calculate_field_confidence, is_low_confidence, score_extraction, score_record,
    ConfidenceTier, ExtractionScores, FieldConfidence, DEFAULT_FALLBACK_CONFIDENCE,
    LOW_CONFIDENCE_THRESHOLD,
};
