//! Second-model auditing of primary clinical extractions.
//!
//! A primary model turns a dictated transcript into a structured record; this
//! crate asks a second, independently-configured model to check that work,
//! at two granularities:
//!
//! - [`FieldAuditor`] checks one named field at a time and always produces a
//!   [`Correction`] — transport or parse failures degrade to a no-op
//!   correction whose reason names the failure, so low confidence in the
//!   auditor itself propagates instead of crashing the flow.
//! - [`ExtractionAuditor`] reviews the whole record in a single adversarial
//!   pass and produces a [`ValidationReport`] listing hallucinations,
//!   omissions, negation errors, and positively confirmed fields. Here a
//!   malformed response is a hard error: a record-level audit has no safe
//!   partial result.
//!
//! The model transport is behind the [`ModelClient`] trait so tests run
//! against fakes; [`ChatClient`] is the production OpenAI-compatible
//! implementation. Clients are constructed explicitly and passed in — there
//! is no shared module-level client.
//!
//! # Example
//!
//! ```no_run
//! use medscribe_audit::{AuditConfig, ChatClient, FieldAuditor};
//! use medscribe_core::{FieldName, PatientRecord};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let client = ChatClient::from_env()?;
//! let auditor = FieldAuditor::new(client, AuditConfig::default());
//!
//! let record = PatientRecord::default();
//! let correction = auditor
//!     .audit_field(FieldName::IsSmoker, "yes", "Pacient nekouří.", Some(&record))
//!     .await;
//!
//! if !correction.is_noop() {
//!     println!("auditor suggests: {}", correction.suggested);
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod correction;
pub mod extraction_auditor;
pub mod field_auditor;
pub mod report;
pub mod response;

pub use client::{ChatClient, ModelClient};
pub use config::AuditConfig;
pub use correction::Correction;
pub use extraction_auditor::ExtractionAuditor;
pub use field_auditor::FieldAuditor;
pub use report::{
    FindingSeverity, Hallucination, MissingData, NegationError, ReportMetadata, ValidationReport,
};
pub use response::{extract_json_block, strip_code_fences};
