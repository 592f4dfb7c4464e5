//! Shared types for the medscribe extraction-audit pipeline.
//!
//! This crate defines the closed clinical field registry ([`FieldName`]),
//! the structured record those fields live on ([`PatientRecord`]), and the
//! error type shared by the confidence, audit, and review crates.
//!
//! The field registry is deliberately a closed enum rather than string-keyed
//! dynamic access: any field name arriving from an external model response
//! must parse into [`FieldName`], so "referenced fields exist in the schema"
//! is checked at the parsing boundary instead of deep inside the pipeline.

pub mod error;
pub mod record;

pub use error::{MedscribeError, Result};
pub use record::{FieldName, PatientRecord};
