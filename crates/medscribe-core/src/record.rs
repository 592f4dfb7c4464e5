//! Clinical record schema: the closed field registry and the record struct.

use serde::{Deserialize, Serialize};

/// Closed registry of clinical record fields.
///
/// Every field a primary extraction can produce, a confidence score can be
/// assigned to, or an audit finding can reference. External inputs (model
/// responses, review requests) must parse into this enum via [`std::str::FromStr`],
/// which is where orphan field references are rejected.
///
/// The variant order is the fixed enumeration order used for transcript-match
/// attribution and for sibling-context dumps in audit prompts.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub enum FieldName {
    /// Patient given name
    FirstName,
    /// Patient family name
    LastName,
    /// National identification (birth) number
    BirthNumber,
    /// Health insurance company code
    InsuranceCompany,
    /// Primary diagnosis
    Diagnosis,
    /// Current medications
    Medications,
    /// Known allergies
    Allergies,
    /// Smoking status
    IsSmoker,
    /// Alcohol consumption
    AlcoholUse,
    /// Medical history narrative
    Anamnesis,
    /// Blood pressure reading
    BloodPressure,
    /// Free-text clinical notes
    Notes,
}

impl FieldName {
    /// All fields in the fixed enumeration order.
    pub const ALL: [Self; 12] = [
        Self::FirstName,
        Self::LastName,
        Self::BirthNumber,
        Self::InsuranceCompany,
        Self::Diagnosis,
        Self::Medications,
        Self::Allergies,
        Self::IsSmoker,
        Self::AlcoholUse,
        Self::Anamnesis,
        Self::BloodPressure,
        Self::Notes,
    ];

    /// Wire name used in extraction JSON and review requests.
    #[inline]
    #[must_use = "returns the field's wire name"]
    pub const fn wire_name(self) -> &'static str {
        match self {
            Self::FirstName => "firstName",
            Self::LastName => "lastName",
            Self::BirthNumber => "birthNumber",
            Self::InsuranceCompany => "insuranceCompany",
            Self::Diagnosis => "diagnosis",
            Self::Medications => "medications",
            Self::Allergies => "allergies",
            Self::IsSmoker => "isSmoker",
            Self::AlcoholUse => "alcoholUse",
            Self::Anamnesis => "anamnesis",
            Self::BloodPressure => "bloodPressure",
            Self::Notes => "notes",
        }
    }

    /// Human-readable description of what the field semantically holds.
    ///
    /// Used verbatim in audit prompts so the checking model knows what it is
    /// looking at. This is a static configuration artifact; fields without a
    /// richer description fall back to the wire name.
    #[must_use = "returns the field description used in audit prompts"]
    pub const fn description(self) -> &'static str {
        match self {
            Self::FirstName => "the patient's given name",
            Self::LastName => "the patient's family name",
            Self::BirthNumber => {
                "the patient's national birth number, format NNNNNN/NNN(N) (six digits, slash, three or four digits)"
            }
            Self::InsuranceCompany => "the numeric code of the patient's health insurance company",
            Self::Diagnosis => "the primary diagnosis stated in the transcript, including any composite index notation (e.g. tooth or segment indices)",
            Self::Medications => "medications the patient currently takes, as dictated",
            Self::Allergies => "known allergies, or an explicit statement that there are none",
            Self::IsSmoker => "whether the patient smokes (yes/no)",
            Self::AlcoholUse => "the patient's alcohol consumption as dictated",
            Self::Anamnesis => "the medical history narrative",
            Self::BloodPressure => "blood pressure reading, systolic/diastolic",
            Self::Notes => "notes",
        }
    }
}

impl std::fmt::Display for FieldName {
    #[inline]
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.wire_name())
    }
}

impl std::str::FromStr for FieldName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "firstname" => Ok(Self::FirstName),
            "lastname" => Ok(Self::LastName),
            "birthnumber" => Ok(Self::BirthNumber),
            "insurancecompany" => Ok(Self::InsuranceCompany),
            "diagnosis" => Ok(Self::Diagnosis),
            "medications" => Ok(Self::Medications),
            "allergies" => Ok(Self::Allergies),
            "issmoker" => Ok(Self::IsSmoker),
            "alcoholuse" => Ok(Self::AlcoholUse),
            "anamnesis" => Ok(Self::Anamnesis),
            "bloodpressure" => Ok(Self::BloodPressure),
            "notes" => Ok(Self::Notes),
            _ => Err(format!("unknown field name: '{s}'")),
        }
    }
}

/// One structured clinical record as produced by the primary extraction.
///
/// All fields are plain strings; an empty or all-whitespace value means the
/// extraction left the field blank.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PatientRecord {
    /// Patient given name
    pub first_name: String,
    /// Patient family name
    pub last_name: String,
    /// National identification (birth) number
    pub birth_number: String,
    /// Health insurance company code
    pub insurance_company: String,
    /// Primary diagnosis
    pub diagnosis: String,
    /// Current medications
    pub medications: String,
    /// Known allergies
    pub allergies: String,
    /// Smoking status
    pub is_smoker: String,
    /// Alcohol consumption
    pub alcohol_use: String,
    /// Medical history narrative
    pub anamnesis: String,
    /// Blood pressure reading
    pub blood_pressure: String,
    /// Free-text clinical notes
    pub notes: String,
}

impl PatientRecord {
    /// Get the current value of a field.
    #[inline]
    #[must_use = "returns the field's current value"]
    pub fn get(&self, field: FieldName) -> &str {
        match field {
            FieldName::FirstName => &self.first_name,
            FieldName::LastName => &self.last_name,
            FieldName::BirthNumber => &self.birth_number,
            FieldName::InsuranceCompany => &self.insurance_company,
            FieldName::Diagnosis => &self.diagnosis,
            FieldName::Medications => &self.medications,
            FieldName::Allergies => &self.allergies,
            FieldName::IsSmoker => &self.is_smoker,
            FieldName::AlcoholUse => &self.alcohol_use,
            FieldName::Anamnesis => &self.anamnesis,
            FieldName::BloodPressure => &self.blood_pressure,
            FieldName::Notes => &self.notes,
        }
    }

    /// Set the value of a field.
    #[inline]
    pub fn set(&mut self, field: FieldName, value: String) {
        match field {
            FieldName::FirstName => self.first_name = value,
            FieldName::LastName => self.last_name = value,
            FieldName::BirthNumber => self.birth_number = value,
            FieldName::InsuranceCompany => self.insurance_company = value,
            FieldName::Diagnosis => self.diagnosis = value,
            FieldName::Medications => self.medications = value,
            FieldName::Allergies => self.allergies = value,
            FieldName::IsSmoker => self.is_smoker = value,
            FieldName::AlcoholUse => self.alcohol_use = value,
            FieldName::Anamnesis => self.anamnesis = value,
            FieldName::BloodPressure => self.blood_pressure = value,
            FieldName::Notes => self.notes = value,
        }
    }

    /// Iterate over all fields in the fixed enumeration order.
    pub fn fields(&self) -> impl Iterator<Item = (FieldName, &str)> {
        FieldName::ALL.into_iter().map(move |f| (f, self.get(f)))
    }

    /// Iterate over fields whose value is not blank.
    pub fn non_empty_fields(&self) -> impl Iterator<Item = (FieldName, &str)> {
        self.fields().filter(|(_, v)| !is_blank(v))
    }
}

/// A value is blank when it is empty or all-whitespace.
#[inline]
#[must_use]
pub fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_field_name_roundtrip() {
        for field in FieldName::ALL {
            let s = field.to_string();
            let parsed = FieldName::from_str(&s).unwrap();
            assert_eq!(field, parsed, "roundtrip failed for {s}");
        }
    }

    #[test]
    fn test_field_name_from_str_case_insensitive() {
        assert_eq!(FieldName::from_str("isSmoker").unwrap(), FieldName::IsSmoker);
        assert_eq!(FieldName::from_str("ISSMOKER").unwrap(), FieldName::IsSmoker);
        assert_eq!(
            FieldName::from_str("birthNumber").unwrap(),
            FieldName::BirthNumber
        );
        assert!(FieldName::from_str("petName").is_err());
    }

    #[test]
    fn test_field_name_serde_wire_names() {
        let json = serde_json::to_string(&FieldName::IsSmoker).unwrap();
        assert_eq!(json, "\"isSmoker\"");
        let parsed: FieldName = serde_json::from_str("\"bloodPressure\"").unwrap();
        assert_eq!(parsed, FieldName::BloodPressure);
    }

    #[test]
    fn test_descriptions_not_empty() {
        for field in FieldName::ALL {
            assert!(
                !field.description().is_empty(),
                "missing description for {field}"
            );
        }
    }

    #[test]
    fn test_get_set_symmetry() {
        let mut record = PatientRecord::default();
        for field in FieldName::ALL {
            record.set(field, format!("value-{field}"));
            assert_eq!(record.get(field), format!("value-{field}"));
        }
    }

    #[test]
    fn test_record_deserializes_camel_case() {
        let json = r#"{"firstName": "Jan", "isSmoker": "no", "birthNumber": "900101/1234"}"#;
        let record: PatientRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.first_name, "Jan");
        assert_eq!(record.is_smoker, "no");
        assert_eq!(record.birth_number, "900101/1234");
        // Unlisted fields default to empty
        assert!(record.diagnosis.is_empty());
    }

    #[test]
    fn test_fields_enumeration_order() {
        let record = PatientRecord::default();
        let order: Vec<FieldName> = record.fields().map(|(f, _)| f).collect();
        assert_eq!(order, FieldName::ALL.to_vec());
        assert_eq!(order[0], FieldName::FirstName);
    }

    #[test]
    fn test_non_empty_fields_skips_whitespace() {
        let record = PatientRecord {
            first_name: "Jan".to_string(),
            last_name: "   ".to_string(),
            ..Default::default()
        };
        let non_empty: Vec<FieldName> = record.non_empty_fields().map(|(f, _)| f).collect();
        assert_eq!(non_empty, vec![FieldName::FirstName]);
    }

    #[test]
    fn test_is_blank() {
        assert!(is_blank(""));
        assert!(is_blank("  \t "));
        assert!(!is_blank("x"));
    }
}
