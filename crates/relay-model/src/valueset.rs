//! Value sets for coded elements.
//!
//! A value set maps codes to display strings. Lookups are case-insensitive
//! on the code and the display; the canonical form of a coded value is
//! always the code as written in the value set.

use serde::{Deserialize, Serialize};

/// Coding system a value set belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValueSetSystem {
    Hl7,
    SnomedCt,
    Loinc,
    Local,
    Ucum,
    Fhir,
    Iso,
    Nullfl,
}

/// A single code/display pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueSetValue {
    pub code: String,
    #[serde(default)]
    pub display: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    /// An older code this value supersedes; still accepted on input.
    #[serde(default)]
    pub replaces: Option<String>,
}

impl ValueSetValue {
    pub fn new(code: impl Into<String>, display: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            display: Some(display.into()),
            version: None,
            replaces: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueSet {
    pub name: String,
    pub system: ValueSetSystem,
    #[serde(default)]
    pub reference: Option<String>,
    #[serde(default)]
    pub reference_url: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub values: Vec<ValueSetValue>,
}

impl ValueSet {
    pub fn new(name: impl Into<String>, system: ValueSetSystem, values: Vec<ValueSetValue>) -> Self {
        Self {
            name: name.into(),
            system,
            reference: None,
            reference_url: None,
            version: None,
            values,
        }
    }

    /// Coding system identifier written next to a code (HL7 "name of coding system").
    pub fn system_code(&self) -> String {
        match self.system {
            ValueSetSystem::Hl7 => self.name.to_uppercase(),
            ValueSetSystem::SnomedCt => "SCT".to_string(),
            ValueSetSystem::Loinc => "LN".to_string(),
            ValueSetSystem::Local => "LOCAL".to_string(),
            ValueSetSystem::Ucum => "UCUM".to_string(),
            ValueSetSystem::Fhir => "FHIR".to_string(),
            ValueSetSystem::Iso => "ISO".to_string(),
            ValueSetSystem::Nullfl => "NULLFL".to_string(),
        }
    }

    pub fn to_display_from_code(&self, code: &str) -> Option<&str> {
        self.values
            .iter()
            .find(|value| value.code.eq_ignore_ascii_case(code))
            .and_then(|value| value.display.as_deref())
    }

    pub fn to_code_from_display(&self, display: &str) -> Option<&str> {
        self.values
            .iter()
            .find(|value| {
                value
                    .display
                    .as_deref()
                    .is_some_and(|d| d.eq_ignore_ascii_case(display))
            })
            .map(|value| value.code.as_str())
    }

    /// Returns the value set's spelling of `code`, if present.
    pub fn to_normalized_code(&self, code: &str) -> Option<&str> {
        self.values
            .iter()
            .find(|value| value.code.eq_ignore_ascii_case(code))
            .map(|value| value.code.as_str())
    }
}
