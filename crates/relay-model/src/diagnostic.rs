//! Field-level diagnostics.
//!
//! A diagnostic is keyed to the external-facing name of a field (see
//! [`Element::field_mapping`](crate::Element::field_mapping)) so the
//! action log can point a sender at the column that needs fixing.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// What went wrong with a field value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// A required field had no value after mapping and defaults.
    MissingField,
    InvalidDate {
        value: String,
        format: Option<String>,
    },
    InvalidCode {
        value: String,
        format: Option<String>,
    },
    InvalidPhone {
        value: String,
    },
    InvalidPostal {
        value: String,
        format: Option<String>,
    },
    UnsupportedHd {
        format: Option<String>,
    },
    UnsupportedEi {
        format: Option<String>,
    },
    /// Free-form problem reported by a mapper.
    Mapper {
        message: String,
    },
}

/// A single error or warning attached to a field result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    /// External field name(s) plus element name, e.g. `patient_dob (patient_dob)`.
    pub field_mapping: String,
    pub severity: Severity,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, field_mapping: impl Into<String>) -> Self {
        Self {
            kind,
            field_mapping: field_mapping.into(),
            severity: Severity::Error,
        }
    }

    pub fn missing_field(field_mapping: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::MissingField, field_mapping)
    }

    pub fn mapper(field_mapping: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(
            DiagnosticKind::Mapper {
                message: message.into(),
            },
            field_mapping,
        )
    }

    #[must_use]
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    /// Human-readable message for the action log.
    pub fn message(&self) -> String {
        self.to_string()
    }
}

fn format_hint(format: Option<&String>) -> String {
    match format {
        Some(format) => format!(" Reformat to '{format}'."),
        None => String::new(),
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let field = &self.field_mapping;
        match &self.kind {
            DiagnosticKind::MissingField => {
                write!(f, "Blank value for element {field}. Please refer to the schema for more information.")
            }
            DiagnosticKind::InvalidDate { value, format } => write!(
                f,
                "Invalid date: '{value}' for element {field}.{}",
                format_hint(format.as_ref())
            ),
            DiagnosticKind::InvalidCode { value, format } => write!(
                f,
                "Invalid code: '{value}' is not a valid code for element {field}.{}",
                format_hint(format.as_ref())
            ),
            DiagnosticKind::InvalidPhone { value } => write!(
                f,
                "Invalid phone number '{value}' for {field}. Reformat to a 10-digit phone number (e.g. (555) 555-5555)."
            ),
            DiagnosticKind::InvalidPostal { value, format } => write!(
                f,
                "Invalid postal code '{value}' for {field}.{}",
                format_hint(format.as_ref())
            ),
            DiagnosticKind::UnsupportedHd { format } => write!(
                f,
                "Unsupported HD format '{}' for {field}.",
                format.as_deref().unwrap_or("")
            ),
            DiagnosticKind::UnsupportedEi { format } => write!(
                f,
                "Unsupported EI format '{}' for {field}.",
                format.as_deref().unwrap_or("")
            ),
            DiagnosticKind::Mapper { message } => write!(f, "{message} ({field})"),
        }
    }
}
