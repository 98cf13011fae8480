use relay_model::{Diagnostic, DiagnosticKind, SchemaError};
use thiserror::Error;

use crate::tokens::ALT_DISPLAY_TOKEN;

/// Failure converting a single value.
///
/// Data errors describe bad input and become per-row diagnostics.
/// [`ConversionError::Schema`] wraps a configuration error and should stop
/// processing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversionError {
    #[error("Invalid date: '{value}' for element {field}")]
    InvalidDate {
        value: String,
        field: String,
        format: Option<String>,
    },

    #[error("Invalid code: '{value}' does not match any codes for {field}")]
    InvalidCode {
        value: String,
        field: String,
        format: Option<String>,
    },

    #[error("Invalid phone number '{value}' for {field}")]
    InvalidPhone { value: String, field: String },

    #[error("Invalid postal code '{value}' for {field}")]
    InvalidPostal {
        value: String,
        field: String,
        format: Option<String>,
    },

    #[error("'{value}' is not in altValues set for {field}")]
    AltValueNotDefined { value: String, field: String },

    #[error(transparent)]
    Schema(#[from] SchemaError),
}

impl ConversionError {
    /// True if the error points at the schema rather than the data.
    pub fn is_configuration(&self) -> bool {
        matches!(self, ConversionError::Schema(_))
    }

    /// The diagnostic for a data error, or `None` for configuration errors.
    pub fn to_diagnostic(&self) -> Option<Diagnostic> {
        let (kind, field) = match self {
            ConversionError::InvalidDate {
                value,
                field,
                format,
            } => (
                DiagnosticKind::InvalidDate {
                    value: value.clone(),
                    format: format.clone(),
                },
                field,
            ),
            ConversionError::InvalidCode {
                value,
                field,
                format,
            } => (
                DiagnosticKind::InvalidCode {
                    value: value.clone(),
                    format: format.clone(),
                },
                field,
            ),
            ConversionError::InvalidPhone { value, field } => (
                DiagnosticKind::InvalidPhone {
                    value: value.clone(),
                },
                field,
            ),
            ConversionError::InvalidPostal {
                value,
                field,
                format,
            } => (
                DiagnosticKind::InvalidPostal {
                    value: value.clone(),
                    format: format.clone(),
                },
                field,
            ),
            ConversionError::AltValueNotDefined { value, field } => (
                DiagnosticKind::InvalidCode {
                    value: value.clone(),
                    format: Some(ALT_DISPLAY_TOKEN.to_string()),
                },
                field,
            ),
            ConversionError::Schema(_) => return None,
        };
        Some(Diagnostic::new(kind, field.clone()))
    }
}
