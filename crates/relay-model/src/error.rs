use thiserror::Error;

/// Configuration problems found while converting a value.
///
/// These point at a broken schema rather than bad input data, so callers
/// should stop processing instead of attaching a per-row diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("missing value set for {field}")]
    MissingValueSet { field: String },

    #[error("missing alt values for {field}")]
    MissingAltValues { field: String },

    #[error("'{code}' is not in value set '{value_set}' for {field}")]
    CodeNotInValueSet {
        code: String,
        value_set: String,
        field: String,
    },

    #[error("'{value}' cannot be formatted for {field}")]
    DisplayNotFound { value: String, field: String },

    #[error("{field} is not a code element")]
    NotCodeType { field: String },

    #[error("unsupported {kind} format '{format}' for {field}")]
    UnsupportedFormat {
        kind: &'static str,
        format: String,
        field: String,
    },

    #[error("invalid {kind} value '{value}': expected {expected} parts")]
    InvalidComposite {
        kind: &'static str,
        value: String,
        expected: &'static str,
    },

    #[error("invalid date pattern '{pattern}' for {field}")]
    InvalidPattern { pattern: String, field: String },

    #[error("sub-values are not supported for {field}")]
    SubValuesNotSupported { field: String },

    #[error("mapper '{mapper}': {message}")]
    MapperArguments { mapper: String, message: String },
}
