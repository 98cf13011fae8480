//! Error types for metadata loading.

use std::path::PathBuf;

use relay_model::SchemaError;
use thiserror::Error;

/// Errors that can occur when loading or fixing up metadata.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StandardsError {
    /// Metadata directory not found.
    #[error("Metadata directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to read or parse a lookup table.
    #[error("Failed to read CSV {path}: {source}")]
    CsvRead {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Failed to parse TOML {path}: {source}")]
    TomlParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// Two definitions of the same kind share a name.
    #[error("Duplicate {kind} '{name}'")]
    Duplicate { kind: &'static str, name: String },

    /// An element names a value set, table or mapper that is not loaded.
    #[error("Element {element} refers to unknown {kind} '{name}'")]
    UnknownReference {
        kind: &'static str,
        name: String,
        element: String,
    },

    #[error("Schema {schema} extends unknown schema '{base}'")]
    UnknownBaseSchema { schema: String, base: String },

    #[error("Schema {schema} extends itself through '{base}'")]
    InheritanceCycle { schema: String, base: String },

    /// A mapper expression does not parse or has the wrong arguments.
    #[error("Element {element} has an invalid mapper: {source}")]
    Mapper {
        element: String,
        #[source]
        source: SchemaError,
    },

    /// Fixed-up elements broke configuration rules; every message is kept.
    #[error("Schema {schema} is invalid:\n{}", messages.join("\n"))]
    InvalidSchema {
        schema: String,
        messages: Vec<String>,
    },
}

/// Result type for metadata loading operations.
pub type Result<T> = std::result::Result<T, StandardsError>;
