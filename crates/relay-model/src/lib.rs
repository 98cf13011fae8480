//! Core data model for report translation.
//!
//! This crate holds the configuration-side types that every other crate
//! works against:
//!
//! - **element**: field definitions (`Element`) and their type tags
//! - **valueset**: coded value tables used by `CODE` elements
//! - **table**: rectangular lookup tables used by `TABLE` elements
//! - **schema**: named element collections
//! - **diagnostic** / **result**: per-field diagnostics and results
//! - **mapper**: the value derivation contract implemented in `relay-map`
//! - **sender**: read-only sender context handed to mappers
//! - **logging**: PHI-safe value redaction for log output

#![deny(unsafe_code)]

pub mod diagnostic;
pub mod element;
pub mod error;
pub mod logging;
pub mod mapper;
pub mod result;
pub mod schema;
pub mod sender;
pub mod table;
pub mod valueset;

pub use diagnostic::{Diagnostic, DiagnosticKind, Severity};
pub use element::{
    Cardinality, CsvField, EiFields, Element, ElementType, HdFields, LOOKUP_MAPPER_NAME, SubValue,
    WILDCARD,
};
pub use error::SchemaError;
pub use mapper::{ElementAndValue, Mapper, MapperRef, argument_error};
pub use result::ElementResult;
pub use schema::Schema;
pub use sender::{CustomerStatus, SenderContext};
pub use table::LookupTable;
pub use valueset::{ValueSet, ValueSetSystem, ValueSetValue};
