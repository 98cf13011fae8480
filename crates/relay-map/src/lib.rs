//! Value derivation for report fields.
//!
//! - **mappers**: the built-in mappers (`concat`, `lookup`, `ifThenElse`, ...)
//! - **registry**: mapper lookup by name and mapper expression parsing
//! - **process**: the per-field pipeline (mapper, default, cardinality)

pub mod error;
pub mod mappers;
pub mod process;
pub mod registry;

pub use error::ProcessError;
pub use process::{process_value, process_value_on, tokenize_mapper_value};
pub use registry::{MapperRegistry, default_registry, parse_mapper_field};
