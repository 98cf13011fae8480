//! Metadata loading for the relay workspace.
//!
//! This crate provides:
//!
//! - **Loaders** for value sets and schemas (TOML) and lookup tables (CSV)
//! - **Fixup**: schema inheritance and resolution of value set, table and
//!   mapper references, followed by configuration validation
//! - **Metadata**: the read-only catalog rows are processed against
//!
//! # Metadata Directory Structure
//!
//! ```text
//! metadata/
//! ├── valuesets/      # [[valueset]] tables, any number per file
//! ├── tables/         # lookup tables, named after the file stem
//! └── schemas/        # one schema per file, may `extends` another
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use relay_standards::Metadata;
//!
//! let metadata = Metadata::load_default()?;
//! let schema = metadata.find_schema("covid-19").unwrap();
//! println!("covid-19 has {} elements", schema.elements.len());
//! ```

pub mod csv_utils;
pub mod error;
pub mod fixup;
pub mod loaders;
pub mod metadata;
pub mod paths;

pub use error::{Result, StandardsError};
pub use fixup::{FixupContext, extend_schema, fixup_schema};
pub use metadata::Metadata;
pub use paths::{METADATA_ENV_VAR, metadata_root};
