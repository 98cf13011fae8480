//! Metadata directory path resolution.

use std::path::PathBuf;

/// Environment variable for overriding the metadata directory.
pub const METADATA_ENV_VAR: &str = "RELAY_METADATA_DIR";

pub const VALUE_SETS_DIR: &str = "valuesets";
pub const TABLES_DIR: &str = "tables";
pub const SCHEMAS_DIR: &str = "schemas";

/// Get the metadata root directory.
///
/// Resolution order:
/// 1. `RELAY_METADATA_DIR` environment variable
/// 2. `metadata/` directory relative to workspace root
pub fn metadata_root() -> PathBuf {
    if let Ok(root) = std::env::var(METADATA_ENV_VAR) {
        return PathBuf::from(root);
    }
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../metadata")
}
