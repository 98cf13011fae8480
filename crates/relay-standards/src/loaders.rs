//! File loaders for value sets and schemas.
//!
//! Both are TOML. A value set file holds any number of `[[valueset]]`
//! tables; a schema file holds one schema with its `[[elements]]`.

use std::fs;
use std::path::{Path, PathBuf};

use relay_model::{Schema, ValueSet};
use serde::Deserialize;

use crate::error::{Result, StandardsError};

#[derive(Debug, Deserialize)]
struct ValueSetFile {
    #[serde(default)]
    valueset: Vec<ValueSet>,
}

/// Files in `dir` with the given extension, sorted by name.
///
/// A missing directory has no files.
pub fn list_files(dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let io_error = |source| StandardsError::Io {
        path: dir.to_path_buf(),
        source,
    };
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_error)? {
        let path = entry.map_err(io_error)?.path();
        if path.is_file()
            && path
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case(extension))
        {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn read_to_string(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|source| StandardsError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Parse value sets from TOML content; `path` is only used in errors.
pub fn parse_value_sets(content: &str, path: &Path) -> Result<Vec<ValueSet>> {
    let file: ValueSetFile = toml::from_str(content).map_err(|source| StandardsError::TomlParse {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(file.valueset)
}

pub fn load_value_sets(path: &Path) -> Result<Vec<ValueSet>> {
    parse_value_sets(&read_to_string(path)?, path)
}

/// Parse a schema from TOML content; `path` is only used in errors.
pub fn parse_schema(content: &str, path: &Path) -> Result<Schema> {
    toml::from_str(content).map_err(|source| StandardsError::TomlParse {
        path: path.to_path_buf(),
        source,
    })
}

pub fn load_schema(path: &Path) -> Result<Schema> {
    parse_schema(&read_to_string(path)?, path)
}
