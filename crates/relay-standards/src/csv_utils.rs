//! CSV utilities for loading lookup tables.

use std::path::Path;

use csv::ReaderBuilder;
use relay_model::LookupTable;

use crate::error::{Result, StandardsError};

/// Read a CSV file into a lookup table named after the file stem.
///
/// The first row is the header. BOM characters are stripped from headers and
/// whitespace is trimmed from every cell; rows may be shorter than the header.
pub fn read_table(path: &Path) -> Result<LookupTable> {
    let csv_error = |source| StandardsError::CsvRead {
        path: path.to_path_buf(),
        source,
    };
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .map_err(csv_error)?;

    let headers: Vec<String> = reader
        .headers()
        .map_err(csv_error)?
        .iter()
        .map(|header| header.trim_matches('\u{feff}').trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(csv_error)?;
        rows.push(record.iter().map(|value| value.trim().to_string()).collect());
    }

    let name = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok(LookupTable::new(name, headers, rows))
}
