//! Postal code checks and US ZIP formatting.

use std::sync::LazyLock;

use regex::Regex;

/// Postal codes in any country's layout: letters, digits, dashes and spaces.
static POSTAL_CODE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z\d\- ]{3,12}$").expect("Invalid postal code regex"));

/// US ZIP or ZIP+4.
static US_ZIP_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{5})[- ]?(\d{4})?$").expect("Invalid US ZIP regex"));

/// Canadian `A1A 1A1`, with or without the space.
static CANADIAN_POSTAL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z]\d[A-Za-z][- ]?\d[A-Za-z]\d$").expect("Invalid Canadian postal code regex")
});

pub fn is_us_zip(value: &str) -> bool {
    US_ZIP_REGEX.is_match(value.trim())
}

pub fn is_canadian_postal_code(value: &str) -> bool {
    CANADIAN_POSTAL_REGEX.is_match(value.trim())
}

pub fn is_valid_postal_code(value: &str) -> bool {
    POSTAL_CODE_REGEX.is_match(value)
}

/// Canonical postal code: interior spaces removed.
pub fn normalize_postal_code(value: &str) -> String {
    value.replace(' ', "")
}

fn pad_zip(value: &str) -> String {
    format!("{value:0>5}")
}

/// The five-digit ZIP, or the value left-padded with zeros.
pub fn zip_five(value: &str) -> String {
    match US_ZIP_REGEX.captures(value).and_then(|captures| captures.get(1)) {
        Some(zip) => zip.as_str().to_string(),
        None => pad_zip(value),
    }
}

/// `ddddd-dddd` for ZIP+4, `ddddd` for a plain ZIP, otherwise the padded value.
pub fn zip_five_plus_four(value: &str) -> String {
    let Some(captures) = US_ZIP_REGEX.captures(value) else {
        return pad_zip(value);
    };
    match (captures.get(1), captures.get(2)) {
        (Some(zip), Some(plus_four)) => format!("{}-{}", zip.as_str(), plus_four.as_str()),
        (Some(zip), None) => zip.as_str().to_string(),
        _ => pad_zip(value),
    }
}

/// Default output: the value left-padded to five characters.
pub fn format_postal_code(value: &str) -> String {
    pad_zip(value)
}
