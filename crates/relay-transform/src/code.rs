//! Coded values.
//!
//! The canonical form of a coded value is its code. The format token picks
//! how the external value relates to that code: a display string from the
//! element's alt values (`$alt`), a code matched against the value set
//! including replaced codes (`$code`), a display from the value set
//! (`$display`), or by default the code itself in any case.

use relay_model::{Element, SchemaError, ValueSet};

use crate::error::ConversionError;
use crate::tokens::{
    ALT_DISPLAY_TOKEN, CARET_TOKEN, CODE_TOKEN, DISPLAY_TOKEN, NULL_FLAVOR_SYSTEM, SYSTEM_TOKEN,
};

/// HL7 table 0136 (yes/no indicator), whose `UNK` code belongs to the null flavor system.
const YES_NO_VALUE_SET: &str = "hl70136";
const UNKNOWN_CODE: &str = "UNK";

fn value_set(element: &Element) -> Result<&ValueSet, SchemaError> {
    element
        .value_set_ref
        .as_deref()
        .ok_or_else(|| SchemaError::MissingValueSet {
            field: element.field_mapping(),
        })
}

fn invalid_code(element: &Element, value: &str, format: Option<&str>) -> ConversionError {
    ConversionError::InvalidCode {
        value: value.to_string(),
        field: element.field_mapping(),
        format: format.map(str::to_string),
    }
}

/// External coded value to its canonical code.
pub fn normalize_code(
    element: &Element,
    value: &str,
    format: Option<&str>,
) -> Result<String, ConversionError> {
    let code = match format {
        Some(ALT_DISPLAY_TOKEN) => element.to_alt_code(value)?,
        Some(CODE_TOKEN) => element.to_code(value)?,
        Some(DISPLAY_TOKEN) => value_set(element)?.to_code_from_display(value),
        _ => value_set(element)?.to_normalized_code(value),
    };
    code.map(str::to_string)
        .ok_or_else(|| invalid_code(element, value, format))
}

/// Canonical code to its external representation.
pub fn format_code(
    element: &Element,
    code: &str,
    format: Option<&str>,
) -> Result<String, ConversionError> {
    let field = || element.field_mapping();
    match format {
        Some(ALT_DISPLAY_TOKEN) => element
            .to_alt_display(code)?
            .map(str::to_string)
            .ok_or_else(|| ConversionError::AltValueNotDefined {
                value: code.to_string(),
                field: field(),
            }),
        Some(CODE_TOKEN) => {
            let value_set_name = element.value_set.clone().unwrap_or_default();
            element
                .to_code(code)?
                .map(str::to_string)
                .ok_or_else(|| {
                    SchemaError::CodeNotInValueSet {
                        code: code.to_string(),
                        value_set: value_set_name,
                        field: field(),
                    }
                    .into()
                })
        }
        Some(CARET_TOKEN) => {
            let value_set = value_set(element)?;
            let display = value_set
                .to_display_from_code(code)
                .ok_or_else(|| SchemaError::DisplayNotFound {
                    value: code.to_string(),
                    field: field(),
                })?;
            Ok(format!("{code}^{display}^{}", value_set.system_code()))
        }
        Some(DISPLAY_TOKEN) => value_set(element)?
            .to_display_from_code(code)
            .map(str::to_string)
            .ok_or_else(|| {
                SchemaError::DisplayNotFound {
                    value: code.to_string(),
                    field: field(),
                }
                .into()
            }),
        Some(SYSTEM_TOKEN) => {
            let value_set = value_set(element)?;
            if value_set.name == YES_NO_VALUE_SET && code == UNKNOWN_CODE {
                Ok(NULL_FLAVOR_SYSTEM.to_string())
            } else {
                Ok(value_set.system_code())
            }
        }
        _ => Ok(code.to_string()),
    }
}
