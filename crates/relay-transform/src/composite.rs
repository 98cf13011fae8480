//! HL7 composite identifiers: Hierarchic Designator (HD) and Entity Identifier (EI).
//!
//! Canonical values are the parts joined with `^`. An HD has one part (name
//! only) or three (name, universal id, universal id system); an EI has one or
//! four (name, namespace id, universal id, universal id system).

use relay_model::{EiFields, HdFields, SchemaError, SubValue};

use crate::tokens::{
    DEFAULT_UNIVERSAL_ID_SYSTEM, EI_COMPLETE_FORMAT, EI_DELIMITER, EI_NAME_TOKEN,
    EI_NAMESPACE_ID_TOKEN, EI_SYSTEM_TOKEN, EI_UNIVERSAL_ID_TOKEN, HD_COMPLETE_FORMAT,
    HD_DELIMITER, HD_NAME_TOKEN, HD_SYSTEM_TOKEN, HD_UNIVERSAL_ID_TOKEN,
};

/// Parses an HD value, truncating the name to `max_length` characters if given.
///
/// # Errors
///
/// Returns [`SchemaError::InvalidComposite`] unless the value has one or three parts.
pub fn parse_hd(value: &str, max_length: Option<usize>) -> Result<HdFields, SchemaError> {
    let parts: Vec<&str> = value.split(HD_DELIMITER).collect();
    let name = match max_length {
        Some(max) => parts[0].chars().take(max).collect(),
        None => parts[0].to_string(),
    };
    match parts.as_slice() {
        [_] => Ok(HdFields {
            name,
            universal_id: None,
            universal_id_system: None,
        }),
        [_, universal_id, system] => Ok(HdFields {
            name,
            universal_id: Some((*universal_id).to_string()),
            universal_id_system: Some((*system).to_string()),
        }),
        _ => Err(SchemaError::InvalidComposite {
            kind: "HD",
            value: value.to_string(),
            expected: "1 or 3",
        }),
    }
}

/// Parses an EI value.
///
/// # Errors
///
/// Returns [`SchemaError::InvalidComposite`] unless the value has one or four parts.
pub fn parse_ei(value: &str) -> Result<EiFields, SchemaError> {
    let parts: Vec<&str> = value.split(EI_DELIMITER).collect();
    match parts.as_slice() {
        [name] => Ok(EiFields {
            name: (*name).to_string(),
            namespace: None,
            universal_id: None,
            universal_id_system: None,
        }),
        [name, namespace, universal_id, system] => Ok(EiFields {
            name: (*name).to_string(),
            namespace: Some((*namespace).to_string()),
            universal_id: Some((*universal_id).to_string()),
            universal_id_system: Some((*system).to_string()),
        }),
        _ => Err(SchemaError::InvalidComposite {
            kind: "EI",
            value: value.to_string(),
            expected: "1 or 4",
        }),
    }
}

/// Assembles a canonical HD from sub-values, each naming the part it holds by format token.
///
/// A sub-value with no format (or `$complete`) is a whole HD whose parts
/// overwrite those seen so far. The system defaults to `ISO`.
pub fn hd_from_sub_values(sub_values: &[SubValue]) -> Result<String, SchemaError> {
    let mut name = String::new();
    let mut universal_id = String::new();
    let mut system = DEFAULT_UNIVERSAL_ID_SYSTEM.to_string();
    for sub_value in sub_values {
        match sub_value.format.as_deref() {
            None | Some(HD_COMPLETE_FORMAT) => {
                let fields = parse_hd(&sub_value.value, None)?;
                name = fields.name;
                if let Some(id) = fields.universal_id {
                    universal_id = id;
                }
                if let Some(id_system) = fields.universal_id_system {
                    system = id_system;
                }
            }
            Some(HD_NAME_TOKEN) => name.clone_from(&sub_value.value),
            Some(HD_UNIVERSAL_ID_TOKEN) => universal_id.clone_from(&sub_value.value),
            Some(HD_SYSTEM_TOKEN) => system.clone_from(&sub_value.value),
            Some(other) => {
                tracing::debug!(sub_value = %sub_value.name, format = other, "ignoring HD sub-value");
            }
        }
    }
    Ok([name, universal_id, system].join(HD_DELIMITER))
}

/// Assembles a canonical EI from sub-values. See [`hd_from_sub_values`].
pub fn ei_from_sub_values(sub_values: &[SubValue]) -> Result<String, SchemaError> {
    let mut name = String::new();
    let mut namespace = String::new();
    let mut universal_id = String::new();
    let mut system = DEFAULT_UNIVERSAL_ID_SYSTEM.to_string();
    for sub_value in sub_values {
        match sub_value.format.as_deref() {
            None | Some(EI_COMPLETE_FORMAT) => {
                let fields = parse_ei(&sub_value.value)?;
                name = fields.name;
                if let Some(ns) = fields.namespace {
                    namespace = ns;
                }
                if let Some(id) = fields.universal_id {
                    universal_id = id;
                }
                if let Some(id_system) = fields.universal_id_system {
                    system = id_system;
                }
            }
            Some(EI_NAME_TOKEN) => name.clone_from(&sub_value.value),
            Some(EI_NAMESPACE_ID_TOKEN) => namespace.clone_from(&sub_value.value),
            Some(EI_UNIVERSAL_ID_TOKEN) => universal_id.clone_from(&sub_value.value),
            Some(EI_SYSTEM_TOKEN) => system.clone_from(&sub_value.value),
            Some(other) => {
                tracing::debug!(sub_value = %sub_value.name, format = other, "ignoring EI sub-value");
            }
        }
    }
    Ok([name, namespace, universal_id, system].join(EI_DELIMITER))
}
