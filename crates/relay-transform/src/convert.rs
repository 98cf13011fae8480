//! Element-level conversion between canonical and external values.
//!
//! [`ElementConversion`] is implemented for [`Element`]; each operation is one
//! exhaustive match over [`ElementType`].

use relay_model::{Diagnostic, DiagnosticKind, Element, ElementType, SchemaError, SubValue};
use relay_model::logging::redact_value;

use crate::code::{format_code, normalize_code};
use crate::composite::{ei_from_sub_values, hd_from_sub_values, parse_ei, parse_hd};
use crate::date::{
    Temporal, format_canonical_date, format_canonical_datetime, is_valid_pattern, parse_date,
    parse_datetime, parse_variable,
};
use crate::error::ConversionError;
use crate::phone::parse_phone;
use crate::postal::{
    format_postal_code, is_valid_postal_code, normalize_postal_code, zip_five, zip_five_plus_four,
};
use crate::tokens::{
    AREA_CODE_TOKEN, COUNTRY_CODE_TOKEN, DATETIME_PATTERN, DEFAULT_PHONE_FORMAT, E164_TOKEN,
    EI_COMPLETE_FORMAT, EI_NAME_TOKEN, EI_NAMESPACE_ID_TOKEN, EI_SYSTEM_TOKEN,
    EI_UNIVERSAL_ID_TOKEN, EXCHANGE_TOKEN, EXTENSION_TOKEN, HD_COMPLETE_FORMAT, HD_NAME_TOKEN,
    HD_SYSTEM_TOKEN, HD_UNIVERSAL_ID_TOKEN, PHONE_DELIMITER, SUBSCRIBER_TOKEN, ZIP_FIVE_PLUS_FOUR_TOKEN,
    ZIP_FIVE_TOKEN,
};

/// Conversion operations on a fixed-up element.
pub trait ElementConversion {
    /// External value to canonical form.
    ///
    /// Blank input always yields `""`. When the element has `nullify_value`
    /// set, data errors also yield `""`.
    ///
    /// # Errors
    ///
    /// Data errors for malformed input; [`ConversionError::Schema`] for a
    /// broken element configuration.
    fn to_normalized(&self, value: &str, format: Option<&str>) -> Result<String, ConversionError>;

    /// Canonical value assembled from per-part sub-values (HD and EI only).
    ///
    /// # Errors
    ///
    /// Fails for other element types and for malformed composite parts.
    fn to_normalized_sub_values(&self, sub_values: &[SubValue]) -> Result<String, SchemaError>;

    /// Canonical value to its external representation, truncated for text types.
    ///
    /// # Errors
    ///
    /// Fails when the canonical value cannot be represented in `format`.
    fn to_formatted(&self, value: &str, format: Option<&str>) -> Result<String, ConversionError>;

    /// Validates an external value without keeping the result.
    ///
    /// Returns `Ok(None)` exactly when [`to_normalized`](Self::to_normalized)
    /// would succeed for non-blank input. Blank input on a required element
    /// yields a missing-field diagnostic.
    ///
    /// # Errors
    ///
    /// Configuration errors are returned rather than reported as diagnostics.
    fn check_for_error(
        &self,
        value: &str,
        format: Option<&str>,
    ) -> Result<Option<Diagnostic>, SchemaError>;

    /// Truncates text-like values to `max_length` characters.
    fn truncate_if_needed(&self, value: &str) -> String;
}

fn invalid_date(element: &Element, value: &str, format: Option<&str>) -> ConversionError {
    ConversionError::InvalidDate {
        value: value.to_string(),
        field: element.field_mapping(),
        format: format.map(str::to_string),
    }
}

fn check_pattern(element: &Element, format: Option<&str>) -> Result<(), SchemaError> {
    match format {
        Some(pattern) if !is_valid_pattern(pattern) => Err(SchemaError::InvalidPattern {
            pattern: pattern.to_string(),
            field: element.field_mapping(),
        }),
        _ => Ok(()),
    }
}

fn unsupported_format(kind: &'static str, element: &Element, format: &str) -> SchemaError {
    SchemaError::UnsupportedFormat {
        kind,
        format: format.to_string(),
        field: element.field_mapping(),
    }
}

fn normalize(element: &Element, value: &str, format: Option<&str>) -> Result<String, ConversionError> {
    let Some(element_type) = element.element_type else {
        return Ok(value.to_string());
    };
    match element_type {
        ElementType::Blank => Ok(String::new()),
        ElementType::Date => {
            check_pattern(element, format)?;
            parse_date(value, format)
                .map(format_canonical_date)
                .ok_or_else(|| invalid_date(element, value, format))
        }
        ElementType::DateTime => {
            check_pattern(element, format)?;
            parse_datetime(value, format)
                .map(|datetime| format_canonical_datetime(&datetime))
                .ok_or_else(|| invalid_date(element, value, format))
        }
        ElementType::Code => normalize_code(element, value, format),
        ElementType::Telephone => parse_phone(value)
            .map(|number| number.to_canonical())
            .ok_or_else(|| ConversionError::InvalidPhone {
                value: value.to_string(),
                field: element.field_mapping(),
            }),
        ElementType::PostalCode => {
            if is_valid_postal_code(value) {
                Ok(normalize_postal_code(value))
            } else {
                Err(ConversionError::InvalidPostal {
                    value: value.to_string(),
                    field: element.field_mapping(),
                    format: format.map(str::to_string),
                })
            }
        }
        ElementType::Hd => match format {
            None | Some(HD_COMPLETE_FORMAT) => {
                parse_hd(value, None)?;
                Ok(value.to_string())
            }
            Some(HD_NAME_TOKEN) => Ok(parse_hd(value, None)?.name),
            Some(other) => Err(unsupported_format("HD", element, other).into()),
        },
        ElementType::Ei => match format {
            None | Some(EI_COMPLETE_FORMAT) => {
                parse_ei(value)?;
                Ok(value.to_string())
            }
            Some(EI_NAME_TOKEN) => Ok(parse_ei(value)?.name),
            Some(other) => Err(unsupported_format("EI", element, other).into()),
        },
        ElementType::Text
        | ElementType::TextOrBlank
        | ElementType::Number
        | ElementType::Duration
        | ElementType::Table
        | ElementType::TableOrBlank
        | ElementType::Id
        | ElementType::IdClia
        | ElementType::IdDln
        | ElementType::IdSsn
        | ElementType::IdNpi
        | ElementType::Street
        | ElementType::StreetOrBlank
        | ElementType::City
        | ElementType::PersonName
        | ElementType::Email => Ok(value.to_string()),
    }
}

fn format_date(element: &Element, value: &str, format: Option<&str>) -> Result<String, ConversionError> {
    let Some(pattern) = format else {
        return Ok(value.to_string());
    };
    check_pattern(element, format)?;
    let temporal = parse_variable(value).ok_or_else(|| invalid_date(element, value, format))?;
    temporal.format(pattern).ok_or_else(|| {
        SchemaError::InvalidPattern {
            pattern: pattern.to_string(),
            field: element.field_mapping(),
        }
        .into()
    })
}

fn format_datetime(
    element: &Element,
    value: &str,
    format: Option<&str>,
) -> Result<String, ConversionError> {
    let Some(pattern) = format else {
        return Ok(value.to_string());
    };
    check_pattern(element, format)?;
    let datetime = chrono::DateTime::parse_from_str(value, DATETIME_PATTERN)
        .ok()
        .or_else(|| parse_datetime(value, None))
        .ok_or_else(|| invalid_date(element, value, format))?;
    Temporal::Offset(datetime).format(pattern).ok_or_else(|| {
        SchemaError::InvalidPattern {
            pattern: pattern.to_string(),
            field: element.field_mapping(),
        }
        .into()
    })
}

fn format_phone(element: &Element, value: &str, format: Option<&str>) -> Result<String, ConversionError> {
    let invalid = || ConversionError::InvalidPhone {
        value: value.to_string(),
        field: element.field_mapping(),
    };
    // canonical phones are national:country:extension; bare numbers come from HL7
    let (national, country, extension) = if value.contains(PHONE_DELIMITER) {
        let mut parts = value.splitn(3, PHONE_DELIMITER);
        (
            parts.next().unwrap_or_default().to_string(),
            parts.next().unwrap_or_default().to_string(),
            parts.next().unwrap_or_default().to_string(),
        )
    } else {
        (value.replace(['(', ')'], ""), "1".to_string(), String::new())
    };
    if !national.is_ascii() {
        return Err(invalid());
    }
    let area = national.get(0..3).ok_or_else(invalid)?;
    let exchange = national.get(3..6).ok_or_else(invalid)?;
    let subscriber = national.get(6..).ok_or_else(invalid)?;

    Ok(format
        .unwrap_or(DEFAULT_PHONE_FORMAT)
        .replace(COUNTRY_CODE_TOKEN, &country)
        .replace(AREA_CODE_TOKEN, area)
        .replace(EXCHANGE_TOKEN, exchange)
        .replace(SUBSCRIBER_TOKEN, subscriber)
        .replace(EXTENSION_TOKEN, &extension)
        .replace(E164_TOKEN, &format!("+{country}{national}")))
}

fn format_postal(value: &str, format: Option<&str>) -> String {
    match format {
        Some(ZIP_FIVE_TOKEN) => zip_five(value),
        Some(ZIP_FIVE_PLUS_FOUR_TOKEN) => zip_five_plus_four(value),
        _ => format_postal_code(value),
    }
}

fn format_value(element: &Element, value: &str, format: Option<&str>) -> Result<String, ConversionError> {
    let Some(element_type) = element.element_type else {
        return Ok(value.to_string());
    };
    match element_type {
        ElementType::Blank => Ok(String::new()),
        ElementType::Date => format_date(element, value, format),
        ElementType::DateTime => format_datetime(element, value, format),
        ElementType::Code => format_code(element, value, format),
        ElementType::Telephone => format_phone(element, value, format),
        ElementType::PostalCode => Ok(format_postal(value, format)),
        ElementType::Hd => {
            let fields = parse_hd(value, None)?;
            match format {
                None | Some(HD_NAME_TOKEN) => Ok(fields.name),
                Some(HD_UNIVERSAL_ID_TOKEN) => Ok(fields.universal_id.unwrap_or_default()),
                Some(HD_SYSTEM_TOKEN) => Ok(fields.universal_id_system.unwrap_or_default()),
                Some(other) => Err(unsupported_format("HD", element, other).into()),
            }
        }
        ElementType::Ei => {
            let fields = parse_ei(value)?;
            match format {
                None | Some(EI_NAME_TOKEN) => Ok(fields.name),
                Some(EI_NAMESPACE_ID_TOKEN) => Ok(fields.namespace.unwrap_or_default()),
                Some(EI_UNIVERSAL_ID_TOKEN) => Ok(fields.universal_id.unwrap_or_default()),
                Some(EI_SYSTEM_TOKEN) => Ok(fields.universal_id_system.unwrap_or_default()),
                Some(other) => Err(unsupported_format("EI", element, other).into()),
            }
        }
        ElementType::Text
        | ElementType::TextOrBlank
        | ElementType::Number
        | ElementType::Duration
        | ElementType::Table
        | ElementType::TableOrBlank
        | ElementType::Id
        | ElementType::IdClia
        | ElementType::IdDln
        | ElementType::IdSsn
        | ElementType::IdNpi
        | ElementType::Street
        | ElementType::StreetOrBlank
        | ElementType::City
        | ElementType::PersonName
        | ElementType::Email => Ok(value.to_string()),
    }
}

impl ElementConversion for Element {
    fn to_normalized(&self, value: &str, format: Option<&str>) -> Result<String, ConversionError> {
        let cleaned = value.trim();
        if cleaned.is_empty() {
            return Ok(String::new());
        }
        match normalize(self, cleaned, format) {
            Err(error) if self.nullify_value && !error.is_configuration() => {
                tracing::warn!(
                    element = %self.name,
                    value = redact_value(cleaned),
                    "nullified malformed value"
                );
                Ok(String::new())
            }
            result => result,
        }
    }

    fn to_normalized_sub_values(&self, sub_values: &[SubValue]) -> Result<String, SchemaError> {
        if sub_values.is_empty() {
            return Ok(String::new());
        }
        match self.element_type {
            Some(ElementType::Hd) => hd_from_sub_values(sub_values),
            Some(ElementType::Ei) => ei_from_sub_values(sub_values),
            _ => Err(SchemaError::SubValuesNotSupported {
                field: self.field_mapping(),
            }),
        }
    }

    fn to_formatted(&self, value: &str, format: Option<&str>) -> Result<String, ConversionError> {
        let cleaned = value.trim();
        if cleaned.is_empty() {
            return Ok(String::new());
        }
        let formatted = format_value(self, cleaned, format)?;
        Ok(self.truncate_if_needed(&formatted))
    }

    fn check_for_error(
        &self,
        value: &str,
        format: Option<&str>,
    ) -> Result<Option<Diagnostic>, SchemaError> {
        let cleaned = value.trim();
        if cleaned.is_empty() {
            if !self.is_optional() && !self.can_be_blank() {
                return Ok(Some(Diagnostic::missing_field(self.field_mapping())));
            }
            return Ok(None);
        }
        match self.to_normalized(cleaned, format) {
            Ok(_) => Ok(None),
            Err(ConversionError::Schema(
                SchemaError::InvalidComposite { .. } | SchemaError::UnsupportedFormat { .. },
            )) if matches!(self.element_type, Some(ElementType::Hd | ElementType::Ei)) => {
                let kind = if self.element_type == Some(ElementType::Hd) {
                    DiagnosticKind::UnsupportedHd {
                        format: format.map(str::to_string),
                    }
                } else {
                    DiagnosticKind::UnsupportedEi {
                        format: format.map(str::to_string),
                    }
                };
                Ok(Some(Diagnostic::new(kind, self.field_mapping())))
            }
            Err(ConversionError::Schema(error)) => Err(error),
            Err(error) => Ok(error.to_diagnostic()),
        }
    }

    fn truncate_if_needed(&self, value: &str) -> String {
        match (self.max_length, self.element_type) {
            (Some(max), Some(element_type)) if element_type.is_text_like() => {
                value.chars().take(max).collect()
            }
            _ => value.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_input_is_blank_for_every_type() {
        let element = Element::new("a", ElementType::Date);
        assert_eq!(element.to_normalized("   ", None).unwrap(), "");
        assert_eq!(element.to_formatted("", Some("%m/%d/%Y")).unwrap(), "");
    }

    #[test]
    fn blank_type_always_formats_empty() {
        let element = Element::new("a", ElementType::Blank);
        assert_eq!(element.to_normalized("x", None).unwrap(), "");
        assert_eq!(element.to_formatted("x", None).unwrap(), "");
    }

    #[test]
    fn truncation_only_applies_to_text() {
        let mut text = Element::new("a", ElementType::Text);
        text.max_length = Some(3);
        assert_eq!(text.to_formatted("abcdef", None).unwrap(), "abc");

        let mut number = Element::new("b", ElementType::Number);
        number.max_length = Some(3);
        assert_eq!(number.to_formatted("123456", None).unwrap(), "123456");
    }

    #[test]
    fn nullify_value_swallows_data_errors() {
        let mut element = Element::new("a", ElementType::Date);
        element.nullify_value = true;
        assert_eq!(element.to_normalized("not a date", None).unwrap(), "");
        assert_eq!(element.check_for_error("not a date", None).unwrap(), None);
    }

    #[test]
    fn invalid_pattern_is_configuration() {
        let element = Element::new("a", ElementType::Date);
        assert!(element.to_normalized("20210315", Some("%Q")).unwrap_err().is_configuration());
        assert!(element.check_for_error("20210315", Some("%Q")).is_err());
    }

    #[test]
    fn sub_values_require_composite_type() {
        let element = Element::new("a", ElementType::Text);
        assert!(matches!(
            element.to_normalized_sub_values(&[SubValue::new("a", "x", None)]),
            Err(SchemaError::SubValuesNotSupported { .. })
        ));
        assert_eq!(element.to_normalized_sub_values(&[]).unwrap(), "");
    }
}
