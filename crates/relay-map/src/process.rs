//! The per-field processing pipeline.
//!
//! For one element in one row: run the mapper if the element wants it,
//! substitute a default if the value is still eligible, and enforce
//! cardinality. Every step reads shared, immutable metadata, so rows can be
//! processed in parallel.

use std::collections::HashMap;

use chrono::{NaiveDate, Utc};
use relay_model::logging::redact_value;
use relay_model::{Diagnostic, Element, ElementAndValue, ElementResult, Schema, SenderContext};
use relay_transform::LOCAL_TIME_ZONE;
use relay_transform::tokens::DATE_PATTERN;

use crate::error::ProcessError;

pub const INDEX_TOKEN: &str = "$index";
pub const CURRENT_DATE_TOKEN: &str = "$currentDate";
pub const MODE_TOKEN_PREFIX: &str = "$mode:";
pub const STRING_TOKEN_PREFIX: &str = "$string:";

/// Marks a mapper argument the pipeline resolves itself instead of looking up a sibling.
const TOKEN_MARKER: char = '$';

/// Resolves a `$` token to a value.
///
/// `$index` is the row's 1-based item index, `$currentDate` is `today` as a
/// canonical date, and `$mode:X` / `$string:X` are the literal `X`. Any other
/// token resolves to a blank value. The returned element is named after the
/// token so mappers can find it among their values.
pub fn tokenize_mapper_value(name: &str, index: usize, today: NaiveDate) -> ElementAndValue {
    let value = if name == INDEX_TOKEN {
        index.to_string()
    } else if name == CURRENT_DATE_TOKEN {
        today.format(DATE_PATTERN).to_string()
    } else if let Some(literal) = name
        .strip_prefix(MODE_TOKEN_PREFIX)
        .or_else(|| name.strip_prefix(STRING_TOKEN_PREFIX))
    {
        literal.to_string()
    } else {
        String::new()
    };
    ElementAndValue::new(Element::named(name), value)
}

/// Today's date where reports are processed.
fn today() -> NaiveDate {
    Utc::now().with_timezone(&LOCAL_TIME_ZONE).date_naive()
}

/// Values for the mapper's `value_names`.
///
/// Tokens are always passed, even when they resolve to blank. Siblings are
/// passed only when they are in `schema` and have a non-blank value.
fn resolve_mapper_values(
    names: &[String],
    all_values: &HashMap<String, String>,
    schema: &Schema,
    item_index: usize,
    today: NaiveDate,
) -> Vec<ElementAndValue> {
    names
        .iter()
        .filter_map(|name| {
            if name.contains(TOKEN_MARKER) {
                return Some(tokenize_mapper_value(name, item_index, today));
            }
            let element = schema.find_element(name)?;
            let value = all_values.get(name).filter(|value| !value.trim().is_empty())?;
            Some(ElementAndValue::new(element.clone(), value.clone()))
        })
        .collect()
}

/// Adds mapper diagnostics to the element result.
///
/// Optional elements only ever get warnings. A required element keeps mapper
/// errors as errors; if the mapper reported no errors, its warnings are
/// raised to errors.
fn merge_mapper_diagnostics(element: &Element, result: &mut ElementResult, mapped: ElementResult) {
    if element.is_optional() {
        for diagnostic in mapped.errors.into_iter().chain(mapped.warnings) {
            result.push_warning(diagnostic);
        }
    } else if !mapped.errors.is_empty() {
        result.errors.extend(mapped.errors);
        result.warnings.extend(mapped.warnings);
    } else {
        for diagnostic in mapped.warnings {
            result.push_error(diagnostic);
        }
    }
}

/// Computes the value of `element` for one row.
///
/// `all_values` holds the row's raw values by element name, `schema` is the
/// element's owning schema (used to resolve mapper arguments), and
/// `default_overrides` are caller-supplied defaults that take precedence over
/// the element's own default.
///
/// # Errors
///
/// Returns [`ProcessError::InvalidItemIndex`] for an item index of 0 and
/// [`ProcessError::Mapper`] when the element's mapper rejects its arguments.
pub fn process_value(
    element: &Element,
    all_values: &HashMap<String, String>,
    schema: &Schema,
    default_overrides: &HashMap<String, String>,
    item_index: usize,
    sender: Option<&SenderContext>,
) -> Result<ElementResult, ProcessError> {
    process_value_on(
        element,
        all_values,
        schema,
        default_overrides,
        item_index,
        sender,
        today(),
    )
}

/// [`process_value`] with an explicit date for the `$currentDate` token.
pub fn process_value_on(
    element: &Element,
    all_values: &HashMap<String, String>,
    schema: &Schema,
    default_overrides: &HashMap<String, String>,
    item_index: usize,
    sender: Option<&SenderContext>,
    today: NaiveDate,
) -> Result<ElementResult, ProcessError> {
    if item_index == 0 {
        return Err(ProcessError::InvalidItemIndex(item_index));
    }
    let mut value = all_values.get(&element.name).cloned().unwrap_or_default();
    let mut result = ElementResult::empty();

    if element.use_mapper(Some(&value))
        && let Some(mapper) = element.mapper_ref.as_ref()
    {
        let args = element.mapper_args.as_deref().unwrap_or_default();
        let names = mapper
            .value_names(element, args)
            .map_err(|source| ProcessError::Mapper {
                element: element.name.clone(),
                source,
            })?;
        let values = resolve_mapper_values(&names, all_values, schema, item_index, today);
        let mapped = mapper.apply(element, args, &values, sender);
        if let Some(mapped_value) = mapped.value.as_deref().filter(|v| !v.trim().is_empty()) {
            tracing::trace!(
                element = %element.name,
                mapper = mapper.name(),
                value = redact_value(mapped_value),
                "mapper produced value"
            );
            value = mapped_value.to_string();
        }
        merge_mapper_diagnostics(element, &mut result, mapped);
    }

    if element.use_default(Some(&value)) {
        value = if let Some(default) = default_overrides.get(&element.name) {
            default.clone()
        } else if let Some(default) = element.default.as_deref().filter(|d| !d.trim().is_empty()) {
            default.to_string()
        } else {
            if value.trim().is_empty() && !element.is_optional() {
                result.push_error(Diagnostic::missing_field(element.field_mapping()));
            }
            String::new()
        };
    }

    result.value = Some(value);
    Ok(result)
}
