//! Built-in mappers.
//!
//! Each mapper is a unit struct implementing [`Mapper`]. Mappers receive the
//! resolved sibling values keyed by element name; special `$` tokens arrive
//! as values whose element carries the token as its name.

mod conditional;
mod datetime;
mod lookup;
mod text;

use std::ops::RangeInclusive;

use relay_model::{Diagnostic, Element, ElementAndValue, ElementResult, SchemaError, argument_error};

pub use conditional::{
    IfNotPresentMapper, IfNpiMapper, IfPresentMapper, IfThenElseMapper, is_valid_npi,
};
pub use datetime::{DateTimeOffsetMapper, TimestampMapper};
pub use lookup::{LookupMapper, LookupSenderValuesetsMapper, NpiLookupMapper, ZipCodeToCountyMapper};
pub use text::{
    CoalesceMapper, ConcatenateMapper, CountryMapper, HashMapper, MiddleInitialMapper, NullMapper, SplitByCommaMapper,
    SplitMapper, StripNonNumericMapper, StripNumericMapper, StripPhoneFormattingMapper, UseMapper,
    UseSenderSettingMapper,
};

/// Value of the named sibling, if it was resolved to something non-blank.
pub(crate) fn value_of<'a>(values: &'a [ElementAndValue], name: &str) -> Option<&'a str> {
    values
        .iter()
        .find(|value| value.element.name == name)
        .map(|value| value.value.as_str())
        .filter(|value| !value.trim().is_empty())
}

/// Non-blank values in argument order.
pub(crate) fn values_in_order<'a>(
    values: &'a [ElementAndValue],
    args: &'a [String],
) -> impl Iterator<Item = &'a str> + 'a {
    args.iter().filter_map(move |arg| value_of(values, arg))
}

pub(crate) fn expect_args(
    mapper: &str,
    args: &[String],
    count: RangeInclusive<usize>,
) -> Result<(), SchemaError> {
    if count.contains(&args.len()) {
        return Ok(());
    }
    let expected = if count.start() == count.end() {
        format!("{}", count.start())
    } else if *count.end() == usize::MAX {
        format!("at least {}", count.start())
    } else {
        format!("{} to {}", count.start(), count.end())
    };
    Err(argument_error(
        mapper,
        format!("expected {expected} arguments, got {}", args.len()),
    ))
}

/// A result carrying one mapper error for `element`.
pub(crate) fn mapper_error(element: &Element, message: impl Into<String>) -> ElementResult {
    ElementResult::empty().error(Diagnostic::mapper(element.field_mapping(), message))
}

/// Wraps an optional value, treating an empty string as no value.
pub(crate) fn non_empty(value: impl Into<String>) -> ElementResult {
    let value = value.into();
    if value.is_empty() {
        ElementResult::empty()
    } else {
        ElementResult::value(value)
    }
}
