//! Mappers that copy, combine or reshape sibling text values.

use relay_model::{
    Element, ElementAndValue, ElementResult, ElementType, Mapper, SchemaError, SenderContext,
};
use relay_transform::postal::{is_canadian_postal_code, is_us_zip};
use sha2::{Digest, Sha256};

use super::{expect_args, mapper_error, non_empty, value_of, values_in_order};

/// Canonical country code appended by `stripPhoneFormatting`.
const US_PHONE_SUFFIX: &str = ":1:";
const DEFAULT_CONCAT_DELIMITER: &str = ", ";
const DEFAULT_SPLIT_DELIMITER: &str = " ";
const USA: &str = "USA";
const CANADA: &str = "CAN";

/// `middleInitial(name)`: the upper-cased first character of a middle name.
#[derive(Debug, Clone, Copy, Default)]
pub struct MiddleInitialMapper;

impl Mapper for MiddleInitialMapper {
    fn name(&self) -> &'static str {
        "middleInitial"
    }

    fn value_names(&self, _element: &Element, args: &[String]) -> Result<Vec<String>, SchemaError> {
        expect_args(self.name(), args, 1..=1)?;
        Ok(args.to_vec())
    }

    fn apply(
        &self,
        _element: &Element,
        args: &[String],
        values: &[ElementAndValue],
        _sender: Option<&SenderContext>,
    ) -> ElementResult {
        let initial = args
            .first()
            .and_then(|arg| value_of(values, arg))
            .and_then(|name| name.trim().chars().next())
            .map(|c| c.to_uppercase().collect::<String>());
        ElementResult::new(initial)
    }
}

/// `use(a, b, ...)`: the first sibling that has a value.
///
/// A DATETIME copied into a DATE element keeps only its date part.
#[derive(Debug, Clone, Copy, Default)]
pub struct UseMapper;

impl Mapper for UseMapper {
    fn name(&self) -> &'static str {
        "use"
    }

    fn value_names(&self, _element: &Element, args: &[String]) -> Result<Vec<String>, SchemaError> {
        expect_args(self.name(), args, 1..=usize::MAX)?;
        Ok(args.to_vec())
    }

    fn apply(
        &self,
        element: &Element,
        args: &[String],
        values: &[ElementAndValue],
        _sender: Option<&SenderContext>,
    ) -> ElementResult {
        let found = args.iter().find_map(|arg| {
            values
                .iter()
                .find(|value| value.element.name == *arg && !value.value.trim().is_empty())
        });
        let Some(found) = found else {
            return ElementResult::empty();
        };
        let value = if element.element_type == Some(ElementType::Date)
            && found.element.element_type == Some(ElementType::DateTime)
        {
            found.value.chars().take(8).collect()
        } else {
            found.value.clone()
        };
        ElementResult::value(value)
    }
}

/// `useSenderSetting(setting)`: a value taken from the submitting sender.
#[derive(Debug, Clone, Copy, Default)]
pub struct UseSenderSettingMapper;

impl Mapper for UseSenderSettingMapper {
    fn name(&self) -> &'static str {
        "useSenderSetting"
    }

    fn value_names(&self, _element: &Element, args: &[String]) -> Result<Vec<String>, SchemaError> {
        expect_args(self.name(), args, 1..=1)?;
        Ok(Vec::new())
    }

    fn apply(
        &self,
        element: &Element,
        args: &[String],
        _values: &[ElementAndValue],
        sender: Option<&SenderContext>,
    ) -> ElementResult {
        let [setting] = args else {
            return mapper_error(element, "useSenderSetting expects exactly one setting name");
        };
        let Some(sender) = sender else {
            return mapper_error(
                element,
                format!("Cannot read sender setting '{setting}' without a sender"),
            );
        };
        match sender.setting(setting) {
            Some(value) => non_empty(value),
            None => mapper_error(
                element,
                format!("'{setting}' is not a sender setting that useSenderSetting can read"),
            ),
        }
    }
}

/// `concat(a, b, ...)`: present values joined with the element delimiter.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConcatenateMapper;

impl Mapper for ConcatenateMapper {
    fn name(&self) -> &'static str {
        "concat"
    }

    fn value_names(&self, _element: &Element, args: &[String]) -> Result<Vec<String>, SchemaError> {
        expect_args(self.name(), args, 1..=usize::MAX)?;
        Ok(args.to_vec())
    }

    fn apply(
        &self,
        element: &Element,
        args: &[String],
        values: &[ElementAndValue],
        _sender: Option<&SenderContext>,
    ) -> ElementResult {
        let delimiter = element
            .delimiter
            .as_deref()
            .unwrap_or(DEFAULT_CONCAT_DELIMITER);
        let joined = values_in_order(values, args).collect::<Vec<_>>().join(delimiter);
        non_empty(joined)
    }
}

/// `coalesce(a, b, ...)`: the first non-blank value.
#[derive(Debug, Clone, Copy, Default)]
pub struct CoalesceMapper;

impl Mapper for CoalesceMapper {
    fn name(&self) -> &'static str {
        "coalesce"
    }

    fn value_names(&self, _element: &Element, args: &[String]) -> Result<Vec<String>, SchemaError> {
        expect_args(self.name(), args, 1..=usize::MAX)?;
        Ok(args.to_vec())
    }

    fn apply(
        &self,
        _element: &Element,
        args: &[String],
        values: &[ElementAndValue],
        _sender: Option<&SenderContext>,
    ) -> ElementResult {
        ElementResult::new(values_in_order(values, args).next().map(str::to_string))
    }
}

/// `stripPhoneFormatting(phone)`: digits only, as a US canonical number.
#[derive(Debug, Clone, Copy, Default)]
pub struct StripPhoneFormattingMapper;

impl Mapper for StripPhoneFormattingMapper {
    fn name(&self) -> &'static str {
        "stripPhoneFormatting"
    }

    fn value_names(&self, _element: &Element, args: &[String]) -> Result<Vec<String>, SchemaError> {
        expect_args(self.name(), args, 1..=1)?;
        Ok(args.to_vec())
    }

    fn apply(
        &self,
        _element: &Element,
        args: &[String],
        values: &[ElementAndValue],
        _sender: Option<&SenderContext>,
    ) -> ElementResult {
        let Some(phone) = values_in_order(values, args).next() else {
            return ElementResult::empty();
        };
        let digits: String = phone.chars().filter(char::is_ascii_digit).collect();
        if digits.is_empty() {
            return ElementResult::empty();
        }
        ElementResult::value(format!("{digits}{US_PHONE_SUFFIX}"))
    }
}

/// `stripNonNumeric(value)`: keeps digits and decimal points.
#[derive(Debug, Clone, Copy, Default)]
pub struct StripNonNumericMapper;

impl Mapper for StripNonNumericMapper {
    fn name(&self) -> &'static str {
        "stripNonNumeric"
    }

    fn value_names(&self, _element: &Element, args: &[String]) -> Result<Vec<String>, SchemaError> {
        expect_args(self.name(), args, 1..=1)?;
        Ok(args.to_vec())
    }

    fn apply(
        &self,
        _element: &Element,
        args: &[String],
        values: &[ElementAndValue],
        _sender: Option<&SenderContext>,
    ) -> ElementResult {
        let stripped = values_in_order(values, args)
            .next()
            .map(|value| {
                value
                    .chars()
                    .filter(|c| c.is_ascii_digit() || *c == '.')
                    .collect::<String>()
            })
            .unwrap_or_default();
        non_empty(stripped)
    }
}

/// `stripNumeric(value)`: drops digits and trims what is left.
#[derive(Debug, Clone, Copy, Default)]
pub struct StripNumericMapper;

impl Mapper for StripNumericMapper {
    fn name(&self) -> &'static str {
        "stripNumeric"
    }

    fn value_names(&self, _element: &Element, args: &[String]) -> Result<Vec<String>, SchemaError> {
        expect_args(self.name(), args, 1..=1)?;
        Ok(args.to_vec())
    }

    fn apply(
        &self,
        _element: &Element,
        args: &[String],
        values: &[ElementAndValue],
        _sender: Option<&SenderContext>,
    ) -> ElementResult {
        let stripped = values_in_order(values, args)
            .next()
            .map(|value| {
                value
                    .chars()
                    .filter(|c| !c.is_ascii_digit())
                    .collect::<String>()
                    .trim()
                    .to_string()
            })
            .unwrap_or_default();
        non_empty(stripped)
    }
}

fn split_part(
    element: &Element,
    values: &[ElementAndValue],
    source: &str,
    index: &str,
    delimiter: &str,
) -> ElementResult {
    let Ok(index) = index.trim().parse::<usize>() else {
        return mapper_error(element, format!("Split index '{index}' is not a number"));
    };
    let part = value_of(values, source)
        .and_then(|value| value.split(delimiter).nth(index))
        .map(str::trim)
        .unwrap_or_default();
    non_empty(part)
}

/// `split(value, index, delimiter)`: one part of a delimited value; delimiter defaults to a space.
#[derive(Debug, Clone, Copy, Default)]
pub struct SplitMapper;

impl Mapper for SplitMapper {
    fn name(&self) -> &'static str {
        "split"
    }

    fn value_names(&self, _element: &Element, args: &[String]) -> Result<Vec<String>, SchemaError> {
        expect_args(self.name(), args, 2..=3)?;
        Ok(vec![args[0].clone()])
    }

    fn apply(
        &self,
        element: &Element,
        args: &[String],
        values: &[ElementAndValue],
        _sender: Option<&SenderContext>,
    ) -> ElementResult {
        match args {
            [source, index] => split_part(element, values, source, index, DEFAULT_SPLIT_DELIMITER),
            [source, index, delimiter] => split_part(element, values, source, index, delimiter),
            _ => mapper_error(element, "split expects a value, an index and an optional delimiter"),
        }
    }
}

/// `splitByComma(value, index)`
#[derive(Debug, Clone, Copy, Default)]
pub struct SplitByCommaMapper;

impl Mapper for SplitByCommaMapper {
    fn name(&self) -> &'static str {
        "splitByComma"
    }

    fn value_names(&self, _element: &Element, args: &[String]) -> Result<Vec<String>, SchemaError> {
        expect_args(self.name(), args, 2..=2)?;
        Ok(vec![args[0].clone()])
    }

    fn apply(
        &self,
        element: &Element,
        args: &[String],
        values: &[ElementAndValue],
        _sender: Option<&SenderContext>,
    ) -> ElementResult {
        match args {
            [source, index] => split_part(element, values, source, index, ","),
            _ => mapper_error(element, "splitByComma expects a value and an index"),
        }
    }
}

/// `hash(a, b, ...)`: lowercase hex SHA-256 of the concatenated values.
#[derive(Debug, Clone, Copy, Default)]
pub struct HashMapper;

impl Mapper for HashMapper {
    fn name(&self) -> &'static str {
        "hash"
    }

    fn value_names(&self, _element: &Element, args: &[String]) -> Result<Vec<String>, SchemaError> {
        expect_args(self.name(), args, 1..=usize::MAX)?;
        Ok(args.to_vec())
    }

    fn apply(
        &self,
        _element: &Element,
        args: &[String],
        values: &[ElementAndValue],
        _sender: Option<&SenderContext>,
    ) -> ElementResult {
        let concatenated: String = values_in_order(values, args).collect();
        if concatenated.is_empty() {
            return ElementResult::empty();
        }
        ElementResult::value(hex::encode(Sha256::digest(concatenated.as_bytes())))
    }
}

/// `null()`: always blank. Used to suppress a value inherited from a base schema.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullMapper;

impl Mapper for NullMapper {
    fn name(&self) -> &'static str {
        "null"
    }

    fn value_names(&self, _element: &Element, _args: &[String]) -> Result<Vec<String>, SchemaError> {
        Ok(Vec::new())
    }

    fn apply(
        &self,
        _element: &Element,
        _args: &[String],
        _values: &[ElementAndValue],
        _sender: Option<&SenderContext>,
    ) -> ElementResult {
        ElementResult::empty()
    }
}

/// `countryMapper(postal_code)`: the element's own country, else `USA` or `CAN`
/// from the layout of the postal code.
#[derive(Debug, Clone, Copy, Default)]
pub struct CountryMapper;

impl Mapper for CountryMapper {
    fn name(&self) -> &'static str {
        "countryMapper"
    }

    fn value_names(&self, element: &Element, args: &[String]) -> Result<Vec<String>, SchemaError> {
        expect_args(self.name(), args, 1..=1)?;
        Ok(vec![element.name.clone(), args[0].clone()])
    }

    fn apply(
        &self,
        element: &Element,
        args: &[String],
        values: &[ElementAndValue],
        _sender: Option<&SenderContext>,
    ) -> ElementResult {
        if let Some(country) = value_of(values, &element.name) {
            return ElementResult::value(country.trim());
        }
        let country = args
            .first()
            .and_then(|arg| value_of(values, arg))
            .and_then(|postal_code| {
                if is_us_zip(postal_code) {
                    Some(USA)
                } else if is_canadian_postal_code(postal_code) {
                    Some(CANADA)
                } else {
                    None
                }
            });
        ElementResult::new(country.map(str::to_string))
    }
}
