//! Mappers that choose a value based on the presence or content of siblings.

use std::cmp::Ordering;

use relay_model::{
    Element, ElementAndValue, ElementResult, Mapper, SchemaError, SenderContext, argument_error,
};

use super::{expect_args, mapper_error, value_of};

const MODE_PREFIX: &str = "$mode:";
const STRING_PREFIX: &str = "$string:";
const LITERAL_MODE: &str = "literal";
const LOOKUP_MODE: &str = "lookup";

const OPERATORS: &[&str] = &["==", "!=", "<", "<=", ">", ">="];

/// `ifPresent(element, value)`: `value` when `element` has a value, blank otherwise.
#[derive(Debug, Clone, Copy, Default)]
pub struct IfPresentMapper;

impl Mapper for IfPresentMapper {
    fn name(&self) -> &'static str {
        "ifPresent"
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
        let [condition, value] = args else {
            return mapper_error(element, "ifPresent expects an element name and a value");
        };
        match value_of(values, condition) {
            Some(_) => ElementResult::value(value.clone()),
            None => ElementResult::empty(),
        }
    }
}

/// `ifNotPresent($mode:literal|lookup, $string:value|element, condition...)`
///
/// Produces a value only when every condition element is blank. In literal
/// mode the value is the text after `$string:`; in lookup mode it is the
/// value of the named element.
#[derive(Debug, Clone, Copy, Default)]
pub struct IfNotPresentMapper;

impl Mapper for IfNotPresentMapper {
    fn name(&self) -> &'static str {
        "ifNotPresent"
    }

    fn value_names(&self, _element: &Element, args: &[String]) -> Result<Vec<String>, SchemaError> {
        expect_args(self.name(), args, 2..=usize::MAX)?;
        if !args[0].starts_with(MODE_PREFIX) {
            return Err(argument_error(
                self.name(),
                format!("first argument must start with '{MODE_PREFIX}'"),
            ));
        }
        Ok(args.to_vec())
    }

    fn apply(
        &self,
        element: &Element,
        args: &[String],
        values: &[ElementAndValue],
        _sender: Option<&SenderContext>,
    ) -> ElementResult {
        let [mode, source, conditions @ ..] = args else {
            return mapper_error(element, "ifNotPresent expects a mode and a value");
        };
        if conditions.iter().any(|name| value_of(values, name).is_some()) {
            return ElementResult::empty();
        }
        match mode.strip_prefix(MODE_PREFIX) {
            Some(LITERAL_MODE) => {
                let literal = source.strip_prefix(STRING_PREFIX).unwrap_or(source);
                ElementResult::value(literal)
            }
            Some(LOOKUP_MODE) => ElementResult::new(value_of(values, source).map(str::to_string)),
            _ => {
                tracing::debug!(mode = %mode, element = %element.name, "unknown ifNotPresent mode");
                ElementResult::empty()
            }
        }
    }
}

/// An operand is the value of the element it names, or the argument itself as a literal.
fn operand<'a>(values: &'a [ElementAndValue], arg: &'a str) -> &'a str {
    value_of(values, arg).unwrap_or(arg)
}

fn compare(left: &str, right: &str) -> Option<Ordering> {
    match (left.trim().parse::<f64>(), right.trim().parse::<f64>()) {
        (Ok(left), Ok(right)) => left.partial_cmp(&right),
        _ => Some(left.cmp(right)),
    }
}

/// `ifThenElse(operator, left, right, then, else)`
///
/// Compares numerically when both operands are numbers and as text otherwise.
/// The operator may itself be the name of an element holding the operator.
#[derive(Debug, Clone, Copy, Default)]
pub struct IfThenElseMapper;

impl Mapper for IfThenElseMapper {
    fn name(&self) -> &'static str {
        "ifThenElse"
    }

    fn value_names(&self, _element: &Element, args: &[String]) -> Result<Vec<String>, SchemaError> {
        expect_args(self.name(), args, 5..=5)?;
        let mut names = Vec::with_capacity(5);
        if !OPERATORS.contains(&args[0].as_str()) {
            names.push(args[0].clone());
        }
        names.extend_from_slice(&args[1..]);
        Ok(names)
    }

    fn apply(
        &self,
        element: &Element,
        args: &[String],
        values: &[ElementAndValue],
        _sender: Option<&SenderContext>,
    ) -> ElementResult {
        let [operator, left, right, then, otherwise] = args else {
            return mapper_error(
                element,
                "ifThenElse expects an operator, two operands, a then and an else",
            );
        };
        let operator = operand(values, operator);
        let ordering = compare(operand(values, left), operand(values, right));
        let matched = match operator {
            "==" => ordering == Some(Ordering::Equal),
            "!=" => ordering != Some(Ordering::Equal),
            "<" => ordering == Some(Ordering::Less),
            "<=" => matches!(ordering, Some(Ordering::Less | Ordering::Equal)),
            ">" => ordering == Some(Ordering::Greater),
            ">=" => matches!(ordering, Some(Ordering::Greater | Ordering::Equal)),
            other => {
                return mapper_error(element, format!("Unsupported ifThenElse operator '{other}'"));
            }
        };
        let chosen = if matched { then } else { otherwise };
        ElementResult::value(operand(values, chosen))
    }
}

/// Luhn sum contributed by the `80840` card issuer prefix every NPI carries.
const NPI_PREFIX_SUM: u32 = 24;

/// True if `value` is a ten-digit National Provider Identifier with a valid Luhn check digit.
pub fn is_valid_npi(value: &str) -> bool {
    let value = value.trim();
    if value.len() != 10 || !value.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    let digits: Vec<u32> = value.bytes().map(|b| u32::from(b - b'0')).collect();
    let (base, check) = digits.split_at(9);
    let sum: u32 = base
        .iter()
        .rev()
        .enumerate()
        .map(|(position, digit)| {
            if position % 2 == 0 {
                let doubled = digit * 2;
                doubled / 10 + doubled % 10
            } else {
                *digit
            }
        })
        .sum::<u32>()
        + NPI_PREFIX_SUM;
    (10 - sum % 10) % 10 == check[0]
}

/// `ifNPI(element, then, else?)`: `then` when `element` holds a valid NPI, else `else`.
#[derive(Debug, Clone, Copy, Default)]
pub struct IfNpiMapper;

impl Mapper for IfNpiMapper {
    fn name(&self) -> &'static str {
        "ifNPI"
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
        let (source, then, otherwise) = match args {
            [source, then] => (source, then, None),
            [source, then, otherwise] => (source, then, Some(otherwise)),
            _ => return mapper_error(element, "ifNPI expects an element name and one or two values"),
        };
        if value_of(values, source).is_some_and(is_valid_npi) {
            ElementResult::value(then.clone())
        } else {
            ElementResult::new(otherwise.cloned())
        }
    }
}
