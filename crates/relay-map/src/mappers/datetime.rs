//! Mappers producing datetimes.

use chrono::{DateTime, FixedOffset, TimeDelta, Timelike, Utc};
use relay_model::{Element, ElementAndValue, ElementResult, Mapper, SchemaError, SenderContext};
use relay_transform::date::parse_datetime;
use relay_transform::tokens::{DATETIME_PATTERN, HIGH_PRECISION_DATETIME_PATTERN};
use relay_transform::{LOCAL_TIME_ZONE, convert_positive_offset_to_negative};

use super::{expect_args, mapper_error, value_of};

/// Seconds with fractional part, as read back from an offset datetime.
const OFFSET_INPUT_PATTERN: &str = "%Y%m%d%H%M%S%.f%z";

/// `20210302000006.0000-0600`: chrono has no four-digit fraction specifier.
fn format_offset_datetime(datetime: &DateTime<FixedOffset>) -> String {
    let fraction = datetime.nanosecond() % 1_000_000_000 / 100_000;
    convert_positive_offset_to_negative(&format!(
        "{}.{fraction:04}{}",
        datetime.format("%Y%m%d%H%M%S"),
        datetime.format("%z")
    ))
}

fn parse_offset_input(value: &str) -> Option<DateTime<FixedOffset>> {
    let value = value.trim();
    DateTime::parse_from_str(value, DATETIME_PATTERN)
        .or_else(|_| DateTime::parse_from_str(value, OFFSET_INPUT_PATTERN))
        .ok()
        .or_else(|| parse_datetime(value, None))
}

/// `dateTimeOffset(element, seconds|minutes, amount)`: shifts a datetime sibling.
#[derive(Debug, Clone, Copy, Default)]
pub struct DateTimeOffsetMapper;

impl Mapper for DateTimeOffsetMapper {
    fn name(&self) -> &'static str {
        "dateTimeOffset"
    }

    fn value_names(&self, _element: &Element, args: &[String]) -> Result<Vec<String>, SchemaError> {
        expect_args(self.name(), args, 3..=3)?;
        Ok(vec![args[0].clone()])
    }

    fn apply(
        &self,
        element: &Element,
        args: &[String],
        values: &[ElementAndValue],
        _sender: Option<&SenderContext>,
    ) -> ElementResult {
        let [source, unit, amount] = args else {
            return mapper_error(element, "dateTimeOffset expects an element, a unit and an amount");
        };
        let Some(value) = value_of(values, source) else {
            return ElementResult::empty();
        };
        let Ok(amount) = amount.trim().parse::<i64>() else {
            return mapper_error(element, format!("Offset amount '{amount}' is not a whole number"));
        };
        let delta = match unit.as_str() {
            "seconds" => TimeDelta::try_seconds(amount),
            "minutes" => TimeDelta::try_minutes(amount),
            other => {
                return mapper_error(
                    element,
                    format!("Unsupported offset unit '{other}', expected seconds or minutes"),
                );
            }
        };
        let shifted = parse_offset_input(value)
            .zip(delta)
            .and_then(|(datetime, delta)| datetime.checked_add_signed(delta));
        match shifted {
            Some(datetime) => ElementResult::value(format_offset_datetime(&datetime)),
            None => mapper_error(element, format!("Cannot offset datetime '{value}'")),
        }
    }
}

/// `timestamp()`: the current instant in local time at millisecond precision.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimestampMapper;

impl Mapper for TimestampMapper {
    fn name(&self) -> &'static str {
        "timestamp"
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
        let now = Utc::now().with_timezone(&LOCAL_TIME_ZONE);
        ElementResult::value(now.format(HIGH_PRECISION_DATETIME_PATTERN).to_string())
    }
}
