//! Date and datetime parsing.
//!
//! Incoming dates come in many shapes. Each of [`parse_date`] and
//! [`parse_datetime`] walks an ordered list of strategies and returns the
//! first that succeeds. The order matters: ambiguous values such as
//! `03/02/2022` resolve differently depending on which pattern is tried
//! first, so strategies must not be reordered.
//!
//! Values without an offset are placed in [`LOCAL_TIME_ZONE`].

use std::fmt::{self, Write};
use std::sync::LazyLock;

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, TimeZone};
use chrono_tz::Tz;
use regex::Regex;

use crate::tokens::{
    DATE_PATTERN, DATE_PATTERN_MMDDYYYY, DATETIME_PATTERN, MANUALLY_ENTERED_DATE_FORMATS,
    VARIABLE_DATE_PATTERNS, VARIABLE_LOCAL_PATTERNS, VARIABLE_OFFSET_PATTERNS,
};

/// Zone used for dates and local datetimes that carry no offset (US Central).
pub const LOCAL_TIME_ZONE: Tz = chrono_tz::America::Chicago;

/// A trailing all-zero offset written with `+`.
static POSITIVE_ZERO_OFFSET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^.+?\+(00|0000|00:00)$").expect("Invalid zero offset regex"));

/// Best parse of a free-form date or datetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Temporal {
    Date(NaiveDate),
    Local(NaiveDateTime),
    Offset(DateTime<FixedOffset>),
}

impl Temporal {
    /// Calendar date as written (offset datetimes keep their own local date).
    pub fn date(&self) -> NaiveDate {
        match self {
            Temporal::Date(date) => *date,
            Temporal::Local(datetime) => datetime.date(),
            Temporal::Offset(datetime) => datetime.date_naive(),
        }
    }

    /// Resolves to an instant, placing dates and local times in [`LOCAL_TIME_ZONE`].
    pub fn to_offset(&self) -> Option<DateTime<FixedOffset>> {
        match self {
            Temporal::Date(date) => in_local_zone(date.and_time(NaiveTime::MIN)),
            Temporal::Local(datetime) => in_local_zone(*datetime),
            Temporal::Offset(datetime) => Some(*datetime),
        }
    }

    /// Formats with a strftime pattern. Dates are formatted at the start of the day.
    ///
    /// Returns `None` if the pattern needs fields the value does not have
    /// (for example `%z` on a local datetime).
    pub fn format(&self, pattern: &str) -> Option<String> {
        match self {
            Temporal::Date(date) => write_formatted(date.and_time(NaiveTime::MIN).format(pattern)),
            Temporal::Local(datetime) => write_formatted(datetime.format(pattern)),
            Temporal::Offset(datetime) => write_formatted(datetime.format(pattern)),
        }
    }
}

/// True if `pattern` is a well-formed strftime pattern.
pub fn is_valid_pattern(pattern: &str) -> bool {
    !StrftimeItems::new(pattern).any(|item| matches!(item, Item::Error))
}

fn write_formatted(value: impl fmt::Display) -> Option<String> {
    let mut out = String::new();
    write!(out, "{value}").ok()?;
    Some(out)
}

fn in_local_zone(local: NaiveDateTime) -> Option<DateTime<FixedOffset>> {
    LOCAL_TIME_ZONE
        .from_local_datetime(&local)
        .earliest()
        // Local times inside a DST gap move forward by the gap.
        .or_else(|| {
            LOCAL_TIME_ZONE
                .from_local_datetime(&(local + TimeDelta::hours(1)))
                .earliest()
        })
        .map(|datetime| datetime.fixed_offset())
}

/// Parses a date, also accepting a datetime pattern whose time part is then dropped.
fn parse_naive_date(value: &str, pattern: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, pattern).ok().or_else(|| {
        NaiveDateTime::parse_from_str(value, pattern)
            .ok()
            .map(|datetime| datetime.date())
    })
}

/// Parses against the catch-all set of date, datetime, offset and instant forms.
pub fn parse_variable(value: &str) -> Option<Temporal> {
    if let Some(datetime) = VARIABLE_OFFSET_PATTERNS
        .iter()
        .find_map(|pattern| DateTime::parse_from_str(value, pattern).ok())
    {
        return Some(Temporal::Offset(datetime));
    }
    if let Some(datetime) = VARIABLE_LOCAL_PATTERNS
        .iter()
        .find_map(|pattern| NaiveDateTime::parse_from_str(value, pattern).ok())
    {
        return Some(Temporal::Local(datetime));
    }
    if let Ok(datetime) = DateTime::parse_from_rfc3339(value) {
        return Some(Temporal::Offset(datetime));
    }
    VARIABLE_DATE_PATTERNS
        .iter()
        .find_map(|pattern| NaiveDate::parse_from_str(value, pattern).ok())
        .map(Temporal::Date)
}

/// Tries the hand-entered date formats in order, after replacing `-` with `/`.
pub fn parse_manual_date(value: &str) -> Option<NaiveDate> {
    let cleaned = value.replace('-', "/");
    MANUALLY_ENTERED_DATE_FORMATS
        .iter()
        .find_map(|pattern| parse_naive_date(&cleaned, pattern))
}

type DateStrategy = fn(&str, Option<&str>) -> Option<NaiveDate>;

const DATE_STRATEGIES: &[(&str, DateStrategy)] = &[
    ("iso", |value, _| NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()),
    ("format", |value, format| {
        parse_naive_date(value, format.unwrap_or(DATE_PATTERN))
    }),
    ("manual", |value, _| parse_manual_date(value)),
    ("variable", |value, _| parse_variable(value).map(|t| t.date())),
];

/// Parses a date from any accepted input form.
///
/// `format` is an optional strftime pattern tried after ISO `yyyy-mm-dd`.
pub fn parse_date(value: &str, format: Option<&str>) -> Option<NaiveDate> {
    DATE_STRATEGIES.iter().find_map(|(name, strategy)| {
        let date = strategy(value, format)?;
        tracing::trace!(strategy = *name, "parsed date");
        Some(date)
    })
}

type DateTimeStrategy = fn(&str, Option<&str>) -> Option<DateTime<FixedOffset>>;

const DATETIME_STRATEGIES: &[(&str, DateTimeStrategy)] = &[
    ("iso", |value, _| {
        // seconds are optional, and so is the colon in the offset
        DateTime::parse_from_rfc3339(value)
            .or_else(|_| DateTime::parse_from_str(value, "%Y-%m-%dT%H:%M%#z"))
            .or_else(|_| match value.strip_suffix(['Z', 'z']) {
                Some(utc) => DateTime::parse_from_str(&format!("{utc}+00:00"), "%Y-%m-%dT%H:%M%:z"),
                None => DateTime::parse_from_str(value, "%Y-%m-%dT%H:%M%:z"),
            })
            .ok()
    }),
    ("format", |value, format| {
        DateTime::parse_from_str(value, format.unwrap_or(DATETIME_PATTERN)).ok()
    }),
    ("canonical-date", |value, _| {
        NaiveDate::parse_from_str(value, DATE_PATTERN)
            .ok()
            .and_then(|date| Temporal::Date(date).to_offset())
    }),
    ("format-local", |value, format| {
        let pattern = format.unwrap_or(DATETIME_PATTERN);
        let local = NaiveDateTime::parse_from_str(value, pattern)
            .map(Temporal::Local)
            .or_else(|_| NaiveDate::parse_from_str(value, pattern).map(Temporal::Date))
            .ok()?;
        local.to_offset()
    }),
    ("mmddyyyy", |value, _| {
        NaiveDate::parse_from_str(value, DATE_PATTERN_MMDDYYYY)
            .ok()
            .and_then(|date| Temporal::Date(date).to_offset())
    }),
    ("variable", |value, _| {
        parse_variable(value).and_then(|temporal| temporal.to_offset())
    }),
];

/// Parses an instant from any accepted input form.
///
/// Dates resolve to midnight and local datetimes to [`LOCAL_TIME_ZONE`].
pub fn parse_datetime(value: &str, format: Option<&str>) -> Option<DateTime<FixedOffset>> {
    DATETIME_STRATEGIES.iter().find_map(|(name, strategy)| {
        let datetime = strategy(value, format)?;
        tracing::trace!(strategy = *name, "parsed datetime");
        Some(datetime)
    })
}

/// Canonical date string, e.g. `20210315`.
pub fn format_canonical_date(date: NaiveDate) -> String {
    date.format(DATE_PATTERN).to_string()
}

/// Canonical datetime string with a zero offset written as `-0000`.
pub fn format_canonical_datetime(datetime: &DateTime<FixedOffset>) -> String {
    convert_positive_offset_to_negative(&datetime.format(DATETIME_PATTERN).to_string())
}

/// Rewrites a trailing `+00`, `+0000` or `+00:00` offset with a leading `-`.
///
/// Any other value, including non-zero offsets, is returned unchanged.
pub fn convert_positive_offset_to_negative(value: &str) -> String {
    let Some(offset) = POSITIVE_ZERO_OFFSET
        .captures(value)
        .and_then(|captures| captures.get(1))
    else {
        return value.to_string();
    };
    // the capture is always preceded by the '+'
    let sign = offset.start() - 1;
    format!("{}-{}", &value[..sign], offset.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
    }

    #[test]
    fn date_strategies_in_order() {
        assert_eq!(parse_date("2021-03-15", None), Some(ymd(2021, 3, 15)));
        assert_eq!(parse_date("20210315", None), Some(ymd(2021, 3, 15)));
        assert_eq!(parse_date("15.03.2021", Some("%d.%m.%Y")), Some(ymd(2021, 3, 15)));
        assert_eq!(parse_date("3/5/2021", None), Some(ymd(2021, 3, 5)));
        assert_eq!(parse_date("03-15-2021", None), Some(ymd(2021, 3, 15)));
        assert_eq!(parse_date("03152021", None), Some(ymd(2021, 3, 15)));
        assert_eq!(parse_date("2021/3/15 9:30", None), Some(ymd(2021, 3, 15)));
        assert_eq!(parse_date("202103151230-0500", None), Some(ymd(2021, 3, 15)));
        assert_eq!(parse_date("2021-03-15 12:30:45.123", None), Some(ymd(2021, 3, 15)));
        assert_eq!(parse_date("13/45/2021", None), None);
        assert_eq!(parse_date("not a date", None), None);
    }

    #[test]
    fn ambiguous_dates_read_month_first() {
        assert_eq!(parse_date("03/02/2022", None), Some(ymd(2022, 3, 2)));
        assert_eq!(parse_date("13/02/2022", None), None);
    }

    #[test]
    fn datetime_keeps_explicit_offsets() {
        let datetime = parse_datetime("2021-03-15T12:30:00+05:00", None).expect("iso datetime");
        assert_eq!(format_canonical_datetime(&datetime), "202103151230+0500");

        let datetime = parse_datetime("202103151230-0400", None).expect("canonical datetime");
        assert_eq!(format_canonical_datetime(&datetime), "202103151230-0400");

        for value in ["2021-03-15T12:30Z", "2021-03-15T12:30:00Z"] {
            let datetime = parse_datetime(value, None).expect("utc datetime");
            assert_eq!(datetime.offset().local_minus_utc(), 0);
            assert_eq!(datetime.naive_utc().to_string(), "2021-03-15 12:30:00");
        }
        let datetime = parse_datetime("2021-03-15T12:30+05:00", None).expect("minute precision");
        assert_eq!(format_canonical_datetime(&datetime), "202103151230+0500");
    }

    #[test]
    fn datetime_places_local_values_in_central_time() {
        let winter = parse_datetime("20210115", None).expect("canonical date");
        assert_eq!(format_canonical_datetime(&winter), "202101150000-0600");

        let summer = parse_datetime("07152021", None).expect("mmddyyyy date");
        assert_eq!(format_canonical_datetime(&summer), "202107150000-0500");

        let local = parse_datetime("2021-01-15 08:45:00", None).expect("local datetime");
        assert_eq!(format_canonical_datetime(&local), "202101150845-0600");
    }

    #[test]
    fn datetime_with_explicit_local_format() {
        let datetime =
            parse_datetime("01/15/2021 08:45", Some("%m/%d/%Y %H:%M")).expect("formatted local");
        assert_eq!(format_canonical_datetime(&datetime), "202101150845-0600");
        assert!(parse_datetime("garbage", None).is_none());
    }

    #[test]
    fn zero_offset_sign_flip() {
        assert_eq!(convert_positive_offset_to_negative("202103151230+0000"), "202103151230-0000");
        assert_eq!(convert_positive_offset_to_negative("2021-03-15T12:30+00:00"), "2021-03-15T12:30-00:00");
        assert_eq!(convert_positive_offset_to_negative("202103151230+00"), "202103151230-00");
        assert_eq!(convert_positive_offset_to_negative("202103151230+0500"), "202103151230+0500");
        assert_eq!(convert_positive_offset_to_negative("202103151230-0500"), "202103151230-0500");
        assert_eq!(convert_positive_offset_to_negative("+0000"), "+0000");
    }

    #[test]
    fn pattern_validation() {
        assert!(is_valid_pattern("%m/%d/%Y"));
        assert!(!is_valid_pattern("%Q"));
    }

    #[test]
    fn temporal_formatting_reports_missing_fields() {
        let date = Temporal::Date(ymd(2021, 3, 15));
        assert_eq!(date.format("%m/%d/%Y").as_deref(), Some("03/15/2021"));
        assert_eq!(date.format("%Y%m%d%H%M").as_deref(), Some("202103150000"));
        assert_eq!(date.format("%Y%m%d%z"), None);
    }
}
