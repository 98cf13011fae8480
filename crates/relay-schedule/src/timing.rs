//! Batch timing policy and its scheduling arithmetic.
//!
//! A receiver gets `number_per_day` evenly spaced batches, anchored at
//! `initial_time` in the receiver's time zone. Every query is a pure
//! function of the policy and the instant passed in.

use chrono::{DateTime, FixedOffset, NaiveTime, SubsecRound, TimeDelta, TimeZone, Timelike};
use serde::{Deserialize, Serialize};

use crate::error::{Result, TimingError};
use crate::time_zone::UsTimeZone;

pub const SECONDS_PER_DAY: i64 = 24 * 60 * 60;

/// Upper bound for `number_per_day`: one batch a minute.
pub const MAX_NUMBER_PER_DAY: i32 = 24 * 60;

/// How far back [`Timing::batch_in_previous_60_seconds`] looks.
const TRIGGER_WINDOW_SECONDS: i64 = 60;

/// Whether a batch is merged into a single report before sending.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BatchOperation {
    #[default]
    None,
    Merge,
}

/// What to send when a batch is due but holds no reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EmptyOperation {
    #[default]
    None,
    Send,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WhenEmpty {
    pub action: EmptyOperation,
    pub only_once_per_day: bool,
}

/// A receiver's batching policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Timing {
    pub operation: BatchOperation,
    pub number_per_day: i32,
    /// Anchor of the daily schedule, `hh:mm`.
    pub initial_time: String,
    pub time_zone: UsTimeZone,
    pub max_report_count: i32,
    pub when_empty: WhenEmpty,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            operation: BatchOperation::None,
            number_per_day: 1,
            initial_time: "00:00".to_string(),
            time_zone: UsTimeZone::Eastern,
            max_report_count: 100,
            when_empty: WhenEmpty::default(),
        }
    }
}

impl Timing {
    pub fn new(number_per_day: i32, initial_time: &str, time_zone: UsTimeZone) -> Self {
        Self {
            number_per_day,
            initial_time: initial_time.to_string(),
            time_zone,
            ..Self::default()
        }
    }

    /// True when `number_per_day` is in `[1, 1440]`.
    pub fn is_valid(&self) -> bool {
        (1..=MAX_NUMBER_PER_DAY).contains(&self.number_per_day)
    }

    /// Checks every field the scheduling arithmetic depends on.
    pub fn validate(&self) -> Result<()> {
        self.period_seconds()?;
        self.initial_seconds()?;
        Ok(())
    }

    /// Seconds between batches. Any remainder of the day is dropped.
    pub fn period_seconds(&self) -> Result<i64> {
        if !self.is_valid() {
            return Err(TimingError::NumberPerDay(self.number_per_day));
        }
        Ok(SECONDS_PER_DAY / i64::from(self.number_per_day))
    }

    /// Seconds from local midnight to `initial_time`.
    pub fn initial_seconds(&self) -> Result<i64> {
        let text = self.initial_time.trim();
        let time = NaiveTime::parse_from_str(text, "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(text, "%H:%M:%S"))
            .map_err(|_| TimingError::InitialTime(self.initial_time.clone()))?;
        Ok(i64::from(time.num_seconds_from_midnight()))
    }

    /// Seconds since the most recent period boundary at the local time of day
    /// `seconds_of_day`, in `[0, period)`.
    fn seconds_since_boundary(seconds_of_day: i64, initial: i64, period: i64) -> i64 {
        (seconds_of_day - initial + SECONDS_PER_DAY).rem_euclid(period)
    }

    /// The first batch boundary at or after `now + min_duration_seconds`.
    ///
    /// The result is in the receiver's time zone, with whole seconds. An
    /// adjusted instant already on a boundary comes back unchanged.
    ///
    /// # Errors
    ///
    /// Fails if `min_duration_seconds < 1`, the policy is invalid, or the
    /// result falls outside the representable date range.
    pub fn next_time<Z: TimeZone>(
        &self,
        now: &DateTime<Z>,
        min_duration_seconds: i64,
    ) -> Result<DateTime<FixedOffset>> {
        if min_duration_seconds < 1 {
            return Err(TimingError::MinDuration(min_duration_seconds));
        }
        let period = self.period_seconds()?;
        let initial = self.initial_seconds()?;

        let out_of_range = || TimingError::OutOfRange(min_duration_seconds);
        let zoned = TimeDelta::try_seconds(min_duration_seconds)
            .and_then(|delay| now.with_timezone(&self.time_zone.tz()).checked_add_signed(delay))
            .ok_or_else(out_of_range)?
            .trunc_subsecs(0);
        let elapsed = Self::seconds_since_boundary(
            i64::from(zoned.num_seconds_from_midnight()),
            initial,
            period,
        );
        let seconds_left = (period - elapsed).rem_euclid(period);
        let next = zoned
            .checked_add_signed(TimeDelta::seconds(seconds_left))
            .ok_or_else(out_of_range)?
            .fixed_offset();

        tracing::trace!(
            time_zone = %self.time_zone,
            period,
            seconds_left,
            next = %next,
            "computed next batch time"
        );
        Ok(next)
    }

    /// True when a batch boundary fell within the 60 seconds up to and
    /// including `now`.
    pub fn batch_in_previous_60_seconds<Z: TimeZone>(&self, now: &DateTime<Z>) -> Result<bool> {
        let period = self.period_seconds()?;
        let initial = self.initial_seconds()?;
        let zoned = now.with_timezone(&self.time_zone.tz()).trunc_subsecs(0);
        let elapsed = Self::seconds_since_boundary(
            i64::from(zoned.num_seconds_from_midnight()),
            initial,
            period,
        );
        Ok(elapsed < TRIGGER_WINDOW_SECONDS)
    }
}
