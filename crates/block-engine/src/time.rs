//! Clock times expressed as fractional hours.
//!
//! A time of day is a real number of hours since midnight: `9.5` is 09:30 and
//! `13.25` is 13:15. Conversions to minutes truncate, they never round, so
//! `9.99` renders as `09:59`.

use std::fmt;

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

/// Shortest bookable interval, in hours (15 minutes).
pub const MIN_BLOCK_HOURS: f64 = 0.25;

/// Absorbs binary representation error before truncating to whole minutes
/// (`9.1 * 60` is `545.999…` in some operand orders).
const MINUTE_EPSILON: f64 = 1e-9;

/// A validated clock time within a day, `0 <= hours < 24`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct TimeOfDay(f64);

impl TimeOfDay {
    /// Create a time of day from fractional hours.
    ///
    /// # Errors
    /// Returns `EngineError::InvalidCalendar` if `hours` is not finite or falls
    /// outside `[0, 24)`.
    pub fn new(hours: f64) -> Result<Self> {
        if !hours.is_finite() || !(0.0..24.0).contains(&hours) {
            return Err(EngineError::InvalidCalendar(format!(
                "time of day must be within [0, 24), got {hours}"
            )));
        }
        Ok(Self(hours))
    }

    /// The raw fractional hours.
    pub fn hours(self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for TimeOfDay {
    type Error = EngineError;

    fn try_from(hours: f64) -> Result<Self> {
        Self::new(hours)
    }
}

impl From<TimeOfDay> for f64 {
    fn from(time: TimeOfDay) -> f64 {
        time.0
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_hours(self.0))
    }
}

/// Last whole minute of a day.
const LAST_MINUTE: u32 = 24 * 60 - 1;

/// Split fractional hours into whole `(hour, minute)`, truncating seconds.
///
/// Times just short of midnight stay on 23:59; the epsilon must not carry them
/// into the next day.
fn hour_minute(hours: f64) -> (u32, u32) {
    let mut total_minutes = (hours * 60.0 + MINUTE_EPSILON).floor().max(0.0) as u32;
    if hours < 24.0 {
        total_minutes = total_minutes.min(LAST_MINUTE);
    }
    (total_minutes / 60, total_minutes % 60)
}

/// Render fractional hours as zero-padded `HH:MM`.
///
/// The minute component is truncated: `format_hours(9.1)` is `"09:06"` and
/// `format_hours(9.999)` is `"09:59"`.
pub fn format_hours(hours: f64) -> String {
    let (h, m) = hour_minute(hours);
    format!("{h:02}:{m:02}")
}

/// Combine a calendar date with a fractional-hour clock time.
///
/// Seconds are always zero. No timezone is attached; interpreting the result
/// in a zone is left to whoever submits the entry.
///
/// # Errors
/// Returns `EngineError::InvalidCalendar` if `hours` does not name a clock
/// time on that day (negative, or 24:00 and beyond).
pub fn to_instant(date: NaiveDate, hours: f64) -> Result<NaiveDateTime> {
    let invalid = || EngineError::InvalidCalendar(format!("{hours} is not a clock time on {date}"));
    if !hours.is_finite() || hours < 0.0 {
        return Err(invalid());
    }
    let (h, m) = hour_minute(hours);
    date.and_hms_opt(h, m, 0).ok_or_else(invalid)
}

/// Monday through Friday.
pub fn is_weekday(date: NaiveDate) -> bool {
    date.weekday().number_from_monday() <= 5
}

/// Build a date, mapping impossible combinations to `EngineError::InvalidDate`.
pub(crate) fn date_from_parts(year: i32, month: u32, day: u32) -> Result<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day).ok_or(EngineError::InvalidDate { year, month, day })
}
