//! Standing-meeting expansion -- one entry per meeting per weekday of a period.
//!
//! The weekday dates come from an RFC 5545 rule
//! (`FREQ=DAILY;BYDAY=MO,TU,WE,TH,FR`) expanded with the `rrule` crate over the
//! inclusive period, so the recurrence logic stays in one well-tested place.

use chrono::{NaiveDate, Utc};
use rrule::RRuleSet;
use tracing::info;

use crate::allocator::ScheduledEntry;
use crate::calendar::ClientCalendar;
use crate::error::{EngineError, Result};
use crate::schedule::SchedulePeriod;

const WEEKDAY_RULE: &str = "FREQ=DAILY;BYDAY=MO,TU,WE,TH,FR";

/// Every Monday-to-Friday date between `first` and `last`, inclusive.
///
/// # Errors
/// Returns `EngineError::InvalidRule` if the rule cannot be built for the
/// range (for instance when `last` precedes `first`).
pub fn weekdays_between(first: NaiveDate, last: NaiveDate) -> Result<Vec<NaiveDate>> {
    if last < first {
        return Err(EngineError::InvalidRule(format!(
            "range ends on {last} before it starts on {first}"
        )));
    }

    // The rrule crate requires UNTIL to be in UTC ("Z") when DTSTART is UTC.
    let rrule_text = format!(
        "DTSTART;TZID=UTC:{}\nRRULE:{};UNTIL={}Z",
        first.format("%Y%m%dT000000"),
        WEEKDAY_RULE,
        last.format("%Y%m%dT235959"),
    );

    let rrule_set: RRuleSet = rrule_text
        .parse()
        .map_err(|e| EngineError::InvalidRule(format!("{}", e)))?;

    // One instance per day at most, so the day count bounds the expansion.
    let max_count = u16::try_from((last - first).num_days() + 1).unwrap_or(u16::MAX);

    Ok(rrule_set
        .all(max_count)
        .dates
        .into_iter()
        .map(|dt| dt.with_timezone(&Utc).date_naive())
        .collect())
}

/// Emit one entry per standing meeting for every weekday of `period`.
///
/// Entries use the meeting's own start and end on each date and are grouped
/// by meeting, then by date. Weekends produce nothing.
///
/// # Errors
/// Returns `EngineError::InvalidDate` for a period naming impossible dates,
/// and `EngineError::InvalidRule` if the weekday rule cannot be expanded.
pub fn expand_meetings(
    calendar: &ClientCalendar,
    period: &SchedulePeriod,
) -> Result<Vec<ScheduledEntry>> {
    if calendar.meetings.is_empty() {
        return Ok(Vec::new());
    }

    let dates = weekdays_between(period.first_date()?, period.last_date()?)?;
    let mut entries = Vec::with_capacity(dates.len() * calendar.meetings.len());

    for meeting in &calendar.meetings {
        for date in &dates {
            entries.push(ScheduledEntry::on_date(
                *date,
                &meeting.description,
                meeting.start.hours(),
                meeting.end.hours(),
                calendar,
            )?);
        }
        info!(
            client = %calendar.name,
            meeting = %meeting.description,
            entries = dates.len(),
            "expanded standing meeting"
        );
    }

    Ok(entries)
}
