//! Client calendars and the periods of a day they make unavailable.
//!
//! A [`ClientCalendar`] describes one client's daily envelope: the work
//! window, the lunch break, and the standing meetings that recur every
//! weekday. [`blocked_periods`] turns it into the concrete list of busy
//! intervals for one date.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{EngineError, Result};
use crate::time::{format_hours, is_weekday, TimeOfDay};

/// A half-open `[start, end)` span of clock time within a day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalendarWindow {
    pub start: TimeOfDay,
    pub end: TimeOfDay,
}

impl CalendarWindow {
    /// Build a window, rejecting `start >= end`.
    ///
    /// # Errors
    /// Returns `EngineError::InvalidCalendar` when either bound is not a valid
    /// time of day or the window is empty.
    pub fn new(start: f64, end: f64) -> Result<Self> {
        let window = Self {
            start: TimeOfDay::new(start)?,
            end: TimeOfDay::new(end)?,
        };
        window.validate("window")?;
        Ok(window)
    }

    fn validate(&self, what: &str) -> Result<()> {
        if self.start >= self.end {
            return Err(EngineError::InvalidCalendar(format!(
                "{what} starts at {} but ends at {}",
                self.start, self.end
            )));
        }
        Ok(())
    }

    /// Length of the window in hours.
    pub fn duration_hours(&self) -> f64 {
        self.end.hours() - self.start.hours()
    }
}

/// A standing meeting held every weekday at the same time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecurringMeeting {
    pub description: String,
    pub start: TimeOfDay,
    pub end: TimeOfDay,
}

impl RecurringMeeting {
    /// # Errors
    /// Returns `EngineError::InvalidCalendar` when the times are invalid or
    /// `start >= end`.
    pub fn new(description: impl Into<String>, start: f64, end: f64) -> Result<Self> {
        let window = CalendarWindow::new(start, end)?;
        Ok(Self {
            description: description.into(),
            start: window.start,
            end: window.end,
        })
    }
}

/// Scheduling configuration for one client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientCalendar {
    /// Client display name, used in logs only.
    pub name: String,
    /// Daily work envelope. Tasks are only placed inside it.
    pub work: CalendarWindow,
    /// Daily lunch break, blocked every day including weekends.
    pub lunch: CalendarWindow,
    /// Standing meetings, blocked Monday through Friday.
    #[serde(default)]
    pub meetings: Vec<RecurringMeeting>,
    /// Identifier of the project every entry is booked against.
    pub project_id: String,
    /// Identifier of the project task every entry is booked against.
    pub task_id: String,
}

impl ClientCalendar {
    /// Check every window of the calendar.
    ///
    /// Lunch or meetings reaching outside the work window are accepted; the
    /// block computation clips them naturally.
    ///
    /// # Errors
    /// Returns `EngineError::InvalidCalendar` naming the first empty or
    /// inverted window.
    pub fn validate(&self) -> Result<()> {
        self.work.validate("work window")?;
        self.lunch.validate("lunch")?;
        for meeting in &self.meetings {
            CalendarWindow {
                start: meeting.start,
                end: meeting.end,
            }
            .validate(&format!("meeting '{}'", meeting.description))?;
        }
        Ok(())
    }

    /// Meetings held on `date`: all of them on weekdays, none on weekends.
    pub fn meetings_on(&self, date: NaiveDate) -> &[RecurringMeeting] {
        if is_weekday(date) {
            &self.meetings
        } else {
            &[]
        }
    }
}

/// Why a period is unavailable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeriodKind {
    Lunch,
    Meeting,
}

/// An interval of a day that cannot receive task entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockedPeriod {
    pub kind: PeriodKind,
    /// Fractional hours.
    pub start: f64,
    /// Fractional hours.
    pub end: f64,
    /// Meeting description; `None` for lunch.
    pub description: Option<String>,
}

/// Every blocked period of `date`, sorted by start time.
///
/// Lunch is always present. Meetings only appear on weekdays. Periods that
/// start at the same time keep declaration order, lunch first.
pub fn blocked_periods(date: NaiveDate, calendar: &ClientCalendar) -> Vec<BlockedPeriod> {
    let mut periods = vec![BlockedPeriod {
        kind: PeriodKind::Lunch,
        start: calendar.lunch.start.hours(),
        end: calendar.lunch.end.hours(),
        description: None,
    }];

    periods.extend(
        calendar
            .meetings_on(date)
            .iter()
            .map(|meeting| BlockedPeriod {
                kind: PeriodKind::Meeting,
                start: meeting.start.hours(),
                end: meeting.end.hours(),
                description: Some(meeting.description.clone()),
            }),
    );

    // `sort_by` is stable, so ties keep declaration order.
    periods.sort_by(|a, b| a.start.total_cmp(&b.start));

    for period in &periods {
        match period.kind {
            PeriodKind::Lunch => debug!(
                %date,
                "lunch: {} - {}",
                format_hours(period.start),
                format_hours(period.end)
            ),
            PeriodKind::Meeting => debug!(
                %date,
                "meeting '{}': {} - {}",
                period.description.as_deref().unwrap_or_default(),
                format_hours(period.start),
                format_hours(period.end)
            ),
        }
    }

    periods
}

/// Whether `[start, end)` collides with lunch or a meeting held on `date`.
///
/// Lunch uses plain half-open overlap. A meeting blocks the range when the
/// range starts inside it, ends inside it, or spans it entirely; touching a
/// meeting boundary from outside does not block.
pub fn is_time_range_blocked(
    date: NaiveDate,
    start: f64,
    end: f64,
    calendar: &ClientCalendar,
) -> bool {
    let lunch_start = calendar.lunch.start.hours();
    let lunch_end = calendar.lunch.end.hours();
    if start < lunch_end && end > lunch_start {
        debug!(
            %date,
            "{} - {} blocked by lunch",
            format_hours(start),
            format_hours(end)
        );
        return true;
    }

    calendar.meetings_on(date).iter().any(|meeting| {
        let meeting_start = meeting.start.hours();
        let meeting_end = meeting.end.hours();
        let blocked = (start >= meeting_start && start < meeting_end)
            || (end > meeting_start && end <= meeting_end)
            || (start <= meeting_start && end >= meeting_end);
        if blocked {
            debug!(
                %date,
                "{} - {} blocked by meeting '{}'",
                format_hours(start),
                format_hours(end),
                meeting.description
            );
        }
        blocked
    })
}
