//! Per-client scheduling over a period of one month.
//!
//! Runs the whole pipeline for one client: standing meetings first, then for
//! every day that has tasks the blocked periods, the available blocks and the
//! allocation. The two entry streams are concatenated, meetings first.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::allocator::{allocate_counted, ScheduledEntry, TaskRequest};
use crate::calendar::ClientCalendar;
use crate::error::{EngineError, Result};
use crate::expander::expand_meetings;
use crate::freebusy::{available_blocks, total_hours};
use crate::time::{date_from_parts, format_hours};

/// An inclusive range of days within one month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulePeriod {
    pub year: i32,
    pub month: u32,
    pub start_day: u32,
    pub end_day: u32,
}

impl SchedulePeriod {
    pub fn new(year: i32, month: u32, start_day: u32, end_day: u32) -> Self {
        Self {
            year,
            month,
            start_day,
            end_day,
        }
    }

    /// Check that both ends are real dates and the range is not inverted.
    ///
    /// # Errors
    /// `EngineError::InvalidDate` for an impossible date,
    /// `EngineError::InvalidCalendar` when `start_day > end_day`.
    pub fn validate(&self) -> Result<()> {
        self.first_date()?;
        self.last_date()?;
        if self.start_day > self.end_day {
            return Err(EngineError::InvalidCalendar(format!(
                "period starts on day {} after it ends on day {}",
                self.start_day, self.end_day
            )));
        }
        Ok(())
    }

    /// # Errors
    /// `EngineError::InvalidDate` if `start_day` does not exist in the month.
    pub fn first_date(&self) -> Result<NaiveDate> {
        date_from_parts(self.year, self.month, self.start_day)
    }

    /// # Errors
    /// `EngineError::InvalidDate` if `end_day` does not exist in the month.
    pub fn last_date(&self) -> Result<NaiveDate> {
        date_from_parts(self.year, self.month, self.end_day)
    }

    /// The date of `day` in this period's month.
    ///
    /// # Errors
    /// `EngineError::InvalidDate` if the day does not exist in the month.
    pub fn date_of(&self, day: u32) -> Result<NaiveDate> {
        date_from_parts(self.year, self.month, day)
    }

    pub fn contains_day(&self, day: u32) -> bool {
        (self.start_day..=self.end_day).contains(&day)
    }

    /// Every date of the period, in order.
    ///
    /// # Errors
    /// `EngineError::InvalidDate` if a day in range does not exist.
    pub fn dates(&self) -> Result<Vec<NaiveDate>> {
        (self.start_day..=self.end_day)
            .map(|day| self.date_of(day))
            .collect()
    }
}

/// Everything produced for one client over a period.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ClientSchedule {
    /// Standing-meeting entries followed by task entries.
    pub entries: Vec<ScheduledEntry>,
    pub meeting_entries: usize,
    pub allocated_entries: usize,
    /// Tasks inside the period that received no entry (weekend, no free
    /// block, or blocks exhausted).
    pub dropped_tasks: usize,
    /// Tasks whose day lies outside the period.
    pub ignored_tasks: usize,
}

/// Schedule one client's tasks over `period`.
///
/// `tasks` must already be filtered to this client. Tasks keep their input
/// order within a day.
///
/// # Errors
/// Returns `EngineError::InvalidCalendar` or `EngineError::InvalidDate` when
/// the calendar or the period is malformed, before any entry is produced.
pub fn schedule_client(
    calendar: &ClientCalendar,
    period: &SchedulePeriod,
    tasks: &[TaskRequest],
) -> Result<ClientSchedule> {
    calendar.validate()?;
    period.validate()?;

    let mut schedule = ClientSchedule::default();

    let meetings = expand_meetings(calendar, period)?;
    schedule.meeting_entries = meetings.len();
    schedule.entries.extend(meetings);

    let mut tasks_by_day: BTreeMap<u32, Vec<TaskRequest>> = BTreeMap::new();
    for task in tasks {
        if period.contains_day(task.day) {
            tasks_by_day.entry(task.day).or_default().push(task.clone());
        } else {
            schedule.ignored_tasks += 1;
        }
    }
    if schedule.ignored_tasks > 0 {
        warn!(
            client = %calendar.name,
            ignored = schedule.ignored_tasks,
            "tasks outside the scheduling period were ignored"
        );
    }

    for (day, day_tasks) in &tasks_by_day {
        let date = period.date_of(*day)?;
        info!(client = %calendar.name, %date, tasks = day_tasks.len(), "processing day");

        let blocks = available_blocks(date, calendar)?;
        if blocks.is_empty() {
            warn!(client = %calendar.name, %date, "no available blocks");
        } else {
            info!(
                client = %calendar.name,
                %date,
                "total available time: {}",
                format_hours(total_hours(&blocks))
            );
        }

        let allocation = allocate_counted(date, day_tasks, &blocks, calendar)?;
        schedule.allocated_entries += allocation.entries.len();
        schedule.dropped_tasks += allocation.unscheduled;
        schedule.entries.extend(allocation.entries);
    }

    info!(
        client = %calendar.name,
        entries = schedule.entries.len(),
        meetings = schedule.meeting_entries,
        dropped = schedule.dropped_tasks,
        "client scheduled"
    );

    Ok(schedule)
}
