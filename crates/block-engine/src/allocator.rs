//! Distribute a day's tasks across its available blocks.
//!
//! Two policies apply:
//!
//! - **One task**: the task fills every available block of the day, one entry
//!   per block.
//! - **Several tasks**: the day's total free time is divided by the task count
//!   to get an average share. Each block, in order, is cut into
//!   `max(1, floor(block / average))` equal slices and the next tasks in list
//!   order take those slices. Allocation stops as soon as every task has a
//!   slice; tasks still waiting when the blocks run out get no entry.
//!
//! Every candidate interval is checked again against the blocked periods and
//! the 15-minute minimum before it becomes an entry.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::calendar::{is_time_range_blocked, ClientCalendar};
use crate::error::Result;
use crate::freebusy::{total_hours, AvailableBlock};
use crate::time::{format_hours, is_weekday, to_instant, MIN_BLOCK_HOURS};

/// A task that happened on a given day of the scheduling month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRequest {
    /// Day of the month, 1-31.
    pub day: u32,
    pub description: String,
}

impl TaskRequest {
    pub fn new(day: u32, description: impl Into<String>) -> Self {
        Self {
            day,
            description: description.into(),
        }
    }
}

/// A dated time-tracking entry, ready for export or submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledEntry {
    pub description: String,
    /// Wall-clock start, no timezone attached.
    pub start: NaiveDateTime,
    /// Wall-clock end, no timezone attached.
    pub end: NaiveDateTime,
    pub billable: bool,
    pub project_id: String,
    pub task_id: String,
}

impl ScheduledEntry {
    /// Build a billable entry for `date` from fractional-hour bounds.
    ///
    /// # Errors
    /// Propagates `EngineError::InvalidCalendar` from [`to_instant`].
    pub fn on_date(
        date: NaiveDate,
        description: &str,
        start: f64,
        end: f64,
        calendar: &ClientCalendar,
    ) -> Result<Self> {
        Ok(Self {
            description: description.to_string(),
            start: to_instant(date, start)?,
            end: to_instant(date, end)?,
            billable: true,
            project_id: calendar.project_id.clone(),
            task_id: calendar.task_id.clone(),
        })
    }

    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }
}

/// Allocate `tasks` (all belonging to `date`) across `blocks`.
///
/// `blocks` is expected to come from
/// [`available_blocks`](crate::freebusy::available_blocks) for the same date
/// and calendar. Returns no entries on weekends or when there is no block.
///
/// # Errors
/// Returns `EngineError::InvalidCalendar` when the calendar has an empty or
/// inverted window, or a block bound is not a clock time.
pub fn allocate_day(
    date: NaiveDate,
    tasks: &[TaskRequest],
    blocks: &[AvailableBlock],
    calendar: &ClientCalendar,
) -> Result<Vec<ScheduledEntry>> {
    allocate_counted(date, tasks, blocks, calendar).map(|day| day.entries)
}

/// Entries of one day plus the number of tasks that received none.
#[derive(Debug)]
pub(crate) struct DayAllocation {
    pub entries: Vec<ScheduledEntry>,
    pub unscheduled: usize,
}

pub(crate) fn allocate_counted(
    date: NaiveDate,
    tasks: &[TaskRequest],
    blocks: &[AvailableBlock],
    calendar: &ClientCalendar,
) -> Result<DayAllocation> {
    calendar.validate()?;

    if tasks.is_empty() || blocks.is_empty() || !is_weekday(date) {
        return Ok(DayAllocation {
            entries: Vec::new(),
            unscheduled: tasks.len(),
        });
    }

    match tasks {
        [task] => {
            let entries = allocate_single(date, task, blocks, calendar)?;
            let unscheduled = usize::from(entries.is_empty());
            Ok(DayAllocation {
                entries,
                unscheduled,
            })
        }
        _ => {
            let entries = allocate_shared(date, tasks, blocks, calendar)?;
            // Each task receives at most one slice.
            let unscheduled = tasks.len() - entries.len();
            Ok(DayAllocation {
                entries,
                unscheduled,
            })
        }
    }
}

fn is_bookable(date: NaiveDate, start: f64, end: f64, calendar: &ClientCalendar) -> bool {
    !is_time_range_blocked(date, start, end, calendar) && end - start >= MIN_BLOCK_HOURS
}

fn allocate_single(
    date: NaiveDate,
    task: &TaskRequest,
    blocks: &[AvailableBlock],
    calendar: &ClientCalendar,
) -> Result<Vec<ScheduledEntry>> {
    let mut entries = Vec::with_capacity(blocks.len());
    for block in blocks {
        if !is_bookable(date, block.start, block.end, calendar) {
            continue;
        }
        entries.push(ScheduledEntry::on_date(
            date,
            &task.description,
            block.start,
            block.end,
            calendar,
        )?);
    }
    Ok(entries)
}

fn allocate_shared(
    date: NaiveDate,
    tasks: &[TaskRequest],
    blocks: &[AvailableBlock],
    calendar: &ClientCalendar,
) -> Result<Vec<ScheduledEntry>> {
    let average = total_hours(blocks) / tasks.len() as f64;
    debug!(
        %date,
        tasks = tasks.len(),
        "average share per task: {}",
        format_hours(average)
    );

    let mut entries = Vec::with_capacity(tasks.len());
    let mut next_task = 0;

    for block in blocks {
        if next_task >= tasks.len() {
            break;
        }

        let block_hours = block.duration_hours();
        let tasks_in_block = ((block_hours / average).floor() as usize).max(1);
        let slice = block_hours / tasks_in_block as f64;
        let mut cursor = block.start;

        for _ in 0..tasks_in_block {
            let Some(task) = tasks.get(next_task) else {
                break;
            };
            let task_end = block.end.min(cursor + slice);

            if is_bookable(date, cursor, task_end, calendar) {
                entries.push(ScheduledEntry::on_date(
                    date,
                    &task.description,
                    cursor,
                    task_end,
                    calendar,
                )?);
            } else {
                // The slice is lost; the cursor and the task index still move on.
                debug!(
                    %date,
                    task = %task.description,
                    "dropping slice {} - {}",
                    format_hours(cursor),
                    format_hours(task_end)
                );
            }

            cursor = task_end;
            next_task += 1;
        }
    }

    if next_task < tasks.len() {
        warn!(
            %date,
            client = %calendar.name,
            unscheduled = tasks.len() - next_task,
            "available blocks exhausted before every task got time"
        );
    }

    Ok(entries)
}
