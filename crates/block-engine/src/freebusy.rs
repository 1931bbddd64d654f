//! Compute the available blocks of a day.
//!
//! Sweeps a cursor across the sorted blocked periods of the day, collecting
//! the gaps inside the work window, then keeps only the gaps long enough to
//! book.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calendar::{blocked_periods, ClientCalendar};
use crate::error::Result;
use crate::time::{format_hours, MIN_BLOCK_HOURS};

/// A free interval of a day, in fractional hours.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AvailableBlock {
    pub start: f64,
    pub end: f64,
}

impl AvailableBlock {
    pub fn duration_hours(&self) -> f64 {
        self.end - self.start
    }

    /// Whether `[start, end)` lies within this block.
    pub fn contains(&self, start: f64, end: f64) -> bool {
        start >= self.start && end <= self.end
    }
}

/// Subtract the blocked periods of `date` from the calendar's work window.
///
/// Returns blocks sorted by start time, pairwise disjoint, each at least
/// [`MIN_BLOCK_HOURS`] long. Overlapping blocked periods coalesce because the
/// cursor never moves backwards.
///
/// # Errors
/// Returns `EngineError::InvalidCalendar` when a window of the calendar is
/// empty or inverted.
pub fn available_blocks(date: NaiveDate, calendar: &ClientCalendar) -> Result<Vec<AvailableBlock>> {
    calendar.validate()?;

    let window_start = calendar.work.start.hours();
    let window_end = calendar.work.end.hours();

    let mut gaps = Vec::new();
    let mut cursor = window_start;

    for period in blocked_periods(date, calendar) {
        // Clip to the work window so lunch after hours cannot open a gap past the end.
        let gap_end = period.start.min(window_end);
        if cursor < gap_end {
            gaps.push(AvailableBlock {
                start: cursor,
                end: gap_end,
            });
        }
        cursor = cursor.max(period.end);
    }

    // Trailing block after the last blocked period.
    if cursor < window_end {
        gaps.push(AvailableBlock {
            start: cursor,
            end: window_end,
        });
    }

    let blocks: Vec<AvailableBlock> = gaps
        .into_iter()
        .filter(|block| block.duration_hours() >= MIN_BLOCK_HOURS)
        .collect();

    for block in &blocks {
        debug!(
            %date,
            client = %calendar.name,
            "available block: {} - {}",
            format_hours(block.start),
            format_hours(block.end)
        );
    }

    Ok(blocks)
}

/// Sum of block durations, in hours.
pub fn total_hours(blocks: &[AvailableBlock]) -> f64 {
    blocks.iter().map(AvailableBlock::duration_hours).sum()
}
