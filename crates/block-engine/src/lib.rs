//! # block-engine
//!
//! Deterministic daily time-block allocation for time-tracking entries.
//!
//! Given a client's work calendar (work hours, lunch, standing weekday
//! meetings) and the tasks that happened on each day, the engine computes the
//! free blocks of every day and spreads the day's tasks across them. The
//! result is a list of dated, non-overlapping [`ScheduledEntry`] values ready
//! to be exported or submitted by the caller.
//!
//! The engine is pure: it never performs I/O and keeps no state between calls.
//!
//! ## Modules
//!
//! - [`time`] - fractional-hour clock times, `HH:MM` formatting, instants
//! - [`calendar`] - client calendars and the blocked periods of a day
//! - [`freebusy`] - available blocks left after subtracting blocked periods
//! - [`allocator`] - distribute a day's tasks across its available blocks
//! - [`expander`] - one entry per weekday for every standing meeting
//! - [`schedule`] - per-client driver tying the pieces together
//! - [`conflict`] - detect overlapping entries
//! - [`error`] - Error types

pub mod allocator;
pub mod calendar;
pub mod conflict;
pub mod error;
pub mod expander;
pub mod freebusy;
pub mod schedule;
pub mod time;

pub use allocator::{allocate_day, ScheduledEntry, TaskRequest};
pub use calendar::{
    blocked_periods, is_time_range_blocked, BlockedPeriod, CalendarWindow, ClientCalendar,
    PeriodKind, RecurringMeeting,
};
pub use conflict::{find_overlaps, Overlap};
pub use error::EngineError;
pub use expander::expand_meetings;
pub use freebusy::{available_blocks, AvailableBlock};
pub use schedule::{schedule_client, ClientSchedule, SchedulePeriod};
pub use time::{format_hours, is_weekday, to_instant, TimeOfDay, MIN_BLOCK_HOURS};
