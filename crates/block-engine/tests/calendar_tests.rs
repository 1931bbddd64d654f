//! Tests for client calendars, blocked periods and range blocking.

use block_engine::calendar::{
    blocked_periods, is_time_range_blocked, CalendarWindow, ClientCalendar, PeriodKind,
    RecurringMeeting,
};
use block_engine::EngineError;
use chrono::NaiveDate;

// ── Helpers ─────────────────────────────────────────────────────────────────

fn date(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, day).unwrap()
}

const TUESDAY: u32 = 5;
const SATURDAY: u32 = 9;

fn calendar(meetings: Vec<RecurringMeeting>) -> ClientCalendar {
    ClientCalendar {
        name: "Globex".to_string(),
        work: CalendarWindow::new(9.0, 18.0).unwrap(),
        lunch: CalendarWindow::new(13.0, 14.0).unwrap(),
        meetings,
        project_id: "p-1".to_string(),
        task_id: "t-1".to_string(),
    }
}

fn meeting(description: &str, start: f64, end: f64) -> RecurringMeeting {
    RecurringMeeting::new(description, start, end).unwrap()
}

// ── Validation ──────────────────────────────────────────────────────────────

#[test]
fn window_rejects_inverted_or_empty_range() {
    assert!(matches!(
        CalendarWindow::new(18.0, 9.0),
        Err(EngineError::InvalidCalendar(_))
    ));
    assert!(matches!(
        CalendarWindow::new(9.0, 9.0),
        Err(EngineError::InvalidCalendar(_))
    ));
}

#[test]
fn meeting_rejects_inverted_range() {
    assert!(RecurringMeeting::new("stand-up", 10.0, 9.5).is_err());
}

#[test]
fn validate_reports_bad_meeting_from_deserialized_calendar() {
    let json = r#"{
        "name": "Globex",
        "work": {"start": 9, "end": 18},
        "lunch": {"start": 13, "end": 14},
        "meetings": [{"description": "retro", "start": 11, "end": 10}],
        "project_id": "p",
        "task_id": "t"
    }"#;
    let calendar: ClientCalendar = serde_json::from_str(json).unwrap();
    let err = calendar.validate().unwrap_err();
    assert!(err.to_string().contains("retro"), "got: {err}");
}

#[test]
fn validate_accepts_well_formed_calendar() {
    assert!(calendar(vec![meeting("stand-up", 9.5, 10.0)]).validate().is_ok());
}

// ── blocked_periods ─────────────────────────────────────────────────────────

#[test]
fn lunch_is_always_blocked() {
    let cal = calendar(vec![]);
    for day in [TUESDAY, SATURDAY] {
        let periods = blocked_periods(date(day), &cal);
        assert_eq!(periods.len(), 1);
        assert_eq!(periods[0].kind, PeriodKind::Lunch);
        assert_eq!((periods[0].start, periods[0].end), (13.0, 14.0));
        assert_eq!(periods[0].description, None);
    }
}

#[test]
fn meetings_only_block_weekdays() {
    let cal = calendar(vec![meeting("stand-up", 9.5, 10.0)]);

    let weekday = blocked_periods(date(TUESDAY), &cal);
    assert_eq!(weekday.len(), 2);

    let weekend = blocked_periods(date(SATURDAY), &cal);
    assert_eq!(weekend.len(), 1);
    assert_eq!(weekend[0].kind, PeriodKind::Lunch);
}

#[test]
fn periods_are_sorted_by_start() {
    let cal = calendar(vec![
        meeting("review", 16.0, 17.0),
        meeting("stand-up", 9.5, 10.0),
    ]);
    let periods = blocked_periods(date(TUESDAY), &cal);
    let starts: Vec<f64> = periods.iter().map(|p| p.start).collect();
    assert_eq!(starts, vec![9.5, 13.0, 16.0]);
    assert_eq!(periods[0].description.as_deref(), Some("stand-up"));
    assert_eq!(periods[2].description.as_deref(), Some("review"));
}

#[test]
fn equal_starts_keep_declaration_order() {
    let cal = calendar(vec![
        meeting("first", 10.0, 10.5),
        meeting("second", 10.0, 11.0),
        meeting("lunch-sync", 13.0, 13.5),
    ]);
    let periods = blocked_periods(date(TUESDAY), &cal);
    let labels: Vec<Option<&str>> = periods.iter().map(|p| p.description.as_deref()).collect();
    assert_eq!(
        labels,
        vec![Some("first"), Some("second"), None, Some("lunch-sync")]
    );
}

// ── is_time_range_blocked ───────────────────────────────────────────────────

#[test]
fn range_overlapping_lunch_is_blocked() {
    let cal = calendar(vec![]);
    assert!(is_time_range_blocked(date(TUESDAY), 12.0, 13.5, &cal));
    assert!(is_time_range_blocked(date(TUESDAY), 13.5, 15.0, &cal));
    assert!(is_time_range_blocked(date(SATURDAY), 12.5, 14.5, &cal));
}

#[test]
fn range_touching_lunch_is_free() {
    let cal = calendar(vec![]);
    assert!(!is_time_range_blocked(date(TUESDAY), 9.0, 13.0, &cal));
    assert!(!is_time_range_blocked(date(TUESDAY), 14.0, 18.0, &cal));
}

#[test]
fn range_starting_inside_meeting_is_blocked() {
    let cal = calendar(vec![meeting("stand-up", 9.5, 10.0)]);
    assert!(is_time_range_blocked(date(TUESDAY), 9.5, 11.0, &cal));
    assert!(is_time_range_blocked(date(TUESDAY), 9.75, 11.0, &cal));
}

#[test]
fn range_ending_inside_meeting_is_blocked() {
    let cal = calendar(vec![meeting("stand-up", 9.5, 10.0)]);
    assert!(is_time_range_blocked(date(TUESDAY), 9.0, 9.75, &cal));
    assert!(is_time_range_blocked(date(TUESDAY), 9.0, 10.0, &cal));
}

#[test]
fn range_spanning_meeting_is_blocked() {
    let cal = calendar(vec![meeting("stand-up", 9.5, 10.0)]);
    assert!(is_time_range_blocked(date(TUESDAY), 9.0, 12.0, &cal));
}

#[test]
fn range_touching_meeting_from_outside_is_free() {
    let cal = calendar(vec![meeting("stand-up", 9.5, 10.0)]);
    assert!(!is_time_range_blocked(date(TUESDAY), 9.0, 9.5, &cal));
    assert!(!is_time_range_blocked(date(TUESDAY), 10.0, 13.0, &cal));
}

#[test]
fn meetings_do_not_block_weekends() {
    let cal = calendar(vec![meeting("stand-up", 9.5, 10.0)]);
    assert!(!is_time_range_blocked(date(SATURDAY), 9.0, 12.0, &cal));
}
