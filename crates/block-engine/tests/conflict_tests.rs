//! Tests for overlap detection between scheduled entries.

use block_engine::allocator::ScheduledEntry;
use block_engine::find_overlaps;
use chrono::NaiveDate;

/// Helper to create an entry from hour/minute ranges on a given day.
fn entry(day: u32, start_hour: u32, start_min: u32, end_hour: u32, end_min: u32) -> ScheduledEntry {
    let date = NaiveDate::from_ymd_opt(2024, 3, day).unwrap();
    ScheduledEntry {
        description: format!("{start_hour}:{start_min}"),
        start: date.and_hms_opt(start_hour, start_min, 0).unwrap(),
        end: date.and_hms_opt(end_hour, end_min, 0).unwrap(),
        billable: true,
        project_id: "p".to_string(),
        task_id: "t".to_string(),
    }
}

#[test]
fn overlapping_entries_detected() {
    let overlaps = find_overlaps(&[entry(5, 9, 0, 10, 0), entry(5, 9, 30, 10, 30)]);
    assert_eq!(overlaps.len(), 1);
    assert_eq!(overlaps[0].overlap_minutes, 30);
    assert_eq!(overlaps[0].first.description, "9:0");
    assert_eq!(overlaps[0].second.description, "9:30");
}

#[test]
fn adjacent_entries_do_not_overlap() {
    let overlaps = find_overlaps(&[entry(5, 9, 0, 10, 0), entry(5, 10, 0, 11, 0)]);
    assert!(overlaps.is_empty());
}

#[test]
fn same_time_on_different_days_does_not_overlap() {
    let overlaps = find_overlaps(&[entry(5, 9, 0, 10, 0), entry(6, 9, 0, 10, 0)]);
    assert!(overlaps.is_empty());
}

#[test]
fn contained_entry_overlaps_for_its_full_length() {
    let overlaps = find_overlaps(&[entry(5, 9, 0, 13, 0), entry(5, 10, 0, 10, 45)]);
    assert_eq!(overlaps.len(), 1);
    assert_eq!(overlaps[0].overlap_minutes, 45);
}

#[test]
fn each_pair_reported_once() {
    let overlaps = find_overlaps(&[
        entry(5, 9, 0, 12, 0),
        entry(5, 10, 0, 11, 0),
        entry(5, 10, 30, 11, 30),
    ]);
    assert_eq!(overlaps.len(), 3);
}

#[test]
fn empty_list_has_no_overlaps() {
    assert!(find_overlaps(&[]).is_empty());
}
