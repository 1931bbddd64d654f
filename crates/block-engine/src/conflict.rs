//! Detect overlapping entries in a schedule.
//!
//! Adjacent entries (where one ends exactly when another starts) are NOT
//! overlaps.

use crate::allocator::ScheduledEntry;

/// Two entries whose time ranges intersect.
#[derive(Debug, Clone, PartialEq)]
pub struct Overlap {
    pub first: ScheduledEntry,
    pub second: ScheduledEntry,
    pub overlap_minutes: i64,
}

/// Find every pair of overlapping entries within one list.
///
/// Two entries overlap when `a.start < b.end && b.start < a.end`; each pair is
/// reported once, in list order.
pub fn find_overlaps(entries: &[ScheduledEntry]) -> Vec<Overlap> {
    let mut overlaps = Vec::new();

    for (i, a) in entries.iter().enumerate() {
        for b in &entries[i + 1..] {
            if a.start < b.end && b.start < a.end {
                let overlap_start = a.start.max(b.start);
                let overlap_end = a.end.min(b.end);

                overlaps.push(Overlap {
                    first: a.clone(),
                    second: b.clone(),
                    overlap_minutes: (overlap_end - overlap_start).num_minutes(),
                });
            }
        }
    }

    overlaps
}
