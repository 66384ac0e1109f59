//! Half-open interval overlap detection, shared by venue booking, equipment
//! booking and the free-text event-location check.

use crate::error::{AppError, AppResult};
use crate::models::{Event, EquipmentBooking, VenueBooking};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// A validated `[start, end)` time window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Window {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> AppResult<Window> {
        if start >= end {
            return Err(AppError::validation("end time must be after start time"));
        }
        Ok(Window { start, end })
    }
}

/// Anything occupying a `[start, end)` slice of time.
pub trait TimeSpan {
    fn span_start(&self) -> DateTime<Utc>;
    fn span_end(&self) -> DateTime<Utc>;
}

impl TimeSpan for Window {
    fn span_start(&self) -> DateTime<Utc> {
        self.start
    }

    fn span_end(&self) -> DateTime<Utc> {
        self.end
    }
}

impl TimeSpan for VenueBooking {
    fn span_start(&self) -> DateTime<Utc> {
        self.start_time
    }

    fn span_end(&self) -> DateTime<Utc> {
        self.end_time
    }
}

impl TimeSpan for EquipmentBooking {
    fn span_start(&self) -> DateTime<Utc> {
        self.start_time
    }

    fn span_end(&self) -> DateTime<Utc> {
        self.end_time
    }
}

impl TimeSpan for Event {
    fn span_start(&self) -> DateTime<Utc> {
        self.start_date
    }

    fn span_end(&self) -> DateTime<Utc> {
        self.end_date
    }
}

/// Two half-open intervals overlap iff each starts before the other ends.
/// Back-to-back slots (one ends exactly when the other begins) do not
/// conflict.
pub fn overlaps(a: &impl TimeSpan, b: &impl TimeSpan) -> bool {
    a.span_start() < b.span_end() && b.span_start() < a.span_end()
}

/// The subset of `existing` that overlaps `window`. O(n), which is fine at
/// per-resource booking counts.
pub fn find_conflicts<'a, T: TimeSpan>(window: Window, existing: &'a [T]) -> Vec<&'a T> {
    existing.iter().filter(|e| overlaps(&window, *e)).collect()
}

/// What a failed booking collided with, surfaced to the caller verbatim.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConflictDetail {
    pub id: i32,
    pub event_id: Option<i32>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

impl From<&VenueBooking> for ConflictDetail {
    fn from(b: &VenueBooking) -> Self {
        ConflictDetail {
            id: b.id,
            event_id: b.event_id,
            start_time: b.start_time,
            end_time: b.end_time,
        }
    }
}

impl From<&EquipmentBooking> for ConflictDetail {
    fn from(b: &EquipmentBooking) -> Self {
        ConflictDetail {
            id: b.id,
            event_id: b.event_id,
            start_time: b.start_time,
            end_time: b.end_time,
        }
    }
}

impl From<&Event> for ConflictDetail {
    fn from(e: &Event) -> Self {
        ConflictDetail {
            id: e.id,
            event_id: Some(e.id),
            start_time: e.start_date,
            end_time: e.end_date,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 14, hour, 0, 0).unwrap()
    }

    fn win(start: u32, end: u32) -> Window {
        Window::new(at(start), at(end)).unwrap()
    }

    #[test]
    fn rejects_inverted_window() {
        assert!(Window::new(at(16), at(14)).is_err());
        assert!(Window::new(at(14), at(14)).is_err());
    }

    #[test]
    fn overlap_truth_table() {
        // partial overlap on either side
        assert!(overlaps(&win(14, 16), &win(15, 17)));
        assert!(overlaps(&win(15, 17), &win(14, 16)));
        // containment
        assert!(overlaps(&win(14, 18), &win(15, 16)));
        assert!(overlaps(&win(15, 16), &win(14, 18)));
        // identical
        assert!(overlaps(&win(14, 16), &win(14, 16)));
        // disjoint
        assert!(!overlaps(&win(10, 12), &win(14, 16)));
    }

    #[test]
    fn back_to_back_is_not_a_conflict() {
        assert!(!overlaps(&win(14, 16), &win(16, 18)));
        assert!(!overlaps(&win(16, 18), &win(14, 16)));
    }

    #[test]
    fn find_conflicts_filters() {
        let existing = vec![win(9, 10), win(14, 16), win(17, 19)];
        let hits = find_conflicts(win(15, 18), &existing);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].start, at(14));
        assert_eq!(hits[1].start, at(17));

        assert!(find_conflicts(win(10, 14), &existing).is_empty());
    }
}
