use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;

/// An inclusive range of calendar days.
///
/// As an instant range it covers `start 00:00:00` up to, but not including,
/// midnight after `end`, so every reading on the final day is inside it.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct DayRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DayRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// A range that contains no day at all (`start > end`).
    pub fn is_empty(&self) -> bool {
        self.start > self.end
    }

    /// First instant inside the range.
    pub fn start_datetime(&self) -> NaiveDateTime {
        self.start.and_time(NaiveTime::MIN)
    }

    /// First instant after the range, `None` when `end` is the last representable day.
    pub fn end_exclusive(&self) -> Option<NaiveDateTime> {
        self.end
            .succ_opt()
            .map(|next| next.and_time(NaiveTime::MIN))
    }

    /// Narrows this range to the days covered by `extent`.
    ///
    /// Bounds already inside `extent` are kept. The result may be empty when the two
    /// ranges do not overlap.
    pub fn clamp_to(&self, extent: &DayRange) -> DayRange {
        DayRange {
            start: self.start.max(extent.start),
            end: self.end.min(extent.end),
        }
    }
}
