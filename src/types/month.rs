use chrono::Month;

/// Month numbers in calendar order, the fixed column domain of seasonal views.
pub const CALENDAR_MONTHS: [u32; 12] = [1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12];

/// Hours of the day in order, the fixed row domain of the hour-by-month grid.
pub const DAY_HOURS: std::ops::Range<u32> = 0..24;

/// Three-letter English abbreviation of a month number (`1` -> `"Jan"`).
///
/// Returns `None` for numbers outside `1..=12`.
pub fn month_abbreviation(month: u32) -> Option<&'static str> {
    let month = u8::try_from(month).ok()?;
    Month::try_from(month).ok().map(|m| &m.name()[..3])
}

/// Abbreviations for all twelve months, January first.
pub fn month_abbreviations() -> [&'static str; 12] {
    CALENDAR_MONTHS
        .map(month_abbreviation)
        .map(Option::unwrap_or_default)
}

/// Row label for an hour of the day, e.g. `"07:00"`.
pub fn hour_label(hour: u32) -> String {
    format!("{:02}:00", hour)
}
