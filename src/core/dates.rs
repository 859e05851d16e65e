//! German date handling.
//!
//! Invoices carry dates as `dd.MM.yyyy` strings, the format users type
//! and the stores persist. The checks here are strict: exactly two
//! digits for day and month, four for the year, and the date must exist
//! on the calendar.

use chrono::NaiveDate;

/// Shape check only: `dd.MM.yyyy` with all-digit components and
/// plausible ranges (day 01-31, month 01-12). "30.02.2025" passes this
/// but fails [`parse_german_date`].
pub fn is_german_date_format(value: &str) -> bool {
    let bytes = value.as_bytes();
    if bytes.len() != 10 || bytes[2] != b'.' || bytes[5] != b'.' {
        return false;
    }
    let digits = [
        bytes[0], bytes[1], bytes[3], bytes[4], bytes[6], bytes[7], bytes[8], bytes[9],
    ];
    if !digits.iter().all(u8::is_ascii_digit) {
        return false;
    }
    let day = (bytes[0] - b'0') * 10 + (bytes[1] - b'0');
    let month = (bytes[3] - b'0') * 10 + (bytes[4] - b'0');
    (1..=31).contains(&day) && (1..=12).contains(&month)
}

/// Parse a strict `dd.MM.yyyy` string into a calendar date.
/// Returns `None` for wrong shapes and for dates that do not exist,
/// such as "30.02.2025".
pub fn parse_german_date(value: &str) -> Option<NaiveDate> {
    if !is_german_date_format(value) {
        return None;
    }
    let day: u32 = value[0..2].parse().ok()?;
    let month: u32 = value[3..5].parse().ok()?;
    let year: i32 = value[6..10].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Format a date back to `dd.MM.yyyy`.
pub fn format_german_date(date: NaiveDate) -> String {
    date.format("%d.%m.%Y").to_string()
}

/// Signed whole days from `from` to `to`.
pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    to.signed_duration_since(from).num_days()
}
