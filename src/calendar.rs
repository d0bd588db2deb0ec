//! Fixed-year calendar: month table, date keys and ISO week numbers.

use crate::errors::{TrackerError, TrackerResult};
use chrono::{Datelike, NaiveDate};
use serde::Serialize;

pub const YEAR: i32 = 2026;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CalendarMonth {
    pub name: &'static str,
    pub day_count: u32,
    /// Weekday of the 1st, 0 = Sunday .. 6 = Saturday.
    pub first_weekday_offset: u32,
}

impl CalendarMonth {
    const fn new(name: &'static str, day_count: u32, first_weekday_offset: u32) -> Self {
        Self {
            name,
            day_count,
            first_weekday_offset,
        }
    }

    pub fn short_name(&self) -> &'static str {
        let name: &'static str = self.name;
        &name[..3]
    }
}

static MONTHS: [CalendarMonth; 12] = [
    CalendarMonth::new("January", 31, 4),
    CalendarMonth::new("February", 28, 0),
    CalendarMonth::new("March", 31, 0),
    CalendarMonth::new("April", 30, 3),
    CalendarMonth::new("May", 31, 5),
    CalendarMonth::new("June", 30, 1),
    CalendarMonth::new("July", 31, 3),
    CalendarMonth::new("August", 31, 6),
    CalendarMonth::new("September", 30, 2),
    CalendarMonth::new("October", 31, 4),
    CalendarMonth::new("November", 30, 0),
    CalendarMonth::new("December", 31, 2),
];

pub fn month_table() -> &'static [CalendarMonth; 12] {
    &MONTHS
}

pub fn month(month_index: usize) -> TrackerResult<&'static CalendarMonth> {
    MONTHS
        .get(month_index)
        .ok_or_else(|| {
            TrackerError::InvalidDate(format!("month index {month_index} out of range"))
        })
}

pub fn date_key(month_index: usize, day: u32) -> TrackerResult<String> {
    check_day(month_index, day)?;
    Ok(format_key(month_index, day))
}

/// Inverse of [`date_key`]; rejects anything `date_key` would not produce.
pub fn parse_date_key(key: &str) -> TrackerResult<(usize, u32)> {
    let invalid = || TrackerError::InvalidDate(format!("'{key}' is not a {YEAR} date key"));
    let bytes = key.as_bytes();
    if !key.is_ascii() || bytes.len() != 10 || bytes[4] != b'-' || bytes[7] != b'-' {
        return Err(invalid());
    }
    let digits = |range: std::ops::Range<usize>| -> Option<u32> {
        let part = &key[range];
        if part.bytes().all(|b| b.is_ascii_digit()) {
            part.parse().ok()
        } else {
            None
        }
    };
    let (Some(year), Some(month), Some(day)) = (digits(0..4), digits(5..7), digits(8..10)) else {
        return Err(invalid());
    };
    if year != YEAR as u32 || month == 0 {
        return Err(invalid());
    }
    let month_index = (month - 1) as usize;
    check_day(month_index, day).map_err(|_| invalid())?;
    Ok((month_index, day))
}

/// ISO-8601 week of a day in the tracked year.
pub fn iso_week_number(month_index: usize, day: u32) -> TrackerResult<u32> {
    Ok(iso_week(to_naive(month_index, day)?))
}

/// Week of the Thursday sharing the date's Monday-based week, counted from
/// that Thursday's own year.
pub fn iso_week(date: NaiveDate) -> u32 {
    date.iso_week().week()
}

pub fn weekday_label(month_index: usize, day: u32) -> TrackerResult<String> {
    Ok(to_naive(month_index, day)?.format("%a").to_string())
}

/// Every `(month_index, day)` of the year in calendar order.
pub fn year_days() -> impl Iterator<Item = (usize, u32)> {
    MONTHS
        .iter()
        .enumerate()
        .flat_map(|(month_index, month)| {
            (1..=month.day_count).map(move |day| (month_index, day))
        })
}

pub(crate) fn format_key(month_index: usize, day: u32) -> String {
    format!("{YEAR}-{:02}-{:02}", month_index + 1, day)
}

fn check_day(month_index: usize, day: u32) -> TrackerResult<()> {
    let month = month(month_index)?;
    if day == 0 || day > month.day_count {
        return Err(TrackerError::InvalidDate(format!(
            "day {day} out of range for {}",
            month.name
        )));
    }
    Ok(())
}

fn to_naive(month_index: usize, day: u32) -> TrackerResult<NaiveDate> {
    check_day(month_index, day)?;
    NaiveDate::from_ymd_opt(YEAR, month_index as u32 + 1, day)
        .ok_or_else(|| TrackerError::InvalidDate(format_key(month_index, day)))
}
