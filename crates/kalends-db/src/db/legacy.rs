//! Column encodings fixed by the legacy schema.
//!
//! - dates are `YYYYMMDD` integers
//! - times are `HHMMSS` integers
//! - integer lists are comma-joined strings, NULL when empty
//! - the weekly weekday selection is a 7-character `y`/`n` mask, Sunday first

use std::fmt::Display;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate, NaiveTime, Timelike};

use kalends_rfc::rfc::rrule::{Weekday, WeekdayNum};

use crate::error::{DbError, DbResult};

/// A column a stored value came from, used to report corrupt data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub table: &'static str,
    pub name: &'static str,
}

impl Column {
    #[must_use]
    pub const fn new(table: &'static str, name: &'static str) -> Self {
        Self { table, name }
    }

    pub(crate) fn corrupt(self, value: impl ToString) -> DbError {
        DbError::corrupt(self.table, self.name, value)
    }

    pub(crate) fn out_of_range(self, value: impl ToString) -> DbError {
        DbError::out_of_range(self.table, self.name, value)
    }
}

/// Years a `YYYYMMDD` integer holds.
const YMD_YEARS: std::ops::RangeInclusive<i32> = 1..=9999;

/// ## Summary
/// Encodes a date as a `YYYYMMDD` integer.
///
/// ## Errors
/// Returns `DbError::OutOfRange` if the year has more than four digits or is
/// not positive.
pub fn encode_ymd(column: Column, date: NaiveDate) -> DbResult<i32> {
    if !YMD_YEARS.contains(&date.year()) {
        return Err(column.out_of_range(date));
    }
    Ok(ymd(date))
}

/// Encodes a query bound, clamped to the first or last encodable date.
#[must_use]
pub fn encode_ymd_bound(date: NaiveDate) -> i32 {
    match date.year() {
        year if year < *YMD_YEARS.start() => 10_101,
        year if year > *YMD_YEARS.end() => 99_991_231,
        _ => ymd(date),
    }
}

fn ymd(date: NaiveDate) -> i32 {
    date.year() * 10_000 + i32::try_from(date.month() * 100 + date.day()).unwrap_or_default()
}

/// ## Summary
/// Decodes a `YYYYMMDD` integer.
///
/// ## Errors
/// Returns `DbError::CorruptColumn` if the value is not a calendar date.
pub fn decode_ymd(column: Column, value: i32) -> DbResult<NaiveDate> {
    let month = u32::try_from(value / 100 % 100).map_err(|_| column.corrupt(value))?;
    let day = u32::try_from(value % 100).map_err(|_| column.corrupt(value))?;
    NaiveDate::from_ymd_opt(value / 10_000, month, day).ok_or_else(|| column.corrupt(value))
}

#[must_use]
pub fn encode_hms(time: NaiveTime) -> i32 {
    i32::try_from(time.hour() * 10_000 + time.minute() * 100 + time.second()).unwrap_or_default()
}

/// ## Summary
/// Decodes an `HHMMSS` integer.
///
/// ## Errors
/// Returns `DbError::CorruptColumn` if the value is not a time of day.
pub fn decode_hms(column: Column, value: i32) -> DbResult<NaiveTime> {
    let parts = [value / 10_000, value / 100 % 100, value % 100].map(u32::try_from);
    match parts {
        [Ok(hour), Ok(minute), Ok(second)] => NaiveTime::from_hms_opt(hour, minute, second)
            .ok_or_else(|| column.corrupt(value)),
        _ => Err(column.corrupt(value)),
    }
}

/// Comma-joins a list, or `None` when it is empty.
#[must_use]
pub fn encode_list<T: Display>(values: &[T]) -> Option<String> {
    if values.is_empty() {
        return None;
    }
    Some(
        values
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(","),
    )
}

/// ## Summary
/// Splits a comma-joined column back into values. NULL and the empty string
/// both decode to an empty list.
///
/// ## Errors
/// Returns `DbError::CorruptColumn` if any element fails to parse.
pub fn decode_list<T: FromStr>(column: Column, value: Option<&str>) -> DbResult<Vec<T>> {
    let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(Vec::new());
    };
    value
        .split(',')
        .map(|element| {
            element
                .trim()
                .parse()
                .map_err(|_| column.corrupt(value))
        })
        .collect()
}

/// Encodes weekdays as the 7-character mask. Ordinals are ignored.
#[must_use]
pub fn encode_weekday_mask(days: &[WeekdayNum]) -> String {
    let mut mask = ['n'; 7];
    for day in days {
        mask[day.weekday.index()] = 'y';
    }
    mask.iter().collect()
}

/// ## Summary
/// Decodes the 7-character mask into BYDAY entries in Sunday-first order.
///
/// ## Errors
/// Returns `DbError::CorruptColumn` unless the value is exactly seven `y`/`n`
/// characters.
pub fn decode_weekday_mask(column: Column, value: &str) -> DbResult<Vec<WeekdayNum>> {
    if value.chars().count() != 7 {
        return Err(column.corrupt(value));
    }
    let mut days = Vec::new();
    for (index, flag) in value.chars().enumerate() {
        match flag.to_ascii_lowercase() {
            'y' => {
                let weekday = Weekday::from_index(index).ok_or_else(|| column.corrupt(value))?;
                days.push(WeekdayNum::every(weekday));
            }
            'n' => {}
            _ => return Err(column.corrupt(value)),
        }
    }
    Ok(days)
}
