//! DB <-> anchor mapping helpers.

use chrono::{DateTime, NaiveTime, TimeDelta, Utc};

use kalends_rfc::Anchor;

use crate::db::legacy::{Column, decode_hms, decode_ymd, encode_hms, encode_ymd};
use crate::error::DbResult;
use crate::model::calendar::entry::Entry;

const CAL_DATE: Column = Column::new("webcal_entry", "cal_date");
const CAL_TIME: Column = Column::new("webcal_entry", "cal_time");
const CAL_DURATION: Column = Column::new("webcal_entry", "cal_duration");

/// ## Summary
/// Rebuilds the anchor (first occurrence) of a stored entry.
///
/// Untimed entries are anchored at midnight UTC.
///
/// ## Errors
/// Returns `DbError::CorruptColumn` if the date, time or duration cannot be
/// decoded.
pub fn entry_anchor(entry: &Entry) -> DbResult<Anchor> {
    let date = decode_ymd(CAL_DATE, entry.cal_date)?;
    let time = match entry.cal_time {
        Some(value) => decode_hms(CAL_TIME, value)?,
        None => NaiveTime::MIN,
    };
    if entry.cal_duration < 0 {
        return Err(CAL_DURATION.corrupt(entry.cal_duration));
    }
    Ok(Anchor::with_minutes(
        date.and_time(time).and_utc(),
        i64::from(entry.cal_duration),
    ))
}

/// ## Summary
/// Splits a start instant into the stored date and optional time columns.
///
/// ## Errors
/// Returns `DbError::OutOfRange` if the date cannot be stored.
pub fn encode_start(start: DateTime<Utc>, timed: bool) -> DbResult<(i32, Option<i32>)> {
    let date = encode_ymd(CAL_DATE, start.date_naive())?;
    let time = timed.then(|| encode_hms(start.time()));
    Ok((date, time))
}

/// ## Summary
/// Converts a duration to whole stored minutes.
///
/// ## Errors
/// Returns `DbError::CorruptColumn` for negative durations or ones that do not
/// fit the column.
pub fn encode_duration(duration: TimeDelta) -> DbResult<i32> {
    let minutes = duration.num_minutes();
    if minutes < 0 {
        return Err(CAL_DURATION.corrupt(minutes));
    }
    i32::try_from(minutes).map_err(|_| CAL_DURATION.corrupt(minutes))
}
