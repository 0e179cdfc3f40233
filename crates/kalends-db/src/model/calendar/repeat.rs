//! Models for the recurrence rule table.

use diesel::prelude::*;

use crate::db::enums::RepeatType;
use crate::db::schema::webcal_entry_repeats;

/// One recurrence rule row, keyed by the entry it belongs to.
///
/// Used for both loading and insertion: every column is supplied by the
/// mapper, none are generated.
#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable, Insertable)]
#[diesel(table_name = webcal_entry_repeats)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct EntryRepeat {
    pub cal_id: i32,
    pub cal_type: RepeatType,
    /// UNTIL date, `YYYYMMDD`. NULL or 0 means unbounded.
    pub cal_end: Option<i32>,
    /// UNTIL time, `HHMMSS`. NULL for a date-only UNTIL.
    pub cal_endtime: Option<i32>,
    /// INTERVAL. NULL means 1.
    pub cal_frequency: Option<i32>,
    /// Weekly weekday mask, Sunday first.
    pub cal_days: Option<String>,
    pub cal_bymonth: Option<String>,
    pub cal_bymonthday: Option<String>,
    pub cal_byday: Option<String>,
    pub cal_bysetpos: Option<String>,
    pub cal_byweekno: Option<String>,
    pub cal_byyearday: Option<String>,
    pub cal_byhour: Option<String>,
    pub cal_byminute: Option<String>,
    pub cal_bysecond: Option<String>,
    /// COUNT. NULL means unbounded by count.
    pub cal_count: Option<i32>,
    pub cal_wkst: Option<String>,
}
