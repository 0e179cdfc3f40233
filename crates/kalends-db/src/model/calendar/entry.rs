//! Models for the entry anchor table.

use diesel::prelude::*;

use crate::db::enums::{AccessLevel, EntryType};
use crate::db::schema::webcal_entry;

/// Calendar entry anchor.
///
/// The anchor date and time are the first occurrence of a repeating entry.
#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable, Identifiable)]
#[diesel(table_name = webcal_entry)]
#[diesel(primary_key(cal_id))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Entry {
    pub cal_id: i32,
    /// Login of the creating user.
    pub cal_create_by: String,
    /// Anchor date, `YYYYMMDD`.
    pub cal_date: i32,
    /// Anchor time, `HHMMSS`; NULL for untimed entries.
    pub cal_time: Option<i32>,
    /// Duration in minutes.
    pub cal_duration: i32,
    pub cal_type: EntryType,
    pub cal_access: AccessLevel,
    pub cal_name: String,
    pub cal_description: Option<String>,
}

/// Entry anchor for insertion and update.
#[derive(Debug, Clone, PartialEq, Eq, Insertable, AsChangeset)]
#[diesel(table_name = webcal_entry)]
#[diesel(treat_none_as_null = true)]
pub struct NewEntry {
    pub cal_create_by: String,
    pub cal_date: i32,
    pub cal_time: Option<i32>,
    pub cal_duration: i32,
    pub cal_type: EntryType,
    pub cal_access: AccessLevel,
    pub cal_name: String,
    pub cal_description: Option<String>,
}
