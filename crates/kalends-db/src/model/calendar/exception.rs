//! Models for the recurrence exception table.

use diesel::prelude::*;

use crate::db::enums::ExceptionKind;
use crate::db::schema::webcal_entry_repeats_not;

/// One excluded or added date for an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Queryable, Selectable, Insertable)]
#[diesel(table_name = webcal_entry_repeats_not)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct EntryException {
    pub cal_id: i32,
    /// `YYYYMMDD`.
    pub cal_date: i32,
    pub cal_exdate: ExceptionKind,
}
