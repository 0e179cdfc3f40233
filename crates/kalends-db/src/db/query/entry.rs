//! Query composition for `webcal_entry`, including the date-window planner.

use chrono::NaiveDate;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::db::connection::DbConnection;
use crate::db::enums::{AccessLevel, EntryType, ExceptionKind};
use crate::db::legacy::encode_ymd_bound;
use crate::db::schema::{webcal_entry, webcal_entry_repeats, webcal_entry_repeats_not};
use crate::model::calendar::entry::{Entry, NewEntry};

/// Caller-side restrictions ANDed onto a window query.
///
/// Empty lists mean "no restriction".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryScope {
    pub creator: Option<String>,
    pub access_levels: Vec<AccessLevel>,
    pub entry_types: Vec<EntryType>,
}

impl EntryScope {
    #[must_use]
    pub fn created_by(creator: impl Into<String>) -> Self {
        Self {
            creator: Some(creator.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_access_levels(mut self, levels: impl IntoIterator<Item = AccessLevel>) -> Self {
        self.access_levels = levels.into_iter().collect();
        self
    }

    #[must_use]
    pub fn with_entry_types(mut self, types: impl IntoIterator<Item = EntryType>) -> Self {
        self.entry_types = types.into_iter().collect();
        self
    }
}

/// ## Summary
/// Returns a query for one entry by id.
#[must_use]
pub fn by_id(cal_id: i32) -> webcal_entry::BoxedQuery<'static, Pg> {
    webcal_entry::table
        .filter(webcal_entry::cal_id.eq(cal_id))
        .into_boxed()
}

/// ## Summary
/// Returns the candidate query for the inclusive date window `[first, last]`.
///
/// Selects entries anchored inside the window, plus entries anchored before it
/// that either have a rule whose end is unset, zero, or not before `first`, or
/// have an added date inside the window. The result over-fetches: some
/// recurring candidates expand to nothing inside the window. Bounds beyond
/// the encodable years are clamped.
#[must_use]
pub fn in_window(
    first: NaiveDate,
    last: NaiveDate,
    scope: &EntryScope,
) -> webcal_entry::BoxedQuery<'static, Pg> {
    let start = encode_ymd_bound(first);
    let end = encode_ymd_bound(last);

    let open_rules = webcal_entry_repeats::table
        .select(webcal_entry_repeats::cal_id)
        .filter(
            webcal_entry_repeats::cal_end
                .is_null()
                .or(webcal_entry_repeats::cal_end.eq(0))
                .or(webcal_entry_repeats::cal_end.ge(start)),
        );

    let added_in_window = webcal_entry_repeats_not::table
        .select(webcal_entry_repeats_not::cal_id)
        .filter(webcal_entry_repeats_not::cal_exdate.eq(ExceptionKind::Include))
        .filter(webcal_entry_repeats_not::cal_date.between(start, end));

    let query = webcal_entry::table
        .filter(
            webcal_entry::cal_date.between(start, end).or(webcal_entry::cal_date
                .lt(start)
                .and(
                    webcal_entry::cal_id
                        .eq_any(open_rules)
                        .or(webcal_entry::cal_id.eq_any(added_in_window)),
                )),
        )
        .into_boxed();

    scoped(query, scope).order((
        webcal_entry::cal_date.asc(),
        webcal_entry::cal_time.asc(),
        webcal_entry::cal_id.asc(),
    ))
}

fn scoped(
    mut query: webcal_entry::BoxedQuery<'static, Pg>,
    scope: &EntryScope,
) -> webcal_entry::BoxedQuery<'static, Pg> {
    if let Some(creator) = &scope.creator {
        query = query.filter(webcal_entry::cal_create_by.eq(creator.clone()));
    }
    if !scope.access_levels.is_empty() {
        query = query.filter(webcal_entry::cal_access.eq_any(scope.access_levels.clone()));
    }
    if !scope.entry_types.is_empty() {
        query = query.filter(webcal_entry::cal_type.eq_any(scope.entry_types.clone()));
    }
    query
}

/// ## Summary
/// Loads the longest stored duration, in minutes, among entries in `scope`.
/// `None` when the scope holds no entries.
///
/// ## Errors
/// Returns an error if the database operation fails.
pub async fn longest_duration(
    conn: &mut DbConnection,
    scope: &EntryScope,
) -> QueryResult<Option<i32>> {
    scoped(webcal_entry::table.into_boxed(), scope)
        .select(diesel::dsl::max(webcal_entry::cal_duration))
        .get_result(conn)
        .await
}

/// ## Summary
/// Loads the candidate entries for a date window.
///
/// ## Errors
/// Returns an error if the database operation fails.
#[tracing::instrument(skip(conn))]
pub async fn load_in_window(
    conn: &mut DbConnection,
    first: NaiveDate,
    last: NaiveDate,
    scope: &EntryScope,
) -> QueryResult<Vec<Entry>> {
    let query = in_window(first, last, scope).select(Entry::as_select());
    tracing::debug!(sql = %diesel::debug_query::<Pg, _>(&query), "Planned window query");

    let entries = query.load::<Entry>(conn).await?;
    tracing::debug!(candidates = entries.len(), "Loaded window candidates");
    Ok(entries)
}

/// ## Summary
/// Loads one entry by id.
///
/// ## Errors
/// Returns an error if the database operation fails.
pub async fn find(conn: &mut DbConnection, cal_id: i32) -> QueryResult<Option<Entry>> {
    by_id(cal_id)
        .select(Entry::as_select())
        .first::<Entry>(conn)
        .await
        .optional()
}

/// ## Summary
/// Inserts an entry anchor and returns its generated id.
///
/// ## Errors
/// Returns an error if the database operation fails.
pub async fn insert(conn: &mut DbConnection, row: &NewEntry) -> QueryResult<i32> {
    diesel::insert_into(webcal_entry::table)
        .values(row)
        .returning(webcal_entry::cal_id)
        .get_result(conn)
        .await
}

/// ## Summary
/// Overwrites an existing entry anchor. Returns the number of rows updated.
///
/// ## Errors
/// Returns an error if the database operation fails.
pub async fn update(conn: &mut DbConnection, cal_id: i32, row: &NewEntry) -> QueryResult<usize> {
    diesel::update(webcal_entry::table.find(cal_id))
        .set(row)
        .execute(conn)
        .await
}

/// ## Summary
/// Deletes an entry anchor. Returns the number of rows deleted.
///
/// ## Errors
/// Returns an error if the database operation fails.
pub async fn delete(conn: &mut DbConnection, cal_id: i32) -> QueryResult<usize> {
    diesel::delete(webcal_entry::table.find(cal_id))
        .execute(conn)
        .await
}
