//! Persistence of recurrence rules and exception dates.
//!
//! A recurrence is always replaced as a whole: saving deletes the entry's
//! rule row and every exception row, then writes the new ones.

use std::collections::HashMap;

use diesel::pg::Pg;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use diesel_async::scoped_futures::ScopedFutureExt;

use kalends_core::config::MonthlyTypePolicy;
use kalends_rfc::Recurrence;

use crate::db::connection::DbConnection;
use crate::db::map::recurrence::{exceptions_to_rows, rows_to_recurrence, rule_to_row};
use crate::db::schema::{webcal_entry_repeats, webcal_entry_repeats_not};
use crate::db::transaction::with_transaction;
use crate::error::{DbError, DbResult};
use crate::model::calendar::exception::EntryException;
use crate::model::calendar::repeat::EntryRepeat;

/// ## Summary
/// Returns a query for the rule rows of the given entries.
#[must_use]
pub fn rules_for(cal_ids: &[i32]) -> webcal_entry_repeats::BoxedQuery<'static, Pg> {
    webcal_entry_repeats::table
        .filter(webcal_entry_repeats::cal_id.eq_any(cal_ids.to_vec()))
        .into_boxed()
}

/// ## Summary
/// Returns a query for the exception rows of the given entries, in date order.
#[must_use]
pub fn exceptions_for(cal_ids: &[i32]) -> webcal_entry_repeats_not::BoxedQuery<'static, Pg> {
    webcal_entry_repeats_not::table
        .filter(webcal_entry_repeats_not::cal_id.eq_any(cal_ids.to_vec()))
        .order((
            webcal_entry_repeats_not::cal_id.asc(),
            webcal_entry_repeats_not::cal_date.asc(),
        ))
        .into_boxed()
}

/// ## Summary
/// Replaces the stored recurrence of an entry.
///
/// Runs atomically; joins the caller's transaction when one is open.
///
/// ## Errors
/// Returns `DbError::OutOfRange` if a rule or exception value does not fit
/// its column, or an error if any delete or insert fails.
#[tracing::instrument(skip(conn, recurrence))]
pub async fn save_recurrence(
    conn: &mut DbConnection,
    cal_id: i32,
    recurrence: &Recurrence,
    policy: MonthlyTypePolicy,
) -> DbResult<()> {
    let repeat = recurrence
        .rule
        .as_ref()
        .map(|rule| rule_to_row(cal_id, rule, policy))
        .transpose()?;
    let exceptions = exceptions_to_rows(cal_id, recurrence)?;

    with_transaction::<_, DbError, _>(conn, move |conn| {
        async move {
            delete_recurrence(conn, cal_id).await?;

            if let Some(repeat) = &repeat {
                diesel::insert_into(webcal_entry_repeats::table)
                    .values(repeat)
                    .execute(conn)
                    .await?;
            }

            if !exceptions.is_empty() {
                diesel::insert_into(webcal_entry_repeats_not::table)
                    .values(&exceptions)
                    .execute(conn)
                    .await?;
            }

            tracing::debug!(
                has_rule = repeat.is_some(),
                exceptions = exceptions.len(),
                "Saved recurrence"
            );
            Ok(())
        }
        .scope_boxed()
    })
    .await
}

/// ## Summary
/// Deletes the rule row and all exception rows of an entry.
///
/// ## Errors
/// Returns an error if the database operation fails.
pub async fn delete_recurrence(conn: &mut DbConnection, cal_id: i32) -> QueryResult<()> {
    diesel::delete(webcal_entry_repeats_not::table.filter(webcal_entry_repeats_not::cal_id.eq(cal_id)))
        .execute(conn)
        .await?;
    diesel::delete(webcal_entry_repeats::table.filter(webcal_entry_repeats::cal_id.eq(cal_id)))
        .execute(conn)
        .await?;
    Ok(())
}

/// ## Summary
/// Loads the recurrence of one entry. An entry with no rows loads as
/// non-repeating.
///
/// ## Errors
/// Returns an error if the database operation fails or stored data is corrupt.
pub async fn load_recurrence(conn: &mut DbConnection, cal_id: i32) -> DbResult<Recurrence> {
    let mut loaded = load_recurrences(conn, &[cal_id]).await?;
    Ok(loaded.remove(&cal_id).unwrap_or_default())
}

/// ## Summary
/// Loads recurrences for many entries with one rule query and one exception
/// query.
///
/// Every requested id is present in the result; ids without rows map to a
/// non-repeating recurrence.
///
/// ## Errors
/// Returns an error if a query fails or any stored rule or exception is
/// corrupt.
#[tracing::instrument(skip(conn, cal_ids), fields(count = cal_ids.len()))]
pub async fn load_recurrences(
    conn: &mut DbConnection,
    cal_ids: &[i32],
) -> DbResult<HashMap<i32, Recurrence>> {
    if cal_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let repeats = rules_for(cal_ids)
        .select(EntryRepeat::as_select())
        .load::<EntryRepeat>(conn)
        .await?;
    let exceptions = exceptions_for(cal_ids)
        .select(EntryException::as_select())
        .load::<EntryException>(conn)
        .await?;

    let repeats: HashMap<i32, EntryRepeat> =
        repeats.into_iter().map(|row| (row.cal_id, row)).collect();
    let mut exceptions_by_entry: HashMap<i32, Vec<EntryException>> = HashMap::new();
    for exception in exceptions {
        exceptions_by_entry
            .entry(exception.cal_id)
            .or_default()
            .push(exception);
    }

    let mut recurrences = HashMap::with_capacity(cal_ids.len());
    for &cal_id in cal_ids {
        let exceptions = exceptions_by_entry
            .get(&cal_id)
            .map_or(&[][..], Vec::as_slice);
        let recurrence = rows_to_recurrence(repeats.get(&cal_id), exceptions)?;
        recurrences.insert(cal_id, recurrence);
    }

    tracing::trace!(
        rules = repeats.len(),
        with_exceptions = exceptions_by_entry.len(),
        "Loaded recurrences"
    );
    Ok(recurrences)
}
