//! Window listings and double-booking checks.
//!
//! A listing runs in three stages: the planner over-fetches candidate rows,
//! recurrences are batch loaded for all candidates, and each candidate is
//! expanded and clipped to the window.

use chrono::TimeDelta;
use serde::Serialize;

use kalends_core::config::RecurrenceConfig;
use kalends_core::types::{Occurrence, TimeWindow};
use kalends_db::db::connection::DbConnection;
use kalends_db::db::map::entry::entry_anchor;
use kalends_db::db::query::entry::{EntryScope, load_in_window, longest_duration};
use kalends_db::db::query::repeat::load_recurrences;
use kalends_rfc::expand;

use crate::conflict::{Booking, detect_conflicts, limit_exceeded};
use crate::entry::StoredEntry;
use crate::error::{ServiceError, ServiceResult};

/// One occurrence of a stored entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EntryOccurrence {
    pub cal_id: i32,
    pub occurrence: Occurrence,
}

/// Outcome of a double-booking check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DoubleBooking {
    /// Every existing booking overlapping the candidate.
    pub conflicts: Vec<Booking>,
    /// Whether the overlaps break the configured limit.
    pub exceeded: bool,
}

/// ## Summary
/// Lists the entries that may occur inside `window`, with their recurrences.
///
/// The list is pre-expansion: recurring entries are included when they could
/// produce an occurrence in the window, even if expansion yields none.
///
/// ## Errors
/// Returns `ServiceError::ValidationError` if the window is wider than
/// `recurrence.max_window_days`, or a database error if loading fails or
/// stored data is corrupt.
#[tracing::instrument(skip(conn, config))]
pub async fn entries_in_window(
    conn: &mut DbConnection,
    window: &TimeWindow,
    scope: &EntryScope,
    config: &RecurrenceConfig,
) -> ServiceResult<Vec<StoredEntry>> {
    if window.span_days() > i64::from(config.max_window_days) {
        return Err(ServiceError::ValidationError(format!(
            "window spans {} days, at most {} allowed",
            window.span_days(),
            config.max_window_days
        )));
    }
    load_candidates(conn, window, scope).await
}

async fn load_candidates(
    conn: &mut DbConnection,
    window: &TimeWindow,
    scope: &EntryScope,
) -> ServiceResult<Vec<StoredEntry>> {
    let entries = load_in_window(conn, window.first_date(), window.last_date(), scope).await?;
    let ids: Vec<i32> = entries.iter().map(|entry| entry.cal_id).collect();
    let mut recurrences = load_recurrences(conn, &ids).await?;

    entries
        .into_iter()
        .map(|entry| {
            let anchor = entry_anchor(&entry)?;
            let recurrence = recurrences.remove(&entry.cal_id).unwrap_or_default();
            Ok(StoredEntry {
                entry,
                anchor,
                recurrence,
            })
        })
        .collect()
}

/// ## Summary
/// Expands stored entries into their occurrences inside `window`, ordered by
/// start time and then entry id.
///
/// Non-repeating entries contribute their anchor only when it starts inside
/// the window.
///
/// ## Errors
/// Returns an RFC error if a stored rule cannot be expanded.
pub fn expand_entries(
    entries: &[StoredEntry],
    window: &TimeWindow,
) -> ServiceResult<Vec<EntryOccurrence>> {
    let mut occurrences = Vec::new();
    for stored in entries {
        let expanded = expand(&stored.anchor, &stored.recurrence, window)?;
        let repeating = stored.recurrence.is_repeating();
        occurrences.extend(
            expanded
                .into_iter()
                .filter(|occurrence| repeating || window.contains(occurrence.start))
                .map(|occurrence| EntryOccurrence {
                    cal_id: stored.entry.cal_id,
                    occurrence,
                }),
        );
    }
    occurrences.sort_by_key(|o| (o.occurrence.start, o.cal_id));
    Ok(occurrences)
}

/// ## Summary
/// Lists every occurrence inside `window`.
///
/// ## Errors
/// Same as [`entries_in_window`], plus expansion failures.
#[tracing::instrument(skip(conn, config))]
pub async fn occurrences_in_window(
    conn: &mut DbConnection,
    window: &TimeWindow,
    scope: &EntryScope,
    config: &RecurrenceConfig,
) -> ServiceResult<Vec<EntryOccurrence>> {
    let entries = entries_in_window(conn, window, scope, config).await?;
    let occurrences = expand_entries(&entries, window)?;
    tracing::debug!(
        candidates = entries.len(),
        occurrences = occurrences.len(),
        "Expanded window"
    );
    Ok(occurrences)
}

/// ## Summary
/// Checks whether booking `candidate` would exceed `limit` simultaneous
/// bookings among the entries visible through `scope`.
///
/// Existing entries are expanded over the days the candidate touches, widened
/// backwards by the longest stored duration in `scope` so bookings that start
/// earlier and run into the candidate are found. A `limit` of 0 disables the
/// check without querying.
///
/// ## Errors
/// Returns a database or expansion error if loading the day's entries fails.
#[tracing::instrument(skip(conn))]
pub async fn check_double_booking(
    conn: &mut DbConnection,
    candidate: &Booking,
    scope: &EntryScope,
    limit: u32,
) -> ServiceResult<DoubleBooking> {
    if limit == 0 {
        return Ok(DoubleBooking {
            conflicts: Vec::new(),
            exceeded: false,
        });
    }

    let longest = longest_duration(conn, scope).await?.unwrap_or_default();
    let window = booking_window(candidate, TimeDelta::minutes(i64::from(longest.max(0))))?;

    let entries = load_candidates(conn, &window, scope).await?;
    let existing: Vec<Booking> = expand_entries(&entries, &window)?
        .into_iter()
        .map(|o| Booking::new(Some(o.cal_id), o.occurrence))
        .collect();

    let conflicts = detect_conflicts(candidate, &existing, limit);
    let exceeded = limit_exceeded(conflicts.len(), limit);
    if exceeded {
        tracing::warn!(
            conflicts = conflicts.len(),
            limit,
            "Booking limit exceeded"
        );
    }

    Ok(DoubleBooking {
        conflicts,
        exceeded,
    })
}

/// ## Summary
/// Days an existing booking lasting at most `longest` must start on to
/// overlap `candidate`.
///
/// ## Errors
/// Returns `ServiceError::ValidationError` if the widened window leaves the
/// representable range.
fn booking_window(candidate: &Booking, longest: TimeDelta) -> ServiceResult<TimeWindow> {
    let earliest = candidate
        .occurrence
        .start
        .checked_sub_signed(longest)
        .ok_or_else(|| {
            ServiceError::ValidationError(format!(
                "booking at {} cannot look back {longest}",
                candidate.occurrence.start
            ))
        })?;
    let first = earliest.date_naive();
    let last = candidate
        .occurrence
        .end
        .date_naive()
        .max(candidate.occurrence.start.date_naive());
    Ok(TimeWindow::from_dates(first, last)?)
}
