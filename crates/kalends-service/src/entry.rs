//! Entry storage service.
//!
//! Every write touches the anchor row, the rule row and the exception rows
//! together, inside one transaction.

use chrono::{DateTime, TimeDelta, Utc};
use diesel_async::scoped_futures::ScopedFutureExt;

use kalends_core::config::MonthlyTypePolicy;
use kalends_db::db::connection::DbConnection;
use kalends_db::db::enums::{AccessLevel, EntryType};
use kalends_db::db::map::entry::{encode_duration, encode_start, entry_anchor};
use kalends_db::db::query::{entry, repeat};
use kalends_db::db::transaction::with_transaction;
use kalends_db::model::calendar::entry::{Entry, NewEntry};
use kalends_rfc::{Anchor, Recurrence};

use crate::error::{ServiceError, ServiceResult};

/// An entry as supplied by a caller for saving.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryDraft {
    /// Existing entry to overwrite; `None` creates a new entry.
    pub cal_id: Option<i32>,
    pub creator: String,
    pub start: DateTime<Utc>,
    /// `false` stores the entry without a time of day.
    pub timed: bool,
    pub duration: TimeDelta,
    /// Kind of entry; the repeating marker is derived from `recurrence`.
    pub kind: EntryType,
    pub access: AccessLevel,
    pub name: String,
    pub description: Option<String>,
    pub recurrence: Recurrence,
}

impl EntryDraft {
    /// A public, timed, non-repeating event.
    #[must_use]
    pub fn event(
        creator: impl Into<String>,
        name: impl Into<String>,
        start: DateTime<Utc>,
        duration: TimeDelta,
    ) -> Self {
        Self {
            cal_id: None,
            creator: creator.into(),
            start,
            timed: true,
            duration,
            kind: EntryType::Event,
            access: AccessLevel::Public,
            name: name.into(),
            description: None,
            recurrence: Recurrence::none(),
        }
    }

    #[must_use]
    pub fn with_recurrence(mut self, recurrence: Recurrence) -> Self {
        self.recurrence = recurrence;
        self
    }

    #[must_use]
    pub fn anchor(&self) -> Anchor {
        Anchor::new(self.start, self.duration)
    }

    fn to_row(&self) -> ServiceResult<NewEntry> {
        let (cal_date, cal_time) = encode_start(self.start, self.timed)?;
        Ok(NewEntry {
            cal_create_by: self.creator.clone(),
            cal_date,
            cal_time,
            cal_duration: encode_duration(self.duration)?,
            cal_type: self.kind.with_repetition(self.recurrence.is_repeating()),
            cal_access: self.access,
            cal_name: self.name.clone(),
            cal_description: self.description.clone(),
        })
    }
}

/// A stored entry with its anchor and reconstructed recurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredEntry {
    pub entry: Entry,
    pub anchor: Anchor,
    pub recurrence: Recurrence,
}

/// ## Summary
/// Creates or overwrites an entry together with its recurrence.
///
/// Joins the caller's transaction if one is open.
///
/// ## Errors
/// Returns `ServiceError::NotFound` when overwriting an id that does not
/// exist, an RFC error if the rule is structurally invalid, or the
/// persistence error that aborted the write.
#[tracing::instrument(skip(conn, draft), fields(cal_id = ?draft.cal_id, name = %draft.name))]
pub async fn save_entry(
    conn: &mut DbConnection,
    draft: &EntryDraft,
    policy: MonthlyTypePolicy,
) -> ServiceResult<i32> {
    if let Some(rule) = &draft.recurrence.rule {
        rule.validate()?;
    }

    let row = draft.to_row()?;
    let existing_id = draft.cal_id;
    let recurrence = draft.recurrence.clone();

    let cal_id = with_transaction::<_, ServiceError, _>(conn, move |conn| {
        async move {
            let cal_id = match existing_id {
                Some(cal_id) => {
                    if entry::update(conn, cal_id, &row).await? == 0 {
                        return Err(ServiceError::NotFound(format!("entry {cal_id}")));
                    }
                    cal_id
                }
                None => entry::insert(conn, &row).await?,
            };
            repeat::save_recurrence(conn, cal_id, &recurrence, policy).await?;
            Ok(cal_id)
        }
        .scope_boxed()
    })
    .await?;

    tracing::debug!(cal_id, "Entry saved");
    Ok(cal_id)
}

/// ## Summary
/// Deletes an entry and its recurrence. Returns whether the entry existed.
///
/// ## Errors
/// Returns the persistence error that aborted the delete.
#[tracing::instrument(skip(conn))]
pub async fn delete_entry(conn: &mut DbConnection, cal_id: i32) -> ServiceResult<bool> {
    with_transaction::<_, ServiceError, _>(conn, move |conn| {
        async move {
            repeat::delete_recurrence(conn, cal_id).await?;
            Ok(entry::delete(conn, cal_id).await? > 0)
        }
        .scope_boxed()
    })
    .await
}

/// ## Summary
/// Saves many entries in one outer transaction.
///
/// Each save joins the outer transaction, so either every entry is stored
/// or none is.
///
/// ## Errors
/// Returns the first failing save's error; nothing is committed.
#[tracing::instrument(skip(conn, drafts), fields(count = drafts.len()))]
pub async fn import_entries(
    conn: &mut DbConnection,
    drafts: &[EntryDraft],
    policy: MonthlyTypePolicy,
) -> ServiceResult<Vec<i32>> {
    let drafts = drafts.to_vec();

    let ids = with_transaction::<_, ServiceError, _>(conn, move |conn| {
        async move {
            let mut ids = Vec::with_capacity(drafts.len());
            for draft in &drafts {
                ids.push(save_entry(conn, draft, policy).await?);
            }
            Ok(ids)
        }
        .scope_boxed()
    })
    .await?;

    tracing::info!(imported = ids.len(), "Entries imported");
    Ok(ids)
}

/// ## Summary
/// Loads one entry with its recurrence.
///
/// ## Errors
/// Returns an error if a query fails or stored data is corrupt.
pub async fn load_entry(conn: &mut DbConnection, cal_id: i32) -> ServiceResult<Option<StoredEntry>> {
    let Some(entry) = entry::find(conn, cal_id).await? else {
        return Ok(None);
    };
    let recurrence = repeat::load_recurrence(conn, cal_id).await?;
    let anchor = entry_anchor(&entry)?;
    Ok(Some(StoredEntry {
        entry,
        anchor,
        recurrence,
    }))
}
