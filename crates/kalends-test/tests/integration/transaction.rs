use chrono::TimeDelta;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use diesel_async::scoped_futures::ScopedFutureExt;

use kalends_test::core::config::MonthlyTypePolicy;
use kalends_test::db::db::connection::DbConnection;
use kalends_test::db::db::schema::{webcal_entry, webcal_entry_repeats, webcal_entry_repeats_not};
use kalends_test::db::db::transaction::{in_transaction, with_transaction};
use kalends_test::rfc::Recurrence;
use kalends_test::service::entry::{EntryDraft, import_entries, load_entry, save_entry};
use kalends_test::service::error::ServiceError;

use super::helpers::{TestDb, at, date};

const POLICY: MonthlyTypePolicy = MonthlyTypePolicy::Collapse;

fn weekly(name: &str, day: u32) -> EntryDraft {
    EntryDraft::event("alice", name, at(2026, 1, day, 9, 0), TimeDelta::hours(1)).with_recurrence(
        Recurrence::parse_rule("FREQ=WEEKLY;COUNT=4")
            .expect("valid rule")
            .with_ex_date(date(2026, 1, day + 7)),
    )
}

async fn row_counts(conn: &mut DbConnection) -> (i64, i64, i64) {
    let entries = webcal_entry::table
        .count()
        .get_result(conn)
        .await
        .expect("count entries");
    let rules = webcal_entry_repeats::table
        .count()
        .get_result(conn)
        .await
        .expect("count rules");
    let exceptions = webcal_entry_repeats_not::table
        .count()
        .get_result(conn)
        .await
        .expect("count exceptions");
    (entries, rules, exceptions)
}

/// ## Summary
/// A successful import stores every entry with its recurrence.
#[test_log::test(tokio::test)]
#[ignore = "requires KALENDS_TEST_DATABASE_URL"]
async fn import_commits_all_entries() {
    let test_db = TestDb::new().await.expect("Failed to create test database");
    let mut conn = test_db.get_conn().await.expect("connection");

    let drafts = [weekly("Mon", 5), weekly("Tue", 6), weekly("Wed", 7)];
    let ids = import_entries(&mut conn, &drafts, POLICY).await.expect("import");
    assert_eq!(ids.len(), 3);

    for (id, draft) in ids.iter().zip(&drafts) {
        let stored = load_entry(&mut conn, *id).await.expect("load").expect("entry");
        assert_eq!(stored.entry.cal_name, draft.name);
        assert_eq!(stored.recurrence, draft.recurrence);
    }
    assert_eq!(row_counts(&mut conn).await, (3, 3, 3));
}

/// ## Summary
/// A failing save inside an import rolls back the saves that succeeded
/// before it.
#[test_log::test(tokio::test)]
#[ignore = "requires KALENDS_TEST_DATABASE_URL"]
async fn failed_import_rolls_back_earlier_saves() {
    let test_db = TestDb::new().await.expect("Failed to create test database");
    let mut conn = test_db.get_conn().await.expect("connection");

    let mut missing = weekly("Missing", 8);
    missing.cal_id = Some(9999);
    let drafts = [weekly("Mon", 5), weekly("Tue", 6), missing];

    let result = import_entries(&mut conn, &drafts, POLICY).await;
    assert!(matches!(result, Err(ServiceError::NotFound(_))), "{result:?}");
    assert_eq!(row_counts(&mut conn).await, (0, 0, 0));
    assert!(!in_transaction(&mut conn).expect("transaction status"));
}

/// ## Summary
/// Nested calls join the caller's transaction, so an error raised by the
/// caller after a nested save discards that save.
#[test_log::test(tokio::test)]
#[ignore = "requires KALENDS_TEST_DATABASE_URL"]
async fn nested_save_joins_outer_transaction() {
    let test_db = TestDb::new().await.expect("Failed to create test database");
    let mut conn = test_db.get_conn().await.expect("connection");
    assert!(!in_transaction(&mut conn).expect("transaction status"));

    let draft = weekly("Abandoned", 5);
    let result = with_transaction::<_, ServiceError, _>(&mut conn, move |conn| {
        async move {
            let cal_id = save_entry(conn, &draft, POLICY).await?;
            assert!(in_transaction(conn)?);
            assert!(load_entry(conn, cal_id).await?.is_some());
            Err::<i32, _>(ServiceError::ValidationError(format!(
                "abandoning entry {cal_id}"
            )))
        }
        .scope_boxed()
    })
    .await;

    assert!(matches!(result, Err(ServiceError::ValidationError(_))), "{result:?}");
    assert_eq!(row_counts(&mut conn).await, (0, 0, 0));
}

/// ## Summary
/// Without an enclosing transaction each save commits on its own.
#[test_log::test(tokio::test)]
#[ignore = "requires KALENDS_TEST_DATABASE_URL"]
async fn standalone_saves_commit_independently() {
    let test_db = TestDb::new().await.expect("Failed to create test database");
    let mut conn = test_db.get_conn().await.expect("connection");

    save_entry(&mut conn, &weekly("Kept", 5), POLICY).await.expect("save");
    let mut missing = weekly("Missing", 6);
    missing.cal_id = Some(9999);
    assert!(save_entry(&mut conn, &missing, POLICY).await.is_err());

    assert_eq!(row_counts(&mut conn).await, (1, 1, 1));
}
