use chrono::TimeDelta;

use kalends_test::core::config::MonthlyTypePolicy;
use kalends_test::core::types::Occurrence;
use kalends_test::db::db::connection::DbConnection;
use kalends_test::db::db::query::entry::EntryScope;
use kalends_test::rfc::Recurrence;
use kalends_test::service::conflict::Booking;
use kalends_test::service::entry::{EntryDraft, save_entry};
use kalends_test::service::schedule::check_double_booking;

use super::helpers::{TestDb, at};

/// Seeds a daily 10:00-11:00 meeting and a single 10:30-11:30 call on
/// 2026-02-11. Returns `(daily, single)`.
async fn seed(conn: &mut DbConnection) -> (i32, i32) {
    let daily = EntryDraft::event("alice", "Daily", at(2026, 1, 1, 10, 0), TimeDelta::hours(1))
        .with_recurrence(Recurrence::parse_rule("FREQ=DAILY").expect("valid rule"));
    let single = EntryDraft::event("alice", "Call", at(2026, 2, 11, 10, 30), TimeDelta::hours(1));

    let daily = save_entry(conn, &daily, MonthlyTypePolicy::Collapse)
        .await
        .expect("save daily");
    let single = save_entry(conn, &single, MonthlyTypePolicy::Collapse)
        .await
        .expect("save single");
    (daily, single)
}

fn candidate(cal_id: Option<i32>, start: (u32, u32), end: (u32, u32)) -> Booking {
    Booking::new(
        cal_id,
        Occurrence::new(at(2026, 2, 11, start.0, start.1), at(2026, 2, 11, end.0, end.1)),
    )
}

/// ## Summary
/// Recurring and single entries are both expanded and compared against the
/// candidate, and the limit decides whether the overlaps are too many.
#[test_log::test(tokio::test)]
#[ignore = "requires KALENDS_TEST_DATABASE_URL"]
async fn overlaps_are_counted_against_limit() {
    let test_db = TestDb::new().await.expect("Failed to create test database");
    let mut conn = test_db.get_conn().await.expect("connection");
    let (daily, single) = seed(&mut conn).await;
    let scope = EntryScope::created_by("alice");
    let booking = candidate(None, (10, 15), (10, 45));

    let check = check_double_booking(&mut conn, &booking, &scope, 1)
        .await
        .expect("check");
    let mut ids: Vec<_> = check.conflicts.iter().filter_map(|b| b.cal_id).collect();
    ids.sort_unstable();
    assert_eq!(ids, vec![daily, single]);
    assert!(check.exceeded);

    let check = check_double_booking(&mut conn, &booking, &scope, 2)
        .await
        .expect("check");
    assert!(check.exceeded);

    let check = check_double_booking(&mut conn, &booking, &scope, 3)
        .await
        .expect("check");
    assert_eq!(check.conflicts.len(), 2);
    assert!(!check.exceeded);
}

/// ## Summary
/// Touching intervals do not overlap.
#[test_log::test(tokio::test)]
#[ignore = "requires KALENDS_TEST_DATABASE_URL"]
async fn adjacent_booking_is_free() {
    let test_db = TestDb::new().await.expect("Failed to create test database");
    let mut conn = test_db.get_conn().await.expect("connection");
    seed(&mut conn).await;

    let check = check_double_booking(
        &mut conn,
        &candidate(None, (11, 30), (12, 0)),
        &EntryScope::created_by("alice"),
        1,
    )
    .await
    .expect("check");
    assert!(check.conflicts.is_empty());
    assert!(!check.exceeded);
}

/// ## Summary
/// Re-saving an entry in place does not conflict with itself.
#[test_log::test(tokio::test)]
#[ignore = "requires KALENDS_TEST_DATABASE_URL"]
async fn own_entry_is_ignored() {
    let test_db = TestDb::new().await.expect("Failed to create test database");
    let mut conn = test_db.get_conn().await.expect("connection");
    let (daily, single) = seed(&mut conn).await;

    let check = check_double_booking(
        &mut conn,
        &candidate(Some(single), (10, 30), (11, 30)),
        &EntryScope::created_by("alice"),
        1,
    )
    .await
    .expect("check");
    let ids: Vec<_> = check.conflicts.iter().filter_map(|b| b.cal_id).collect();
    assert_eq!(ids, vec![daily]);
}

/// ## Summary
/// A limit of 0 disables the check, and entries outside the scope never
/// conflict.
#[test_log::test(tokio::test)]
#[ignore = "requires KALENDS_TEST_DATABASE_URL"]
async fn disabled_or_out_of_scope_checks_pass() {
    let test_db = TestDb::new().await.expect("Failed to create test database");
    let mut conn = test_db.get_conn().await.expect("connection");
    seed(&mut conn).await;
    let booking = candidate(None, (10, 0), (11, 0));

    let check = check_double_booking(&mut conn, &booking, &EntryScope::created_by("alice"), 0)
        .await
        .expect("check");
    assert!(check.conflicts.is_empty());
    assert!(!check.exceeded);

    let check = check_double_booking(&mut conn, &booking, &EntryScope::created_by("bob"), 1)
        .await
        .expect("check");
    assert!(check.conflicts.is_empty());
    assert!(!check.exceeded);
}

/// ## Summary
/// A booking that starts the evening before and runs past midnight still
/// conflicts with an early-morning candidate.
#[test_log::test(tokio::test)]
#[ignore = "requires KALENDS_TEST_DATABASE_URL"]
async fn overnight_booking_from_previous_day_conflicts() {
    let test_db = TestDb::new().await.expect("Failed to create test database");
    let mut conn = test_db.get_conn().await.expect("connection");
    seed(&mut conn).await;
    let late = EntryDraft::event("alice", "Late shift", at(2026, 2, 10, 23, 0), TimeDelta::hours(3));
    let late = save_entry(&mut conn, &late, MonthlyTypePolicy::Collapse)
        .await
        .expect("save late shift");

    let check = check_double_booking(
        &mut conn,
        &candidate(None, (0, 30), (1, 30)),
        &EntryScope::created_by("alice"),
        1,
    )
    .await
    .expect("check");
    let ids: Vec<_> = check.conflicts.iter().filter_map(|b| b.cal_id).collect();
    assert_eq!(ids, vec![late]);
    assert!(check.exceeded);
}
