use chrono::TimeDelta;

use kalends_test::core::config::{MonthlyTypePolicy, RecurrenceConfig};
use kalends_test::core::types::TimeWindow;
use kalends_test::db::db::connection::DbConnection;
use kalends_test::db::db::enums::EntryType;
use kalends_test::db::db::query::entry::EntryScope;
use kalends_test::rfc::Recurrence;
use kalends_test::service::entry::{EntryDraft, save_entry};
use kalends_test::service::error::ServiceError;
use kalends_test::service::schedule::{entries_in_window, occurrences_in_window};

use super::helpers::{TestDb, at, date};

struct Seeded {
    single: i32,
    daily: i32,
    added_only: i32,
    ending_monday: i32,
    excluded_thursday: i32,
    bob: i32,
}

async fn save(conn: &mut DbConnection, draft: EntryDraft) -> i32 {
    save_entry(conn, &draft, MonthlyTypePolicy::Collapse)
        .await
        .expect("save entry")
}

fn rule(text: &str) -> Recurrence {
    Recurrence::parse_rule(text).expect("valid rule")
}

fn event(creator: &str, name: &str, start: chrono::DateTime<chrono::Utc>) -> EntryDraft {
    EntryDraft::event(creator, name, start, TimeDelta::minutes(30))
}

/// Seeds entries around the first week of March 2026, Sunday the 1st through
/// Saturday the 7th.
async fn seed(conn: &mut DbConnection) -> Seeded {
    let single = save(conn, event("alice", "Dentist", at(2026, 3, 3, 10, 0))).await;
    save(conn, event("alice", "Before", at(2026, 2, 20, 10, 0))).await;
    save(conn, event("alice", "After", at(2026, 3, 10, 10, 0))).await;

    let daily = save(
        conn,
        event("alice", "Daily", at(2026, 1, 1, 9, 0)).with_recurrence(rule("FREQ=DAILY")),
    )
    .await;
    save(
        conn,
        event("alice", "Ended", at(2026, 1, 1, 9, 0))
            .with_recurrence(rule("FREQ=DAILY;UNTIL=20260215")),
    )
    .await;
    let added_only = save(
        conn,
        event("alice", "Added", at(2026, 1, 15, 14, 0))
            .with_recurrence(Recurrence::none().with_r_date(date(2026, 3, 5))),
    )
    .await;
    let ending_monday = save(
        conn,
        event("alice", "Mondays", at(2026, 2, 2, 8, 0))
            .with_recurrence(rule("FREQ=WEEKLY;UNTIL=20260303;BYDAY=MO")),
    )
    .await;
    let excluded_thursday = save(
        conn,
        event("alice", "Thursdays", at(2026, 2, 5, 16, 0)).with_recurrence(
            rule("FREQ=WEEKLY;BYDAY=TH").with_ex_date(date(2026, 3, 5)),
        ),
    )
    .await;
    let bob = save(conn, event("bob", "Bob's", at(2026, 3, 4, 11, 0))).await;

    Seeded {
        single,
        daily,
        added_only,
        ending_monday,
        excluded_thursday,
        bob,
    }
}

fn first_week() -> TimeWindow {
    TimeWindow::from_dates(date(2026, 3, 1), date(2026, 3, 7)).expect("valid window")
}

/// ## Summary
/// The planner returns every entry that may occur in the window and skips
/// entries anchored outside it or ended before it.
#[test_log::test(tokio::test)]
#[ignore = "requires KALENDS_TEST_DATABASE_URL"]
async fn candidates_cover_anchored_and_recurring_entries() {
    let test_db = TestDb::new().await.expect("Failed to create test database");
    let mut conn = test_db.get_conn().await.expect("connection");
    let seeded = seed(&mut conn).await;

    let entries = entries_in_window(
        &mut conn,
        &first_week(),
        &EntryScope::created_by("alice"),
        &RecurrenceConfig::default(),
    )
    .await
    .expect("entries in window");

    let ids: Vec<i32> = entries.iter().map(|stored| stored.entry.cal_id).collect();
    assert_eq!(
        ids,
        vec![
            seeded.daily,
            seeded.added_only,
            seeded.ending_monday,
            seeded.excluded_thursday,
            seeded.single,
        ]
    );

    let thursday = entries
        .iter()
        .find(|stored| stored.entry.cal_id == seeded.excluded_thursday)
        .expect("thursday entry");
    assert!(thursday.recurrence.ex_dates.contains(date(2026, 3, 5)));
}

/// ## Summary
/// Expansion clips candidates to the window and orders the merged result.
#[test_log::test(tokio::test)]
#[ignore = "requires KALENDS_TEST_DATABASE_URL"]
async fn occurrences_are_expanded_and_ordered() {
    let test_db = TestDb::new().await.expect("Failed to create test database");
    let mut conn = test_db.get_conn().await.expect("connection");
    let seeded = seed(&mut conn).await;

    let occurrences = occurrences_in_window(
        &mut conn,
        &first_week(),
        &EntryScope::created_by("alice"),
        &RecurrenceConfig::default(),
    )
    .await
    .expect("occurrences in window");

    let summary: Vec<_> = occurrences
        .iter()
        .map(|o| (o.occurrence.start, o.cal_id))
        .collect();
    assert_eq!(
        summary,
        vec![
            (at(2026, 3, 1, 9, 0), seeded.daily),
            (at(2026, 3, 2, 8, 0), seeded.ending_monday),
            (at(2026, 3, 2, 9, 0), seeded.daily),
            (at(2026, 3, 3, 9, 0), seeded.daily),
            (at(2026, 3, 3, 10, 0), seeded.single),
            (at(2026, 3, 4, 9, 0), seeded.daily),
            (at(2026, 3, 5, 9, 0), seeded.daily),
            (at(2026, 3, 5, 14, 0), seeded.added_only),
            (at(2026, 3, 6, 9, 0), seeded.daily),
            (at(2026, 3, 7, 9, 0), seeded.daily),
        ]
    );
    assert!(
        occurrences
            .iter()
            .all(|o| o.occurrence.duration() == TimeDelta::minutes(30))
    );
}

/// ## Summary
/// Scope predicates narrow the candidate set.
#[test_log::test(tokio::test)]
#[ignore = "requires KALENDS_TEST_DATABASE_URL"]
async fn scope_restricts_candidates() {
    let test_db = TestDb::new().await.expect("Failed to create test database");
    let mut conn = test_db.get_conn().await.expect("connection");
    let seeded = seed(&mut conn).await;
    let config = RecurrenceConfig::default();

    let bobs = entries_in_window(&mut conn, &first_week(), &EntryScope::created_by("bob"), &config)
        .await
        .expect("entries in window");
    let ids: Vec<i32> = bobs.iter().map(|stored| stored.entry.cal_id).collect();
    assert_eq!(ids, vec![seeded.bob]);

    let singles = entries_in_window(
        &mut conn,
        &first_week(),
        &EntryScope::default().with_entry_types([EntryType::Event]),
        &config,
    )
    .await
    .expect("entries in window");
    let ids: Vec<i32> = singles.iter().map(|stored| stored.entry.cal_id).collect();
    assert_eq!(ids, vec![seeded.single, seeded.bob]);
}

/// ## Summary
/// Windows wider than the configured maximum are refused before querying.
#[test_log::test(tokio::test)]
#[ignore = "requires KALENDS_TEST_DATABASE_URL"]
async fn oversized_window_is_rejected() {
    let test_db = TestDb::new().await.expect("Failed to create test database");
    let mut conn = test_db.get_conn().await.expect("connection");

    let decade = TimeWindow::from_dates(date(2020, 1, 1), date(2030, 12, 31)).expect("valid window");
    let result = occurrences_in_window(
        &mut conn,
        &decade,
        &EntryScope::default(),
        &RecurrenceConfig::default(),
    )
    .await;
    assert!(matches!(result, Err(ServiceError::ValidationError(_))), "{result:?}");
}
