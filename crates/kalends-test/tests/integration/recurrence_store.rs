use chrono::TimeDelta;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use kalends_test::core::config::MonthlyTypePolicy;
use kalends_test::db::db::enums::{EntryType, RepeatType};
use kalends_test::db::db::schema::{webcal_entry, webcal_entry_repeats, webcal_entry_repeats_not};
use kalends_test::db::error::DbError;
use kalends_test::db::model::calendar::repeat::EntryRepeat;
use kalends_test::rfc::Recurrence;
use kalends_test::service::entry::{EntryDraft, delete_entry, load_entry, save_entry};
use kalends_test::service::error::ServiceError;

use super::helpers::{TestDb, at, date};

const POLICY: MonthlyTypePolicy = MonthlyTypePolicy::Collapse;

fn standup() -> EntryDraft {
    EntryDraft::event(
        "alice",
        "Standup",
        at(2026, 1, 5, 9, 0),
        TimeDelta::minutes(15),
    )
}

fn legacy_weekly_row(cal_id: i32) -> EntryRepeat {
    EntryRepeat {
        cal_id,
        cal_type: RepeatType::Weekly,
        cal_end: None,
        cal_endtime: None,
        cal_frequency: None,
        cal_days: Some("nynynnn".to_string()),
        cal_bymonth: None,
        cal_bymonthday: None,
        cal_byday: None,
        cal_bysetpos: None,
        cal_byweekno: None,
        cal_byyearday: None,
        cal_byhour: None,
        cal_byminute: None,
        cal_bysecond: None,
        cal_count: None,
        cal_wkst: None,
    }
}

/// ## Summary
/// A saved rule, its exclusions and its additions load back unchanged.
#[test_log::test(tokio::test)]
#[ignore = "requires KALENDS_TEST_DATABASE_URL"]
async fn saved_recurrence_loads_back() {
    let test_db = TestDb::new().await.expect("Failed to create test database");
    let mut conn = test_db.get_conn().await.expect("connection");

    let recurrence = Recurrence::parse_rule("FREQ=WEEKLY;UNTIL=20260331;BYDAY=MO,WE")
        .expect("valid rule")
        .with_ex_date(date(2026, 1, 7))
        .with_ex_date(date(2026, 1, 14))
        .with_r_date(date(2026, 1, 10));
    let draft = standup().with_recurrence(recurrence.clone());

    let cal_id = save_entry(&mut conn, &draft, POLICY).await.expect("save");
    let stored = load_entry(&mut conn, cal_id)
        .await
        .expect("load")
        .expect("entry exists");

    assert_eq!(stored.recurrence, recurrence);
    assert_eq!(stored.entry.cal_type, EntryType::RepeatingEvent);
    assert_eq!(stored.anchor, draft.anchor());
    assert_eq!(
        stored.recurrence.rule.expect("rule").to_string(),
        "FREQ=WEEKLY;UNTIL=20260331;BYDAY=MO,WE"
    );
}

/// ## Summary
/// Saving twice replaces the recurrence as a whole instead of merging.
#[test_log::test(tokio::test)]
#[ignore = "requires KALENDS_TEST_DATABASE_URL"]
async fn overwrite_replaces_recurrence() {
    let test_db = TestDb::new().await.expect("Failed to create test database");
    let mut conn = test_db.get_conn().await.expect("connection");

    let first = standup().with_recurrence(
        Recurrence::parse_rule("FREQ=DAILY")
            .expect("valid rule")
            .with_ex_date(date(2026, 1, 6))
            .with_r_date(date(2026, 1, 3)),
    );
    let cal_id = save_entry(&mut conn, &first, POLICY).await.expect("save");

    let mut second = standup().with_recurrence(
        Recurrence::parse_rule("FREQ=WEEKLY;BYDAY=FR")
            .expect("valid rule")
            .with_ex_date(date(2026, 1, 9)),
    );
    second.cal_id = Some(cal_id);
    assert_eq!(save_entry(&mut conn, &second, POLICY).await.expect("save"), cal_id);

    let stored = load_entry(&mut conn, cal_id).await.expect("load").expect("entry");
    assert_eq!(stored.recurrence, second.recurrence);

    let mut single = standup();
    single.cal_id = Some(cal_id);
    save_entry(&mut conn, &single, POLICY).await.expect("save");

    let stored = load_entry(&mut conn, cal_id).await.expect("load").expect("entry");
    assert!(!stored.recurrence.is_repeating());
    assert!(stored.recurrence.ex_dates.is_empty());
    assert_eq!(stored.entry.cal_type, EntryType::Event);

    let rule_rows: i64 = webcal_entry_repeats::table
        .filter(webcal_entry_repeats::cal_id.eq(cal_id))
        .count()
        .get_result(&mut conn)
        .await
        .expect("count");
    assert_eq!(rule_rows, 0);
}

/// ## Summary
/// Deleting an entry removes its anchor, rule and exception rows.
#[test_log::test(tokio::test)]
#[ignore = "requires KALENDS_TEST_DATABASE_URL"]
async fn delete_removes_every_row() {
    let test_db = TestDb::new().await.expect("Failed to create test database");
    let mut conn = test_db.get_conn().await.expect("connection");

    let draft = standup().with_recurrence(
        Recurrence::parse_rule("FREQ=DAILY;COUNT=5")
            .expect("valid rule")
            .with_ex_date(date(2026, 1, 6)),
    );
    let cal_id = save_entry(&mut conn, &draft, POLICY).await.expect("save");

    assert!(delete_entry(&mut conn, cal_id).await.expect("delete"));
    assert!(!delete_entry(&mut conn, cal_id).await.expect("delete"));
    assert!(load_entry(&mut conn, cal_id).await.expect("load").is_none());

    let entries: i64 = webcal_entry::table.count().get_result(&mut conn).await.expect("count");
    let rules: i64 = webcal_entry_repeats::table
        .count()
        .get_result(&mut conn)
        .await
        .expect("count");
    let exceptions: i64 = webcal_entry_repeats_not::table
        .count()
        .get_result(&mut conn)
        .await
        .expect("count");
    assert_eq!((entries, rules, exceptions), (0, 0, 0));
}

/// ## Summary
/// Overwriting an id that was never stored is reported as not found.
#[test_log::test(tokio::test)]
#[ignore = "requires KALENDS_TEST_DATABASE_URL"]
async fn overwrite_of_missing_entry_is_not_found() {
    let test_db = TestDb::new().await.expect("Failed to create test database");
    let mut conn = test_db.get_conn().await.expect("connection");

    let mut draft = standup();
    draft.cal_id = Some(4242);
    let result = save_entry(&mut conn, &draft, POLICY).await;
    assert!(matches!(result, Err(ServiceError::NotFound(_))), "{result:?}");
}

/// ## Summary
/// Weekly rows written before `cal_byday` existed load their days from the
/// Sunday-first bitmask.
#[test_log::test(tokio::test)]
#[ignore = "requires KALENDS_TEST_DATABASE_URL"]
async fn legacy_weekly_mask_loads_as_by_day() {
    let test_db = TestDb::new().await.expect("Failed to create test database");
    let mut conn = test_db.get_conn().await.expect("connection");

    let cal_id = save_entry(&mut conn, &standup(), POLICY).await.expect("save");
    diesel::insert_into(webcal_entry_repeats::table)
        .values(&legacy_weekly_row(cal_id))
        .execute(&mut conn)
        .await
        .expect("insert legacy row");

    let stored = load_entry(&mut conn, cal_id).await.expect("load").expect("entry");
    let rule = stored.recurrence.rule.expect("rule");
    assert_eq!(rule.to_string(), "FREQ=WEEKLY;BYDAY=MO,WE");
}

/// ## Summary
/// A rule column that does not parse fails the load and names the column.
#[test_log::test(tokio::test)]
#[ignore = "requires KALENDS_TEST_DATABASE_URL"]
async fn corrupt_rule_column_fails_load() {
    let test_db = TestDb::new().await.expect("Failed to create test database");
    let mut conn = test_db.get_conn().await.expect("connection");

    let cal_id = save_entry(&mut conn, &standup(), POLICY).await.expect("save");
    let mut row = legacy_weekly_row(cal_id);
    row.cal_type = RepeatType::MonthlyByDate;
    row.cal_days = None;
    row.cal_bymonthday = Some("1,fifteen".to_string());
    diesel::insert_into(webcal_entry_repeats::table)
        .values(&row)
        .execute(&mut conn)
        .await
        .expect("insert corrupt row");

    let result = load_entry(&mut conn, cal_id).await;
    match result {
        Err(ServiceError::DatabaseError(DbError::CorruptColumn { column, .. })) => {
            assert_eq!(column, "cal_bymonthday");
        }
        other => panic!("expected a corrupt column error, got {other:?}"),
    }
}
