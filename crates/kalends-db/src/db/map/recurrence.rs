//! DB <-> recurrence mapping helpers.
//!
//! Field layout of `webcal_entry_repeats`:
//!
//! | Rule part        | Column            | Encoding                                  |
//! |------------------|-------------------|-------------------------------------------|
//! | FREQ             | `cal_type`        | legacy keyword                            |
//! | INTERVAL         | `cal_frequency`   | integer, NULL when 1                      |
//! | COUNT            | `cal_count`       | integer, NULL when 0                      |
//! | UNTIL            | `cal_end`/`cal_endtime` | `YYYYMMDD` / `HHMMSS`, time NULL for a date |
//! | BYDAY (weekly)   | `cal_days`        | 7-char `y`/`n` mask, Sunday first         |
//! | BYDAY            | `cal_byday`       | comma list, e.g. `2MO,-1FR`               |
//! | other BY* parts  | `cal_by*`         | comma list, NULL when empty               |
//! | WKST             | `cal_wkst`        | two-letter weekday                        |

use chrono::NaiveDateTime;

use kalends_core::config::MonthlyTypePolicy;
use kalends_rfc::Recurrence;
use kalends_rfc::rfc::rrule::{
    Frequency, RRuleUntil, RecurrenceRule, Weekday, WeekdayNum, parse_byday,
};

use crate::db::enums::{ExceptionKind, RepeatType};
use crate::db::legacy::{
    Column, decode_hms, decode_list, decode_weekday_mask, decode_ymd, encode_hms, encode_list,
    encode_weekday_mask, encode_ymd,
};
use crate::error::DbResult;
use crate::model::calendar::exception::EntryException;
use crate::model::calendar::repeat::EntryRepeat;

const REPEATS: &str = "webcal_entry_repeats";
const REPEATS_NOT: &str = "webcal_entry_repeats_not";

/// ## Summary
/// Chooses the legacy `cal_type` keyword for a rule.
///
/// Under [`MonthlyTypePolicy::Collapse`] every MONTHLY rule is written as
/// `monthlyByDate`.
#[must_use]
pub fn repeat_type_for(rule: &RecurrenceRule, policy: MonthlyTypePolicy) -> RepeatType {
    match rule.freq {
        Frequency::Daily => RepeatType::Daily,
        Frequency::Weekly => RepeatType::Weekly,
        Frequency::Yearly => RepeatType::Yearly,
        Frequency::Monthly => match policy {
            MonthlyTypePolicy::Collapse => RepeatType::MonthlyByDate,
            MonthlyTypePolicy::Distinguish if !rule.by_set_pos.is_empty() => {
                RepeatType::MonthlyBySetPos
            }
            MonthlyTypePolicy::Distinguish if !rule.by_day.is_empty() => RepeatType::MonthlyByDay,
            MonthlyTypePolicy::Distinguish => RepeatType::MonthlyByDate,
        },
    }
}

/// ## Summary
/// Builds the rule row for an entry.
///
/// ## Errors
/// Returns `DbError::OutOfRange` if UNTIL, INTERVAL or COUNT does not fit its
/// column.
pub fn rule_to_row(
    cal_id: i32,
    rule: &RecurrenceRule,
    policy: MonthlyTypePolicy,
) -> DbResult<EntryRepeat> {
    let (cal_end, cal_endtime) = match rule.until {
        Some(until) => (
            Some(encode_ymd(Column::new(REPEATS, "cal_end"), until.date())?),
            until.time().map(encode_hms),
        ),
        None => (None, None),
    };
    let cal_frequency = (rule.interval != 1)
        .then(|| {
            i32::try_from(rule.interval)
                .map_err(|_| Column::new(REPEATS, "cal_frequency").out_of_range(rule.interval))
        })
        .transpose()?;
    let cal_count = (rule.count != 0)
        .then(|| {
            i32::try_from(rule.count)
                .map_err(|_| Column::new(REPEATS, "cal_count").out_of_range(rule.count))
        })
        .transpose()?;

    let cal_days = (rule.freq == Frequency::Weekly && !rule.by_day.is_empty())
        .then(|| encode_weekday_mask(&rule.by_day));

    Ok(EntryRepeat {
        cal_id,
        cal_type: repeat_type_for(rule, policy),
        cal_end,
        cal_endtime,
        cal_frequency,
        cal_days,
        cal_bymonth: encode_list(&rule.by_month),
        cal_bymonthday: encode_list(&rule.by_month_day),
        cal_byday: encode_list(&rule.by_day),
        cal_bysetpos: encode_list(&rule.by_set_pos),
        cal_byweekno: encode_list(&rule.by_week_no),
        cal_byyearday: encode_list(&rule.by_year_day),
        cal_byhour: encode_list(&rule.by_hour),
        cal_byminute: encode_list(&rule.by_minute),
        cal_bysecond: encode_list(&rule.by_second),
        cal_count,
        cal_wkst: rule.wkst.map(|wkst| wkst.as_str().to_string()),
    })
}

/// ## Summary
/// Rebuilds a rule from its stored row.
///
/// The monthly sub-type is not consulted beyond FREQ; BYDAY, BYSETPOS and
/// BYMONTHDAY come from their own columns. A WEEKLY row without `cal_byday`
/// falls back to the `cal_days` mask.
///
/// ## Errors
/// Returns `DbError::CorruptColumn` for undecodable columns and
/// `DbError::Rfc` if the decoded rule is structurally invalid.
pub fn row_to_rule(row: &EntryRepeat) -> DbResult<RecurrenceRule> {
    let freq = row.cal_type.frequency();
    let mut rule = RecurrenceRule::new(freq);

    if let Some(interval) = row.cal_frequency {
        rule.interval = u32::try_from(interval)
            .map_err(|_| Column::new(REPEATS, "cal_frequency").corrupt(interval))?;
    }
    if let Some(count) = row.cal_count {
        rule.count =
            u32::try_from(count).map_err(|_| Column::new(REPEATS, "cal_count").corrupt(count))?;
    }
    rule.until = decode_until(row)?;

    rule.by_day = decode_byday(row)?;
    rule.by_month = decode_list(Column::new(REPEATS, "cal_bymonth"), row.cal_bymonth.as_deref())?;
    rule.by_month_day = decode_list(
        Column::new(REPEATS, "cal_bymonthday"),
        row.cal_bymonthday.as_deref(),
    )?;
    rule.by_year_day = decode_list(
        Column::new(REPEATS, "cal_byyearday"),
        row.cal_byyearday.as_deref(),
    )?;
    rule.by_week_no = decode_list(
        Column::new(REPEATS, "cal_byweekno"),
        row.cal_byweekno.as_deref(),
    )?;
    rule.by_set_pos = decode_list(
        Column::new(REPEATS, "cal_bysetpos"),
        row.cal_bysetpos.as_deref(),
    )?;
    rule.by_hour = decode_list(Column::new(REPEATS, "cal_byhour"), row.cal_byhour.as_deref())?;
    rule.by_minute = decode_list(
        Column::new(REPEATS, "cal_byminute"),
        row.cal_byminute.as_deref(),
    )?;
    rule.by_second = decode_list(
        Column::new(REPEATS, "cal_bysecond"),
        row.cal_bysecond.as_deref(),
    )?;

    if let Some(wkst) = row.cal_wkst.as_deref().map(str::trim).filter(|w| !w.is_empty()) {
        rule.wkst = Some(
            Weekday::parse(wkst).ok_or_else(|| Column::new(REPEATS, "cal_wkst").corrupt(wkst))?,
        );
    }

    rule.validate()?;
    tracing::trace!(cal_id = row.cal_id, rule = %rule, "Loaded recurrence rule");
    Ok(rule)
}

fn decode_until(row: &EntryRepeat) -> DbResult<Option<RRuleUntil>> {
    let Some(end) = row.cal_end.filter(|end| *end != 0) else {
        return Ok(None);
    };
    let date = decode_ymd(Column::new(REPEATS, "cal_end"), end)?;
    Ok(Some(match row.cal_endtime {
        Some(time) => RRuleUntil::DateTime(NaiveDateTime::new(
            date,
            decode_hms(Column::new(REPEATS, "cal_endtime"), time)?,
        )),
        None => RRuleUntil::Date(date),
    }))
}

fn decode_byday(row: &EntryRepeat) -> DbResult<Vec<WeekdayNum>> {
    if let Some(byday) = row.cal_byday.as_deref().map(str::trim).filter(|b| !b.is_empty()) {
        return parse_byday(byday).map_err(|_| Column::new(REPEATS, "cal_byday").corrupt(byday));
    }
    match row.cal_days.as_deref() {
        Some(days) if row.cal_type == RepeatType::Weekly => {
            decode_weekday_mask(Column::new(REPEATS, "cal_days"), days)
        }
        _ => Ok(Vec::new()),
    }
}

/// ## Summary
/// Builds one exception row per distinct excluded and added date.
///
/// ## Errors
/// Returns `DbError::OutOfRange` for a date the column cannot hold.
pub fn exceptions_to_rows(cal_id: i32, recurrence: &Recurrence) -> DbResult<Vec<EntryException>> {
    let column = Column::new(REPEATS_NOT, "cal_date");
    let excluded = recurrence
        .ex_dates
        .iter()
        .map(|date| (date, ExceptionKind::Exclude));
    let added = recurrence
        .r_dates
        .iter()
        .map(|date| (date, ExceptionKind::Include));
    excluded
        .chain(added)
        .map(|(date, cal_exdate)| {
            Ok(EntryException {
                cal_id,
                cal_date: encode_ymd(column, date)?,
                cal_exdate,
            })
        })
        .collect()
}

/// ## Summary
/// Rebuilds a recurrence from its optional rule row and its exception rows.
///
/// ## Errors
/// Returns the first decoding or validation failure; no field is defaulted.
pub fn rows_to_recurrence(
    repeat: Option<&EntryRepeat>,
    exceptions: &[EntryException],
) -> DbResult<Recurrence> {
    let mut recurrence = Recurrence {
        rule: repeat.map(row_to_rule).transpose()?,
        ..Recurrence::default()
    };

    let column = Column::new(REPEATS_NOT, "cal_date");
    for exception in exceptions {
        let date = decode_ymd(column, exception.cal_date)?;
        match exception.cal_exdate {
            ExceptionKind::Exclude => recurrence.ex_dates.insert(date),
            ExceptionKind::Include => recurrence.r_dates.insert(date),
        };
    }

    Ok(recurrence)
}
