//! RECUR value parser (RFC 5545 §3.3.10).

use std::collections::HashSet;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};

use super::core::{Frequency, RRuleUntil, Weekday, WeekdayNum};
use super::rule::RecurrenceRule;
use crate::error::{RfcError, RfcResult};

/// Parses a RECUR (RRULE) value without applying structural validation.
///
/// Accepts an optional `RRULE:` prefix and tolerates a trailing `;`.
///
/// ## Errors
/// Returns `RfcError::ParseError` on unknown or repeated rule parts, malformed
/// numbers or weekdays, and `RfcError::ValidationError` when FREQ is missing
/// or unsupported.
pub fn parse_rrule(s: &str) -> RfcResult<RecurrenceRule> {
    let body = s.trim();
    let body = body
        .strip_prefix("RRULE:")
        .or_else(|| body.strip_prefix("rrule:"))
        .unwrap_or(body);

    let mut parts = Vec::new();
    let mut seen = HashSet::new();
    for part in body.split(';').filter(|part| !part.trim().is_empty()) {
        let (key, value) = part
            .split_once('=')
            .ok_or_else(|| malformed(format!("rule part `{part}` has no value")))?;
        let key = key.trim().to_ascii_uppercase();
        if !seen.insert(key.clone()) {
            return Err(malformed(format!("rule part {key} appears more than once")));
        }
        parts.push((key, value.trim()));
    }

    let freq_text = parts
        .iter()
        .find(|(key, _)| key == "FREQ")
        .map(|(_, value)| *value)
        .ok_or_else(|| RfcError::ValidationError("FREQ is required".to_string()))?;
    let freq = Frequency::parse(freq_text)
        .ok_or_else(|| RfcError::ValidationError(format!("unsupported FREQ `{freq_text}`")))?;

    let mut rule = RecurrenceRule::new(freq);
    for (key, value) in parts {
        parse_rrule_part(&mut rule, &key, value)?;
    }

    tracing::trace!(rule = %rule, "Parsed recurrence rule");
    Ok(rule)
}

/// Parses a single RRULE key-value pair.
fn parse_rrule_part(rule: &mut RecurrenceRule, key: &str, value: &str) -> RfcResult<()> {
    match key {
        "FREQ" => {}
        "INTERVAL" => rule.interval = parse_number("INTERVAL", value)?,
        "COUNT" => rule.count = parse_number("COUNT", value)?,
        "UNTIL" => rule.until = Some(parse_until(value)?),
        "WKST" => {
            rule.wkst = Some(
                Weekday::parse(value)
                    .ok_or_else(|| malformed(format!("invalid WKST `{value}`")))?,
            );
        }
        "BYSECOND" => rule.by_second = parse_list(key, value)?,
        "BYMINUTE" => rule.by_minute = parse_list(key, value)?,
        "BYHOUR" => rule.by_hour = parse_list(key, value)?,
        "BYDAY" => rule.by_day = parse_byday(value)?,
        "BYMONTHDAY" => rule.by_month_day = parse_list(key, value)?,
        "BYYEARDAY" => rule.by_year_day = parse_list(key, value)?,
        "BYWEEKNO" => rule.by_week_no = parse_list(key, value)?,
        "BYMONTH" => rule.by_month = parse_list(key, value)?,
        "BYSETPOS" => rule.by_set_pos = parse_list(key, value)?,
        other => return Err(malformed(format!("unknown rule part {other}"))),
    }
    Ok(())
}

fn malformed(message: String) -> RfcError {
    RfcError::ParseError(message)
}

fn parse_number<T: FromStr>(part: &str, value: &str) -> RfcResult<T> {
    value
        .parse()
        .map_err(|_| malformed(format!("invalid {part} value `{value}`")))
}

/// Parses a comma-separated list of integers.
///
/// ## Errors
/// Returns `RfcError::ParseError` if any element is empty or not a number
/// of the target width.
pub fn parse_list<T: FromStr>(part: &str, value: &str) -> RfcResult<Vec<T>> {
    value
        .split(',')
        .map(|v| parse_number(part, v.trim()))
        .collect()
}

/// Parses UNTIL as either `YYYYMMDD` or `YYYYMMDDTHHMMSSZ`.
///
/// A date-time without the trailing `Z` is read as UTC.
///
/// ## Errors
/// Returns `RfcError::ParseError` if the value is neither form.
pub fn parse_until(value: &str) -> RfcResult<RRuleUntil> {
    if value.contains('T') {
        let trimmed = value.strip_suffix('Z').unwrap_or(value);
        NaiveDateTime::parse_from_str(trimmed, "%Y%m%dT%H%M%S")
            .map(RRuleUntil::DateTime)
            .map_err(|err| malformed(format!("invalid UNTIL `{value}`: {err}")))
    } else {
        NaiveDate::parse_from_str(value, "%Y%m%d")
            .map(RRuleUntil::Date)
            .map_err(|err| malformed(format!("invalid UNTIL `{value}`: {err}")))
    }
}

/// Parses a BYDAY value (weekdays with optional ordinals).
///
/// ## Errors
/// Returns `RfcError::ParseError` if any element is not `[+-]?N?XX`.
pub fn parse_byday(s: &str) -> RfcResult<Vec<WeekdayNum>> {
    s.split(',').map(|v| parse_weekday_num(v.trim())).collect()
}

/// Parses a single weekday with optional ordinal (e.g., "MO", "1MO", "-1FR").
fn parse_weekday_num(s: &str) -> RfcResult<WeekdayNum> {
    if s.len() < 2 || !s.is_char_boundary(s.len() - 2) {
        return Err(malformed(format!("invalid BYDAY element `{s}`")));
    }

    let (ordinal_str, weekday_str) = s.split_at(s.len() - 2);

    let weekday = Weekday::parse(weekday_str)
        .ok_or_else(|| malformed(format!("invalid weekday in BYDAY element `{s}`")))?;

    let ordinal = if ordinal_str.is_empty() {
        None
    } else {
        let ordinal_str = ordinal_str.strip_prefix('+').unwrap_or(ordinal_str);
        Some(parse_number("BYDAY ordinal", ordinal_str)?)
    };

    Ok(WeekdayNum { ordinal, weekday })
}
