//! Occurrence expansion using the `rrule` crate.
//!
//! The engine generates the rule and merges in the RDATE additions. Excluded
//! dates are whole calendar days, so they are applied here to every generated
//! start on that date, and the ascending output is clipped to the requested
//! window.

use chrono::{DateTime, NaiveDate, TimeDelta, Utc};
use rrule::{RRule, RRuleSet, Tz, Unvalidated};

use kalends_core::types::{Occurrence, TimeWindow};

use crate::error::{RfcError, RfcResult};
use crate::recurrence::Recurrence;
use crate::rfc::rrule::RecurrenceRule;

/// Stored start and length of an entry. The start is always the first occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Anchor {
    pub start: DateTime<Utc>,
    pub duration: TimeDelta,
}

impl Anchor {
    #[must_use]
    pub const fn new(start: DateTime<Utc>, duration: TimeDelta) -> Self {
        Self { start, duration }
    }

    /// Anchor with a duration given in whole minutes.
    #[must_use]
    pub fn with_minutes(start: DateTime<Utc>, minutes: i64) -> Self {
        Self::new(start, TimeDelta::minutes(minutes))
    }

    /// The addition date placed at the anchor's time of day.
    fn on(&self, date: NaiveDate) -> DateTime<Tz> {
        date.and_time(self.start.time())
            .and_utc()
            .with_timezone(&Tz::UTC)
    }
}

/// ## Summary
/// Expands an entry into its occurrences inside `window`.
///
/// A non-repeating recurrence yields exactly one occurrence at the anchor,
/// whether or not it falls inside the window; callers restrict single entries
/// to the window when they query for them.
///
/// A repeating recurrence yields occurrences in ascending start order whose
/// start lies in `[window.start, window.end]`. Unbounded rules stop at the
/// window end. An excluded date removes every start on that date, whatever
/// its time of day.
///
/// ## Errors
/// Returns `RfcError::ExpansionError` if the engine rejects the rule for this
/// anchor.
pub fn expand(
    anchor: &Anchor,
    recurrence: &Recurrence,
    window: &TimeWindow,
) -> RfcResult<Vec<Occurrence>> {
    if !recurrence.is_repeating() {
        return Ok(vec![Occurrence::starting_at(anchor.start, anchor.duration)]);
    }

    let rule_set = build_rule_set(anchor, recurrence)?;

    let mut occurrences = Vec::new();
    let mut previous: Option<DateTime<Utc>> = None;
    for start in &rule_set {
        let start = start.with_timezone(&Utc);
        if start > window.end() {
            break;
        }
        if start < window.start()
            || start < anchor.start
            || previous == Some(start)
            || recurrence.ex_dates.contains(start.date_naive())
        {
            continue;
        }
        previous = Some(start);
        occurrences.push(Occurrence::starting_at(start, anchor.duration));
    }

    tracing::trace!(
        anchor = %anchor.start,
        window_start = %window.start(),
        window_end = %window.end(),
        count = occurrences.len(),
        "Expanded recurrence"
    );

    Ok(occurrences)
}

/// ## Summary
/// Builds the engine rule set for an anchor and recurrence.
///
/// The anchor itself is added as an RDATE so it is always the first
/// occurrence. A COUNT includes the anchor: when the rule does not generate
/// the anchor it generates one start fewer. A rule whose UNTIL lies before
/// the anchor contributes nothing beyond the anchor and the RDATEs.
///
/// Excluded dates are not part of the set; [`expand`] drops them.
///
/// ## Errors
/// Returns `RfcError::ExpansionError` if the engine fails to parse or
/// validate the rule.
pub fn build_rule_set(anchor: &Anchor, recurrence: &Recurrence) -> RfcResult<RRuleSet> {
    let dt_start = anchor.start.with_timezone(&Tz::UTC);

    let rule = recurrence
        .rule
        .as_ref()
        .filter(|rule| rule.until.is_none_or(|until| until.as_utc() >= anchor.start));

    let rule_set = match rule {
        Some(rule) => {
            let rule_set = engine_rule_set(rule, dt_start)?;
            if rule.count == 0 || rule_set.into_iter().next() == Some(dt_start) {
                rule_set
            } else if rule.count == 1 {
                RRuleSet::new(dt_start).limit()
            } else {
                engine_rule_set(&rule.clone().with_count(rule.count - 1), dt_start)?
            }
        }
        None => RRuleSet::new(dt_start).limit(),
    };

    let mut rdates: Vec<DateTime<Tz>> = recurrence.r_dates.iter().map(|d| anchor.on(d)).collect();
    rdates.push(dt_start);
    Ok(rule_set.set_rdates(rdates))
}

/// Engine set for one rule. Limited so a rule that never matches gives up
/// after the engine's loop cap instead of scanning to its last year.
fn engine_rule_set(rule: &RecurrenceRule, dt_start: DateTime<Tz>) -> RfcResult<RRuleSet> {
    let engine_text = rule.engine_text();
    tracing::trace!(rrule = %engine_text, "Building engine rule set");
    Ok(engine_text
        .parse::<RRule<Unvalidated>>()
        .map_err(|err| RfcError::ExpansionError(err.to_string()))?
        .build(dt_start)
        .map_err(|err| RfcError::ExpansionError(err.to_string()))?
        .limit())
}
