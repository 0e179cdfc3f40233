//! Recurrence aggregate: an optional rule plus explicit exclusion and
//! addition dates.

use std::collections::BTreeSet;

use chrono::NaiveDate;

use crate::error::RfcResult;
use crate::rfc::rrule::RecurrenceRule;

/// Ordered set of calendar dates used for EXDATE and RDATE lists.
///
/// Dates carry no time of day; the expander places them at the anchor's time.
/// Inserting a date twice is a no-op.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DateSet(BTreeSet<NaiveDate>);

impl DateSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a date. Returns `false` if it was already present.
    pub fn insert(&mut self, date: NaiveDate) -> bool {
        self.0.insert(date)
    }

    pub fn remove(&mut self, date: NaiveDate) -> bool {
        self.0.remove(&date)
    }

    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.0.contains(&date)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Dates in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<NaiveDate> for DateSet {
    fn from_iter<I: IntoIterator<Item = NaiveDate>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Extend<NaiveDate> for DateSet {
    fn extend<I: IntoIterator<Item = NaiveDate>>(&mut self, iter: I) {
        self.0.extend(iter);
    }
}

/// Rule and exceptions attached to one entry.
///
/// Built fresh on every load and replaced wholesale on every save.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Recurrence {
    pub rule: Option<RecurrenceRule>,
    pub ex_dates: DateSet,
    pub r_dates: DateSet,
}

impl Recurrence {
    /// A recurrence that does not repeat.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from_rule(rule: RecurrenceRule) -> Self {
        Self {
            rule: Some(rule),
            ..Self::default()
        }
    }

    /// ## Summary
    /// Builds a recurrence from rule text.
    ///
    /// ## Errors
    /// Returns the parse or validation error for malformed text.
    pub fn parse_rule(text: &str) -> RfcResult<Self> {
        Ok(Self::from_rule(text.parse()?))
    }

    #[must_use]
    pub fn with_ex_date(mut self, date: NaiveDate) -> Self {
        self.ex_dates.insert(date);
        self
    }

    #[must_use]
    pub fn with_r_date(mut self, date: NaiveDate) -> Self {
        self.r_dates.insert(date);
        self
    }

    /// True when a rule is present or explicit addition dates exist.
    #[must_use]
    pub fn is_repeating(&self) -> bool {
        self.rule.is_some() || !self.r_dates.is_empty()
    }
}
