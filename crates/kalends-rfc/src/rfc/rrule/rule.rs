//! Structured recurrence rule and its canonical text form.

use std::fmt;
use std::str::FromStr;

use super::core::{Frequency, RRuleUntil, Weekday, WeekdayNum};
use super::parse::parse_rrule;
use crate::error::{RfcError, RfcResult};

/// Recurrence rule (RFC 5545 §3.3.10, §3.8.5.3).
///
/// Empty `by_*` lists leave that dimension unconstrained. `count == 0` and
/// `until == None` together describe an unbounded series.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecurrenceRule {
    pub freq: Frequency,
    /// Always at least 1.
    pub interval: u32,
    /// Number of occurrences, 0 when not bounded by count.
    pub count: u32,
    pub until: Option<RRuleUntil>,
    pub by_day: Vec<WeekdayNum>,
    pub by_month: Vec<u8>,
    pub by_month_day: Vec<i8>,
    pub by_year_day: Vec<i16>,
    pub by_week_no: Vec<i8>,
    pub by_set_pos: Vec<i16>,
    pub by_hour: Vec<u8>,
    pub by_minute: Vec<u8>,
    pub by_second: Vec<u8>,
    /// Week start day; `None` means the RFC default (Monday).
    pub wkst: Option<Weekday>,
}

impl RecurrenceRule {
    /// Creates an unbounded rule repeating every period of `freq`.
    #[must_use]
    pub const fn new(freq: Frequency) -> Self {
        Self {
            freq,
            interval: 1,
            count: 0,
            until: None,
            by_day: Vec::new(),
            by_month: Vec::new(),
            by_month_day: Vec::new(),
            by_year_day: Vec::new(),
            by_week_no: Vec::new(),
            by_set_pos: Vec::new(),
            by_hour: Vec::new(),
            by_minute: Vec::new(),
            by_second: Vec::new(),
            wkst: None,
        }
    }

    #[must_use]
    pub const fn daily() -> Self {
        Self::new(Frequency::Daily)
    }

    #[must_use]
    pub const fn weekly() -> Self {
        Self::new(Frequency::Weekly)
    }

    #[must_use]
    pub const fn monthly() -> Self {
        Self::new(Frequency::Monthly)
    }

    #[must_use]
    pub const fn yearly() -> Self {
        Self::new(Frequency::Yearly)
    }

    #[must_use]
    pub fn with_interval(mut self, interval: u32) -> Self {
        self.interval = interval;
        self
    }

    /// Sets the count. Clears any until bound.
    #[must_use]
    pub fn with_count(mut self, count: u32) -> Self {
        self.count = count;
        self.until = None;
        self
    }

    /// Sets the until bound. Clears any count.
    #[must_use]
    pub fn with_until(mut self, until: RRuleUntil) -> Self {
        self.until = Some(until);
        self.count = 0;
        self
    }

    #[must_use]
    pub fn with_by_day(mut self, days: Vec<WeekdayNum>) -> Self {
        self.by_day = days;
        self
    }

    #[must_use]
    pub fn with_by_month(mut self, months: Vec<u8>) -> Self {
        self.by_month = months;
        self
    }

    #[must_use]
    pub fn with_by_month_day(mut self, days: Vec<i8>) -> Self {
        self.by_month_day = days;
        self
    }

    #[must_use]
    pub fn with_by_set_pos(mut self, positions: Vec<i16>) -> Self {
        self.by_set_pos = positions;
        self
    }

    #[must_use]
    pub fn with_wkst(mut self, wkst: Weekday) -> Self {
        self.wkst = Some(wkst);
        self
    }

    /// Week start day with the RFC default applied.
    #[must_use]
    pub fn week_start(&self) -> Weekday {
        self.wkst.unwrap_or(Weekday::Monday)
    }

    /// Whether neither count nor until limits the series.
    #[must_use]
    pub fn is_unbounded(&self) -> bool {
        self.count == 0 && self.until.is_none()
    }

    /// ## Summary
    /// Checks the structural constraints RFC 5545 places on a rule.
    ///
    /// ## Errors
    /// Returns `RfcError::ValidationError` naming the first violated constraint.
    pub fn validate(&self) -> RfcResult<()> {
        if self.interval == 0 {
            return Err(invalid("INTERVAL must be at least 1"));
        }
        if self.count > 0 && self.until.is_some() {
            return Err(invalid("COUNT and UNTIL are mutually exclusive"));
        }

        check_range("BYSECOND", &self.by_second, 0, 60)?;
        check_range("BYMINUTE", &self.by_minute, 0, 59)?;
        check_range("BYHOUR", &self.by_hour, 0, 23)?;
        check_range("BYMONTH", &self.by_month, 1, 12)?;
        check_signed_range("BYMONTHDAY", &self.by_month_day, 31)?;
        check_signed_range("BYYEARDAY", &self.by_year_day, 366)?;
        check_signed_range("BYWEEKNO", &self.by_week_no, 53)?;
        check_signed_range("BYSETPOS", &self.by_set_pos, 366)?;

        let ordinals: Vec<i8> = self.by_day.iter().filter_map(|day| day.ordinal).collect();
        check_signed_range("BYDAY ordinal", &ordinals, 53)?;
        if !ordinals.is_empty() && !matches!(self.freq, Frequency::Monthly | Frequency::Yearly) {
            return Err(invalid(
                "BYDAY ordinals are only allowed with FREQ=MONTHLY or FREQ=YEARLY",
            ));
        }

        if !self.by_week_no.is_empty() && self.freq != Frequency::Yearly {
            return Err(invalid("BYWEEKNO is only allowed with FREQ=YEARLY"));
        }
        if !self.by_year_day.is_empty()
            && matches!(self.freq, Frequency::Daily | Frequency::Weekly | Frequency::Monthly)
        {
            return Err(invalid("BYYEARDAY is not allowed with this frequency"));
        }
        if !self.by_month_day.is_empty() && self.freq == Frequency::Weekly {
            return Err(invalid("BYMONTHDAY is not allowed with FREQ=WEEKLY"));
        }

        if !self.by_set_pos.is_empty() && !self.has_other_by_part() {
            return Err(invalid("BYSETPOS requires another BYxxx rule part"));
        }

        Ok(())
    }

    fn has_other_by_part(&self) -> bool {
        !(self.by_day.is_empty()
            && self.by_month.is_empty()
            && self.by_month_day.is_empty()
            && self.by_year_day.is_empty()
            && self.by_week_no.is_empty()
            && self.by_hour.is_empty()
            && self.by_minute.is_empty()
            && self.by_second.is_empty())
    }

    /// Rule text handed to the expansion engine.
    ///
    /// Identical to the canonical form except that UNTIL is always a UTC
    /// date-time, so date and date-time bounds expand the same way.
    #[must_use]
    pub fn engine_text(&self) -> String {
        self.render(self.until.as_ref().map(RRuleUntil::to_utc_string))
    }

    fn render(&self, until: Option<String>) -> String {
        let mut parts = vec![format!("FREQ={}", self.freq)];

        if self.interval != 1 {
            parts.push(format!("INTERVAL={}", self.interval));
        }

        if let Some(until) = until {
            parts.push(format!("UNTIL={until}"));
        }

        if self.count > 0 {
            parts.push(format!("COUNT={}", self.count));
        }

        if let Some(wkst) = self.wkst {
            parts.push(format!("WKST={wkst}"));
        }

        push_list(&mut parts, "BYSECOND", &self.by_second);
        push_list(&mut parts, "BYMINUTE", &self.by_minute);
        push_list(&mut parts, "BYHOUR", &self.by_hour);
        push_list(&mut parts, "BYDAY", &self.by_day);
        push_list(&mut parts, "BYMONTHDAY", &self.by_month_day);
        push_list(&mut parts, "BYYEARDAY", &self.by_year_day);
        push_list(&mut parts, "BYWEEKNO", &self.by_week_no);
        push_list(&mut parts, "BYMONTH", &self.by_month);
        push_list(&mut parts, "BYSETPOS", &self.by_set_pos);

        parts.join(";")
    }
}

fn invalid(message: &str) -> RfcError {
    RfcError::ValidationError(message.to_string())
}

fn check_range<T>(part: &str, values: &[T], min: T, max: T) -> RfcResult<()>
where
    T: PartialOrd + Copy + fmt::Display,
{
    match values.iter().find(|v| **v < min || **v > max) {
        Some(bad) => Err(RfcError::ValidationError(format!(
            "{part} value {bad} is outside {min}..={max}"
        ))),
        None => Ok(()),
    }
}

fn check_signed_range<T>(part: &str, values: &[T], limit: i16) -> RfcResult<()>
where
    T: Into<i16> + Copy + fmt::Display,
{
    match values.iter().find(|v| {
        let v: i16 = (**v).into();
        v == 0 || v.abs() > limit
    }) {
        Some(bad) => Err(RfcError::ValidationError(format!(
            "{part} value {bad} is outside ±1..={limit}"
        ))),
        None => Ok(()),
    }
}

fn push_list<T: fmt::Display>(parts: &mut Vec<String>, name: &str, values: &[T]) {
    if values.is_empty() {
        return;
    }
    let joined: Vec<String> = values.iter().map(ToString::to_string).collect();
    parts.push(format!("{name}={}", joined.join(",")));
}

impl fmt::Display for RecurrenceRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(self.until.as_ref().map(ToString::to_string)))
    }
}

impl FromStr for RecurrenceRule {
    type Err = RfcError;

    /// Parses and validates rule text such as `FREQ=WEEKLY;BYDAY=MO,WE`.
    fn from_str(s: &str) -> RfcResult<Self> {
        let rule = parse_rrule(s)?;
        rule.validate()?;
        Ok(rule)
    }
}
