//! RFC 5545 recurrence rules.
//!
//! This module owns the structured rule model and its canonical text form.
//! Expansion is delegated to the `rrule` engine (see [`crate::expand`]).

mod core;
mod parse;
mod rule;

pub use self::core::{Frequency, RRuleUntil, Weekday, WeekdayNum};
pub use parse::{parse_byday, parse_list, parse_rrule, parse_until};
pub use rule::RecurrenceRule;
