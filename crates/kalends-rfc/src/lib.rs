//! Recurrence rules, exception date sets and occurrence expansion.

pub mod error;
pub mod expand;
pub mod recurrence;
pub mod rfc;

pub use expand::{Anchor, expand};
pub use recurrence::{DateSet, Recurrence};
pub use rfc::rrule::RecurrenceRule;
