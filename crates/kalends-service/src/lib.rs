//! Calendar entry operations: atomic saves, window listings and
//! double-booking checks.

pub mod conflict;
pub mod entry;
pub mod error;
pub mod schedule;
