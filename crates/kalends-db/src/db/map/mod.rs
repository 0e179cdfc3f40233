//! Database <-> domain mapping helpers.
//!
//! Pure conversions between row models and the recurrence model; nothing in
//! here touches a connection.

pub mod entry;
pub mod recurrence;
