//! Double-booking detection over materialized start/end pairs.
//!
//! Detection is mechanical: it reports every overlap. Whether the number of
//! overlaps is acceptable is decided by [`limit_exceeded`].

use serde::Serialize;

use kalends_core::types::Occurrence;

/// A concrete booked interval, optionally tied to a stored entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Booking {
    /// Stored entry id; `None` for an entry that has not been saved yet.
    pub cal_id: Option<i32>,
    pub occurrence: Occurrence,
}

impl Booking {
    #[must_use]
    pub const fn new(cal_id: Option<i32>, occurrence: Occurrence) -> Self {
        Self { cal_id, occurrence }
    }

    fn is_same_entry(&self, other: &Self) -> bool {
        self.cal_id.is_some() && self.cal_id == other.cal_id
    }
}

/// ## Summary
/// Returns every existing booking that overlaps `candidate`.
///
/// Bookings of the candidate's own entry are skipped, so re-saving an entry
/// in place does not conflict with itself. Intervals are half-open: a booking
/// ending exactly when another starts does not overlap it. A `limit` of 0
/// disables checking and always yields an empty result.
#[must_use]
pub fn detect_conflicts(candidate: &Booking, existing: &[Booking], limit: u32) -> Vec<Booking> {
    if limit == 0 {
        return Vec::new();
    }

    existing
        .iter()
        .filter(|booking| !booking.is_same_entry(candidate))
        .filter(|booking| booking.occurrence.overlaps(&candidate.occurrence))
        .copied()
        .collect()
}

/// ## Summary
/// Whether `conflicts` overlapping bookings break a limit of `limit`
/// simultaneous bookings.
///
/// The candidate itself takes one slot, so the limit is exceeded once the
/// overlap count is above `limit - 1`. A limit of 0 is never exceeded.
#[must_use]
pub fn limit_exceeded(conflicts: usize, limit: u32) -> bool {
    match limit {
        0 => false,
        limit => conflicts > usize::try_from(limit - 1).unwrap_or(usize::MAX),
    }
}
