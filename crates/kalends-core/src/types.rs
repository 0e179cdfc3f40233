//! Time values shared across crates without database or RFC dependencies.

use chrono::{DateTime, NaiveDate, NaiveTime, TimeDelta, Utc};
use serde::Serialize;

use crate::error::{CoreError, CoreResult};

/// One concrete start/end instance of an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Occurrence {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Occurrence {
    #[must_use]
    pub const fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// Occurrence lasting `duration` from `start`.
    #[must_use]
    pub fn starting_at(start: DateTime<Utc>, duration: TimeDelta) -> Self {
        Self {
            start,
            end: start + duration,
        }
    }

    #[must_use]
    pub fn duration(&self) -> TimeDelta {
        self.end - self.start
    }

    /// Half-open overlap test: touching intervals do not overlap.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start < other.end && self.end > other.start
    }
}

/// Inclusive `[start, end]` bound on occurrence start times.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeWindow {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TimeWindow {
    /// ## Summary
    /// Creates a window with both ends inclusive.
    ///
    /// ## Errors
    /// Returns `CoreError::InvalidWindow` if `start` is after `end`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> CoreResult<Self> {
        if start > end {
            return Err(CoreError::InvalidWindow {
                start: start.to_rfc3339(),
                end: end.to_rfc3339(),
            });
        }
        Ok(Self { start, end })
    }

    /// ## Summary
    /// Creates a window covering whole days, from midnight of `first` through
    /// the last second of `last`.
    ///
    /// ## Errors
    /// Returns `CoreError::InvalidWindow` if `first` is after `last`.
    pub fn from_dates(first: NaiveDate, last: NaiveDate) -> CoreResult<Self> {
        let end_of_day = NaiveTime::from_hms_opt(23, 59, 59)
            .ok_or(CoreError::InvariantViolation("23:59:59 is a valid time"))?;
        Self::new(
            first.and_time(NaiveTime::MIN).and_utc(),
            last.and_time(end_of_day).and_utc(),
        )
    }

    #[must_use]
    pub const fn start(&self) -> DateTime<Utc> {
        self.start
    }

    #[must_use]
    pub const fn end(&self) -> DateTime<Utc> {
        self.end
    }

    #[must_use]
    pub fn first_date(&self) -> NaiveDate {
        self.start.date_naive()
    }

    #[must_use]
    pub fn last_date(&self) -> NaiveDate {
        self.end.date_naive()
    }

    /// Whether `instant` lies within the window, both ends included.
    #[must_use]
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant <= self.end
    }

    /// Number of calendar days the window touches.
    #[must_use]
    pub fn span_days(&self) -> i64 {
        (self.last_date() - self.first_date()).num_days() + 1
    }
}
