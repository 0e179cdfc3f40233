//! Database enum types with Diesel serialization.
//!
//! Each enum maps one legacy single-letter or keyword column. Values outside
//! the known set fail to deserialize instead of falling back to a default.

use diesel::deserialize::{self, FromSql, FromSqlRow};
use diesel::expression::AsExpression;
use diesel::pg::{Pg, PgValue};
use diesel::serialize::{self, IsNull, Output, ToSql};
use diesel::sql_types::{Integer, Text};
use std::fmt;
use std::io::Write;

use kalends_rfc::rfc::rrule::Frequency;

/// Kind of calendar entry.
///
/// Maps to `webcal_entry.cal_type`. Each kind has a plain letter and a
/// letter used while the entry carries a recurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, AsExpression, FromSqlRow)]
#[diesel(sql_type = Text)]
pub enum EntryType {
    Event,
    RepeatingEvent,
    Task,
    RepeatingTask,
    Journal,
    RepeatingJournal,
}

impl ToSql<Text, Pg> for EntryType {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
        out.write_all(self.as_str().as_bytes())?;
        Ok(IsNull::No)
    }
}

impl FromSql<Text, Pg> for EntryType {
    fn from_sql(bytes: PgValue<'_>) -> deserialize::Result<Self> {
        match bytes.as_bytes() {
            b"E" => Ok(Self::Event),
            b"M" => Ok(Self::RepeatingEvent),
            b"T" => Ok(Self::Task),
            b"N" => Ok(Self::RepeatingTask),
            b"J" => Ok(Self::Journal),
            b"O" => Ok(Self::RepeatingJournal),
            _ => Err("Unrecognized enum variant".into()),
        }
    }
}

impl EntryType {
    /// Returns the database string representation of this entry type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Event => "E",
            Self::RepeatingEvent => "M",
            Self::Task => "T",
            Self::RepeatingTask => "N",
            Self::Journal => "J",
            Self::RepeatingJournal => "O",
        }
    }

    #[must_use]
    pub const fn is_repeating(self) -> bool {
        matches!(
            self,
            Self::RepeatingEvent | Self::RepeatingTask | Self::RepeatingJournal
        )
    }

    /// The same kind of entry, with or without the repeating marker.
    #[must_use]
    pub const fn with_repetition(self, repeating: bool) -> Self {
        match (self, repeating) {
            (Self::Event | Self::RepeatingEvent, false) => Self::Event,
            (Self::Event | Self::RepeatingEvent, true) => Self::RepeatingEvent,
            (Self::Task | Self::RepeatingTask, false) => Self::Task,
            (Self::Task | Self::RepeatingTask, true) => Self::RepeatingTask,
            (Self::Journal | Self::RepeatingJournal, false) => Self::Journal,
            (Self::Journal | Self::RepeatingJournal, true) => Self::RepeatingJournal,
        }
    }
}

impl fmt::Display for EntryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Visibility of an entry to users other than its creator.
///
/// Maps to `webcal_entry.cal_access`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, AsExpression, FromSqlRow)]
#[diesel(sql_type = Text)]
pub enum AccessLevel {
    Public,
    Private,
    Confidential,
}

impl ToSql<Text, Pg> for AccessLevel {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
        out.write_all(self.as_str().as_bytes())?;
        Ok(IsNull::No)
    }
}

impl FromSql<Text, Pg> for AccessLevel {
    fn from_sql(bytes: PgValue<'_>) -> deserialize::Result<Self> {
        match bytes.as_bytes() {
            b"P" => Ok(Self::Public),
            b"R" => Ok(Self::Private),
            b"C" => Ok(Self::Confidential),
            _ => Err("Unrecognized enum variant".into()),
        }
    }
}

impl AccessLevel {
    /// Returns the database string representation of this access level.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Public => "P",
            Self::Private => "R",
            Self::Confidential => "C",
        }
    }
}

impl fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Legacy repeat type keyword.
///
/// Maps to `webcal_entry_repeats.cal_type`. The three monthly keywords all
/// load as `FREQ=MONTHLY`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, AsExpression, FromSqlRow)]
#[diesel(sql_type = Text)]
pub enum RepeatType {
    Daily,
    Weekly,
    MonthlyByDate,
    MonthlyByDay,
    MonthlyBySetPos,
    Yearly,
}

impl ToSql<Text, Pg> for RepeatType {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
        out.write_all(self.as_str().as_bytes())?;
        Ok(IsNull::No)
    }
}

impl FromSql<Text, Pg> for RepeatType {
    fn from_sql(bytes: PgValue<'_>) -> deserialize::Result<Self> {
        match bytes.as_bytes() {
            b"daily" => Ok(Self::Daily),
            b"weekly" => Ok(Self::Weekly),
            b"monthlyByDate" => Ok(Self::MonthlyByDate),
            b"monthlyByDay" => Ok(Self::MonthlyByDay),
            b"monthlyBySetPos" => Ok(Self::MonthlyBySetPos),
            b"yearly" => Ok(Self::Yearly),
            _ => Err("Unrecognized enum variant".into()),
        }
    }
}

impl RepeatType {
    /// Returns the database string representation of this repeat type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::MonthlyByDate => "monthlyByDate",
            Self::MonthlyByDay => "monthlyByDay",
            Self::MonthlyBySetPos => "monthlyBySetPos",
            Self::Yearly => "yearly",
        }
    }

    #[must_use]
    pub const fn frequency(self) -> Frequency {
        match self {
            Self::Daily => Frequency::Daily,
            Self::Weekly => Frequency::Weekly,
            Self::MonthlyByDate | Self::MonthlyByDay | Self::MonthlyBySetPos => {
                Frequency::Monthly
            }
            Self::Yearly => Frequency::Yearly,
        }
    }
}

impl fmt::Display for RepeatType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Discriminator for `webcal_entry_repeats_not.cal_exdate`.
///
/// `1` excludes the date from the series, `0` adds it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, AsExpression, FromSqlRow)]
#[diesel(sql_type = Integer)]
pub enum ExceptionKind {
    Exclude,
    Include,
}

impl ToSql<Integer, Pg> for ExceptionKind {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
        out.write_all(&self.as_flag().to_be_bytes())?;
        Ok(IsNull::No)
    }
}

impl FromSql<Integer, Pg> for ExceptionKind {
    fn from_sql(bytes: PgValue<'_>) -> deserialize::Result<Self> {
        match <i32 as FromSql<Integer, Pg>>::from_sql(bytes)? {
            1 => Ok(Self::Exclude),
            0 => Ok(Self::Include),
            _ => Err("Unrecognized enum variant".into()),
        }
    }
}

impl ExceptionKind {
    /// Returns the stored integer flag.
    #[must_use]
    pub const fn as_flag(self) -> i32 {
        match self {
            Self::Exclude => 1,
            Self::Include => 0,
        }
    }
}
