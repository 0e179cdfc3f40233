use thiserror::Error;

/// Database layer errors
#[derive(Error, Debug)]
pub enum DbError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] diesel::result::Error),

    #[error("Pool error: {0}")]
    PoolError(#[from] diesel_async::pooled_connection::bb8::RunError),

    #[error("Corrupt value in {table}.{column}: `{value}`")]
    CorruptColumn {
        table: &'static str,
        column: &'static str,
        value: String,
    },

    #[error("Value for {table}.{column} does not fit the column: `{value}`")]
    OutOfRange {
        table: &'static str,
        column: &'static str,
        value: String,
    },

    #[error("Stored recurrence rule is invalid: {0}")]
    Rfc(#[from] kalends_rfc::error::RfcError),

    #[error(transparent)]
    CoreError(#[from] kalends_core::error::CoreError),
}

impl DbError {
    pub(crate) fn corrupt(table: &'static str, column: &'static str, value: impl ToString) -> Self {
        Self::CorruptColumn {
            table,
            column,
            value: value.to_string(),
        }
    }

    pub(crate) fn out_of_range(
        table: &'static str,
        column: &'static str,
        value: impl ToString,
    ) -> Self {
        Self::OutOfRange {
            table,
            column,
            value: value.to_string(),
        }
    }
}

pub type DbResult<T> = std::result::Result<T, DbError>;
