use thiserror::Error;

/// Recurrence parsing, validation and expansion errors
#[derive(Error, Debug)]
pub enum RfcError {
    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Expansion error: {0}")]
    ExpansionError(String),

    #[error(transparent)]
    CoreError(#[from] kalends_core::error::CoreError),
}

pub type RfcResult<T> = std::result::Result<T, RfcError>;
