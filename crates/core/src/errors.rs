//! Core error types for the lotbook engine.
//!
//! Every failure here is a local, recoverable condition returned to the
//! caller; nothing is treated as process-fatal. Module-specific errors are
//! aggregated into the root [`Error`] via `From` conversions.

use chrono::ParseError as ChronoParseError;
use thiserror::Error;

use crate::compliance::ComplianceError;
use crate::fx::FxError;
use crate::lots::LotError;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the accounting engine.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Lot allocation failed: {0}")]
    Lot(#[from] LotError),

    #[error("Compliance operation failed: {0}")]
    Compliance(#[from] ComplianceError),

    #[error("Fx error: {0}")]
    Fx(#[from] FxError),

    #[error("Input validation failed: {0}")]
    Validation(#[from] ValidationError),
}

/// Validation errors for externally supplied data.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Failed to parse decimal number: {0}")]
    DecimalParse(#[from] rust_decimal::Error),

    #[error("Failed to parse date/time: {0}")]
    DateTimeParse(#[from] ChronoParseError),
}

// === From implementations for common error types ===

impl From<rust_decimal::Error> for Error {
    fn from(err: rust_decimal::Error) -> Self {
        Error::Validation(ValidationError::DecimalParse(err))
    }
}

impl From<ChronoParseError> for Error {
    fn from(err: ChronoParseError) -> Self {
        Error::Validation(ValidationError::DateTimeParse(err))
    }
}

impl From<Error> for String {
    fn from(err: Error) -> Self {
        err.to_string()
    }
}
