use thiserror::Error;

/// Errors from currency conversion and formatting.
#[derive(Error, Debug)]
pub enum FxError {
    /// No rate could be obtained, from cache or the external collaborator.
    #[error("Exchange rate not available for {from}/{to}")]
    RateUnavailable { from: String, to: String },

    #[error("Currency '{0}' is not supported")]
    InvalidCurrencyCode(String),

    /// A formatted string could not be parsed back into a decimal.
    #[error("Cannot parse amount from '{0}'")]
    UnparsableAmount(String),

    /// The rate provider failed; the caller may retry.
    #[error("Rate provider error: {0}")]
    Provider(String),
}
