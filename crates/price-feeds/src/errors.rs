use thiserror::Error;

/// Errors surfaced by rate providers.
#[derive(Error, Debug)]
pub enum PriceFeedError {
    /// Transport-level failure (connection, timeout, TLS, ...).
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider answered but reported an application-level failure.
    #[error("Provider '{provider}' returned an error: {message}")]
    Api { provider: String, message: String },

    /// The provider answered successfully but the requested pair was absent.
    #[error("No rate available for {pair}")]
    MissingRate { pair: String },

    /// The provider returned a rate that cannot be used (zero, negative,
    /// or not representable as a decimal).
    #[error("Invalid rate value: {value}")]
    InvalidRate { value: String },

    /// The requested currency has no mapping for this provider.
    #[error("Unsupported currency for this provider: {0}")]
    UnsupportedCurrency(String),
}
