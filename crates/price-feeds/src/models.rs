use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A single exchange-rate observation returned by a provider.
///
/// `source` carries the provider id (e.g. `"coingecko"`, `"fixer"`); the core
/// maps it onto its own source enum and derives cache TTL from it.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RateQuote {
    pub rate: Decimal,
    pub timestamp: DateTime<Utc>,
    pub source: String,
}

impl RateQuote {
    pub fn new(rate: Decimal, timestamp: DateTime<Utc>, source: impl Into<String>) -> Self {
        Self {
            rate,
            timestamp,
            source: source.into(),
        }
    }
}
