use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::errors::PriceFeedError;
use crate::models::RateQuote;

/// Contract implemented by every exchange-rate source.
///
/// `fetch_rate` resolves one `(from, to)` pair. When `at` is given the
/// provider must return the rate for that historical instant; otherwise the
/// latest available rate. The call is async and cancellable; retry policy
/// belongs to the caller.
#[async_trait]
pub trait RateProvider: Send + Sync {
    /// Stable provider identifier (e.g. `"coingecko"`).
    fn id(&self) -> &'static str;

    async fn fetch_rate(
        &self,
        from: &str,
        to: &str,
        at: Option<DateTime<Utc>>,
    ) -> Result<RateQuote, PriceFeedError>;
}
