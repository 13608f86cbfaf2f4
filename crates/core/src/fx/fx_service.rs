use chrono::{DateTime, Utc};
use dashmap::DashMap;
use num_traits::ToPrimitive;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use super::fx_errors::FxError;
use super::fx_model::{
    builtin_currencies, AccountSettings, Conversion, ConversionMethod, ConversionRequest,
    Currency, ExchangeRate, RateSource,
};
use crate::errors::Result;
use lotbook_price_feeds::RateProvider;

/// Rate cache and conversion engine.
///
/// Rates are cached per ordered `(from, to)` pair and evicted on read once
/// their TTL elapses. The cache is a `DashMap`, so concurrent reads and
/// writes are safe without an outer lock. The only I/O is the async
/// [`RateProvider`] call behind a cache miss or an explicit historical
/// lookup.
#[derive(Clone)]
pub struct FxService {
    cache: Arc<DashMap<(String, String), ExchangeRate>>,
    currencies: Arc<HashMap<String, Currency>>,
    provider: Arc<dyn RateProvider>,
}

impl FxService {
    pub fn new(provider: Arc<dyn RateProvider>) -> Self {
        let currencies = builtin_currencies()
            .into_iter()
            .map(|currency| (currency.code.clone(), currency))
            .collect();
        Self {
            cache: Arc::new(DashMap::new()),
            currencies: Arc::new(currencies),
            provider,
        }
    }

    /// Registry lookup for a supported currency.
    pub fn currency(&self, code: &str) -> Option<&Currency> {
        self.currencies.get(code)
    }

    pub fn cache_rate(&self, rate: ExchangeRate) {
        let key = (rate.from_currency.clone(), rate.to_currency.clone());
        self.cache.insert(key, rate);
    }

    /// Cached rate for a pair; expired entries are evicted on read.
    pub fn cached_rate(&self, from: &str, to: &str) -> Option<ExchangeRate> {
        let key = (from.to_string(), to.to_string());
        let rate = self.cache.get(&key)?.clone();

        if rate.is_expired(Utc::now()) {
            self.cache.remove(&key);
            return None;
        }

        Some(rate)
    }

    /// Advisory staleness check; callers may still choose to refresh.
    pub fn is_rate_stale(&self, rate: &ExchangeRate) -> bool {
        rate.is_expired(Utc::now())
    }

    async fn fetch_rate(
        &self,
        from: &str,
        to: &str,
        at: Option<DateTime<Utc>>,
    ) -> Result<ExchangeRate> {
        let quote = self.provider.fetch_rate(from, to, at).await.map_err(|e| {
            log::warn!("rate fetch failed for {}/{}: {}", from, to, e);
            FxError::RateUnavailable {
                from: from.to_string(),
                to: to.to_string(),
            }
        })?;

        if quote.rate <= Decimal::ZERO {
            return Err(FxError::Provider(format!(
                "non-positive rate {} for {}/{}",
                quote.rate, from, to
            ))
            .into());
        }

        let source = RateSource::from(quote.source.as_str());
        Ok(ExchangeRate {
            id: Uuid::new_v4().to_string(),
            from_currency: from.to_string(),
            to_currency: to.to_string(),
            rate: quote.rate,
            timestamp: quote.timestamp,
            source,
            ttl_seconds: source.default_ttl_secs(),
            metadata: None,
        })
    }

    /// Converts an amount between currencies.
    ///
    /// Same-currency conversion is a no-op (rate 1, source manual). An
    /// explicit historical request with a timestamp bypasses the cache and
    /// asks the provider; the result is not cached since it does not
    /// describe the present. Everything else serves from cache, fetching
    /// and caching on a miss.
    pub async fn convert(&self, request: &ConversionRequest) -> Result<Conversion> {
        if request.from_currency == request.to_currency {
            return Ok(Conversion {
                from_currency: request.from_currency.clone(),
                to_currency: request.to_currency.clone(),
                amount: request.amount,
                converted_amount: request.amount,
                exchange_rate: Decimal::ONE,
                timestamp: request.timestamp.unwrap_or_else(Utc::now),
                source: RateSource::Manual,
            });
        }

        let historical =
            request.method == Some(ConversionMethod::Historical) && request.timestamp.is_some();

        let rate = if historical {
            self.fetch_rate(&request.from_currency, &request.to_currency, request.timestamp)
                .await?
        } else {
            match self.cached_rate(&request.from_currency, &request.to_currency) {
                Some(cached) => cached,
                None => {
                    let fresh = self
                        .fetch_rate(&request.from_currency, &request.to_currency, None)
                        .await?;
                    self.cache_rate(fresh.clone());
                    fresh
                }
            }
        };

        Ok(Conversion {
            from_currency: request.from_currency.clone(),
            to_currency: request.to_currency.clone(),
            amount: request.amount,
            converted_amount: request.amount * rate.rate,
            exchange_rate: rate.rate,
            timestamp: rate.timestamp,
            source: rate.source,
        })
    }

    /// Converts a transaction amount into the account's primary currency,
    /// at the historical rate when the account prefers it.
    pub async fn convert_to_primary(
        &self,
        amount: Decimal,
        currency: &str,
        timestamp: DateTime<Utc>,
        settings: &AccountSettings,
    ) -> Result<Conversion> {
        let use_historical = settings.conversion_method == ConversionMethod::Historical;
        self.convert(&ConversionRequest {
            from_currency: currency.to_string(),
            to_currency: settings.primary_currency.clone(),
            amount,
            timestamp: use_historical.then_some(timestamp),
            method: Some(settings.conversion_method),
        })
        .await
    }

    /// Exact sum of same-currency amounts.
    pub fn sum_amounts(&self, amounts: &[Decimal]) -> Decimal {
        amounts.iter().sum()
    }

    /// Percentage change between two values; display-only, so f64 output.
    pub fn percentage_change(&self, old_value: Decimal, new_value: Decimal) -> f64 {
        if old_value.is_zero() {
            return 0.0;
        }
        ((new_value - old_value) / old_value * Decimal::new(100, 0))
            .to_f64()
            .unwrap_or(0.0)
    }
}
