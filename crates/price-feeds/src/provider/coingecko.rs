//! CoinGecko provider for cryptocurrency rates.
//!
//! Latest rates come from `/simple/price`, historical rates from
//! `/coins/{id}/history`. A pro API key switches to the pro host and is sent
//! via the `x-cg-pro-api-key` header.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

use crate::errors::PriceFeedError;
use crate::models::RateQuote;
use crate::provider::RateProvider;

/// Provider ID constant
const PROVIDER_ID: &str = "coingecko";

/// Default HTTP request timeout
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const PUBLIC_BASE_URL: &str = "https://api.coingecko.com/api/v3";
const PRO_BASE_URL: &str = "https://pro-api.coingecko.com/api/v3";

/// Response of `/simple/price`: coin id -> vs currency -> rate.
#[derive(Debug, Deserialize)]
struct SimplePriceResponse {
    #[serde(flatten)]
    prices: HashMap<String, HashMap<String, Decimal>>,
}

/// Response of `/coins/{id}/history`.
#[derive(Debug, Deserialize)]
struct HistoricalResponse {
    market_data: HistoricalMarketData,
}

#[derive(Debug, Deserialize)]
struct HistoricalMarketData {
    current_price: HashMap<String, Decimal>,
}

/// CoinGecko client for crypto-sourced exchange rates.
pub struct CoinGeckoClient {
    client: Client,
    api_key: Option<String>,
    base_url: String,
}

impl CoinGeckoClient {
    pub fn new(api_key: Option<String>) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| Client::new());

        let base_url = if api_key.is_some() {
            PRO_BASE_URL.to_string()
        } else {
            PUBLIC_BASE_URL.to_string()
        };

        Self {
            client,
            api_key,
            base_url,
        }
    }

    /// Maps a ticker symbol onto the CoinGecko coin id.
    fn coin_id(symbol: &str) -> Option<&'static str> {
        match symbol.to_uppercase().as_str() {
            "BTC" => Some("bitcoin"),
            "ETH" => Some("ethereum"),
            "DOT" => Some("polkadot"),
            "KSM" => Some("kusama"),
            "GLMR" => Some("moonbeam"),
            "ASTR" => Some("astar"),
            "BNC" => Some("bifrost-native-coin"),
            "IBTC" => Some("interbtc"),
            "USDC" => Some("usd-coin"),
            "USDT" => Some("tether"),
            _ => None,
        }
    }

    fn request(&self, url: &str) -> reqwest::RequestBuilder {
        let mut builder = self.client.get(url);
        if let Some(key) = &self.api_key {
            builder = builder.header("x-cg-pro-api-key", key);
        }
        builder
    }

    async fn fetch_latest(&self, coin_id: &str, vs: &str) -> Result<Decimal, PriceFeedError> {
        let url = format!(
            "{}/simple/price?ids={}&vs_currencies={}",
            self.base_url, coin_id, vs
        );

        let response = self.request(&url).send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(PriceFeedError::Api {
                provider: PROVIDER_ID.to_string(),
                message: format!("{}: {}", status, body),
            });
        }

        let data: SimplePriceResponse = response.json().await?;
        data.prices
            .get(coin_id)
            .and_then(|prices| prices.get(vs))
            .copied()
            .ok_or_else(|| PriceFeedError::MissingRate {
                pair: format!("{}/{}", coin_id, vs),
            })
    }

    async fn fetch_historical(
        &self,
        coin_id: &str,
        vs: &str,
        at: DateTime<Utc>,
    ) -> Result<Decimal, PriceFeedError> {
        // CoinGecko expects DD-MM-YYYY for the history endpoint.
        let date = at.format("%d-%m-%Y");
        let url = format!(
            "{}/coins/{}/history?date={}&localization=false",
            self.base_url, coin_id, date
        );

        let response = self.request(&url).send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(PriceFeedError::Api {
                provider: PROVIDER_ID.to_string(),
                message: format!("{}: {}", status, body),
            });
        }

        let data: HistoricalResponse = response.json().await?;
        data.market_data
            .current_price
            .get(vs)
            .copied()
            .ok_or_else(|| PriceFeedError::MissingRate {
                pair: format!("{}/{} on {}", coin_id, vs, date),
            })
    }
}

#[async_trait]
impl RateProvider for CoinGeckoClient {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    async fn fetch_rate(
        &self,
        from: &str,
        to: &str,
        at: Option<DateTime<Utc>>,
    ) -> Result<RateQuote, PriceFeedError> {
        let coin_id = Self::coin_id(from)
            .ok_or_else(|| PriceFeedError::UnsupportedCurrency(from.to_string()))?;
        let vs = to.to_lowercase();

        let rate = match at {
            Some(at) => self.fetch_historical(coin_id, &vs, at).await?,
            None => self.fetch_latest(coin_id, &vs).await?,
        };

        if rate <= Decimal::ZERO {
            return Err(PriceFeedError::InvalidRate {
                value: rate.to_string(),
            });
        }

        let timestamp = at.unwrap_or_else(Utc::now);
        log::debug!("coingecko rate {}/{} = {} at {}", from, to, rate, timestamp);

        Ok(RateQuote::new(rate, timestamp, PROVIDER_ID))
    }
}
