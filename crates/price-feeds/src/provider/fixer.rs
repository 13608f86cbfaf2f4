//! Fixer.io provider for fiat exchange rates.
//!
//! Latest rates come from `/latest`, historical rates from the `/{date}`
//! endpoint. The access key is a query parameter on every request.

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

use crate::errors::PriceFeedError;
use crate::models::RateQuote;
use crate::provider::RateProvider;

/// Provider ID constant
const PROVIDER_ID: &str = "fixer";

/// Default HTTP request timeout
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const BASE_URL: &str = "https://api.fixer.io";

/// Shared shape of `/latest` and `/{date}` responses.
#[derive(Debug, Deserialize)]
struct FixerResponse {
    success: bool,
    timestamp: Option<i64>,
    rates: Option<HashMap<String, Decimal>>,
    error: Option<FixerApiError>,
}

#[derive(Debug, Deserialize)]
struct FixerApiError {
    code: i64,
    #[serde(rename = "type")]
    kind: Option<String>,
}

/// Fixer client for fiat-sourced exchange rates.
pub struct FixerClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl FixerClient {
    pub fn new(api_key: String) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            api_key,
            base_url: BASE_URL.to_string(),
        }
    }

    async fn fetch(
        &self,
        from: &str,
        to: &str,
        at: Option<DateTime<Utc>>,
    ) -> Result<FixerResponse, PriceFeedError> {
        // `/latest` for spot, `/YYYY-MM-DD` for historical.
        let endpoint = match at {
            Some(at) => at.format("%Y-%m-%d").to_string(),
            None => "latest".to_string(),
        };
        let url = format!(
            "{}/{}?access_key={}&base={}&symbols={}",
            self.base_url,
            endpoint,
            self.api_key,
            from.to_uppercase(),
            to.to_uppercase()
        );

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(PriceFeedError::Api {
                provider: PROVIDER_ID.to_string(),
                message: format!("{}: {}", status, body),
            });
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl RateProvider for FixerClient {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    async fn fetch_rate(
        &self,
        from: &str,
        to: &str,
        at: Option<DateTime<Utc>>,
    ) -> Result<RateQuote, PriceFeedError> {
        let data = self.fetch(from, to, at).await?;

        if !data.success {
            let message = match data.error {
                Some(err) => format!(
                    "code {}{}",
                    err.code,
                    err.kind.map(|k| format!(" ({})", k)).unwrap_or_default()
                ),
                None => "success=false".to_string(),
            };
            return Err(PriceFeedError::Api {
                provider: PROVIDER_ID.to_string(),
                message,
            });
        }

        let rate = data
            .rates
            .as_ref()
            .and_then(|rates| rates.get(to.to_uppercase().as_str()))
            .copied()
            .ok_or_else(|| PriceFeedError::MissingRate {
                pair: format!("{}/{}", from, to),
            })?;

        if rate <= Decimal::ZERO {
            return Err(PriceFeedError::InvalidRate {
                value: rate.to_string(),
            });
        }

        let timestamp = data
            .timestamp
            .and_then(|ts| Utc.timestamp_opt(ts, 0).single())
            .or(at)
            .unwrap_or_else(Utc::now);
        log::debug!("fixer rate {}/{} = {} at {}", from, to, rate, timestamp);

        Ok(RateQuote::new(rate, timestamp, PROVIDER_ID))
    }
}
