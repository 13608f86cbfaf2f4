use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::constants::{CRYPTO_RATE_TTL_SECS, FIAT_RATE_TTL_SECS};

/// Where an exchange rate came from. TTL policy hangs off the source, not
/// the pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RateSource {
    CoinGecko,
    Fixer,
    #[default]
    Manual,
    Composite,
}

impl RateSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            RateSource::CoinGecko => "coingecko",
            RateSource::Fixer => "fixer",
            RateSource::Manual => "manual",
            RateSource::Composite => "composite",
        }
    }

    /// Default cache TTL: crypto-sourced rates go stale fast, fiat rates
    /// hold for a day.
    pub fn default_ttl_secs(&self) -> i64 {
        match self {
            RateSource::CoinGecko | RateSource::Composite => CRYPTO_RATE_TTL_SECS,
            RateSource::Fixer | RateSource::Manual => FIAT_RATE_TTL_SECS,
        }
    }
}

impl From<RateSource> for String {
    fn from(source: RateSource) -> Self {
        source.as_str().to_string()
    }
}

impl From<&str> for RateSource {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "coingecko" => RateSource::CoinGecko,
            "fixer" => RateSource::Fixer,
            "composite" => RateSource::Composite,
            _ => RateSource::Manual,
        }
    }
}

/// A cached exchange rate for one ordered currency pair.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeRate {
    pub id: String,
    pub from_currency: String,
    pub to_currency: String,
    pub rate: Decimal,
    pub timestamp: DateTime<Utc>,
    pub source: RateSource,
    pub ttl_seconds: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

impl ExchangeRate {
    /// Whether the rate has outlived its TTL at `now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        (now - self.timestamp).num_seconds() > self.ttl_seconds
    }
}

/// How a conversion resolves its rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ConversionMethod {
    #[default]
    Spot,
    Historical,
    Fixed,
}

/// A conversion to perform.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConversionRequest {
    pub from_currency: String,
    pub to_currency: String,
    pub amount: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<ConversionMethod>,
}

/// A performed conversion, carrying the rate that produced it.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Conversion {
    pub from_currency: String,
    pub to_currency: String,
    pub amount: Decimal,
    pub converted_amount: Decimal,
    pub exchange_rate: Decimal,
    pub timestamp: DateTime<Utc>,
    pub source: RateSource,
}

/// Fiat or crypto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CurrencyKind {
    Fiat,
    Crypto,
}

/// A supported currency.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Currency {
    pub code: String,
    pub name: String,
    pub kind: CurrencyKind,
    pub decimals: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
}

/// Display symbol for a currency code, when one is known.
pub fn currency_symbol(code: &str) -> Option<&'static str> {
    match code {
        "USD" | "USDC" | "USDT" => Some("$"),
        "EUR" => Some("€"),
        "GBP" => Some("£"),
        "JPY" | "CNY" => Some("¥"),
        "INR" => Some("₹"),
        "CAD" => Some("C$"),
        "AUD" => Some("A$"),
        "CHF" => Some("CHF"),
        "BTC" => Some("₿"),
        "ETH" => Some("Ξ"),
        _ => None,
    }
}

/// Built-in currency registry.
pub fn builtin_currencies() -> Vec<Currency> {
    fn entry(code: &str, name: &str, kind: CurrencyKind, decimals: u32) -> Currency {
        Currency {
            code: code.to_string(),
            name: name.to_string(),
            kind,
            decimals,
            symbol: currency_symbol(code).map(str::to_string),
        }
    }

    vec![
        entry("USD", "US Dollar", CurrencyKind::Fiat, 2),
        entry("EUR", "Euro", CurrencyKind::Fiat, 2),
        entry("GBP", "Pound Sterling", CurrencyKind::Fiat, 2),
        entry("JPY", "Japanese Yen", CurrencyKind::Fiat, 0),
        entry("CAD", "Canadian Dollar", CurrencyKind::Fiat, 2),
        entry("AUD", "Australian Dollar", CurrencyKind::Fiat, 2),
        entry("CHF", "Swiss Franc", CurrencyKind::Fiat, 2),
        entry("CNY", "Chinese Yuan", CurrencyKind::Fiat, 2),
        entry("INR", "Indian Rupee", CurrencyKind::Fiat, 2),
        entry("BTC", "Bitcoin", CurrencyKind::Crypto, 8),
        entry("ETH", "Ether", CurrencyKind::Crypto, 8),
        entry("DOT", "Polkadot", CurrencyKind::Crypto, 8),
        entry("KSM", "Kusama", CurrencyKind::Crypto, 8),
        entry("GLMR", "Moonbeam", CurrencyKind::Crypto, 8),
        entry("ASTR", "Astar", CurrencyKind::Crypto, 8),
        entry("BNC", "Bifrost", CurrencyKind::Crypto, 8),
        entry("USDC", "USD Coin", CurrencyKind::Crypto, 6),
        entry("USDT", "Tether", CurrencyKind::Crypto, 6),
    ]
}

/// How formatted amounts announce their currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CurrencyDisplayFormat {
    #[default]
    Symbol,
    Code,
    Name,
}

/// Thousands/decimal separator convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum DecimalSeparatorStandard {
    /// 1,234.56
    #[default]
    PointComma,
    /// 1.234,56
    CommaPoint,
    /// 1 234.56
    PointSpace,
    /// 1 234,56
    CommaSpace,
}

impl DecimalSeparatorStandard {
    /// (thousands separator, decimal separator)
    pub fn separators(&self) -> (char, char) {
        match self {
            DecimalSeparatorStandard::PointComma => (',', '.'),
            DecimalSeparatorStandard::CommaPoint => ('.', ','),
            DecimalSeparatorStandard::PointSpace => (' ', '.'),
            DecimalSeparatorStandard::CommaSpace => (' ', ','),
        }
    }
}

/// Account-scoped display and conversion preferences.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AccountSettings {
    pub primary_currency: String,
    #[serde(default)]
    pub reporting_currencies: Vec<String>,
    pub conversion_method: ConversionMethod,
    pub decimal_places: u32,
    pub use_thousands_separator: bool,
    pub currency_display_format: CurrencyDisplayFormat,
    pub decimal_separator_standard: DecimalSeparatorStandard,
}
