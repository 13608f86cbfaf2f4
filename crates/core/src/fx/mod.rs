//! FX module - exchange rates, conversion, and locale-aware formatting.

pub mod formatter;
mod fx_errors;
mod fx_model;
mod fx_service;

pub use fx_errors::FxError;
pub use fx_model::{
    builtin_currencies, currency_symbol, AccountSettings, Conversion, ConversionMethod,
    ConversionRequest, Currency, CurrencyDisplayFormat, CurrencyKind, DecimalSeparatorStandard,
    ExchangeRate, RateSource,
};
pub use fx_service::FxService;
