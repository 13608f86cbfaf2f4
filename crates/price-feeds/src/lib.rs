//! Exchange-rate providers for the lotbook accounting engine.
//!
//! This crate contains:
//! - The `RateProvider` trait implemented by every rate source
//! - Concrete HTTP clients (CoinGecko for crypto, Fixer for fiat)
//!
//! The core engine treats a provider as an opaque async dependency: it asks
//! for a `(from, to)` pair at an optional historical instant and receives a
//! decimal-typed `RateQuote` or a `PriceFeedError`. Timeout policy lives on
//! the HTTP clients here, not in the core.

mod errors;
mod models;
pub mod provider;

pub use errors::PriceFeedError;
pub use models::RateQuote;
pub use provider::{CoinGeckoClient, FixerClient, RateProvider};
