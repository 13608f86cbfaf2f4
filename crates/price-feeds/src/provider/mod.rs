//! Rate provider trait and concrete client implementations.

mod traits;

pub mod coingecko;
pub mod fixer;

pub use coingecko::CoinGeckoClient;
pub use fixer::FixerClient;
pub use traits::RateProvider;
