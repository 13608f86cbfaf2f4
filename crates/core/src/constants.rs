/// Holding period in days beyond which a disposal is long-term
pub const LONG_TERM_HOLDING_DAYS: i64 = 365;

/// Cache TTL for crypto-sourced exchange rates
pub const CRYPTO_RATE_TTL_SECS: i64 = 300;

/// Cache TTL for fiat-sourced exchange rates
pub const FIAT_RATE_TTL_SECS: i64 = 86_400;

/// Fair-value share (percent) above which a holding is disclosed as significant
pub const SIGNIFICANT_HOLDING_PCT: u32 = 5;

/// Maximum decimal places accepted by the display formatter
pub const MAX_DISPLAY_DECIMAL_PLACES: u32 = 8;
