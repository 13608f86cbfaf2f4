//! Locale-aware number and currency formatting.
//!
//! Formatting works on [`Decimal`] values end to end; nothing here passes
//! through floating point. Each function takes the separator convention
//! explicitly so callers can format for any account, not just the active
//! one.

use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

use super::fx_errors::FxError;
use super::fx_model::{
    builtin_currencies, currency_symbol, AccountSettings, CurrencyDisplayFormat,
    DecimalSeparatorStandard,
};
use crate::constants::MAX_DISPLAY_DECIMAL_PLACES;
use crate::errors::Result;

/// Options controlling numeric rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumberFormatOptions {
    pub decimal_places: u32,
    pub use_thousands_separator: bool,
    pub standard: DecimalSeparatorStandard,
}

impl Default for NumberFormatOptions {
    fn default() -> Self {
        Self {
            decimal_places: 2,
            use_thousands_separator: true,
            standard: DecimalSeparatorStandard::PointComma,
        }
    }
}

impl NumberFormatOptions {
    pub fn from_settings(settings: &AccountSettings) -> Self {
        Self {
            decimal_places: settings.decimal_places,
            use_thousands_separator: settings.use_thousands_separator,
            standard: settings.decimal_separator_standard,
        }
    }
}

fn group_thousands(digits: &str, separator: char) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    let len = digits.len();
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            grouped.push(separator);
        }
        grouped.push(ch);
    }
    grouped
}

/// Renders a decimal under the given separator convention.
///
/// Rounds half away from zero; decimal places are capped at
/// [`MAX_DISPLAY_DECIMAL_PLACES`].
pub fn format_number(amount: Decimal, options: &NumberFormatOptions) -> String {
    let places = options.decimal_places.min(MAX_DISPLAY_DECIMAL_PLACES);
    let rounded = amount.round_dp_with_strategy(places, RoundingStrategy::MidpointAwayFromZero);
    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    let fixed = format!("{:.*}", places as usize, rounded.abs());

    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (fixed.as_str(), None),
    };

    let (thousands, decimal) = options.standard.separators();
    let mut out = String::new();
    if negative {
        out.push('-');
    }
    if options.use_thousands_separator {
        out.push_str(&group_thousands(int_part, thousands));
    } else {
        out.push_str(int_part);
    }
    if let Some(frac) = frac_part {
        out.push(decimal);
        out.push_str(frac);
    }
    out
}

fn currency_name(code: &str) -> Option<String> {
    builtin_currencies()
        .into_iter()
        .find(|currency| currency.code == code)
        .map(|currency| currency.name)
}

/// Renders an amount with its currency, as a symbol prefix or a code/name
/// suffix. Unknown codes fall back to the code suffix form.
pub fn format_currency(
    amount: Decimal,
    currency_code: &str,
    display: CurrencyDisplayFormat,
    options: &NumberFormatOptions,
) -> String {
    let number = format_number(amount, options);
    match display {
        CurrencyDisplayFormat::Symbol => match currency_symbol(currency_code) {
            Some(symbol) => format!("{}{}", symbol, number),
            None => format!("{} {}", number, currency_code),
        },
        CurrencyDisplayFormat::Code => format!("{} {}", number, currency_code),
        CurrencyDisplayFormat::Name => match currency_name(currency_code) {
            Some(name) => format!("{} {}", number, name),
            None => format!("{} {}", number, currency_code),
        },
    }
}

/// Renders a ratio as a percentage. Thousands grouping is never applied.
pub fn format_percentage(value: Decimal, options: &NumberFormatOptions) -> String {
    let plain = NumberFormatOptions {
        use_thousands_separator: false,
        ..*options
    };
    format!("{}%", format_number(value, &plain))
}

/// Compact display for dashboards: 1.2K, 3.4M, 5.6B. Amounts under a
/// thousand render in full.
pub fn format_compact(
    amount: Decimal,
    currency_code: &str,
    standard: DecimalSeparatorStandard,
) -> String {
    let thousand = Decimal::new(1_000, 0);
    let million = Decimal::new(1_000_000, 0);
    let billion = Decimal::new(1_000_000_000, 0);
    let magnitude = amount.abs();

    if magnitude < thousand {
        let options = NumberFormatOptions {
            decimal_places: 2,
            use_thousands_separator: true,
            standard,
        };
        return format_currency(amount, currency_code, CurrencyDisplayFormat::Symbol, &options);
    }

    let (scaled, suffix) = if magnitude >= billion {
        (amount / billion, "B")
    } else if magnitude >= million {
        (amount / million, "M")
    } else {
        (amount / thousand, "K")
    };

    let options = NumberFormatOptions {
        decimal_places: 1,
        use_thousands_separator: false,
        standard,
    };
    let number = format_number(scaled, &options);
    match currency_symbol(currency_code) {
        Some(symbol) => format!("{}{}{}", symbol, number, suffix),
        None => format!("{}{} {}", number, suffix, currency_code),
    }
}

/// Parses a formatted amount back into a decimal under the convention it
/// was rendered with. Currency symbols, codes, percent signs, and grouping
/// separators are stripped; the decimal separator is normalized.
pub fn parse_formatted_number(
    input: &str,
    standard: DecimalSeparatorStandard,
) -> Result<Decimal> {
    let (thousands, decimal) = standard.separators();
    let mut cleaned = String::with_capacity(input.len());

    for ch in input.chars() {
        if ch.is_ascii_digit() || ch == '-' {
            cleaned.push(ch);
        } else if ch == decimal {
            cleaned.push('.');
        } else if ch == thousands
            || ch.is_alphabetic()
            || ch.is_whitespace()
            || matches!(ch, '$' | '€' | '£' | '¥' | '₹' | '₿' | '%')
        {
            // symbol, grouping, or annotation; carries no numeric value
        } else {
            return Err(FxError::UnparsableAmount(input.to_string()).into());
        }
    }

    if cleaned.is_empty() || cleaned == "-" {
        return Err(FxError::UnparsableAmount(input.to_string()).into());
    }

    Decimal::from_str(&cleaned)
        .map_err(|_| FxError::UnparsableAmount(input.to_string()).into())
}
