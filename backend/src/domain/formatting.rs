//! Display formatting for amounts and percentages.
//!
//! Currency is a display setting only; amounts are never converted.

use crate::domain::models::PlannerConfig;

const NARROW_NO_BREAK_SPACE: char = '\u{202F}';
const NO_BREAK_SPACE: char = '\u{00A0}';

fn currency_symbol(currency: &str) -> Option<&'static str> {
    match currency {
        "EUR" => Some("€"),
        "USD" => Some("$"),
        "GBP" => Some("£"),
        _ => None,
    }
}

/// Digits of `amount` rounded to cents, as (is_negative, integer part, cents)
fn split_amount(amount: f64) -> (bool, String, String) {
    let rounded = format!("{:.2}", amount.abs());
    let (integer, cents) = rounded.split_once('.').unwrap_or((rounded.as_str(), "00"));
    // -0.004 rounds to 0.00 and shows without a sign
    let negative = amount < 0.0 && rounded.bytes().any(|b| b.is_ascii_digit() && b != b'0');
    (negative, integer.to_string(), cents.to_string())
}

fn group_thousands(integer: &str, separator: char) -> String {
    let mut grouped = String::with_capacity(integer.len() + integer.len() / 3);
    for (index, digit) in integer.chars().enumerate() {
        if index > 0 && (integer.len() - index) % 3 == 0 {
            grouped.push(separator);
        }
        grouped.push(digit);
    }
    grouped
}

/// Format `amount` with two decimals following the configured locale.
///
/// - `fr-FR`: `1 234,56 €` (narrow no-break space grouping, comma decimal)
/// - `en-US`: `$1,234.56`
/// - anything else: French grouping with the currency code as suffix
pub fn format_currency(amount: f64, config: &PlannerConfig) -> String {
    let (negative, integer, cents) = split_amount(amount);
    let sign = if negative { "-" } else { "" };

    match config.locale.as_str() {
        "en-US" => {
            let symbol = currency_symbol(&config.currency).unwrap_or(config.currency.as_str());
            format!("{}{}{}.{}", sign, symbol, group_thousands(&integer, ','), cents)
        }
        "fr-FR" => {
            let symbol = currency_symbol(&config.currency).unwrap_or(config.currency.as_str());
            format!(
                "{}{},{}{}{}",
                sign,
                group_thousands(&integer, NARROW_NO_BREAK_SPACE),
                cents,
                NO_BREAK_SPACE,
                symbol
            )
        }
        _ => format!(
            "{}{},{}{}{}",
            sign,
            group_thousands(&integer, NARROW_NO_BREAK_SPACE),
            cents,
            NO_BREAK_SPACE,
            config.currency
        ),
    }
}

/// Percentage with one decimal, e.g. `33.3%`
pub fn format_percentage(percentage: f64) -> String {
    format!("{:.1}%", percentage)
}
