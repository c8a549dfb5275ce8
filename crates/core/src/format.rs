//! Deterministic number formatting for report text.

use chrono::{DateTime, Utc};

/// Section rule used between report blocks.
pub const RULE: &str = "───────────────────────────────────────────────────────────────";

/// Banner rule used around the report header.
pub const BANNER: &str = "═══════════════════════════════════════════════════════════════";

/// Format a number with thousands separators
#[must_use]
pub fn format_thousands(value: f64, decimals: usize) -> String {
    let formatted = format!("{:.*}", decimals, value.abs());

    let parts: Vec<&str> = formatted.split('.').collect();
    let int_part = parts[0];
    let dec_part = parts.get(1);

    let int_with_commas: String = int_part
        .chars()
        .rev()
        .enumerate()
        .flat_map(|(i, c)| {
            if i > 0 && i % 3 == 0 {
                vec![',', c]
            } else {
                vec![c]
            }
        })
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();

    let sign = if value < 0.0 && formatted.chars().any(|c| c.is_ascii_digit() && c != '0') {
        "-"
    } else {
        ""
    };

    match dec_part {
        Some(d) if decimals > 0 => format!("{sign}{int_with_commas}.{d}"),
        _ => format!("{sign}{int_with_commas}"),
    }
}

/// Number of decimals used for a price of this magnitude.
#[must_use]
pub fn price_decimals(price: f64) -> usize {
    let magnitude = price.abs();
    if magnitude >= 1_000.0 {
        2
    } else if magnitude >= 1.0 {
        4
    } else {
        8
    }
}

/// Formats a price with magnitude-dependent precision.
#[must_use]
pub fn format_price(price: f64) -> String {
    format!("{:.*}", price_decimals(price), price)
}

/// Formats a percentage with a sign, e.g. `+1.25%`.
#[must_use]
pub fn format_signed_pct(value: f64) -> String {
    format!("{value:+.2}%")
}

/// Formats a candle time as `YYYY-MM-DD HH:MM UTC`.
#[must_use]
pub fn format_time(time: &DateTime<Utc>) -> String {
    time.format("%Y-%m-%d %H:%M UTC").to_string()
}
