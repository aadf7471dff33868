//! pt-BR display formatting for amounts and head counts.

use crate::models::numeric_value;
use serde_json::Value;

pub const ZERO_CURRENCY: &str = "R$ 0,00";

/// Formats a row value as BRL. Absent, null and non-numeric values render
/// as [`ZERO_CURRENCY`].
pub fn format_currency(value: Option<&Value>) -> String {
    numeric_value(value).map_or_else(|| ZERO_CURRENCY.to_string(), format_brl)
}

pub fn format_brl(amount: f64) -> String {
    if !amount.is_finite() {
        return ZERO_CURRENCY.to_string();
    }

    let digits = format!("{:.2}", amount.abs());
    let (units, cents) = digits.split_once('.').unwrap_or((digits.as_str(), "00"));
    let sign = if amount < 0.0 && digits != "0.00" { "-" } else { "" };
    format!("{sign}R$ {},{cents}", group_thousands(units))
}

/// Formats a head count; absent values render as `0`.
pub fn format_count(value: Option<&Value>) -> String {
    format_count_value(numeric_value(value).unwrap_or(0.0))
}

pub fn format_count_value(count: f64) -> String {
    if !count.is_finite() {
        return "0".to_string();
    }

    let digits = format!("{:.0}", count.abs());
    let sign = if count < 0.0 && digits != "0" { "-" } else { "" };
    format!("{sign}{}", group_thousands(&digits))
}

/// Inserts `.` every three digits of an unsigned integer string.
fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }
    grouped
}
