//! Brazilian-real amounts: lenient coercion from API payloads and `R$` display.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde_json::Value;

/// Renders an amount as `R$ 1.234,56`.
///
/// Two decimal places (banker's rounding), `.` thousands separator, `,`
/// decimal separator. Negative amounts carry the sign after the symbol
/// (`R$ -10,00`); values that round to zero render as `R$ 0,00`.
pub fn format_brl(value: Decimal) -> String {
    let rounded = value.round_dp(2);
    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    let digits = format!("{:.2}", rounded.abs());
    let (integer, fraction) = digits.split_once('.').unwrap_or((digits.as_str(), "00"));

    format!(
        "R$ {}{},{}",
        if negative { "-" } else { "" },
        group_thousands(integer),
        fraction
    )
}

/// Like [`format_brl`] but blank for non-positive amounts, used by statement
/// inflow/outflow cells.
pub fn format_brl_or_blank(value: Decimal) -> String {
    if value > Decimal::ZERO {
        format_brl(value)
    } else {
        String::new()
    }
}

fn group_thousands(integer: &str) -> String {
    let len = integer.len();
    let mut grouped = String::with_capacity(len + len / 3);
    for (index, ch) in integer.chars().enumerate() {
        if index > 0 && (len - index) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }
    grouped
}

/// Largest magnitude, in whole reais, accepted from upstream payloads.
pub const MAX_AMOUNT_REAIS: i64 = 1_000_000_000_000_000;

fn within_bounds(value: &Decimal) -> bool {
    value.abs() <= Decimal::from(MAX_AMOUNT_REAIS)
}

/// Reads an amount from a JSON value, returning `None` when it is absent, not
/// numeric or beyond [`MAX_AMOUNT_REAIS`].
pub fn parse_amount(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(number) => {
            let repr = number.to_string();
            Decimal::from_str(&repr)
                .or_else(|_| Decimal::from_scientific(&repr))
                .ok()
                .or_else(|| number.as_f64().and_then(|f| Decimal::try_from(f).ok()))
                .filter(within_bounds)
        }
        Value::String(raw) => parse_amount_str(raw),
        _ => None,
    }
}

/// Coerces an amount, falling back to zero so the row is kept and totals stay
/// defined.
pub fn coerce_amount(value: &Value) -> Decimal {
    parse_amount(value).unwrap_or(Decimal::ZERO)
}

/// Parses `1234.56`, `1.234,56`, `1234,56` and `R$ 1.234,56`.
pub fn parse_amount_str(raw: &str) -> Option<Decimal> {
    let trimmed = raw.trim().trim_start_matches("R$").trim();
    if trimmed.is_empty() {
        return None;
    }

    let normalized = if trimmed.contains(',') {
        trimmed.replace('.', "").replace(',', ".")
    } else {
        trimmed.to_owned()
    };

    Decimal::from_str(&normalized)
        .or_else(|_| Decimal::from_scientific(&normalized))
        .ok()
        .filter(within_bounds)
}

/// Sum that saturates at the `Decimal` bounds.
pub fn sum_amounts(amounts: impl IntoIterator<Item = Decimal>) -> Decimal {
    amounts
        .into_iter()
        .fold(Decimal::ZERO, |total, amount| total.saturating_add(amount))
}
