//! Decimal money helpers.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! Amounts are `rust_decimal::Decimal`, rounded to cents half-up.

use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};

use crate::error::{AppError, AppResult};

/// Number of decimal places kept for currency amounts.
pub const MONEY_SCALE: u32 = 2;

/// Rounds an amount to cents, midpoint away from zero.
#[must_use]
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Parses a numeric form field.
///
/// Blank input is zero, matching how empty numeric inputs are submitted.
///
/// # Errors
///
/// Returns `AppError::Validation` naming `field` if the text is not a decimal
/// number or has more than two decimal places.
pub fn parse_amount(field: &str, raw: &str) -> AppResult<Decimal> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(Decimal::ZERO);
    }
    let value = Decimal::from_str(trimmed)
        .map_err(|_| AppError::invalid_field(field, format!("'{trimmed}' is not a number")))?;
    if value.normalize().scale() > MONEY_SCALE {
        return Err(AppError::invalid_field(
            field,
            format!("'{trimmed}' has more than {MONEY_SCALE} decimal places"),
        ));
    }
    Ok(value)
}

/// Parses an optional numeric form field; absent or blank input is `None`.
///
/// # Errors
///
/// Returns `AppError::Validation` naming `field` if the text is not a decimal
/// number or has more than two decimal places.
pub fn parse_optional_amount(field: &str, raw: Option<&str>) -> AppResult<Option<Decimal>> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(text) => parse_amount(field, text).map(Some),
    }
}

/// Formats an amount for documents, e.g. `$1,234.50` or `-$20.00`.
#[must_use]
pub fn format_money(amount: Decimal, symbol: &str) -> String {
    let rounded = round_money(amount);
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    let text = format!("{:.2}", rounded.abs());
    let (whole, cents) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    format!("{sign}{symbol}{grouped}.{cents}")
}
