//! Monetary amount validation
//!
//! All money is held as [`Decimal`], so repeated small credits never drift.
//! Values arriving as text or as `f64` are converted here, at the boundary,
//! and anything that is not a positive finite number is rejected with
//! [`FareError::InvalidAmount`].

use super::error::FareError;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use std::str::FromStr;

/// Check that a credit amount is strictly positive
pub fn validate_credit_amount(amount: Decimal) -> Result<Decimal, FareError> {
    if amount <= Decimal::ZERO {
        return Err(FareError::non_positive_amount(amount));
    }
    Ok(amount)
}

/// Parse a textual amount such as `"25.0"`
///
/// Surrounding whitespace is ignored. `NaN`, `inf` and friends are not valid
/// decimals and fail here. The sign is not checked; use
/// [`validate_credit_amount`] for that.
pub fn parse_amount(raw: &str) -> Result<Decimal, FareError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(FareError::invalid_amount(raw, "amount is required"));
    }
    Decimal::from_str(trimmed).map_err(|e| FareError::invalid_amount(raw, &e.to_string()))
}

/// Convert a binary floating-point amount into a decimal
pub fn amount_from_f64(value: f64) -> Result<Decimal, FareError> {
    if !value.is_finite() {
        return Err(FareError::invalid_amount(
            &value.to_string(),
            "amount must be finite",
        ));
    }
    Decimal::from_f64(value).ok_or_else(|| {
        FareError::invalid_amount(&value.to_string(), "amount is out of range")
    })
}
