//! Bundle pricing with decimal arithmetic.
//!
//! Shopify sends variant prices as decimal strings ("19.99"). They are
//! parsed straight into [`Decimal`] so no binary floating point touches a
//! money amount; only the model's percentage starts out as `f64`.

use rust_decimal::{Decimal, RoundingStrategy};

/// Errors that can occur when computing a price.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// The input is not a decimal number.
    #[error("invalid price `{0}`")]
    Invalid(String),
    /// The input is negative.
    #[error("price cannot be negative: {0}")]
    Negative(Decimal),
    /// The discount is outside the open interval (0, 100).
    #[error("discount must be greater than 0 and less than 100, got {0}")]
    DiscountOutOfRange(String),
}

/// Parse a Shopify price string.
///
/// # Errors
///
/// Returns an error if `s` is not a decimal number or is negative.
pub fn parse_price(s: &str) -> Result<Decimal, PriceError> {
    let amount: Decimal = s
        .trim()
        .parse()
        .map_err(|_| PriceError::Invalid(s.to_owned()))?;

    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(PriceError::Negative(amount));
    }
    Ok(amount)
}

/// Price of a two-product bundle: `(a + b) * (1 - percent_off / 100)`,
/// rounded to cents with halves rounded away from zero.
///
/// # Errors
///
/// Returns an error if `percent_off` is not strictly between 0 and 100.
pub fn bundle_price(a: Decimal, b: Decimal, percent_off: f64) -> Result<Decimal, PriceError> {
    let percent = Decimal::try_from(percent_off)
        .map_err(|_| PriceError::DiscountOutOfRange(percent_off.to_string()))?;
    if percent <= Decimal::ZERO || percent >= Decimal::ONE_HUNDRED {
        return Err(PriceError::DiscountOutOfRange(percent.to_string()));
    }

    let factor = Decimal::ONE - percent / Decimal::ONE_HUNDRED;
    Ok(((a + b) * factor).round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().expect("decimal literal")
    }

    #[test]
    fn test_parse_price() {
        assert_eq!(parse_price("19.99"), Ok(dec("19.99")));
        assert_eq!(parse_price(" 5 "), Ok(dec("5")));
        assert_eq!(parse_price("0.00"), Ok(Decimal::ZERO));
    }

    #[test]
    fn test_parse_price_rejects_garbage() {
        assert!(matches!(parse_price("abc"), Err(PriceError::Invalid(_))));
        assert!(matches!(parse_price(""), Err(PriceError::Invalid(_))));
        assert!(matches!(parse_price("-1.00"), Err(PriceError::Negative(_))));
    }

    #[test]
    fn test_bundle_price_exact() {
        let price = bundle_price(dec("19.99"), dec("10.01"), 10.0).expect("valid");
        assert_eq!(price, dec("27.00"));
    }

    #[test]
    fn test_bundle_price_rounds_to_cents() {
        let price = bundle_price(dec("10.00"), dec("10.05"), 12.5).expect("valid");
        assert_eq!(price, dec("17.54"));
    }

    #[test]
    fn test_bundle_price_midpoint_rounds_away_from_zero() {
        let price = bundle_price(dec("0.25"), Decimal::ZERO, 50.0).expect("valid");
        assert_eq!(price, dec("0.13"));
    }

    #[test]
    fn test_bundle_price_rejects_out_of_range_discount() {
        let a = dec("10");
        assert!(bundle_price(a, a, 0.0).is_err());
        assert!(bundle_price(a, a, 100.0).is_err());
        assert!(bundle_price(a, a, -5.0).is_err());
        assert!(bundle_price(a, a, f64::NAN).is_err());
    }
}
