//! Currency conversion logic.
//!
//! Converted amounts are rounded half to even at the organization currency's
//! precision.

use rust_decimal::Decimal;
use rust_decimal::RoundingStrategy;

/// Decimal places kept for amounts in the organization currency.
pub const ORG_CURRENCY_DECIMALS: u32 = 2;

/// Converts an amount using the given exchange rate.
///
/// Uses banker's rounding (round half to even) to minimize cumulative errors.
#[must_use]
pub fn convert_amount(amount: Decimal, rate: Decimal, decimal_places: u32) -> Decimal {
    let converted = amount * rate;
    converted.round_dp_with_strategy(decimal_places, RoundingStrategy::MidpointNearestEven)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_convert_amount() {
        // 100 EUR * 1.0850 = 108.50 USD
        let result = convert_amount(dec!(100), dec!(1.0850), ORG_CURRENCY_DECIMALS);
        assert_eq!(result, dec!(108.50));
    }

    #[test]
    fn test_convert_with_rounding() {
        // 19.99 * 0.7913 = 15.818087 -> 15.82
        let result = convert_amount(dec!(19.99), dec!(0.7913), ORG_CURRENCY_DECIMALS);
        assert_eq!(result, dec!(15.82));
    }

    #[test]
    fn test_bankers_rounding() {
        // 0.125 -> 0.12, 0.135 -> 0.14
        assert_eq!(convert_amount(dec!(0.125), Decimal::ONE, 2), dec!(0.12));
        assert_eq!(convert_amount(dec!(0.135), Decimal::ONE, 2), dec!(0.14));
    }
}
