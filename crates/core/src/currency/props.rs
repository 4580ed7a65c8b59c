//! Property-based tests for currency conversion.

use proptest::prelude::*;
use rust_decimal::Decimal;

use super::conversion::{ORG_CURRENCY_DECIMALS, convert_amount};

/// Positive amounts from 0.01 to 1,000,000.00.
fn positive_amount() -> impl Strategy<Value = Decimal> {
    (1i64..100_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Positive rates from 0.0001 to 10000.0000.
fn positive_rate() -> impl Strategy<Value = Decimal> {
    (1i64..100_000_000i64).prop_map(|v| Decimal::new(v, 4))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Converted amounts never carry more than two decimal places.
    #[test]
    fn prop_convert_keeps_org_precision(amount in positive_amount(), rate in positive_rate()) {
        let result = convert_amount(amount, rate, ORG_CURRENCY_DECIMALS);
        prop_assert!(result.scale() <= ORG_CURRENCY_DECIMALS);
    }

    /// Rounding moves the exact product by at most half a cent.
    #[test]
    fn prop_convert_error_bounded(amount in positive_amount(), rate in positive_rate()) {
        let exact = amount * rate;
        let result = convert_amount(amount, rate, ORG_CURRENCY_DECIMALS);
        prop_assert!((result - exact).abs() <= Decimal::new(5, 3));
    }

    /// A rate of one leaves cent amounts untouched.
    #[test]
    fn prop_identity_rate(amount in positive_amount()) {
        prop_assert_eq!(convert_amount(amount, Decimal::ONE, ORG_CURRENCY_DECIMALS), amount);
    }
}
