//! Currency service for expense conversion.
//!
//! Wraps a [`RateProvider`] with the conversion policy used at submission:
//! no lookup for same-currency expenses, banker's rounding to the
//! organization currency's precision, and a 1:1 fallback when the provider
//! fails.

use async_trait::async_trait;
use rust_decimal::Decimal;
use spendflow_shared::types::CurrencyCode;
use tracing::{debug, warn};

use crate::currency::conversion::{ORG_CURRENCY_DECIMALS, convert_amount};
use crate::currency::error::CurrencyError;

/// Source of exchange rates.
#[async_trait]
pub trait RateProvider: Send + Sync {
    /// Returns the factor such that `1 from = factor to`.
    async fn rate(&self, from: &CurrencyCode, to: &CurrencyCode) -> Result<Decimal, CurrencyError>;
}

/// Result of converting an expense amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Conversion {
    /// Amount in the target currency, rounded.
    pub amount: Decimal,
    /// Rate that was applied.
    pub rate: Decimal,
    /// True when the lookup failed and 1:1 was used.
    pub fallback: bool,
}

/// Currency service for conversion operations.
pub struct CurrencyService;

impl CurrencyService {
    /// Convert `amount` from `from` into `to`, never failing.
    ///
    /// Same-currency amounts are returned unchanged without a lookup. A
    /// provider error is logged and the amount is kept at a rate of 1.
    pub async fn convert_or_identity<R>(
        provider: &R,
        amount: Decimal,
        from: &CurrencyCode,
        to: &CurrencyCode,
    ) -> Conversion
    where
        R: RateProvider + ?Sized,
    {
        if from == to {
            return Conversion {
                amount,
                rate: Decimal::ONE,
                fallback: false,
            };
        }

        match provider.rate(from, to).await {
            Ok(rate) => {
                debug!(%from, %to, %rate, "Converted expense amount");
                Conversion {
                    amount: convert_amount(amount, rate, ORG_CURRENCY_DECIMALS),
                    rate,
                    fallback: false,
                }
            }
            Err(err) => {
                warn!(
                    %from,
                    %to,
                    error = %err,
                    code = err.error_code(),
                    "Exchange rate unavailable, using 1:1"
                );
                Conversion {
                    amount,
                    rate: Decimal::ONE,
                    fallback: true,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedRate {
        rate: Decimal,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl RateProvider for FixedRate {
        async fn rate(&self, _: &CurrencyCode, _: &CurrencyCode) -> Result<Decimal, CurrencyError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.rate)
        }
    }

    struct Offline;

    #[async_trait]
    impl RateProvider for Offline {
        async fn rate(&self, from: &CurrencyCode, to: &CurrencyCode) -> Result<Decimal, CurrencyError> {
            Err(CurrencyError::ConversionUnavailable {
                from: from.to_string(),
                to: to.to_string(),
                reason: "connection refused".to_string(),
            })
        }
    }

    fn code(s: &str) -> CurrencyCode {
        s.parse().unwrap()
    }

    #[tokio::test]
    async fn test_same_currency_skips_lookup() {
        let provider = FixedRate {
            rate: dec!(2),
            calls: AtomicUsize::new(0),
        };
        let result =
            CurrencyService::convert_or_identity(&provider, dec!(42.10), &code("USD"), &code("usd"))
                .await;

        assert_eq!(result.amount, dec!(42.10));
        assert_eq!(result.rate, Decimal::ONE);
        assert!(!result.fallback);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_converts_and_rounds() {
        let provider = FixedRate {
            rate: dec!(0.012),
            calls: AtomicUsize::new(0),
        };
        // 1234.56 INR * 0.012 = 14.81472 USD
        let result =
            CurrencyService::convert_or_identity(&provider, dec!(1234.56), &code("INR"), &code("USD"))
                .await;

        assert_eq!(result.amount, dec!(14.81));
        assert_eq!(result.rate, dec!(0.012));
        assert!(!result.fallback);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failure_falls_back_to_identity() {
        let result =
            CurrencyService::convert_or_identity(&Offline, dec!(99.99), &code("EUR"), &code("USD"))
                .await;

        assert_eq!(result.amount, dec!(99.99));
        assert_eq!(result.rate, Decimal::ONE);
        assert!(result.fallback);
    }
}
