//! Currency error types.

use thiserror::Error;

/// Errors raised by rate providers.
#[derive(Debug, Error)]
pub enum CurrencyError {
    /// The provider could not be reached or answered with an error.
    #[error("Exchange rate lookup failed for {from}->{to}: {reason}")]
    ConversionUnavailable {
        /// Source currency code.
        from: String,
        /// Target currency code.
        to: String,
        /// Provider failure description.
        reason: String,
    },

    /// The provider answered but has no rate for the target currency.
    #[error("No exchange rate from {from} to {to}")]
    UnknownCurrency {
        /// Source currency code.
        from: String,
        /// Target currency code.
        to: String,
    },
}

impl CurrencyError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::ConversionUnavailable { .. } => "CONVERSION_UNAVAILABLE",
            Self::UnknownCurrency { .. } => "UNKNOWN_CURRENCY",
        }
    }
}
