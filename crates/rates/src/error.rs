//! Rates client error types.

use spendflow_core::currency::CurrencyError;
use spendflow_shared::AppError;
use thiserror::Error;

/// Errors from the exchange-rate and country APIs.
#[derive(Debug, Error)]
pub enum RatesError {
    /// Transport failure, timeout, or undecodable body.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("{service} returned status {status}")]
    Status {
        /// Which API answered.
        service: &'static str,
        /// HTTP status code.
        status: u16,
    },

    /// The rate table has no entry for the target currency.
    #[error("No rate from {from} to {to}")]
    MissingRate {
        /// Base currency.
        from: String,
        /// Target currency.
        to: String,
    },
}

impl RatesError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Http(_) => "RATES_HTTP_ERROR",
            Self::Status { .. } => "RATES_BAD_STATUS",
            Self::MissingRate { .. } => "RATES_MISSING_RATE",
        }
    }
}

impl From<RatesError> for AppError {
    fn from(err: RatesError) -> Self {
        Self::ExternalService(err.to_string())
    }
}

/// Maps a client failure for `from -> to` onto the core currency error.
pub(crate) fn into_currency_error(err: RatesError, from: &str, to: &str) -> CurrencyError {
    match err {
        RatesError::MissingRate { from, to } => CurrencyError::UnknownCurrency { from, to },
        other => CurrencyError::ConversionUnavailable {
            from: from.to_string(),
            to: to.to_string(),
            reason: other.to_string(),
        },
    }
}
