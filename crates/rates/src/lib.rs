//! HTTP clients for exchange rates and country currencies.
//!
//! [`ExchangeRateClient`] implements the core `RateProvider` seam with a
//! TTL cache per base currency. [`CountryClient`] lists countries with their
//! currencies for organization setup.

pub mod countries;
pub mod error;
pub mod exchange;
pub mod types;

pub use countries::CountryClient;
pub use error::RatesError;
pub use exchange::ExchangeRateClient;
pub use types::{Country, CountryCurrency, RateTable};

use std::time::Duration;

use spendflow_shared::config::ExchangeRateConfig;

/// Builds the shared HTTP client from configuration.
///
/// # Errors
///
/// Returns an error if the TLS backend cannot be initialized.
pub fn http_client(config: &ExchangeRateConfig) -> Result<reqwest::Client, RatesError> {
    Ok(reqwest::Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .user_agent(concat!("spendflow/", env!("CARGO_PKG_VERSION")))
        .build()?)
}
