//! Exchange-rate API client.
//!
//! Fetches the full rate table for a base currency and keeps it in a moka
//! cache for the configured TTL, so converting many expenses from the same
//! currency costs one request.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;
use rust_decimal::Decimal;
use spendflow_core::currency::{CurrencyError, RateProvider};
use spendflow_shared::config::ExchangeRateConfig;
use spendflow_shared::types::CurrencyCode;
use tracing::{debug, error};

use crate::error::{RatesError, into_currency_error};
use crate::http_client;
use crate::types::RateTable;

/// Client for `{base_url}/v4/latest/{base}`.
#[derive(Clone)]
pub struct ExchangeRateClient {
    http: reqwest::Client,
    base_url: String,
    cache: Cache<CurrencyCode, Arc<RateTable>>,
}

impl ExchangeRateClient {
    /// Creates a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &ExchangeRateConfig) -> Result<Self, RatesError> {
        Ok(Self::with_client(http_client(config)?, config))
    }

    /// Creates a client around an existing HTTP client.
    #[must_use]
    pub fn with_client(http: reqwest::Client, config: &ExchangeRateConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(config.cache_capacity)
            .time_to_live(Duration::from_secs(config.cache_ttl_secs))
            .build();

        Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            cache,
        }
    }

    /// Latest rate table for `base`, from cache when fresh.
    ///
    /// # Errors
    ///
    /// Returns an error if the table has to be fetched and the request fails.
    pub async fn latest(&self, base: &CurrencyCode) -> Result<Arc<RateTable>, RatesError> {
        if let Some(table) = self.cache.get(base).await {
            debug!(%base, "Rate table cache hit");
            return Ok(table);
        }

        let table = Arc::new(self.fetch(base).await?);
        self.cache.insert(base.clone(), Arc::clone(&table)).await;
        Ok(table)
    }

    /// Rate to convert one unit of `from` into `to`.
    ///
    /// # Errors
    ///
    /// Returns `MissingRate` if the table has no entry for `to`, or the
    /// fetch error.
    pub async fn rate_between(
        &self,
        from: &CurrencyCode,
        to: &CurrencyCode,
    ) -> Result<Decimal, RatesError> {
        let table = self.latest(from).await?;
        table.rate_to(to).ok_or_else(|| RatesError::MissingRate {
            from: from.to_string(),
            to: to.to_string(),
        })
    }

    async fn fetch(&self, base: &CurrencyCode) -> Result<RateTable, RatesError> {
        let url = format!("{}/v4/latest/{}", self.base_url, base);

        let response = self.http.get(&url).send().await.map_err(|e| {
            error!(error = %e, %base, "Exchange-rate API request failed");
            RatesError::from(e)
        })?;

        let status = response.status();
        if !status.is_success() {
            error!(status = status.as_u16(), %base, "Exchange-rate API returned an error");
            return Err(RatesError::Status {
                service: "exchange-rate API",
                status: status.as_u16(),
            });
        }

        let table = response.json::<RateTable>().await.map_err(|e| {
            error!(error = %e, %base, "Failed to parse exchange-rate response");
            RatesError::from(e)
        })?;

        debug!(%base, currencies = table.rates.len(), "Fetched rate table");
        Ok(table)
    }

    #[cfg(test)]
    async fn seed(&self, table: RateTable) {
        let base: CurrencyCode = table.base.parse().unwrap();
        self.cache.insert(base, Arc::new(table)).await;
    }
}

#[async_trait]
impl RateProvider for ExchangeRateClient {
    async fn rate(&self, from: &CurrencyCode, to: &CurrencyCode) -> Result<Decimal, CurrencyError> {
        self.rate_between(from, to)
            .await
            .map_err(|e| into_currency_error(e, from.as_str(), to.as_str()))
    }
}
