//! Country directory client.

use spendflow_shared::config::ExchangeRateConfig;
use tracing::{debug, error};

use crate::error::RatesError;
use crate::http_client;
use crate::types::{Country, CountryResponse};

/// Client for `{countries_url}/v3.1/all`.
#[derive(Debug, Clone)]
pub struct CountryClient {
    http: reqwest::Client,
    base_url: String,
}

impl CountryClient {
    /// Creates a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &ExchangeRateConfig) -> Result<Self, RatesError> {
        Ok(Self {
            http: http_client(config)?,
            base_url: config.countries_url.trim_end_matches('/').to_string(),
        })
    }

    /// All countries with their currencies, sorted by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body does not parse.
    pub async fn list_countries(&self) -> Result<Vec<Country>, RatesError> {
        let url = format!("{}/v3.1/all", self.base_url);

        let response = self
            .http
            .get(&url)
            .query(&[("fields", "name,currencies")])
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "Countries API request failed");
                RatesError::from(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            error!(status = status.as_u16(), "Countries API returned an error");
            return Err(RatesError::Status {
                service: "countries API",
                status: status.as_u16(),
            });
        }

        let raw: Vec<CountryResponse> = response.json().await?;
        let mut countries: Vec<Country> = raw.into_iter().map(Country::from).collect();
        countries.sort_by(|a, b| a.name.cmp(&b.name));

        debug!(count = countries.len(), "Fetched country list");
        Ok(countries)
    }
}
