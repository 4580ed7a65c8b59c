//! Application configuration management.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Exchange-rate and country lookup configuration.
    #[serde(default)]
    pub exchange_rates: ExchangeRateConfig,
    /// Workflow defaults.
    #[serde(default)]
    pub workflow: WorkflowConfig,
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// Exchange-rate provider configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ExchangeRateConfig {
    /// Base URL of the exchange-rate API.
    #[serde(default = "default_rates_url")]
    pub base_url: String,
    /// Base URL of the country/currency directory API.
    #[serde(default = "default_countries_url")]
    pub countries_url: String,
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// How long fetched rate tables stay cached.
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
    /// Maximum number of base currencies kept in the cache.
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: u64,
}

impl Default for ExchangeRateConfig {
    fn default() -> Self {
        Self {
            base_url: default_rates_url(),
            countries_url: default_countries_url(),
            timeout_secs: default_timeout_secs(),
            cache_ttl_secs: default_cache_ttl_secs(),
            cache_capacity: default_cache_capacity(),
        }
    }
}

fn default_rates_url() -> String {
    "https://api.exchangerate-api.com".to_string()
}

fn default_countries_url() -> String {
    "https://restcountries.com".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_cache_ttl_secs() -> u64 {
    3600 // 1 hour
}

fn default_cache_capacity() -> u64 {
    64
}

/// Workflow defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct WorkflowConfig {
    /// Currency assumed for organizations created without one.
    #[serde(default = "default_currency")]
    pub default_currency: String,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            default_currency: default_currency(),
        }
    }
}

fn default_currency() -> String {
    "USD".to_string()
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// Sources, later ones overriding earlier ones:
    /// `config/default`, `config/{RUN_MODE}`, then `SPENDFLOW__*` variables.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("SPENDFLOW").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_from_environment() {
        temp_env::with_vars(
            [
                ("SPENDFLOW__DATABASE__URL", Some("sqlite::memory:")),
                ("SPENDFLOW__DATABASE__MAX_CONNECTIONS", Some("3")),
                ("SPENDFLOW__EXCHANGE_RATES__TIMEOUT_SECS", Some("2")),
                ("RUN_MODE", Some("test")),
            ],
            || {
                let config = AppConfig::load().unwrap();
                assert_eq!(config.database.url, "sqlite::memory:");
                assert_eq!(config.database.max_connections, 3);
                assert_eq!(config.database.min_connections, 1);
                assert_eq!(config.exchange_rates.timeout_secs, 2);
                assert_eq!(config.exchange_rates.cache_ttl_secs, 3600);
                assert_eq!(config.workflow.default_currency, "USD");
            },
        );
    }

    #[test]
    fn test_missing_database_url_fails() {
        temp_env::with_vars(
            [
                ("SPENDFLOW__DATABASE__URL", None::<&str>),
                ("RUN_MODE", Some("test")),
            ],
            || {
                assert!(AppConfig::load().is_err());
            },
        );
    }

    #[test]
    fn test_exchange_rate_defaults() {
        let config = ExchangeRateConfig::default();
        assert_eq!(config.base_url, "https://api.exchangerate-api.com");
        assert_eq!(config.countries_url, "https://restcountries.com");
        assert_eq!(config.cache_capacity, 64);
    }
}
