//! Wire and domain types for the rates APIs.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::Deserialize;
use spendflow_shared::types::CurrencyCode;

/// Latest rates for one base currency, as served by `/v4/latest/{base}`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RateTable {
    /// Base currency code.
    pub base: String,
    /// Publication date, if given.
    #[serde(default)]
    pub date: Option<String>,
    /// Units of each currency per one unit of `base`.
    pub rates: HashMap<String, Decimal>,
}

impl RateTable {
    /// Rate from the base currency into `to`.
    #[must_use]
    pub fn rate_to(&self, to: &CurrencyCode) -> Option<Decimal> {
        self.rates.get(to.as_str()).copied()
    }
}

/// One entry of `/v3.1/all?fields=name,currencies`.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct CountryResponse {
    pub name: CountryName,
    #[serde(default)]
    pub currencies: HashMap<String, CurrencyInfo>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct CountryName {
    pub common: String,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct CurrencyInfo {
    pub name: String,
    #[serde(default)]
    pub symbol: Option<String>,
}

/// A country and the currencies it uses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Country {
    /// Common name.
    pub name: String,
    /// Currencies, sorted by code.
    pub currencies: Vec<CountryCurrency>,
}

/// A currency as listed for a country.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountryCurrency {
    /// ISO code.
    pub code: CurrencyCode,
    /// Display name.
    pub name: String,
    /// Display symbol; the code itself when the API has none.
    pub symbol: String,
}

impl From<CountryResponse> for Country {
    fn from(response: CountryResponse) -> Self {
        let mut currencies: Vec<CountryCurrency> = response
            .currencies
            .into_iter()
            .filter_map(|(code, info)| {
                let code: CurrencyCode = code.parse().ok()?;
                let symbol = info.symbol.unwrap_or_else(|| code.to_string());
                Some(CountryCurrency {
                    code,
                    name: info.name,
                    symbol,
                })
            })
            .collect();
        currencies.sort_by(|a, b| a.code.cmp(&b.code));

        Self {
            name: response.name.common,
            currencies,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_rate_table() {
        let body = r#"{
            "provider": "https://www.exchangerate-api.com",
            "base": "USD",
            "date": "2026-03-14",
            "time_last_updated": 1773446401,
            "rates": { "USD": 1, "EUR": 0.92, "INR": 83.12 }
        }"#;
        let table: RateTable = serde_json::from_str(body).unwrap();

        assert_eq!(table.base, "USD");
        assert_eq!(table.date.as_deref(), Some("2026-03-14"));
        assert_eq!(table.rate_to(&"eur".parse().unwrap()), Some(dec!(0.92)));
        assert_eq!(table.rate_to(&"INR".parse().unwrap()), Some(dec!(83.12)));
        assert_eq!(table.rate_to(&"JPY".parse().unwrap()), None);
    }

    #[test]
    fn test_country_conversion() {
        let body = r#"[
            {
                "name": { "common": "Switzerland", "official": "Swiss Confederation" },
                "currencies": { "CHF": { "name": "Swiss franc", "symbol": "Fr." } }
            },
            {
                "name": { "common": "Panama", "official": "Republic of Panama" },
                "currencies": {
                    "USD": { "name": "United States dollar", "symbol": "$" },
                    "PAB": { "name": "Panamanian balboa" }
                }
            },
            { "name": { "common": "Antarctica", "official": "Antarctica" }, "currencies": {} }
        ]"#;
        let responses: Vec<CountryResponse> = serde_json::from_str(body).unwrap();
        let countries: Vec<Country> = responses.into_iter().map(Country::from).collect();

        assert_eq!(countries[0].currencies[0].symbol, "Fr.");
        let panama = &countries[1];
        assert_eq!(panama.currencies.len(), 2);
        assert_eq!(panama.currencies[0].code.as_str(), "PAB");
        assert_eq!(panama.currencies[0].symbol, "PAB");
        assert_eq!(panama.currencies[1].symbol, "$");
        assert!(countries[2].currencies.is_empty());
    }
}
