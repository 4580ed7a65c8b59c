//! Currency conversion for submitted expenses.
//!
//! Rates come from a [`RateProvider`]. Conversion is best effort: a failed
//! lookup falls back to 1:1 so submission never blocks on a rate outage.

pub mod conversion;
pub mod error;
pub mod service;

#[cfg(test)]
mod props;

pub use conversion::{ORG_CURRENCY_DECIMALS, convert_amount};
pub use error::CurrencyError;
pub use service::{Conversion, CurrencyService, RateProvider};
