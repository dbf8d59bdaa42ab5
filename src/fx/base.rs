//! Base FX types - Currency, CurrencyPair and the RateSource trait

use crate::error::RateFetchError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;

/// ISO 4217 currency code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Currency {
    USD, // US Dollar
    SGD, // Singapore Dollar
}

impl Currency {
    /// Get currency code as string
    pub fn as_str(&self) -> &'static str {
        match self {
            Currency::USD => "USD",
            Currency::SGD => "SGD",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Conversion direction: `target_amount = base_amount * rate`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CurrencyPair {
    pub base: Currency,
    pub target: Currency,
}

impl CurrencyPair {
    /// The only pair the exchange reports
    pub const USD_SGD: CurrencyPair = CurrencyPair {
        base: Currency::USD,
        target: Currency::SGD,
    };
}

impl Default for CurrencyPair {
    fn default() -> Self {
        Self::USD_SGD
    }
}

impl fmt::Display for CurrencyPair {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}/{}", self.base, self.target)
    }
}

/// External provider of historical conversion rates
pub trait RateSource: Send + Sync {
    /// Rate for `pair` on `date` (as stored in the price table)
    fn historical_rate(
        &self,
        date: &str,
        pair: CurrencyPair,
    ) -> impl Future<Output = Result<f64, RateFetchError>> + Send;

    /// Get the source name
    fn name(&self) -> &str;
}
