//! Core types shared by ingestion and the snapshot query

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Ticker symbol as found in the seed header
pub type Symbol = String;

/// Store-assigned ticker id
pub type TickerId = i64;

/// Price type (using f64 for precision)
pub type Price = f64;

/// Currency conversion factor; `None` means the rate was unavailable
pub type Rate = Option<f64>;

/// A tracked ticker symbol
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticker {
    pub id: TickerId,
    pub symbol: Symbol,
}

/// One stored (ticker, date, time) price observation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub id: i64,
    pub ticker_id: TickerId,
    pub date: String,
    pub time: String,
    pub price: Option<Price>,
}

/// Price record waiting to be inserted (no id yet)
#[derive(Debug, Clone, PartialEq)]
pub struct NewPricePoint {
    pub ticker_id: TickerId,
    pub date: String,
    pub time: String,
    pub price: Option<Price>,
}

/// Price row joined to its ticker symbol, as served to readers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRow {
    #[serde(rename = "ticker")]
    pub symbol: Symbol,
    pub date: String,
    pub time: String,
    pub price: Option<Price>,
}

impl PriceRow {
    /// Sort key used by the snapshot: symbol, then date, then time
    pub fn sort_key(&self) -> (&str, &str, &str) {
        (self.symbol.as_str(), self.date.as_str(), self.time.as_str())
    }
}

/// Full price + rate dataset returned by a query
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub prices: Vec<PriceRow>,
    pub rates: BTreeMap<String, Rate>,
}

impl Snapshot {
    /// Serialize to the JSON shape consumed by the exchange page
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Pretty-printed variant of [`Snapshot::to_json`]
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Rate for a date, if present and available
    pub fn rate_for(&self, date: &str) -> Rate {
        self.rates.get(date).copied().flatten()
    }
}
