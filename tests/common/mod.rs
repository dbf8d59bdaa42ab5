//! Shared fixtures for the integration tests

#![allow(dead_code)]

use fool_exchange::error::RateFetchError;
use fool_exchange::fx::{CurrencyPair, RateSource};
use std::collections::HashMap;
use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use tempfile::NamedTempFile;

/// Small seed in the same shape as the shipped initial-data.csv
pub const SAMPLE_SEED: &str = "\
Date,Time,FOOL Price USD,AAPL Price USD,MSFT Price USD
20180102,09:30:00,\"$1,000.50\",\"$172.26\",85.95
20180102,16:00:00,\"$1,010.00\",\"$172.02\",85.95
20180103,09:30:00,\"$1,020.25\",\"$172.30\",86.35
20180103,16:00:00,\"$1,015.75\",\"$172.15\",86.10
";

pub fn write_seed(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

/// Rate source answering from a fixed table, counting every call
#[derive(Default)]
pub struct MockRateSource {
    rates: HashMap<String, f64>,
    calls: AtomicUsize,
    dates: Mutex<Vec<String>>,
}

impl MockRateSource {
    pub fn with_rates(rates: &[(&str, f64)]) -> Self {
        Self {
            rates: rates.iter().map(|(d, r)| (d.to_string(), *r)).collect(),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requested_dates(&self) -> Vec<String> {
        self.dates.lock().unwrap().clone()
    }
}

impl RateSource for MockRateSource {
    async fn historical_rate(&self, date: &str, _pair: CurrencyPair) -> Result<f64, RateFetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.dates.lock().unwrap().push(date.to_string());
        self.rates
            .get(date)
            .copied()
            .ok_or_else(|| RateFetchError::ConnectionFailure(format!("no route for {}", date)))
    }

    fn name(&self) -> &str {
        "mock"
    }
}
