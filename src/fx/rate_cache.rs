//! Cached historical rate lookups
//!
//! A lookup first consults the [`RateStore`] under the key `date + target
//! currency` (e.g. `20180102SGD`). On a miss the [`RateSource`] is called once
//! and the answer cached for the configured TTL. Failures are not retried and
//! are not cached.

use super::base::{CurrencyPair, RateSource};
use super::cache::RateStore;
use crate::config::DEFAULT_CACHE_TTL_HOURS;
use crate::error::RateFetchError;
use crate::types::Rate;
use chrono::Duration;

/// Rate lookups with a transient cache in front of an external source
#[derive(Debug)]
pub struct RateCache<S, C> {
    source: S,
    store: C,
    pair: CurrencyPair,
    ttl: Duration,
}

impl<S: RateSource, C: RateStore> RateCache<S, C> {
    /// USD→SGD cache with the default 24 hour lifetime
    pub fn new(source: S, store: C) -> Self {
        Self {
            source,
            store,
            pair: CurrencyPair::USD_SGD,
            ttl: Duration::hours(DEFAULT_CACHE_TTL_HOURS),
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn pair(&self) -> CurrencyPair {
        self.pair
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn store(&self) -> &C {
        &self.store
    }

    /// Cache key for a date
    pub fn cache_key(&self, date: &str) -> String {
        format!("{}{}", date, self.pair.target)
    }

    /// Cached rate, else a fresh fetch that is then cached.
    ///
    /// A broken cache store only costs a fetch; it is logged and skipped.
    pub async fn fetch_rate(&self, date: &str) -> Result<f64, RateFetchError> {
        let key = self.cache_key(date);

        match self.store.get(&key) {
            Ok(Some(rate)) => {
                log::debug!("Rate cache hit for {}", key);
                return Ok(rate);
            }
            Ok(None) => log::debug!("Rate cache miss for {}", key),
            Err(e) => log::warn!("Rate cache read failed for {}: {}", key, e),
        }

        let rate = self.source.historical_rate(date, self.pair).await?;

        if let Err(e) = self.store.set(&key, rate, self.ttl) {
            log::warn!("Rate cache write failed for {}: {}", key, e);
        }
        Ok(rate)
    }

    /// Rate for `date`, or `None` when it could not be obtained.
    ///
    /// Never fails: fetch errors are logged so the caller can carry on with a
    /// hole in its data.
    pub async fn get_rate(&self, date: &str) -> Rate {
        match self.fetch_rate(date).await {
            Ok(rate) => Some(rate),
            Err(e) => {
                log::warn!(
                    "{} rate for {} unavailable from {}: {}",
                    self.pair,
                    date,
                    self.source.name(),
                    e
                );
                None
            }
        }
    }
}
