//! Foreign Exchange (FX) rates
//!
//! Historical USD→SGD rates for the dates present in the price table.
//!
//! # Components
//!
//! - **base**: Currency, CurrencyPair and the RateSource trait
//! - **cache**: transient rate stores (in-memory and SQLite)
//! - **fixer**: fixer.io historical rate client
//! - **rate_cache**: cache-or-fetch lookups with an "unavailable" fallback
//!
//! # Example
//!
//! ```rust,no_run
//! use fool_exchange::fx::{FixerRateSource, InMemoryRateStore, RateCache};
//!
//! # async fn run() -> fool_exchange::error::Result<()> {
//! let source = FixerRateSource::new("api-key", "http://data.fixer.io/api")?;
//! let cache = RateCache::new(source, InMemoryRateStore::new());
//!
//! // None when the API could not be reached
//! let rate = cache.get_rate("20180102").await;
//! # Ok(())
//! # }
//! ```

pub mod base;
pub mod cache;
pub mod fixer;
pub mod rate_cache;

pub use base::{Currency, CurrencyPair, RateSource};
pub use cache::{InMemoryRateStore, RateStore, SqliteRateStore};
pub use fixer::FixerRateSource;
pub use rate_cache::RateCache;
