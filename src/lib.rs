//! # fool-exchange
//!
//! Loads historical ticker prices from a CSV seed into SQLite and serves them
//! back together with historical USD→SGD conversion rates.
//!
//! Two entry points matter to a host:
//!
//! - [`lifecycle::Activator::activate`] creates and seeds the tables once;
//! - [`query::ExchangeQueryService::snapshot`] returns every price and a rate
//!   for each date present.
//!
//! ## Example
//!
//! ```rust,no_run
//! use fool_exchange::prelude::*;
//! use std::path::Path;
//!
//! # async fn run() -> fool_exchange::error::Result<()> {
//! let store = Store::open(Path::new("exchange.db"), TableNames::default())?;
//! Activator::new(&store).activate(Path::new("assets/initial-data.csv"))?;
//!
//! let source = FixerRateSource::new("api-key", "http://data.fixer.io/api")?;
//! let rates = RateCache::new(source, InMemoryRateStore::new());
//! let snapshot = ExchangeQueryService::new(&store, &rates).snapshot().await?;
//! println!("{}", snapshot.to_json()?);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod fx;
pub mod ingest;
pub mod lifecycle;
pub mod query;
pub mod schema;
pub mod seed;
pub mod store;
pub mod types;

pub mod prelude {
    //! Commonly used types and traits
    pub use crate::config::Config;
    pub use crate::error::{DataFileError, ExchangeError, RateFetchError, Result};
    pub use crate::fx::{
        CurrencyPair, FixerRateSource, InMemoryRateStore, RateCache, RateSource, RateStore,
        SqliteRateStore,
    };
    pub use crate::lifecycle::{Activation, Activator, Uninstaller};
    pub use crate::query::ExchangeQueryService;
    pub use crate::store::{Store, TableNames};
    pub use crate::types::*;
}
