//! Install-time activation and full-removal teardown

use crate::error::Result;
use crate::ingest;
use crate::schema;
use crate::seed::SeedFile;
use crate::store::Store;
use std::path::Path;

/// What an activation run did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    /// The schema was already present; nothing was written
    AlreadyInstalled,
    /// Tables were created and seeded
    Seeded { tickers: usize, prices: usize },
}

/// Creates and seeds the exchange tables
#[derive(Debug)]
pub struct Activator<'a> {
    store: &'a Store,
}

impl<'a> Activator<'a> {
    pub fn new(store: &'a Store) -> Self {
        Self { store }
    }

    /// Create the tables and load the seed file.
    ///
    /// If the ticker table already exists the store is assumed to be seeded and
    /// nothing happens, even when the tables were emptied by hand. A failure
    /// part way through leaves whatever was already written in place.
    pub fn activate(&self, seed_path: &Path) -> Result<Activation> {
        if schema::tables_exist(self.store)? {
            log::info!(
                "Exchange tables already present in {}, skipping seed",
                self.store.tables().tickers
            );
            return Ok(Activation::AlreadyInstalled);
        }

        schema::create_tables(self.store)?;

        let seed = SeedFile::load(seed_path)?;
        log::info!(
            "Seeding {} ticker(s) and {} data row(s) from {}",
            seed.tickers.len(),
            seed.rows.len(),
            seed_path.display()
        );

        let ticker_ids = ingest::insert_tickers(self.store, &seed.symbols())?;
        let prices = ingest::insert_prices(self.store, &seed.rows, &ticker_ids)?;

        log::info!(
            "Activation complete: {} ticker(s), {} price(s)",
            ticker_ids.len(),
            prices
        );
        Ok(Activation::Seeded {
            tickers: ticker_ids.len(),
            prices,
        })
    }
}

/// Removes all exchange data and tables
#[derive(Debug)]
pub struct Uninstaller<'a> {
    store: &'a Store,
}

impl<'a> Uninstaller<'a> {
    pub fn new(store: &'a Store) -> Self {
        Self { store }
    }

    /// Delete every ticker (prices follow through the cascade), then drop the
    /// price table before the ticker table it references.
    pub fn uninstall(&self) -> Result<()> {
        let tables = self.store.tables();
        if !schema::tables_exist(self.store)? {
            log::info!("Table {} not found, nothing to uninstall", tables.tickers);
            return Ok(());
        }

        let deleted = self
            .store
            .conn()
            .execute(&format!("DELETE FROM {}", tables.tickers), [])?;
        log::info!("Deleted {} ticker(s) and their prices", deleted);

        schema::drop_tables(self.store)
    }
}
