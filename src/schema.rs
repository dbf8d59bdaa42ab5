//! Exchange table management
//!
//! Column names (`ticker_id`, `ticker`, `price_id`, `date`, `time`, `price`)
//! are the compatibility surface with databases created by earlier installs.

use crate::error::Result;
use crate::store::Store;

/// Whether the exchange schema is installed.
///
/// Only the ticker table is checked: the two tables are created together, so
/// the price table is assumed to exist alongside it.
pub fn tables_exist(store: &Store) -> Result<bool> {
    store.table_exists(&store.tables().tickers)
}

/// Create the ticker and price tables with their indexes
pub fn create_tables(store: &Store) -> Result<()> {
    let tickers = &store.tables().tickers;
    let prices = &store.tables().prices;

    store.conn().execute_batch(&format!(
        "CREATE TABLE {tickers} (
            ticker_id INTEGER PRIMARY KEY AUTOINCREMENT,
            ticker VARCHAR(10) NULL
        );
        CREATE UNIQUE INDEX {tickers}_UNIQ_ticker ON {tickers} (ticker ASC);

        CREATE TABLE {prices} (
            price_id INTEGER PRIMARY KEY AUTOINCREMENT,
            ticker_id BIGINT NULL,
            date CHAR(8) NULL,
            time CHAR(8) NULL,
            price FLOAT NULL,
            CONSTRAINT FK_ticker_id
                FOREIGN KEY (ticker_id)
                REFERENCES {tickers} (ticker_id)
                ON DELETE CASCADE
                ON UPDATE RESTRICT
        );
        CREATE INDEX {prices}_IDX_ticker_id ON {prices} (ticker_id ASC);",
        tickers = tickers,
        prices = prices,
    ))?;

    log::info!("Created tables {} and {}", tickers, prices);
    Ok(())
}

/// Create the schema unless the ticker table already exists.
///
/// Returns `true` when this call created the tables. An existing schema is not
/// inspected further.
pub fn ensure_schema(store: &Store) -> Result<bool> {
    if tables_exist(store)? {
        log::debug!("Table {} already exists", store.tables().tickers);
        return Ok(false);
    }
    create_tables(store)?;
    Ok(true)
}

/// Drop the price table, then the ticker table it references
pub fn drop_tables(store: &Store) -> Result<()> {
    let tables = store.tables();
    store.conn().execute_batch(&format!(
        "DROP TABLE IF EXISTS {};
         DROP TABLE IF EXISTS {};",
        tables.prices, tables.tickers
    ))?;
    log::info!("Dropped tables {} and {}", tables.prices, tables.tickers);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::TableNames;

    fn store() -> Store {
        Store::open_in_memory(TableNames::with_prefix("wp_")).unwrap()
    }

    #[test]
    fn test_ensure_schema_is_idempotent() {
        let store = store();
        assert!(!tables_exist(&store).unwrap());

        assert!(ensure_schema(&store).unwrap());
        assert!(tables_exist(&store).unwrap());
        assert!(store.table_exists("wp_fool_exchange_prices").unwrap());

        assert!(!ensure_schema(&store).unwrap());
    }

    #[test]
    fn test_ticker_is_unique() {
        let store = store();
        create_tables(&store).unwrap();
        let sql = "INSERT INTO wp_fool_exchange_tickers (ticker) VALUES ('AAA')";
        store.conn().execute(sql, []).unwrap();
        assert!(store.conn().execute(sql, []).is_err());
    }

    #[test]
    fn test_price_requires_ticker() {
        let store = store();
        create_tables(&store).unwrap();
        let result = store.conn().execute(
            "INSERT INTO wp_fool_exchange_prices (ticker_id, date, time, price)
             VALUES (42, '20200101', '09:30:00', 1.0)",
            [],
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_delete_cascades_to_prices() {
        let store = store();
        create_tables(&store).unwrap();
        let conn = store.conn();
        conn.execute("INSERT INTO wp_fool_exchange_tickers (ticker) VALUES ('AAA')", [])
            .unwrap();
        let id = conn.last_insert_rowid();
        conn.execute(
            "INSERT INTO wp_fool_exchange_prices (ticker_id, date, time, price)
             VALUES (?1, '20200101', '09:30:00', 1.0)",
            [id],
        )
        .unwrap();

        conn.execute("DELETE FROM wp_fool_exchange_tickers", []).unwrap();
        assert_eq!(store.count_rows("wp_fool_exchange_prices").unwrap(), 0);
    }

    #[test]
    fn test_drop_tables() {
        let store = store();
        create_tables(&store).unwrap();
        drop_tables(&store).unwrap();
        assert!(!tables_exist(&store).unwrap());
        assert!(!store.table_exists("wp_fool_exchange_prices").unwrap());
    }
}
