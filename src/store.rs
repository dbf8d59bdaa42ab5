//! SQLite store handle
//!
//! Every component receives a `&Store` explicitly; nothing reaches for a
//! global connection.

use crate::error::Result;
use rusqlite::Connection;
use std::path::Path;

/// Names of the two exchange tables, derived from a prefix
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableNames {
    pub tickers: String,
    pub prices: String,
}

impl TableNames {
    /// Table names for the given prefix (e.g. `"wp_"`)
    pub fn with_prefix(prefix: &str) -> Self {
        Self {
            tickers: format!("{}fool_exchange_tickers", prefix),
            prices: format!("{}fool_exchange_prices", prefix),
        }
    }
}

impl Default for TableNames {
    fn default() -> Self {
        Self::with_prefix("")
    }
}

/// Relational store with SQLite backend
pub struct Store {
    conn: Connection,
    tables: TableNames,
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("path", &self.conn.path())
            .field("tables", &self.tables)
            .finish()
    }
}

impl Store {
    /// Create or open database at path
    pub fn open(db_path: &Path, tables: TableNames) -> Result<Self> {
        let conn = Connection::open(db_path)?;
        Self::from_connection(conn, tables)
    }

    /// Create in-memory database (for testing)
    pub fn open_in_memory(tables: TableNames) -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::from_connection(conn, tables)
    }

    /// Wrap an existing connection. Foreign key enforcement is switched on,
    /// since the price cascade depends on it.
    pub fn from_connection(conn: Connection, tables: TableNames) -> Result<Self> {
        conn.pragma_update(None, "foreign_keys", true)?;
        Ok(Self { conn, tables })
    }

    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    pub fn tables(&self) -> &TableNames {
        &self.tables
    }

    /// Whether a table with this exact name exists
    pub fn table_exists(&self, name: &str) -> Result<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
            [name],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Row count of a table. Callers pass one of our own table names.
    pub fn count_rows(&self, table: &str) -> Result<usize> {
        let count: i64 =
            self.conn
                .query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_names() {
        let names = TableNames::with_prefix("wp_");
        assert_eq!(names.tickers, "wp_fool_exchange_tickers");
        assert_eq!(names.prices, "wp_fool_exchange_prices");
        assert_eq!(TableNames::default().tickers, "fool_exchange_tickers");
    }

    #[test]
    fn test_foreign_keys_enabled() {
        let store = Store::open_in_memory(TableNames::default()).unwrap();
        let enabled: i64 = store
            .conn()
            .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
            .unwrap();
        assert_eq!(enabled, 1);
    }

    #[test]
    fn test_table_exists() {
        let store = Store::open_in_memory(TableNames::default()).unwrap();
        assert!(!store.table_exists("things").unwrap());

        store.conn().execute("CREATE TABLE things (id INTEGER)", []).unwrap();
        assert!(store.table_exists("things").unwrap());
        assert_eq!(store.count_rows("things").unwrap(), 0);
    }
}
