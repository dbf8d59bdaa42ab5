//! Transient rate storage
//!
//! A cached rate carries an expiry time; once it passes the entry reads as
//! absent. [`InMemoryRateStore`] lives for the process, [`SqliteRateStore`]
//! keeps entries in a table so they survive restarts.

use crate::error::Result;
use chrono::{DateTime, Duration, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Mutex, RwLock};

/// Key/value store for cached rates with per-entry expiry
pub trait RateStore: Send + Sync {
    /// Non-expired rate for `key`
    fn get(&self, key: &str) -> Result<Option<f64>>;

    /// Store `rate` under `key` for `ttl`
    fn set(&self, key: &str, rate: f64, ttl: Duration) -> Result<()>;

    /// Drop every entry
    fn clear(&self) -> Result<()>;
}

impl<T: RateStore + ?Sized> RateStore for Box<T> {
    fn get(&self, key: &str) -> Result<Option<f64>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, rate: f64, ttl: Duration) -> Result<()> {
        (**self).set(key, rate, ttl)
    }

    fn clear(&self) -> Result<()> {
        (**self).clear()
    }
}

#[derive(Debug, Clone, Copy)]
struct CachedRate {
    rate: f64,
    expires_at: DateTime<Utc>,
}

impl CachedRate {
    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// Expiry instant for an entry written now, saturating at the latest
/// representable time
fn expiry(ttl: Duration) -> DateTime<Utc> {
    Utc::now()
        .checked_add_signed(ttl)
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// In-memory rate store
#[derive(Debug, Default)]
pub struct InMemoryRateStore {
    entries: RwLock<HashMap<String, CachedRate>>,
}

impl InMemoryRateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries, expired ones included
    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl RateStore for InMemoryRateStore {
    fn get(&self, key: &str) -> Result<Option<f64>> {
        let now = Utc::now();
        {
            let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
            match entries.get(key) {
                None => return Ok(None),
                Some(entry) if !entry.is_expired(now) => return Ok(Some(entry.rate)),
                Some(_) => {}
            }
        }

        // Expired: evict
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        if entries.get(key).is_some_and(|entry| entry.is_expired(now)) {
            entries.remove(key);
            log::debug!("Evicted expired rate {}", key);
        }
        Ok(None)
    }

    fn set(&self, key: &str, rate: f64, ttl: Duration) -> Result<()> {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.insert(
            key.to_string(),
            CachedRate {
                rate,
                expires_at: expiry(ttl),
            },
        );
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        self.entries
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
        Ok(())
    }
}

/// Rate store backed by a SQLite table
#[derive(Debug)]
pub struct SqliteRateStore {
    conn: Mutex<Connection>,
    table: String,
}

impl SqliteRateStore {
    /// Open (or create) the cache database at `path`
    pub fn open(path: &Path, prefix: &str) -> Result<Self> {
        Self::with_connection(Connection::open(path)?, prefix)
    }

    /// In-memory cache table (for testing)
    pub fn open_in_memory(prefix: &str) -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?, prefix)
    }

    fn with_connection(conn: Connection, prefix: &str) -> Result<Self> {
        let table = format!("{}fool_exchange_rate_cache", prefix);
        conn.execute(
            &format!(
                "CREATE TABLE IF NOT EXISTS {} (
                    key TEXT PRIMARY KEY,
                    rate REAL NOT NULL,
                    expires_at INTEGER NOT NULL
                )",
                table
            ),
            [],
        )?;
        Ok(Self {
            conn: Mutex::new(conn),
            table,
        })
    }

    /// Delete expired rows, returning how many went
    pub fn purge_expired(&self) -> Result<usize> {
        let conn = self.conn.lock().unwrap_or_else(|e| e.into_inner());
        let purged = conn.execute(
            &format!("DELETE FROM {} WHERE expires_at <= ?1", self.table),
            params![Utc::now().timestamp_millis()],
        )?;
        Ok(purged)
    }
}

impl RateStore for SqliteRateStore {
    fn get(&self, key: &str) -> Result<Option<f64>> {
        let conn = self.conn.lock().unwrap_or_else(|e| e.into_inner());
        let rate = conn
            .query_row(
                &format!(
                    "SELECT rate FROM {} WHERE key = ?1 AND expires_at > ?2",
                    self.table
                ),
                params![key, Utc::now().timestamp_millis()],
                |row| row.get(0),
            )
            .optional()?;
        Ok(rate)
    }

    fn set(&self, key: &str, rate: f64, ttl: Duration) -> Result<()> {
        let expires_at = expiry(ttl).timestamp_millis();
        let conn = self.conn.lock().unwrap_or_else(|e| e.into_inner());
        conn.execute(
            &format!(
                "INSERT OR REPLACE INTO {} (key, rate, expires_at) VALUES (?1, ?2, ?3)",
                self.table
            ),
            params![key, rate, expires_at],
        )?;
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let conn = self.conn.lock().unwrap_or_else(|e| e.into_inner());
        conn.execute(&format!("DELETE FROM {}", self.table), [])?;
        Ok(())
    }
}
