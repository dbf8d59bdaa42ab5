//! Bulk insertion of seed data
//!
//! Tickers are inserted one at a time so their generated ids can be captured
//! in header order. Prices are compiled into a single multi-row parameterized
//! `INSERT`.

use crate::error::{ExchangeError, Result};
use crate::seed::{clean_price, SeedRow};
use crate::store::Store;
use crate::types::{NewPricePoint, Symbol, TickerId};
use rusqlite::params_from_iter;
use rusqlite::types::Value;

/// Placeholders per price record: ticker_id, date, time, price
const PARAMS_PER_RECORD: usize = 4;

/// Records per statement, kept under SQLite's bound-parameter limit (32766)
pub const MAX_RECORDS_PER_STATEMENT: usize = 8_000;

/// Insert tickers in order, returning their generated ids in the same order
pub fn insert_tickers(store: &Store, symbols: &[Symbol]) -> Result<Vec<TickerId>> {
    let conn = store.conn();
    let mut stmt = conn.prepare(&format!(
        "INSERT INTO {} (ticker) VALUES (?1)",
        store.tables().tickers
    ))?;

    let mut ids = Vec::with_capacity(symbols.len());
    for symbol in symbols {
        stmt.execute([symbol])?;
        let id = conn.last_insert_rowid();
        log::debug!("Inserted ticker {} with id {}", symbol, id);
        ids.push(id);
    }

    Ok(ids)
}

/// Multi-row `INSERT` builder for the price table
#[derive(Debug, Clone)]
pub struct PriceInsert {
    table: String,
    records: Vec<NewPricePoint>,
}

impl PriceInsert {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            records: Vec::new(),
        }
    }

    /// Queue one record
    pub fn values(&mut self, record: NewPricePoint) -> &mut Self {
        self.records.push(record);
        self
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// SQL text and positional parameters for all queued records
    pub fn compile(&self) -> (String, Vec<Value>) {
        let groups = vec!["(?, ?, ?, ?)"; self.records.len()].join(", ");
        let sql = format!(
            "INSERT INTO {} (ticker_id, date, time, price) VALUES {}",
            self.table, groups
        );

        let mut params = Vec::with_capacity(self.records.len() * PARAMS_PER_RECORD);
        for record in &self.records {
            params.push(Value::Integer(record.ticker_id));
            params.push(Value::Text(record.date.clone()));
            params.push(Value::Text(record.time.clone()));
            params.push(record.price.map(Value::Real).unwrap_or(Value::Null));
        }

        (sql, params)
    }

    /// Run the compiled statement, returning the number of rows inserted
    pub fn execute(&self, store: &Store) -> Result<usize> {
        if self.is_empty() {
            return Ok(0);
        }
        let (sql, params) = self.compile();
        Ok(store.conn().execute(&sql, params_from_iter(params.iter()))?)
    }
}

/// Pair every price cell with the ticker id at the same column position
pub fn price_records(rows: &[SeedRow], ticker_ids: &[TickerId]) -> Result<Vec<NewPricePoint>> {
    let mut records = Vec::new();
    for row in rows {
        for (i, cell) in row.prices.iter().enumerate() {
            let ticker_id = *ticker_ids.get(i).ok_or_else(|| {
                ExchangeError::InvalidSeed(format!(
                    "Price column {} on {} {} has no matching ticker",
                    i, row.date, row.time
                ))
            })?;

            records.push(NewPricePoint {
                ticker_id,
                date: row.date.clone(),
                time: row.time.clone(),
                price: clean_price(cell)?,
            });
        }
    }
    Ok(records)
}

/// Insert every price of every data row.
///
/// All records go into one statement unless that would exceed
/// [`MAX_RECORDS_PER_STATEMENT`]. Statements are not wrapped in a transaction.
pub fn insert_prices(store: &Store, rows: &[SeedRow], ticker_ids: &[TickerId]) -> Result<usize> {
    let records = price_records(rows, ticker_ids)?;
    let mut inserted = 0;

    for chunk in records.chunks(MAX_RECORDS_PER_STATEMENT) {
        let mut query = PriceInsert::new(store.tables().prices.clone());
        for record in chunk {
            query.values(record.clone());
        }
        inserted += query.execute(store)?;
    }

    log::debug!("Inserted {} price row(s)", inserted);
    Ok(inserted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema;
    use crate::store::TableNames;

    fn seeded_store() -> Store {
        let store = Store::open_in_memory(TableNames::default()).unwrap();
        schema::create_tables(&store).unwrap();
        store
    }

    fn row(date: &str, time: &str, prices: &[&str]) -> SeedRow {
        SeedRow {
            date: date.to_string(),
            time: time.to_string(),
            prices: prices.iter().map(|p| p.to_string()).collect(),
        }
    }

    #[test]
    fn test_insert_tickers_keeps_order() {
        let store = seeded_store();
        let symbols = vec!["ZZZ".to_string(), "AAA".to_string(), "MMM".to_string()];
        let ids = insert_tickers(&store, &symbols).unwrap();
        assert_eq!(ids.len(), 3);

        for (symbol, id) in symbols.iter().zip(&ids) {
            let stored: String = store
                .conn()
                .query_row(
                    "SELECT ticker FROM fool_exchange_tickers WHERE ticker_id = ?1",
                    [id],
                    |r| r.get(0),
                )
                .unwrap();
            assert_eq!(&stored, symbol);
        }
    }

    #[test]
    fn test_duplicate_ticker_fails() {
        let store = seeded_store();
        let result = insert_tickers(&store, &["AAA".to_string(), "AAA".to_string()]);
        assert!(matches!(result, Err(ExchangeError::Database(_))));
    }

    #[test]
    fn test_compile_single_statement() {
        let mut query = PriceInsert::new("prices");
        for i in 0..3 {
            query.values(NewPricePoint {
                ticker_id: i,
                date: "20200101".to_string(),
                time: "0900".to_string(),
                price: if i == 2 { None } else { Some(1.5) },
            });
        }

        let (sql, params) = query.compile();
        assert_eq!(
            sql,
            "INSERT INTO prices (ticker_id, date, time, price) VALUES (?, ?, ?, ?), (?, ?, ?, ?), (?, ?, ?, ?)"
        );
        assert_eq!(params.len(), 12);
        assert_eq!(params[4], Value::Integer(1));
        assert_eq!(params[7], Value::Real(1.5));
        assert_eq!(params[11], Value::Null);
    }

    #[test]
    fn test_price_records_align_by_position() {
        let records = price_records(&[row("20200101", "0900", &["$1,000.50", "2,000"])], &[7, 9]).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].ticker_id, 7);
        assert_eq!(records[0].price, Some(1000.50));
        assert_eq!(records[1].ticker_id, 9);
        assert_eq!(records[1].price, Some(2000.0));
    }

    #[test]
    fn test_price_records_without_ticker() {
        let result = price_records(&[row("20200101", "0900", &["1", "2"])], &[7]);
        assert!(matches!(result, Err(ExchangeError::InvalidSeed(_))));
    }

    #[test]
    fn test_insert_prices() {
        let store = seeded_store();
        let ids = insert_tickers(&store, &["AAA".to_string(), "BBB".to_string()]).unwrap();
        let rows = vec![
            row("20200101", "0900", &["1", "2"]),
            row("20200101", "1000", &["3", ""]),
        ];

        assert_eq!(insert_prices(&store, &rows, &ids).unwrap(), 4);
        assert_eq!(store.count_rows("fool_exchange_prices").unwrap(), 4);

        let nulls: i64 = store
            .conn()
            .query_row(
                "SELECT COUNT(*) FROM fool_exchange_prices WHERE price IS NULL",
                [],
                |r| r.get(0),
            )
            .unwrap();
        assert_eq!(nulls, 1);
    }

    #[test]
    fn test_insert_no_prices() {
        let store = seeded_store();
        assert_eq!(insert_prices(&store, &[], &[]).unwrap(), 0);
        assert_eq!(PriceInsert::new("x").execute(&store).unwrap(), 0);
    }

    #[test]
    fn test_insert_prices_splits_large_batches() {
        let store = seeded_store();
        let ids = insert_tickers(&store, &["AAA".to_string()]).unwrap();
        let rows: Vec<SeedRow> = (0..MAX_RECORDS_PER_STATEMENT + 5)
            .map(|i| row("20200101", &format!("{:08}", i), &["1"]))
            .collect();

        assert_eq!(insert_prices(&store, &rows, &ids).unwrap(), rows.len());
        assert_eq!(store.count_rows("fool_exchange_prices").unwrap(), rows.len());
    }
}
