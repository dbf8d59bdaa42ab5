//! Snapshot query: every stored price plus a rate per date

use crate::error::Result;
use crate::fx::{RateCache, RateSource, RateStore};
use crate::store::Store;
use crate::types::{PricePoint, PriceRow, Snapshot, Ticker};
use std::collections::{BTreeMap, BTreeSet};

/// Every stored ticker in id order
pub fn fetch_tickers(store: &Store) -> Result<Vec<Ticker>> {
    let mut stmt = store.conn().prepare(&format!(
        "SELECT ticker_id, ticker FROM {} ORDER BY ticker_id",
        store.tables().tickers
    ))?;

    let tickers = stmt
        .query_map([], |row| {
            Ok(Ticker {
                id: row.get(0)?,
                symbol: row.get(1)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(tickers)
}

/// Raw price rows for one ticker, ordered by date then time
pub fn fetch_price_points(store: &Store, ticker_id: i64) -> Result<Vec<PricePoint>> {
    let mut stmt = store.conn().prepare(&format!(
        "SELECT price_id, ticker_id, date, time, price FROM {}
         WHERE ticker_id = ?1
         ORDER BY date, time",
        store.tables().prices
    ))?;

    let points = stmt
        .query_map([ticker_id], |row| {
            Ok(PricePoint {
                id: row.get(0)?,
                ticker_id: row.get(1)?,
                date: row.get(2)?,
                time: row.get(3)?,
                price: row.get(4)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(points)
}

/// All price rows joined to their symbol, ordered by symbol, date, time.
///
/// Ordering is plain string comparison on the stored values.
pub fn fetch_prices(store: &Store) -> Result<Vec<PriceRow>> {
    let tables = store.tables();
    let mut stmt = store.conn().prepare(&format!(
        "SELECT t.ticker, p.date, p.time, p.price
         FROM {prices} AS p
         JOIN {tickers} AS t ON p.ticker_id = t.ticker_id
         ORDER BY t.ticker, p.date, p.time",
        prices = tables.prices,
        tickers = tables.tickers,
    ))?;

    let rows = stmt
        .query_map([], |row| {
            Ok(PriceRow {
                symbol: row.get(0)?,
                date: row.get(1)?,
                time: row.get(2)?,
                price: row.get(3)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}

/// Distinct dates present in `rows`
pub fn distinct_dates(rows: &[PriceRow]) -> BTreeSet<String> {
    rows.iter().map(|row| row.date.clone()).collect()
}

/// Reads the price table and pairs it with cached rates
#[derive(Debug)]
pub struct ExchangeQueryService<'a, S, C> {
    store: &'a Store,
    rates: &'a RateCache<S, C>,
}

impl<'a, S: RateSource, C: RateStore> ExchangeQueryService<'a, S, C> {
    pub fn new(store: &'a Store, rates: &'a RateCache<S, C>) -> Self {
        Self { store, rates }
    }

    /// Full price list and one rate lookup per distinct date.
    ///
    /// Dates whose rate cannot be fetched map to `None`; only store errors
    /// fail the snapshot.
    pub async fn snapshot(&self) -> Result<Snapshot> {
        let prices = fetch_prices(self.store)?;
        let dates = distinct_dates(&prices);
        log::debug!(
            "Snapshot has {} price(s) across {} date(s)",
            prices.len(),
            dates.len()
        );

        let mut rates = BTreeMap::new();
        for date in dates {
            let rate = self.rates.get_rate(&date).await;
            rates.insert(date, rate);
        }

        Ok(Snapshot { prices, rates })
    }
}
