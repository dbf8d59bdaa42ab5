//! Seed file parsing
//!
//! The seed is a loosely structured CSV:
//!
//! ```text
//! Date,Time,AAA Price USD,BBB Price USD
//! 20180102,09:30:00,"$1,000.50","2,000"
//! ```
//!
//! The first row is the header. Its first two cells label the date and time
//! columns and are ignored; every other cell is `"<SYMBOL> <suffix>"`. Data
//! rows carry a date, a time, and then one price per header ticker at the same
//! position.

use crate::error::{DataFileError, ExchangeError, Result};
use crate::types::{Price, Symbol};
use csv::ReaderBuilder;
use std::fs::File;
use std::path::Path;

/// Number of leading date/time columns in every row
pub const LEADING_COLUMNS: usize = 2;

/// Longest symbol the ticker column can hold
pub const MAX_SYMBOL_LEN: usize = 10;

/// Parsed header cell: `"AAPL Price USD"` → symbol `AAPL`, suffix `Price USD`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickerLabel {
    pub symbol: Symbol,
    pub suffix: String,
}

/// Parse one composite header cell.
///
/// The symbol is everything before the first space; a label without a space is
/// all symbol. Empty symbols and symbols longer than [`MAX_SYMBOL_LEN`] are
/// rejected.
pub fn parse_ticker_label(label: &str) -> Result<TickerLabel> {
    let label = label.trim();
    let (symbol, suffix) = match label.split_once(' ') {
        Some((symbol, suffix)) => (symbol, suffix.trim()),
        None => (label, ""),
    };

    if symbol.is_empty() {
        return Err(ExchangeError::InvalidSeed(format!(
            "Header cell {:?} has no ticker symbol",
            label
        )));
    }
    if symbol.chars().count() > MAX_SYMBOL_LEN {
        return Err(ExchangeError::InvalidSeed(format!(
            "Ticker symbol {:?} is longer than {} characters",
            symbol, MAX_SYMBOL_LEN
        )));
    }

    Ok(TickerLabel {
        symbol: symbol.to_string(),
        suffix: suffix.to_string(),
    })
}

/// Strip `$` and `,` and parse what is left as a decimal.
///
/// Only US formatting is understood. An empty cell yields `None`; `NaN` and
/// infinities are rejected.
pub fn clean_price(cell: &str) -> Result<Option<Price>> {
    let cleaned: String = cell.chars().filter(|c| !matches!(c, '$' | ',')).collect();
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return Ok(None);
    }

    let price = cleaned
        .parse::<Price>()
        .map_err(|e| ExchangeError::InvalidSeed(format!("Invalid price {:?}: {}", cell, e)))?;
    if !price.is_finite() {
        return Err(ExchangeError::InvalidSeed(format!(
            "Invalid price {:?}: not a finite number",
            cell
        )));
    }
    Ok(Some(price))
}

/// One data row with the date/time split off
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedRow {
    pub date: String,
    pub time: String,
    /// Raw price cells, positionally aligned with the header tickers
    pub prices: Vec<String>,
}

impl SeedRow {
    /// Split a raw CSV row; `line` is only used for error messages
    pub fn from_fields(fields: Vec<String>, line: usize) -> Result<Self> {
        if fields.len() < LEADING_COLUMNS {
            return Err(ExchangeError::InvalidSeed(format!(
                "Row {} has {} field(s), expected at least a date and a time",
                line,
                fields.len()
            )));
        }

        let mut fields = fields.into_iter();
        let date = fields.next().unwrap_or_default();
        let time = fields.next().unwrap_or_default();
        Ok(Self {
            date,
            time,
            prices: fields.collect(),
        })
    }
}

/// Seed file split into its header tickers and data rows
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedFile {
    pub tickers: Vec<TickerLabel>,
    pub rows: Vec<SeedRow>,
}

impl SeedFile {
    /// Read and split a seed file
    pub fn load(path: &Path) -> Result<Self> {
        let rows = read_rows(path)?;
        Self::from_rows(rows)
    }

    /// Split already-read rows: the first is the header, the rest are data.
    pub fn from_rows(rows: Vec<Vec<String>>) -> Result<Self> {
        let mut rows = rows.into_iter();
        let header = rows
            .next()
            .ok_or_else(|| ExchangeError::InvalidSeed("Seed has no header row".to_string()))?;

        let tickers = header
            .iter()
            .skip(LEADING_COLUMNS)
            .map(|label| parse_ticker_label(label))
            .collect::<Result<Vec<_>>>()?;

        let mut data = Vec::new();
        for (idx, fields) in rows.enumerate() {
            // Header is line 1
            let line = idx + 2;
            let row = SeedRow::from_fields(fields, line)?;
            if row.prices.len() > tickers.len() {
                return Err(ExchangeError::InvalidSeed(format!(
                    "Row {} has {} price(s) but the header names {} ticker(s)",
                    line,
                    row.prices.len(),
                    tickers.len()
                )));
            }
            data.push(row);
        }

        Ok(Self {
            tickers,
            rows: data,
        })
    }

    /// Symbols in header order
    pub fn symbols(&self) -> Vec<Symbol> {
        self.tickers.iter().map(|t| t.symbol.clone()).collect()
    }

    /// Number of price cells across all data rows
    pub fn price_count(&self) -> usize {
        self.rows.iter().map(|r| r.prices.len()).sum()
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

/// Read every CSV record of the seed file as a list of string fields.
///
/// Rows may differ in length and blank lines are skipped.
pub fn read_rows(path: &Path) -> std::result::Result<Vec<Vec<String>>, DataFileError> {
    let file = display_name(path);

    if !path.is_file() {
        return Err(DataFileError::Missing { file });
    }

    let handle = File::open(path).map_err(|e| DataFileError::Unreadable {
        file: file.clone(),
        reason: e.to_string(),
    })?;

    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(handle);

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| DataFileError::Unreadable {
            file: file.clone(),
            reason: e.to_string(),
        })?;
        rows.push(record.iter().map(|field| field.to_string()).collect());
    }

    if rows.is_empty() {
        return Err(DataFileError::Empty { file });
    }

    log::debug!("Read {} row(s) from {}", rows.len(), file);
    Ok(rows)
}
