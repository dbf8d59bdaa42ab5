//! Property tests for seed ingestion and snapshot ordering

mod common;

use common::write_seed;
use fool_exchange::lifecycle::{Activation, Activator};
use fool_exchange::query::fetch_prices;
use fool_exchange::store::{Store, TableNames};
use proptest::prelude::*;
use std::collections::{BTreeSet, HashMap};

/// `1234567` cents → `"$12,345.67"`
fn us_format(cents: u64) -> String {
    let dollars = (cents / 100).to_string();
    let mut grouped = String::new();
    for (i, ch) in dollars.chars().enumerate() {
        if i > 0 && (dollars.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("${}.{:02}", grouped, cents % 100)
}

fn csv_cell(cell: &str) -> String {
    format!("\"{}\"", cell)
}

fn seed_strategy() -> impl Strategy<Value = (Vec<String>, Vec<(String, String, Vec<u64>)>)> {
    (1usize..6).prop_flat_map(|tickers| {
        let symbols = prop::collection::btree_set("[A-Z]{1,8}", tickers)
            .prop_map(|set| set.into_iter().collect::<Vec<_>>())
            .prop_shuffle();
        let rows = prop::collection::vec(
            (
                "20[0-9]{2}0[1-9][0-2][0-9]",
                "[01][0-9]:[0-5][0-9]:00",
                prop::collection::vec(0u64..100_000_000, tickers),
            ),
            0..8,
        );
        (symbols, rows)
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_counts_and_alignment((symbols, rows) in seed_strategy()) {
        let mut csv = String::from("Date,Time");
        for symbol in &symbols {
            csv.push_str(&format!(",{} Price USD", symbol));
        }
        csv.push('\n');
        for (date, time, prices) in &rows {
            csv.push_str(&format!("{},{}", date, time));
            for cents in prices {
                csv.push(',');
                csv.push_str(&csv_cell(&us_format(*cents)));
            }
            csv.push('\n');
        }

        let store = Store::open_in_memory(TableNames::default()).unwrap();
        let seed = write_seed(&csv);
        let outcome = Activator::new(&store).activate(seed.path()).unwrap();

        prop_assert_eq!(
            outcome,
            Activation::Seeded { tickers: symbols.len(), prices: rows.len() * symbols.len() }
        );

        // Every stored price matches the cell under its own header column
        let mut expected: HashMap<(String, String, String), Vec<f64>> = HashMap::new();
        for (date, time, prices) in &rows {
            for (symbol, cents) in symbols.iter().zip(prices) {
                expected
                    .entry((symbol.clone(), date.clone(), time.clone()))
                    .or_default()
                    .push(*cents as f64 / 100.0);
            }
        }

        let stored = fetch_prices(&store).unwrap();
        prop_assert_eq!(stored.len(), rows.len() * symbols.len());
        for row in &stored {
            let key = (row.symbol.clone(), row.date.clone(), row.time.clone());
            let candidates = expected.get(&key).expect("row without seed cell");
            let price = row.price.expect("price stored as NULL");
            prop_assert!(candidates.iter().any(|c| (c - price).abs() < 1e-6));
        }
    }

    #[test]
    fn prop_snapshot_sorted(
        entries in prop::collection::vec(
            ("[A-Z]{1,4}", "[0-9]{8}", "[0-9]{2}:[0-9]{2}:[0-9]{2}"),
            0..40,
        )
    ) {
        let symbols: BTreeSet<String> = entries.iter().map(|e| e.0.clone()).collect();
        let store = Store::open_in_memory(TableNames::default()).unwrap();
        fool_exchange::schema::create_tables(&store).unwrap();
        let ids = fool_exchange::ingest::insert_tickers(
            &store,
            &symbols.iter().cloned().collect::<Vec<_>>(),
        )
        .unwrap();
        let id_of: HashMap<&String, i64> = symbols.iter().zip(ids).collect();

        let mut insert = fool_exchange::ingest::PriceInsert::new("fool_exchange_prices");
        for (symbol, date, time) in &entries {
            insert.values(fool_exchange::types::NewPricePoint {
                ticker_id: id_of[symbol],
                date: date.clone(),
                time: time.clone(),
                price: Some(1.0),
            });
        }
        insert.execute(&store).unwrap();

        let rows = fetch_prices(&store).unwrap();
        prop_assert_eq!(rows.len(), entries.len());
        for pair in rows.windows(2) {
            prop_assert!(pair[0].sort_key() <= pair[1].sort_key());
        }
    }
}

#[test]
fn test_us_format_helper() {
    assert_eq!(us_format(100_050), "$1,000.50");
    assert_eq!(us_format(5), "$0.05");
    assert_eq!(us_format(123_456_789), "$1,234,567.89");
}
