//! fool-exchange CLI - seed, inspect and serve the exchange data
//!
//! ## Example Usage
//!
//! ```bash
//! # Create and seed the tables
//! fool-exchange activate --seed assets/initial-data.csv
//!
//! # Print the prices + rates JSON
//! fool-exchange snapshot --pretty
//!
//! # Look up one rate
//! fool-exchange rate 20180102
//!
//! # Remove everything
//! fool-exchange uninstall --force
//! ```

use clap::{Parser, Subcommand};
use colored::Colorize;
use fool_exchange::config::{CacheBackend, Config};
use fool_exchange::fx::{FixerRateSource, InMemoryRateStore, RateCache, RateStore, SqliteRateStore};
use fool_exchange::lifecycle::{Activation, Activator, Uninstaller};
use fool_exchange::query::{self, ExchangeQueryService};
use fool_exchange::schema;
use fool_exchange::store::{Store, TableNames};
use std::fs;
use std::path::PathBuf;
use std::process;

type CliResult = Result<(), Box<dyn std::error::Error>>;

/// fool-exchange: historical ticker prices with USD/SGD rates
#[derive(Parser)]
#[command(name = "fool-exchange")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Historical ticker prices with cached USD/SGD rates", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the exchange tables and load the seed file
    Activate {
        /// Seed CSV (defaults to the configured seed_file)
        #[arg(short = 's', long)]
        seed: Option<PathBuf>,
    },

    /// Delete all exchange data and drop the tables
    Uninstall {
        /// Required; the removal cannot be undone
        #[arg(short = 'f', long)]
        force: bool,
    },

    /// Print every price with the rate for its date as JSON
    Snapshot {
        /// Pretty-print the JSON
        #[arg(short = 'p', long)]
        pretty: bool,

        /// Write to a file instead of stdout
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,
    },

    /// Look up the USD/SGD rate for one date
    Rate {
        /// Date as stored in the price table (e.g. 20180102)
        #[arg(value_name = "DATE")]
        date: String,
    },

    /// Show configuration and table counts
    Info,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{} {}", "Error:".red().bold(), e);
            process::exit(1);
        }
    };
    if let Err(e) = config.ensure_dirs() {
        eprintln!(
            "{} Failed to create directories: {}",
            "Error:".red().bold(),
            e
        );
        process::exit(1);
    }

    if cli.verbose {
        println!(
            "{} v{}",
            "fool-exchange".cyan().bold(),
            env!("CARGO_PKG_VERSION")
        );
        println!(
            "Database: {}",
            config.database_path.display().to_string().dimmed()
        );
    }

    let result = match cli.command {
        Commands::Activate { seed } => activate(&config, seed),
        Commands::Uninstall { force } => uninstall(&config, force),
        Commands::Snapshot { pretty, output } => snapshot(&config, pretty, output).await,
        Commands::Rate { date } => rate(&config, &date).await,
        Commands::Info => show_info(&config),
    };

    if let Err(e) = result {
        eprintln!("{} {}", "Error:".red().bold(), e);
        process::exit(1);
    }
}

fn open_store(config: &Config) -> fool_exchange::error::Result<Store> {
    Store::open(
        &config.database_path,
        TableNames::with_prefix(&config.table_prefix),
    )
}

fn rate_cache(
    config: &Config,
) -> fool_exchange::error::Result<RateCache<FixerRateSource, Box<dyn RateStore>>> {
    let source = FixerRateSource::from_config(&config.rates)?;
    let store: Box<dyn RateStore> = match config.rates.cache {
        CacheBackend::Memory => Box::new(InMemoryRateStore::new()),
        CacheBackend::Sqlite => {
            let cache = SqliteRateStore::open(&config.rates.cache_path, &config.table_prefix)?;
            let purged = cache.purge_expired()?;
            if purged > 0 {
                log::debug!("Purged {} expired cached rate(s)", purged);
            }
            Box::new(cache)
        }
    };
    Ok(RateCache::new(source, store).with_ttl(config.cache_ttl()))
}

fn activate(config: &Config, seed: Option<PathBuf>) -> CliResult {
    let seed = seed.unwrap_or_else(|| config.seed_file.clone());
    let store = open_store(config)?;

    println!("{} {}", "Activating from".cyan().bold(), seed.display());
    match Activator::new(&store).activate(&seed)? {
        Activation::AlreadyInstalled => {
            println!(
                "{} Tables already exist; nothing to do.",
                "•".yellow().bold()
            );
        }
        Activation::Seeded { tickers, prices } => {
            println!(
                "{} Seeded {} ticker(s) and {} price(s)",
                "✓".green().bold(),
                tickers,
                prices
            );
        }
    }
    Ok(())
}

fn uninstall(config: &Config, force: bool) -> CliResult {
    if !force {
        return Err("uninstall deletes all exchange data; re-run with --force".into());
    }

    let store = open_store(config)?;
    Uninstaller::new(&store).uninstall()?;
    println!("{} Exchange tables removed", "✓".green().bold());
    Ok(())
}

async fn snapshot(config: &Config, pretty: bool, output: Option<PathBuf>) -> CliResult {
    let store = open_store(config)?;
    if !schema::tables_exist(&store)? {
        return Err("exchange tables not found; run 'activate' first".into());
    }

    let rates = rate_cache(config)?;
    let snapshot = ExchangeQueryService::new(&store, &rates).snapshot().await?;
    let json = if pretty {
        snapshot.to_json_pretty()?
    } else {
        snapshot.to_json()?
    };

    match output {
        Some(path) => {
            fs::write(&path, json)?;
            println!(
                "{} Snapshot saved to: {}",
                "✓".green().bold(),
                path.display()
            );
        }
        None => println!("{}", json),
    }
    Ok(())
}

async fn rate(config: &Config, date: &str) -> CliResult {
    let rates = rate_cache(config)?;
    let pair = rates.pair();
    match rates.fetch_rate(date).await {
        Ok(rate) => println!("{} {} = {}", pair, date.bold(), rate),
        Err(e) => println!("{} {} unavailable: {}", pair, date.bold(), e.to_string().yellow()),
    }
    Ok(())
}

fn show_info(config: &Config) -> CliResult {
    println!("{}", "Configuration".cyan().bold());
    println!("{}", "=============".cyan());
    println!("  Database:    {}", config.database_path.display());
    println!("  Seed file:   {}", config.seed_file.display());
    println!("  Prefix:      {:?}", config.table_prefix);
    println!("  Rate API:    {}", config.rates.base_url);
    println!(
        "  API key:     {}",
        if config.rates.api_key.is_empty() {
            "not set".red().to_string()
        } else {
            "set".green().to_string()
        }
    );
    println!(
        "  Rate cache:  {:?} ({}h)",
        config.rates.cache, config.rates.cache_ttl_hours
    );
    println!();

    let store = open_store(config)?;
    let tables = store.tables().clone();
    println!("{}", "Tables".cyan().bold());
    println!("{}", "======".cyan());
    if schema::tables_exist(&store)? {
        println!(
            "  {}: {} row(s)",
            tables.tickers,
            store.count_rows(&tables.tickers)?
        );
        println!(
            "  {}: {} row(s)",
            tables.prices,
            store.count_rows(&tables.prices)?
        );

        let tickers = query::fetch_tickers(&store)?;
        if !tickers.is_empty() {
            let symbols: Vec<&str> = tickers.iter().map(|t| t.symbol.as_str()).collect();
            println!("  Tickers:     {}", symbols.join(", "));
        }
    } else {
        println!("{}", "  Not installed. Run 'activate' to seed.".dimmed());
    }
    Ok(())
}
