//! # Headline Harvest
//!
//! Collects financial-market headlines from Reddit, Reuters, Twitter/X, and
//! SeekingAlpha, normalizes their dates and text, and stores them next to
//! daily price records for a downstream sentiment model.
//!
//! ## Usage
//!
//! ```sh
//! headline_harvest init
//! headline_harvest collect
//! headline_harvest load-ticks --stock AAPL --csv data/AAPL.csv
//! ```
//!
//! ## Architecture
//!
//! For each tracked instrument, one source at a time:
//! 1. **Fetching**: the source adapter returns raw headlines keyed by date
//! 2. **Cleaning**: text is folded and generalized with the stock's lexicon
//! 3. **Storing**: rows are insert-or-ignored into SQLite and committed

use chrono::Local;
use clap::Parser;
use std::error::Error;
use tracing::{debug, error, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod clean;
mod cli;
mod config;
mod dates;
mod error;
mod models;
mod pipeline;
mod scrapers;
mod store;
mod ticks;
mod utils;

use cli::{Cli, Command};
use config::HarvestConfig;
use pipeline::Harvester;
use store::{Store, Table};

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    let args = Cli::parse();
    debug!(config = %args.config.display(), command = ?args.command, "Parsed CLI arguments");

    let config = HarvestConfig::load(&args.config).await?;
    let database = args.database.clone().unwrap_or_else(|| config.database.clone());
    info!(database = %database.display(), "Opening store");
    let store = Store::open(&database).await?;
    store.create_tables().await?;

    match &args.command {
        Command::Init { dictionary } => {
            let entries = config::load_dictionary(dictionary).await?;
            store.insert_dictionary(&entries).await?;
            let stored = store.count(Table::Dictionary).await?;
            info!(stored, "Dictionary ready");
        }
        Command::Collect { only } => {
            collect(&args, &config, &store, only).await?;
        }
        Command::LoadTicks { stock, csv } => {
            ticks::load_tick_csv(&store, stock, csv).await?;
            let stored = store.count(Table::Ticks).await?;
            info!(stored, "Ticks ready");
        }
        Command::ReplaceAll {
            stock,
            pattern,
            replacement,
            commit,
        } => {
            let changes = store.replace_all(stock, pattern, replacement, *commit).await?;
            for (before, after) in &changes {
                println!("{before}\n{after}\n");
            }
        }
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );
    Ok(())
}

/// Run the harvester over every selected instrument, one after another.
///
/// An instrument that fails is logged and skipped.
async fn collect(
    args: &Cli,
    config: &HarvestConfig,
    store: &Store,
    only: &[String],
) -> Result<(), Box<dyn Error>> {
    let client = scrapers::build_client()?;
    let today = Local::now().date_naive();
    let harvester = Harvester::new(&client, config, args.twitter_bearer_token.as_deref(), today);

    let selected = config
        .instruments
        .iter()
        .filter(|i| only.is_empty() || only.iter().any(|s| s.eq_ignore_ascii_case(&i.symbol)));

    let mut total = 0;
    let mut failed = 0;
    for instrument in selected {
        info!(stock = %instrument.symbol, "Collecting headlines");
        match harvester.run_instrument(store, instrument).await {
            Ok(written) => total += written,
            Err(e) => {
                failed += 1;
                error!(stock = %instrument.symbol, error = %e, "Instrument failed; continuing");
            }
        }
    }

    let stored = store.count(Table::Headlines).await?;
    info!(inserted = total, failed, stored, "Collection finished");
    Ok(())
}
