//! Command-line interface definitions.
//!
//! Global options can also come from environment variables.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Command-line arguments for the headline harvester.
///
/// # Examples
///
/// ```sh
/// # Create tables and load the dictionary reference copy
/// headline_harvest init
///
/// # Collect headlines for every configured instrument
/// TWITTER_BEARER_TOKEN=... headline_harvest collect
///
/// # Only Apple and Microsoft, into a different database
/// headline_harvest -d /tmp/stock.db collect --only AAPL --only MSFT
///
/// # Load a price history export
/// headline_harvest load-ticks --stock AAPL --csv data/AAPL.csv
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Instruments, endpoints, and lexicons
    #[arg(short, long, env = "HARVEST_CONFIG", default_value = "config/instruments.yaml")]
    pub config: PathBuf,

    /// SQLite database file (overrides the config file)
    #[arg(short, long, env = "HARVEST_DATABASE")]
    pub database: Option<PathBuf>,

    /// App-only bearer token for Twitter search
    #[arg(long, env = "TWITTER_BEARER_TOKEN", hide_env_values = true)]
    pub twitter_bearer_token: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Create tables and load the dictionary reference table
    Init {
        /// Dictionary file to load
        #[arg(long, default_value = "config/dictionary.yaml")]
        dictionary: PathBuf,
    },

    /// Fetch, clean, and store headlines
    Collect {
        /// Restrict the run to these symbols (repeatable)
        #[arg(long = "only")]
        only: Vec<String>,
    },

    /// Load a daily price CSV into the ticks table
    LoadTicks {
        /// Symbol the prices belong to
        #[arg(long)]
        stock: String,

        /// CSV export with a header row
        #[arg(long)]
        csv: PathBuf,
    },

    /// Rewrite stored headline content matching a LIKE pattern
    ReplaceAll {
        #[arg(long)]
        stock: String,

        /// SQL LIKE pattern; its text without `%` is what gets replaced
        #[arg(long)]
        pattern: String,

        #[arg(long)]
        replacement: String,

        /// Write the changes instead of only printing them
        #[arg(long)]
        commit: bool,
    },
}
