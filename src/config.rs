//! YAML configuration: tracked instruments, source parameters, lexicons, and
//! the dictionary reference table.
//!
//! See `config/instruments.yaml` and `config/dictionary.yaml` for the bundled
//! data.

use crate::error::{HarvestError, Result};
use crate::models::DictionaryEntry;
use itertools::Itertools;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

/// Top-level contents of the instruments file.
#[derive(Debug, Deserialize)]
pub struct HarvestConfig {
    /// SQLite database file.
    #[serde(default = "default_database")]
    pub database: PathBuf,
    #[serde(default)]
    pub endpoints: Endpoints,
    pub instruments: Vec<Instrument>,
    /// Stock symbol to ordered `(phrase, token)` pairs.
    #[serde(default)]
    pub lexicons: BTreeMap<String, Vec<(String, String)>>,
}

fn default_database() -> PathBuf {
    PathBuf::from("data/stock.db")
}

/// Base URLs of each origin. Overridable so tests can point at a mock server.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    pub reddit: String,
    pub reuters: String,
    pub twitter: String,
    pub seekingalpha: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            reddit: "https://www.reddit.com".to_string(),
            reuters: "http://www.reuters.com".to_string(),
            twitter: "https://api.twitter.com".to_string(),
            seekingalpha: "https://seekingalpha.com".to_string(),
        }
    }
}

/// One tracked stock and the queries run for it. A missing block skips that source.
#[derive(Debug, Clone, Deserialize)]
pub struct Instrument {
    pub symbol: String,
    pub reddit: Option<RedditQuery>,
    pub reuters: Option<ReutersQuery>,
    pub twitter: Option<TwitterQuery>,
    pub seekingalpha: Option<SeekingAlphaQuery>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RedditQuery {
    pub subreddits: Vec<String>,
    pub terms: Vec<String>,
    /// Per-search result cap; Reddit's own default when absent.
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReutersQuery {
    /// Reuters instrument code, e.g. `AAPL.O`.
    pub ric: String,
    /// Days to walk back from today.
    #[serde(default = "default_reuters_pages")]
    pub pages: u32,
}

fn default_reuters_pages() -> u32 {
    80
}

#[derive(Debug, Clone, Deserialize)]
pub struct TwitterQuery {
    pub queries: Vec<String>,
    #[serde(default = "default_twitter_limit")]
    pub limit: u32,
}

fn default_twitter_limit() -> u32 {
    100
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeekingAlphaQuery {
    pub symbol: String,
    #[serde(default = "default_seekingalpha_pages")]
    pub pages: u32,
}

fn default_seekingalpha_pages() -> u32 {
    500
}

impl HarvestConfig {
    /// Parse the YAML text of an instruments file.
    pub fn from_yaml(text: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Read and parse an instruments file.
    #[instrument(level = "info", skip_all, fields(path = %path.display()))]
    pub async fn load(path: &Path) -> Result<Self> {
        let text = tokio::fs::read_to_string(path).await?;
        let config = Self::from_yaml(&text)?;
        info!(
            instruments = config.instruments.len(),
            lexicons = config.lexicons.len(),
            "Loaded configuration"
        );
        Ok(config)
    }

    /// Lexicon for `stock`. Cleaning cannot proceed without one.
    pub fn lexicon(&self, stock: &str) -> Result<&[(String, String)]> {
        self.lexicons
            .get(stock)
            .map(Vec::as_slice)
            .ok_or_else(|| HarvestError::MissingLexicon(stock.to_string()))
    }
}

/// A dictionary file item: a bare word or a `[word, stock, replacement]` triple.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum DictionaryItem {
    Word(String),
    Scoped(String, String, String),
}

impl From<DictionaryItem> for DictionaryEntry {
    fn from(item: DictionaryItem) -> Self {
        match item {
            DictionaryItem::Word(word) => DictionaryEntry::word(&word),
            DictionaryItem::Scoped(word, stock, replacement) => DictionaryEntry {
                word,
                stock,
                replacement,
            },
        }
    }
}

/// Parse a dictionary file, dropping repeated triples while keeping file order.
pub fn parse_dictionary(text: &str) -> Result<Vec<DictionaryEntry>> {
    let items: Vec<DictionaryItem> = serde_yaml::from_str(text)?;
    Ok(items
        .into_iter()
        .map(DictionaryEntry::from)
        .unique()
        .collect())
}

/// Read and parse a dictionary file.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn load_dictionary(path: &Path) -> Result<Vec<DictionaryEntry>> {
    let text = tokio::fs::read_to_string(path).await?;
    let entries = parse_dictionary(&text)?;
    info!(count = entries.len(), "Loaded dictionary");
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    const BUNDLED_INSTRUMENTS: &str = include_str!("../config/instruments.yaml");
    const BUNDLED_DICTIONARY: &str = include_str!("../config/dictionary.yaml");

    #[test]
    fn test_bundled_instruments_parse() {
        let config = HarvestConfig::from_yaml(BUNDLED_INSTRUMENTS).unwrap();
        assert_eq!(config.instruments.len(), 5);
        for instrument in &config.instruments {
            assert!(config.lexicon(&instrument.symbol).is_ok(), "{}", instrument.symbol);
        }
        let goog = config.lexicon("GOOG").unwrap();
        assert_eq!(goog[0], ("googleplay".to_string(), "**PRODUCT**".to_string()));
        let google = goog.iter().position(|(p, _)| p == "google").unwrap();
        let googleplay = goog.iter().position(|(p, _)| p == "googleplay").unwrap();
        assert!(googleplay < google);
    }

    #[test]
    fn test_defaults_fill_in() {
        let config = HarvestConfig::from_yaml(
            r#"
instruments:
  - symbol: AMD
    reuters:
      ric: AMD.O
    seekingalpha:
      symbol: AMD
"#,
        )
        .unwrap();
        assert_eq!(config.database, PathBuf::from("data/stock.db"));
        assert_eq!(config.endpoints.reddit, "https://www.reddit.com");
        let amd = &config.instruments[0];
        assert_eq!(amd.reuters.as_ref().unwrap().pages, 80);
        assert_eq!(amd.seekingalpha.as_ref().unwrap().pages, 500);
        assert!(amd.reddit.is_none());
        assert!(amd.twitter.is_none());
    }

    #[test]
    fn test_missing_lexicon_is_an_error() {
        let config = HarvestConfig::from_yaml("instruments: []").unwrap();
        assert!(matches!(
            config.lexicon("TSLA"),
            Err(HarvestError::MissingLexicon(s)) if s == "TSLA"
        ));
    }

    #[test]
    fn test_dictionary_items() {
        let entries = parse_dictionary(
            r#"
- "**COMPANY**"
- ["bing", "MSFT", "**PRODUCT**"]
- "wsj"
- "wsj"
"#,
        )
        .unwrap();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0], DictionaryEntry::word("**COMPANY**"));
        assert_eq!(entries[1].stock, "MSFT");
        assert_eq!(entries[1].replacement, "**PRODUCT**");
    }

    #[test]
    fn test_bundled_dictionary_parses() {
        let entries = parse_dictionary(BUNDLED_DICTIONARY).unwrap();
        assert!(entries.len() > 500);
        assert!(entries.contains(&DictionaryEntry {
            word: "tim cook".to_string(),
            stock: "AAPL".to_string(),
            replacement: "**MEMBER**".to_string(),
        }));
    }
}
