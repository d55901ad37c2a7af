//! Data models for collected headlines, price ticks, and lexicon entries.
//!
//! - [`Tick`]: one instrument's daily OHLCV record, kept as the text fields
//!   the CSV loader produced
//! - [`Headline`]: one cleaned news/social item ready for the `headlines` table
//! - [`DictionaryEntry`]: one row of the persisted lexicon reference copy
//! - [`DatedHeadlines`]: what every source adapter returns

use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::fmt;

/// Raw headline text grouped by canonical publication date.
///
/// Within each date, headlines keep the order in which the source produced them.
pub type DatedHeadlines = BTreeMap<NaiveDate, Vec<String>>;

/// Append a headline under its date key.
pub fn push_headline(map: &mut DatedHeadlines, date: NaiveDate, headline: String) {
    map.entry(date).or_default().push(headline);
}

/// Format a date as the canonical `YYYY-MM-DD` key.
pub fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// The external origins headlines are collected from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Source {
    Reddit,
    Reuters,
    Twitter,
    SeekingAlpha,
}

impl Source {
    /// Name stored in the `headlines.source` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Reddit => "reddit",
            Source::Reuters => "reuters",
            Source::Twitter => "twitter",
            Source::SeekingAlpha => "seekingalpha",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One day of prices for one instrument.
///
/// Fields stay textual: SQLite's column affinity converts numeric text, and
/// the loader's `null` sentinel survives so [`crate::store::Store::prune_invalid_ticks`]
/// can find it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tick {
    pub stock: String,
    pub date: String,
    pub open: String,
    pub high: String,
    pub low: String,
    pub close: String,
    pub adj_close: String,
    pub volume: String,
}

/// A cleaned headline ready for storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Headline {
    /// Instrument the headline was collected for.
    pub stock: String,
    /// Canonical `YYYY-MM-DD` publication date.
    pub date: String,
    /// Source name, see [`Source::as_str`].
    pub source: String,
    /// Cleaned, lexicon-normalized text.
    pub content: String,
    /// Text as the adapter produced it.
    pub raw_content: String,
    /// Set later by the labeling process; always `None` on insert.
    pub sentiment_label: Option<i64>,
}

/// One normalization rule persisted to the `dictionary` table.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DictionaryEntry {
    pub word: String,
    /// Stock symbol, or [`DictionaryEntry::GLOBAL`] for unscoped words.
    pub stock: String,
    pub replacement: String,
}

impl DictionaryEntry {
    /// Stock value used for entries that apply to every instrument.
    pub const GLOBAL: &'static str = "none";

    /// A bare word: unscoped and mapping to itself.
    pub fn word(word: &str) -> Self {
        Self {
            word: word.to_string(),
            stock: Self::GLOBAL.to_string(),
            replacement: word.to_string(),
        }
    }
}
