//! Per-instrument collection: run each source adapter in turn, clean what it
//! returned with the instrument's lexicon, and store the batch.
//!
//! Adapters run one at a time. Each batch is committed before the next
//! adapter starts, so a later failure never loses earlier work. A failing
//! adapter contributes nothing for this instrument and the run moves on.

use crate::clean::{Lexicon, clean_headline};
use crate::config::{HarvestConfig, Instrument};
use crate::error::{HarvestError, Result};
use crate::models::{DatedHeadlines, Headline, Source, date_key};
use crate::scrapers::{reddit, reuters, seekingalpha, twitter};
use crate::store::Store;
use chrono::NaiveDate;
use reqwest::Client;
use tracing::{debug, error, info, instrument};

/// Order in which sources are visited for each instrument.
const SOURCES: [Source; 4] = [
    Source::Reddit,
    Source::Reuters,
    Source::Twitter,
    Source::SeekingAlpha,
];

/// Turn one adapter's output into storable rows.
///
/// Headlines that clean down to nothing are dropped.
pub fn clean_batch(
    stock: &str,
    source: Source,
    raw: &DatedHeadlines,
    lexicon: &Lexicon,
) -> Vec<Headline> {
    let mut rows = Vec::new();
    for (date, headlines) in raw {
        for headline in headlines {
            let content = clean_headline(headline, lexicon);
            if content.is_empty() {
                debug!(%stock, %source, raw = %headline, "Headline cleaned to nothing");
                continue;
            }
            rows.push(Headline {
                stock: stock.to_string(),
                date: date_key(*date),
                source: source.as_str().to_string(),
                content,
                raw_content: headline.clone(),
                sentiment_label: None,
            });
        }
    }
    rows
}

/// Drives the adapters for one instrument at a time.
pub struct Harvester<'a> {
    client: &'a Client,
    config: &'a HarvestConfig,
    twitter_token: Option<&'a str>,
    today: NaiveDate,
}

impl<'a> Harvester<'a> {
    /// `today` anchors the Reuters walk and SeekingAlpha's relative dates.
    pub fn new(
        client: &'a Client,
        config: &'a HarvestConfig,
        twitter_token: Option<&'a str>,
        today: NaiveDate,
    ) -> Self {
        Self {
            client,
            config,
            twitter_token,
            today,
        }
    }

    /// Run one adapter. `None` when the instrument has no query for `source`.
    async fn fetch(&self, instrument: &Instrument, source: Source) -> Option<Result<DatedHeadlines>> {
        let endpoints = &self.config.endpoints;
        match source {
            Source::Reddit => {
                let query = instrument.reddit.as_ref()?;
                Some(reddit::fetch_headlines(self.client, &endpoints.reddit, query).await)
            }
            Source::Reuters => {
                let query = instrument.reuters.as_ref()?;
                Some(reuters::fetch_headlines(self.client, &endpoints.reuters, query, self.today).await)
            }
            Source::Twitter => {
                let query = instrument.twitter.as_ref()?;
                let Some(token) = self.twitter_token else {
                    return Some(Err(HarvestError::MissingTwitterToken));
                };
                Some(twitter::fetch_headlines(self.client, &endpoints.twitter, token, query).await)
            }
            Source::SeekingAlpha => {
                let query = instrument.seekingalpha.as_ref()?;
                Some(
                    seekingalpha::fetch_headlines(self.client, &endpoints.seekingalpha, query, self.today)
                        .await,
                )
            }
        }
    }

    /// Collect, clean, and store every configured source for `instrument`.
    ///
    /// Returns the number of new rows. Fails only when the instrument has no
    /// lexicon or the store itself errors.
    #[instrument(level = "info", skip_all, fields(stock = %instrument.symbol))]
    pub async fn run_instrument(&self, store: &Store, instrument: &Instrument) -> Result<u64> {
        let lexicon = self.config.lexicon(&instrument.symbol)?;
        let mut written = 0;

        for source in SOURCES {
            let Some(fetched) = self.fetch(instrument, source).await else {
                debug!(%source, "Source not configured");
                continue;
            };
            let raw = match fetched {
                Ok(raw) => raw,
                Err(e) => {
                    error!(%source, error = %e, "Adapter aborted; no headlines from this source");
                    continue;
                }
            };

            let rows = clean_batch(&instrument.symbol, source, &raw, lexicon);
            let inserted = store.insert_headlines(&rows).await?;
            info!(%source, collected = rows.len(), inserted, "Stored headlines");
            written += inserted;
        }

        Ok(written)
    }
}
