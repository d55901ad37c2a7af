//! Reuters company-news pages, walked backwards one day per request.
//!
//! # URL Pattern
//!
//! `{base}/finance/stocks/company-news/{RIC}?date=MMDDYYYY`. Every headline on
//! a page is dated with the day that was requested.

use super::send;
use crate::config::ReutersQuery;
use crate::error::Result;
use crate::models::{DatedHeadlines, push_headline};
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use scraper::{Html, Selector};
use std::collections::HashSet;
use tracing::{debug, info, instrument};
use url::Url;

/// All-caps wire-service tag such as `BRIEF-` or `UPDATE 2-`.
static WIRE_PREFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z]+[A-Z\d\s]*-").unwrap());

/// Company news page for one day, `?date=MMDDYYYY`.
fn page_url(base_url: &str, ric: &str, date: NaiveDate) -> Result<Url> {
    let mut url = Url::parse(&format!(
        "{}/finance/stocks/company-news/{}",
        base_url.trim_end_matches('/'),
        ric
    ))?;
    url.query_pairs_mut()
        .append_pair("date", &date.format("%m%d%Y").to_string());
    Ok(url)
}

/// Remove zero-width characters and a leading wire-service tag.
pub fn strip_wire_prefix(headline: &str) -> String {
    let visible = headline.replace(['\u{200d}', '\u{200b}'], "");
    WIRE_PREFIX.replace(&visible, "").into_owned()
}

/// Headline link texts (`<h2><a>…</a></h2>`) in page order.
pub fn extract_headlines(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("h2 > a").unwrap();
    document
        .select(&selector)
        .map(|a| a.text().collect::<String>().trim().to_string())
        .filter(|text| !text.is_empty())
        .collect()
}

/// Fetch `query.pages` days of headlines ending at `start`.
///
/// A headline already seen on a later day is not repeated on an earlier one.
/// Any failed page aborts the whole walk.
#[instrument(level = "info", skip_all, fields(ric = %query.ric, pages = query.pages))]
pub async fn fetch_headlines(
    client: &Client,
    base_url: &str,
    query: &ReutersQuery,
    start: NaiveDate,
) -> Result<DatedHeadlines> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut articles = DatedHeadlines::new();
    let mut date = start;

    for _ in 0..query.pages {
        let url = page_url(base_url, &query.ric, date)?;
        let html = send(client.get(url)).await?.text().await?;

        let mut kept = 0;
        for raw in extract_headlines(&html) {
            let headline = strip_wire_prefix(&raw);
            if seen.insert(headline.clone()) {
                push_headline(&mut articles, date, headline);
                kept += 1;
            }
        }
        debug!(%date, kept, "Reuters page done");

        match date.pred_opt() {
            Some(previous) => date = previous,
            None => break,
        }
    }

    info!(count = seen.len(), "Collected Reuters headlines");
    Ok(articles)
}
