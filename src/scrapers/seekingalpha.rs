//! SeekingAlpha symbol news, paginated.
//!
//! # URL Pattern
//!
//! Page 1 is `{base}/symbol/{SYM}/news`; page `n` is
//! `{base}/symbol/{SYM}/news/more_news_all?page=n`.
//!
//! The origin stops serving pages unless the cookies it set on the previous
//! response come back with the next request, so the walk threads an explicit
//! [`SessionCookies`] value from page to page. A page that fails is logged
//! and skipped; the walk carries on with the next one.

use super::send;
use crate::config::SeekingAlphaQuery;
use crate::dates;
use crate::error::Result;
use crate::models::{DatedHeadlines, push_headline};
use chrono::NaiveDate;
use reqwest::Client;
use reqwest::header::{COOKIE, HeaderMap, SET_COOKIE};
use scraper::{Html, Selector};
use std::collections::HashSet;
use tracing::{debug, info, instrument, warn};
use url::Url;

/// Name/value pairs the origin set on the most recent successful response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionCookies(Vec<(String, String)>);

impl SessionCookies {
    /// Collect the `Set-Cookie` headers of a response, ignoring attributes.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let pairs = headers
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .filter_map(|cookie| {
                let pair = cookie.split(';').next()?;
                let (name, value) = pair.split_once('=')?;
                let name = name.trim();
                (!name.is_empty()).then(|| (name.to_string(), value.trim().to_string()))
            })
            .collect();
        Self(pairs)
    }

    /// `Cookie` request header value, if there is anything to send.
    pub fn header_value(&self) -> Option<String> {
        if self.0.is_empty() {
            return None;
        }
        Some(
            self.0
                .iter()
                .map(|(name, value)| format!("{name}={value}"))
                .collect::<Vec<_>>()
                .join("; "),
        )
    }
}

/// Listing URL for a 1-based page number.
fn page_url(base_url: &str, symbol: &str, page: u32) -> Result<Url> {
    let base = base_url.trim_end_matches('/');
    if page == 1 {
        return Ok(Url::parse(&format!("{base}/symbol/{symbol}/news"))?);
    }
    let mut url = Url::parse(&format!("{base}/symbol/{symbol}/news/more_news_all"))?;
    url.query_pairs_mut().append_pair("page", &page.to_string());
    Ok(url)
}

/// Pair the n-th headline with the n-th date on a page.
///
/// The listing arrives JSON-escaped, so `\"` is unescaped before parsing.
/// When the two counts differ the shorter list bounds the pairing and a
/// warning is logged. Items whose date cannot be read are dropped.
pub fn extract_items(body: &str, today: NaiveDate) -> Vec<(NaiveDate, String)> {
    let document = Html::parse_document(&body.replace("\\\"", "\""));
    let headline_selector = Selector::parse("a.market_current_title").unwrap();
    let date_selector = Selector::parse("span.date.pad_on_summaries").unwrap();

    let headlines: Vec<String> = document
        .select(&headline_selector)
        .map(|a| a.text().collect::<String>())
        .collect();
    let dates: Vec<String> = document
        .select(&date_selector)
        .map(|span| span.text().collect::<String>())
        .collect();

    if headlines.len() != dates.len() {
        warn!(
            headlines = headlines.len(),
            dates = dates.len(),
            "Headline and date counts differ; pairing the shorter run"
        );
    }

    headlines
        .into_iter()
        .zip(dates)
        .filter_map(|(headline, raw_date)| {
            let headline = headline.replace("(update)", "").trim().to_string();
            match dates::from_seekingalpha(&raw_date, today) {
                Ok(date) => Some((date, headline)),
                Err(e) => {
                    debug!(%headline, error = %e, "Dropping item with unreadable date");
                    None
                }
            }
        })
        .collect()
}

/// Fetch one page, sending `cookies` and returning the ones the origin set.
async fn fetch_page(
    client: &Client,
    url: Url,
    cookies: &SessionCookies,
) -> Result<(String, SessionCookies)> {
    let mut request = client.get(url);
    if let Some(cookie) = cookies.header_value() {
        request = request.header(COOKIE, cookie);
    }
    let response = send(request).await?;
    let next = SessionCookies::from_headers(response.headers());
    let body = response.text().await?;
    Ok((body, next))
}

/// Walk `query.pages` listing pages.
///
/// A headline already kept from an earlier page is skipped. Page failures
/// never abort the walk; `today` anchors relative dates.
#[instrument(level = "info", skip_all, fields(symbol = %query.symbol, pages = query.pages))]
pub async fn fetch_headlines(
    client: &Client,
    base_url: &str,
    query: &SeekingAlphaQuery,
    today: NaiveDate,
) -> Result<DatedHeadlines> {
    let mut articles = DatedHeadlines::new();
    let mut cookies = SessionCookies::default();
    let mut seen: HashSet<String> = HashSet::new();
    let mut total = 0;

    for page in 1..=query.pages {
        let url = page_url(base_url, &query.symbol, page)?;
        let body = match fetch_page(client, url, &cookies).await {
            Ok((body, next)) => {
                cookies = next;
                body
            }
            Err(e) => {
                warn!(page, error = %e, "SeekingAlpha page failed; skipping");
                continue;
            }
        };

        for (date, headline) in extract_items(&body, today) {
            if !seen.insert(headline.clone()) {
                continue;
            }
            push_headline(&mut articles, date, headline);
            total += 1;
        }
    }

    info!(count = total, "Collected SeekingAlpha headlines");
    Ok(articles)
}
