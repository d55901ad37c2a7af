//! Reddit submission search.
//!
//! Runs one search per term against the union of the configured subreddits
//! (`/r/a+b+c/search.json`). Titles with too few words are ignored, and a
//! title surfaced by more than one term is only kept the first time.

use super::get_json;
use crate::config::RedditQuery;
use crate::dates;
use crate::error::Result;
use crate::models::{DatedHeadlines, push_headline};
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashSet;
use tracing::{debug, info, instrument};
use url::Url;

/// Titles need more than this many spaces to count as headlines.
const MIN_SPACES: usize = 4;

/// Search response envelope; only titles and timestamps are read.
#[derive(Debug, Deserialize)]
struct Listing {
    data: ListingData,
}

#[derive(Debug, Deserialize)]
struct ListingData {
    children: Vec<Child>,
}

#[derive(Debug, Deserialize)]
struct Child {
    data: Submission,
}

#[derive(Debug, Deserialize)]
struct Submission {
    title: String,
    created_utc: f64,
}

/// Search URL restricted to `subreddits` (already joined with `+`).
///
/// `limit` is only sent when configured; Reddit's default applies otherwise.
fn search_url(base_url: &str, subreddits: &str, term: &str, limit: Option<u32>) -> Result<Url> {
    let mut url = Url::parse(&format!(
        "{}/r/{}/search.json",
        base_url.trim_end_matches('/'),
        subreddits
    ))?;
    {
        let mut pairs = url.query_pairs_mut();
        pairs.append_pair("q", term).append_pair("restrict_sr", "on");
        if let Some(limit) = limit {
            pairs.append_pair("limit", &limit.to_string());
        }
    }
    Ok(url)
}

/// Enough words to read as a headline rather than a one-off remark.
fn is_headline_like(title: &str) -> bool {
    title.matches(' ').count() > MIN_SPACES
}

/// Search the configured subreddits for every term.
///
/// Any failed search aborts the whole call.
#[instrument(level = "info", skip_all, fields(subreddits = %query.subreddits.join("+")))]
pub async fn fetch_headlines(
    client: &Client,
    base_url: &str,
    query: &RedditQuery,
) -> Result<DatedHeadlines> {
    let subreddits = query.subreddits.join("+");
    let mut seen: HashSet<String> = HashSet::new();
    let mut articles = DatedHeadlines::new();

    for term in &query.terms {
        let url = search_url(base_url, &subreddits, term, query.limit)?;
        let listing: Listing = get_json(client.get(url)).await?;

        for child in listing.data.children {
            let Submission { title, created_utc } = child.data;
            if !is_headline_like(&title) || seen.contains(&title) {
                continue;
            }
            let date = match dates::from_epoch(created_utc as i64) {
                Ok(date) => date,
                Err(e) => {
                    debug!(%title, error = %e, "Dropping submission with bad timestamp");
                    continue;
                }
            };
            seen.insert(title.clone());
            push_headline(&mut articles, date, title);
        }
        debug!(%term, kept = seen.len(), "Reddit search done");
    }

    info!(count = seen.len(), "Collected Reddit headlines");
    Ok(articles)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scrapers::build_client;
    use chrono::NaiveDate;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn listing(posts: &[(&str, i64)]) -> serde_json::Value {
        let children: Vec<_> = posts
            .iter()
            .map(|(title, created)| {
                serde_json::json!({ "kind": "t3", "data": { "title": title, "created_utc": *created as f64 } })
            })
            .collect();
        serde_json::json!({ "kind": "Listing", "data": { "children": children } })
    }

    fn query(terms: &[&str]) -> RedditQuery {
        RedditQuery {
            subreddits: vec!["apple".to_string(), "ios".to_string()],
            terms: terms.iter().map(|t| t.to_string()).collect(),
            limit: None,
        }
    }

    #[test]
    fn test_search_url() {
        let url = search_url("https://www.reddit.com/", "apple+ios", "iphone x", Some(50)).unwrap();
        assert_eq!(url.path(), "/r/apple+ios/search.json");
        assert_eq!(url.query(), Some("q=iphone+x&restrict_sr=on&limit=50"));
    }

    #[test]
    fn test_short_titles_are_not_headlines() {
        assert!(!is_headline_like("Apple buys a company"));
        assert!(!is_headline_like("Apple buys a small company"));
        assert!(is_headline_like("Apple buys a small chip company"));
    }

    #[tokio::test]
    async fn test_same_title_from_two_terms_is_kept_once() {
        let server = MockServer::start().await;
        let shared = "Apple reports record quarter on strong iPhone sales";
        let epoch = 1_515_000_000;

        Mock::given(method("GET"))
            .and(path("/r/apple+ios/search.json"))
            .and(query_param("q", "apple"))
            .respond_with(ResponseTemplate::new(200).set_body_json(listing(&[
                (shared, epoch),
                ("Too short title", epoch),
            ])))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/r/apple+ios/search.json"))
            .and(query_param("q", "iphone"))
            .respond_with(ResponseTemplate::new(200).set_body_json(listing(&[
                (shared, epoch),
                ("The new iPhone battery lasts a full two days", epoch),
            ])))
            .mount(&server)
            .await;

        let client = build_client().unwrap();
        let articles = fetch_headlines(&client, &server.uri(), &query(&["apple", "iphone"]))
            .await
            .unwrap();

        let all: Vec<&String> = articles.values().flatten().collect();
        assert_eq!(all.len(), 2);
        assert_eq!(all.iter().filter(|t| t.as_str() == shared).count(), 1);
        let date: NaiveDate = dates::from_epoch(epoch).unwrap();
        assert_eq!(articles[&date][0], shared);
    }

    #[tokio::test]
    async fn test_failed_search_aborts() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = build_client().unwrap();
        let result = fetch_headlines(&client, &server.uri(), &query(&["apple"])).await;
        assert!(matches!(
            result,
            Err(crate::error::HarvestError::Status { status: 503, .. })
        ));
    }
}
