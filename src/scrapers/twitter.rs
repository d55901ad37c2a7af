//! Twitter/X popular-tweet search.
//!
//! Uses the v1.1 `search/tweets.json` endpoint with an app-only bearer token.

use super::get_json;
use crate::config::TwitterQuery;
use crate::dates;
use crate::error::Result;
use crate::models::{DatedHeadlines, push_headline};
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashSet;
use tracing::{debug, info, instrument};
use url::Url;

/// The endpoint's own per-request cap.
pub const MAX_RESULTS: u32 = 100;

static LINK: Lazy<Regex> = Lazy::new(|| Regex::new(r"https?://\S+").unwrap());
static DISALLOWED: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\s:/]+").unwrap());

/// Body of `search/tweets.json`; only the fields we read.
#[derive(Debug, Deserialize)]
struct SearchResponse {
    statuses: Vec<Status>,
}

#[derive(Debug, Deserialize)]
struct Status {
    text: String,
    created_at: String,
}

/// Popular English tweets for one query, at most `count` of them.
fn search_url(base_url: &str, query: &str, count: u32) -> Result<Url> {
    let mut url = Url::parse(&format!(
        "{}/1.1/search/tweets.json",
        base_url.trim_end_matches('/')
    ))?;
    url.query_pairs_mut()
        .append_pair("q", query)
        .append_pair("result_type", "popular")
        .append_pair("lang", "en")
        .append_pair("count", &count.to_string());
    Ok(url)
}

/// Drop links, then anything that is not a word character, whitespace, `:` or `/`.
pub fn scrub_tweet(text: &str) -> String {
    let unlinked = LINK.replace_all(text, "");
    DISALLOWED.replace_all(&unlinked, "").into_owned()
}

/// Single-line, longer than the query, and more than one word.
pub fn is_headline_like(text: &str, query: &str) -> bool {
    !text.contains('\n') && text.chars().count() > query.chars().count() && text.contains(' ')
}

/// Run every configured query.
///
/// A tweet whose scrubbed text was already kept by an earlier query is
/// skipped. Tweets with an unparseable timestamp are dropped; a failed
/// search aborts.
#[instrument(level = "info", skip_all, fields(queries = %query.queries.join(", ")))]
pub async fn fetch_headlines(
    client: &Client,
    base_url: &str,
    bearer_token: &str,
    query: &TwitterQuery,
) -> Result<DatedHeadlines> {
    let count = query.limit.min(MAX_RESULTS);
    let mut articles = DatedHeadlines::new();
    let mut seen: HashSet<String> = HashSet::new();
    let mut total = 0;

    for q in &query.queries {
        let url = search_url(base_url, q, count)?;
        let response: SearchResponse = get_json(client.get(url).bearer_auth(bearer_token)).await?;

        for status in response.statuses {
            let text = scrub_tweet(&status.text);
            if !is_headline_like(&text, q) || seen.contains(&text) {
                continue;
            }
            match dates::from_twitter(&status.created_at) {
                Ok(date) => {
                    seen.insert(text.clone());
                    push_headline(&mut articles, date, text);
                    total += 1;
                }
                Err(e) => debug!(error = %e, "Dropping tweet with bad timestamp"),
            }
        }
    }

    info!(count = total, "Collected tweets");
    Ok(articles)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HarvestError;
    use crate::scrapers::build_client;
    use chrono::NaiveDate;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_scrub_tweet() {
        assert_eq!(
            scrub_tweet("Apple's #iPhone sales up! https://t.co/abc123 via @Reuters"),
            "Apples iPhone sales up  via Reuters"
        );
        assert_eq!(scrub_tweet("Time: 10:30 / EST"), "Time: 10:30 / EST");
    }

    #[test]
    fn test_is_headline_like() {
        assert!(is_headline_like("Apple launches new phone", "#Apple"));
        assert!(!is_headline_like("Apple\nlaunches", "#Apple"));
        assert!(!is_headline_like("AppleLaunchesNewPhone", "#Apple"));
        assert!(!is_headline_like("a b", "#Apple"));
    }

    #[tokio::test]
    async fn test_search_caps_count_and_filters() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/1.1/search/tweets.json"))
            .and(query_param("q", "#Apple"))
            .and(query_param("count", "100"))
            .and(query_param("result_type", "popular"))
            .and(header("authorization", "Bearer secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "statuses": [
                    { "text": "Apple unveils a new MacBook https://t.co/x", "created_at": "Wed Jan 03 17:21:02 +0000 2018" },
                    { "text": "two\nlines here", "created_at": "Wed Jan 03 17:21:02 +0000 2018" },
                    { "text": "Apple stock climbs again today", "created_at": "2018-01-03" }
                ]
            })))
            .mount(&server)
            .await;

        let client = build_client().unwrap();
        let query = TwitterQuery {
            queries: vec!["#Apple".to_string()],
            limit: 500,
        };
        let articles = fetch_headlines(&client, &server.uri(), "secret", &query)
            .await
            .unwrap();

        let date = NaiveDate::from_ymd_opt(2018, 1, 3).unwrap();
        assert_eq!(articles.len(), 1);
        assert_eq!(articles[&date], vec!["Apple unveils a new MacBook "]);
    }

    #[tokio::test]
    async fn test_same_tweet_from_two_queries_is_kept_once() {
        let server = MockServer::start().await;
        let body = serde_json::json!({
            "statuses": [
                { "text": "Apple unveils a new MacBook today", "created_at": "Wed Jan 03 17:21:02 +0000 2018" }
            ]
        });
        for q in ["@Apple", "#Apple"] {
            Mock::given(method("GET"))
                .and(path("/1.1/search/tweets.json"))
                .and(query_param("q", q))
                .respond_with(ResponseTemplate::new(200).set_body_json(body.clone()))
                .mount(&server)
                .await;
        }

        let client = build_client().unwrap();
        let query = TwitterQuery {
            queries: vec!["@Apple".to_string(), "#Apple".to_string()],
            limit: 100,
        };
        let articles = fetch_headlines(&client, &server.uri(), "secret", &query)
            .await
            .unwrap();

        let all: Vec<&String> = articles.values().flatten().collect();
        assert_eq!(all, vec!["Apple unveils a new MacBook today"]);
    }

    #[tokio::test]
    async fn test_failed_search_aborts() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/1.1/search/tweets.json"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = build_client().unwrap();
        let query = TwitterQuery {
            queries: vec!["#Apple".to_string()],
            limit: 100,
        };
        let result = fetch_headlines(&client, &server.uri(), "secret", &query).await;
        assert!(matches!(result, Err(HarvestError::Status { status: 503, .. })));
    }
}
