//! Source adapters that fetch raw headlines keyed by publication date.
//!
//! Every adapter returns [`DatedHeadlines`](crate::models::DatedHeadlines):
//! canonical date to headline text in source order.
//!
//! # Supported Sources
//!
//! | Source | Module | Method | Dedup | Failure policy |
//! |--------|--------|--------|-------|----------------|
//! | Reddit | [`reddit`] | search JSON, one request per term | by title across terms | abort |
//! | Reuters | [`reuters`] | HTML, one page per day walking back | by headline across the walk | abort |
//! | Twitter/X | [`twitter`] | search JSON, one request per query | by scrubbed text across queries | abort |
//! | SeekingAlpha | [`seekingalpha`] | paginated HTML with session cookies | by headline across pages | skip page |
//!
//! Items whose date or text cannot be parsed are dropped individually.
//! "Abort" means the adapter returns `Err` and the caller counts the source
//! as having produced nothing for that instrument.

pub mod reddit;
pub mod reuters;
pub mod seekingalpha;
pub mod twitter;

use crate::error::{HarvestError, Result};
use crate::utils::truncate_for_log;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::warn;

/// Desktop browser user agent; Reuters and SeekingAlpha refuse default clients.
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/63.0.3239.84 Safari/537.36";

/// Build the HTTP client shared by every adapter.
pub fn build_client() -> Result<Client> {
    Ok(Client::builder().user_agent(USER_AGENT).build()?)
}

/// Send a request, treating any non-success status as a failure.
pub(crate) async fn send(request: RequestBuilder) -> Result<Response> {
    let response = request.send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(HarvestError::Status {
            status: status.as_u16(),
            url: response.url().to_string(),
        });
    }
    Ok(response)
}

/// Send a request and decode its JSON body.
pub(crate) async fn get_json<T: DeserializeOwned>(request: RequestBuilder) -> Result<T> {
    let response = send(request).await?;
    let url = response.url().to_string();
    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|e| {
        warn!(%url, error = %e, body = %truncate_for_log(&body, 300), "Unexpected JSON shape");
        HarvestError::Json(e)
    })
}
