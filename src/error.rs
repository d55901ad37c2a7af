//! Error types shared by the adapters, the normalizers, and the store.

use thiserror::Error;

/// Reasons a source-native date token could not be normalized.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DateError {
    /// Epoch seconds outside chrono's representable range.
    #[error("epoch timestamp out of range: {0}")]
    EpochOutOfRange(i64),

    /// The string does not follow the expected layout.
    #[error("unrecognized date {input:?}: {reason}")]
    Unrecognized {
        /// The offending input, after pre-processing.
        input: String,
        /// Why parsing failed.
        reason: String,
    },
}

/// Errors raised while collecting or persisting headlines.
#[derive(Debug, Error)]
pub enum HarvestError {
    /// Transport-level HTTP failure (DNS, connect, TLS, body read).
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The origin answered with a non-success status.
    #[error("unexpected status {status} from {url}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Requested URL.
        url: String,
    },

    /// Response body was not the JSON shape we expected.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// A URL could not be assembled from the configured endpoint.
    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),

    /// SQLite failure.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Configuration or dictionary file could not be decoded.
    #[error("config error: {0}")]
    Config(#[from] serde_yaml::Error),

    /// Filesystem failure.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// A price CSV line did not have the seven expected fields.
    #[error("malformed tick line {line}: {content:?}")]
    MalformedTick {
        /// 1-based line number in the CSV file.
        line: usize,
        /// The raw line.
        content: String,
    },

    /// No lexicon is configured for the instrument being cleaned.
    #[error("no lexicon configured for stock {0}")]
    MissingLexicon(String),

    /// Twitter search needs an app-only bearer token.
    #[error("twitter bearer token not configured")]
    MissingTwitterToken,
}

/// Convenience alias used across the crate.
pub type Result<T> = std::result::Result<T, HarvestError>;
