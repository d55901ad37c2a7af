//! Conversion of each source's native date representation into a canonical
//! day-granularity [`NaiveDate`].
//!
//! | Source | Native form | Function |
//! |--------|-------------|----------|
//! | Reddit | epoch seconds | [`from_epoch`] |
//! | Reuters | the date the adapter requested | none needed |
//! | Twitter | `Wed Jan 03 17:21:02 +0000 2018` | [`from_twitter`] |
//! | SeekingAlpha | `Today`, `Yesterday`, `Mon, Jan 5`, `Jan 5, 2018` | [`from_seekingalpha`] |
//!
//! Functions that depend on "now" take it as an argument so callers pass
//! `Local::now().date_naive()` and tests pass a fixed date.

use crate::error::DateError;
use chrono::{DateTime, Datelike, Local, NaiveDate, TimeZone};
use itertools::Itertools;

/// Fixed-width layout of Twitter's `created_at` field.
const TWITTER_FORMAT: &str = "%a %b %d %H:%M:%S %z %Y";

/// `Jan 5 2018` after SeekingAlpha strings are reassembled.
const MONTH_DAY_YEAR: &str = "%b %d %Y";

/// Convert epoch seconds to the local calendar date.
pub fn from_epoch(secs: i64) -> Result<NaiveDate, DateError> {
    Local
        .timestamp_opt(secs, 0)
        .single()
        .map(|dt| dt.date_naive())
        .ok_or(DateError::EpochOutOfRange(secs))
}

/// Parse Twitter's `created_at`, keeping the calendar date at its own offset.
pub fn from_twitter(raw: &str) -> Result<NaiveDate, DateError> {
    DateTime::parse_from_str(raw, TWITTER_FORMAT)
        .map(|dt| dt.date_naive())
        .map_err(|e| DateError::Unrecognized {
            input: raw.to_string(),
            reason: e.to_string(),
        })
}

/// Parse SeekingAlpha's heterogeneous listing dates relative to `today`.
///
/// Periods are removed first (`Jan. 5` becomes `Jan 5`). Then:
/// - anything mentioning `Today` is `today`
/// - anything mentioning `Yesterday` is the day before
/// - a 3-character first comma segment is a weekday: the next segment is
///   `Mon DD` in the current year
/// - otherwise the first two segments read `Mon DD, YYYY`
pub fn from_seekingalpha(raw: &str, today: NaiveDate) -> Result<NaiveDate, DateError> {
    let date = raw.replace('.', "");
    let unrecognized = |reason: &str| DateError::Unrecognized {
        input: date.clone(),
        reason: reason.to_string(),
    };

    if date.contains("Today") {
        return Ok(today);
    }
    if date.contains("Yesterday") {
        return today.pred_opt().ok_or_else(|| unrecognized("no previous day"));
    }

    let segments: Vec<&str> = date.split(',').collect();
    let candidate = if segments[0].trim().len() == 3 {
        let month_day = segments
            .get(1)
            .ok_or_else(|| unrecognized("weekday without month and day"))?;
        format!("{} {}", month_day.trim(), today.year())
    } else {
        segments.iter().take(2).map(|s| s.trim()).join(" ")
    };

    NaiveDate::parse_from_str(&candidate, MONTH_DAY_YEAR).map_err(|e| unrecognized(&e.to_string()))
}
