//! Daily price CSV loader.
//!
//! Accepts the usual `Date,Open,High,Low,Close,Adj Close,Volume` export. Fields
//! are stored as text; days without an adjusted close carry the `null`
//! sentinel and are pruned right after the load.

use crate::error::{HarvestError, Result};
use crate::models::Tick;
use crate::store::Store;
use std::path::Path;
use tracing::{info, instrument};

/// Split CSV text into ticks for `stock`, skipping the header and blank lines.
pub fn parse_tick_csv(stock: &str, text: &str) -> Result<Vec<Tick>> {
    let mut ticks = Vec::new();
    for (index, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.contains("Date") {
            continue;
        }
        let fields: Vec<&str> = line.split(',').collect();
        let [date, open, high, low, close, adj_close, volume] = fields.as_slice() else {
            return Err(HarvestError::MalformedTick {
                line: index + 1,
                content: line.to_string(),
            });
        };
        ticks.push(Tick {
            stock: stock.to_string(),
            date: date.to_string(),
            open: open.to_string(),
            high: high.to_string(),
            low: low.to_string(),
            close: close.to_string(),
            adj_close: adj_close.to_string(),
            volume: volume.to_string(),
        });
    }
    Ok(ticks)
}

/// Load a CSV file into the `ticks` table, then prune invalid rows.
///
/// Returns `(inserted, pruned)`.
#[instrument(level = "info", skip(store, path), fields(path = %path.display()))]
pub async fn load_tick_csv(store: &Store, stock: &str, path: &Path) -> Result<(u64, u64)> {
    let text = tokio::fs::read_to_string(path).await?;
    let ticks = parse_tick_csv(stock, &text)?;
    let inserted = store.insert_ticks(&ticks).await?;
    let pruned = store.prune_invalid_ticks().await?;
    info!(parsed = ticks.len(), inserted, pruned, "Loaded price history");
    Ok((inserted, pruned))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Table;

    const CSV: &str = "Date,Open,High,Low,Close,Adj Close,Volume
2018-01-02,170.160004,172.300003,169.259995,172.259995,168.987320,25555900
2018-01-03,172.529999,174.550003,171.960007,172.229996,168.957886,29517900
2018-01-04,null,null,null,null,null,null
";

    #[test]
    fn test_parse_skips_header() {
        let ticks = parse_tick_csv("AAPL", CSV).unwrap();
        assert_eq!(ticks.len(), 3);
        assert_eq!(ticks[0].date, "2018-01-02");
        assert_eq!(ticks[0].volume, "25555900");
        assert_eq!(ticks[2].adj_close, "null");
    }

    #[test]
    fn test_parse_rejects_short_lines() {
        let err = parse_tick_csv("AAPL", "2018-01-02,1,2,3\n").unwrap_err();
        assert!(matches!(err, HarvestError::MalformedTick { line: 1, .. }));
    }

    #[tokio::test]
    async fn test_load_prunes_null_rows() {
        let dir = tempfile::tempdir().unwrap();
        let csv_path = dir.path().join("AAPL.csv");
        tokio::fs::write(&csv_path, CSV).await.unwrap();
        let store = Store::open(&dir.path().join("stock.db")).await.unwrap();
        store.create_tables().await.unwrap();

        let (inserted, pruned) = load_tick_csv(&store, "AAPL", &csv_path).await.unwrap();
        assert_eq!((inserted, pruned), (3, 1));
        assert_eq!(store.count(Table::Ticks).await.unwrap(), 2);

        let (inserted, _) = load_tick_csv(&store, "AAPL", &csv_path).await.unwrap();
        assert_eq!(inserted, 1);
        assert_eq!(store.count(Table::Ticks).await.unwrap(), 2);
    }
}
