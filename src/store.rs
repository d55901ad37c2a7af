//! SQLite persistence for ticks, headlines, and the dictionary reference table.
//!
//! Every operation opens its own connection, does its work inside a
//! transaction, commits, and closes the connection before returning. Nothing
//! is held between calls, so a batch committed by one adapter stays durable
//! even if a later one fails. On an error path the transaction and connection
//! are dropped, which rolls back and releases them.
//!
//! All inserts are insert-or-ignore: rows that collide with a uniqueness
//! constraint are dropped silently.

use crate::error::Result;
use crate::models::{DictionaryEntry, Headline, Tick};
use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection};
use sqlx::{ConnectOptions, Connection};
use std::path::Path;
use tracing::{debug, info, instrument};

const CREATE_TICKS: &str = "CREATE TABLE IF NOT EXISTS ticks (stock text, date text, open real, high real, low real, close real, adjclose real, volume integer, unique (stock, date))";
const CREATE_HEADLINES: &str = "CREATE TABLE IF NOT EXISTS headlines (stock text, date text, source text, content text UNIQUE ON CONFLICT IGNORE, rawcontent text UNIQUE ON CONFLICT IGNORE, sentimentlabel integer)";
const CREATE_DICTIONARY: &str = "CREATE TABLE IF NOT EXISTS dictionary (word text, stock text, replacement text, unique (word, stock, replacement))";

/// Value the price CSV loader writes when a day has no adjusted close.
pub const NULL_SENTINEL: &str = "null";

/// Tables whose row counts can be reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Table {
    Ticks,
    Headlines,
    Dictionary,
}

impl Table {
    fn name(&self) -> &'static str {
        match self {
            Table::Ticks => "ticks",
            Table::Headlines => "headlines",
            Table::Dictionary => "dictionary",
        }
    }
}

/// Handle to the SQLite file. Holds connection options only, never a live connection.
#[derive(Debug, Clone)]
pub struct Store {
    options: SqliteConnectOptions,
}

impl Store {
    /// Point at `path`, creating its parent directory and the file on first use.
    pub async fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        Ok(Self { options })
    }

    async fn connect(&self) -> Result<SqliteConnection> {
        Ok(self.options.connect().await?)
    }

    /// Create the three tables if they are absent.
    #[instrument(level = "info", skip_all)]
    pub async fn create_tables(&self) -> Result<()> {
        let mut conn = self.connect().await?;
        let mut tx = conn.begin().await?;
        for ddl in [CREATE_TICKS, CREATE_HEADLINES, CREATE_DICTIONARY] {
            sqlx::query(ddl).execute(&mut *tx).await?;
        }
        tx.commit().await?;
        conn.close().await?;
        debug!("Schema ready");
        Ok(())
    }

    /// Insert price rows, ignoring any (stock, date) already present.
    ///
    /// Returns the number of rows written.
    #[instrument(level = "info", skip_all, fields(rows = ticks.len()))]
    pub async fn insert_ticks(&self, ticks: &[Tick]) -> Result<u64> {
        let mut conn = self.connect().await?;
        let mut tx = conn.begin().await?;
        let mut written = 0;
        for tick in ticks {
            written += sqlx::query("INSERT OR IGNORE INTO ticks VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)")
                .bind(&tick.stock)
                .bind(&tick.date)
                .bind(&tick.open)
                .bind(&tick.high)
                .bind(&tick.low)
                .bind(&tick.close)
                .bind(&tick.adj_close)
                .bind(&tick.volume)
                .execute(&mut *tx)
                .await?
                .rows_affected();
        }
        tx.commit().await?;
        conn.close().await?;
        info!(written, "Inserted ticks");
        Ok(written)
    }

    /// Delete ticks whose adjusted close is the loader's null sentinel.
    #[instrument(level = "info", skip_all)]
    pub async fn prune_invalid_ticks(&self) -> Result<u64> {
        let mut conn = self.connect().await?;
        let mut tx = conn.begin().await?;
        let removed = sqlx::query("DELETE FROM ticks WHERE adjclose = ?1")
            .bind(NULL_SENTINEL)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        tx.commit().await?;
        conn.close().await?;
        info!(removed, "Pruned invalid ticks");
        Ok(removed)
    }

    /// Insert headlines, ignoring rows whose content or raw content already exists.
    ///
    /// Returns the number of rows written.
    #[instrument(level = "info", skip_all, fields(rows = headlines.len()))]
    pub async fn insert_headlines(&self, headlines: &[Headline]) -> Result<u64> {
        let mut conn = self.connect().await?;
        let mut tx = conn.begin().await?;
        let mut written = 0;
        for headline in headlines {
            written += sqlx::query("INSERT OR IGNORE INTO headlines VALUES (?1, ?2, ?3, ?4, ?5, ?6)")
                .bind(&headline.stock)
                .bind(&headline.date)
                .bind(&headline.source)
                .bind(&headline.content)
                .bind(&headline.raw_content)
                .bind(headline.sentiment_label)
                .execute(&mut *tx)
                .await?
                .rows_affected();
        }
        tx.commit().await?;
        conn.close().await?;
        info!(written, "Inserted headlines");
        Ok(written)
    }

    /// Load the dictionary reference copy, ignoring repeated triples.
    #[instrument(level = "info", skip_all, fields(rows = entries.len()))]
    pub async fn insert_dictionary(&self, entries: &[DictionaryEntry]) -> Result<u64> {
        let mut conn = self.connect().await?;
        let mut tx = conn.begin().await?;
        let mut written = 0;
        for entry in entries {
            written += sqlx::query("INSERT OR IGNORE INTO dictionary VALUES (?1, ?2, ?3)")
                .bind(&entry.word)
                .bind(&entry.stock)
                .bind(&entry.replacement)
                .execute(&mut *tx)
                .await?
                .rows_affected();
        }
        tx.commit().await?;
        conn.close().await?;
        info!(written, "Inserted dictionary entries");
        Ok(written)
    }

    /// Rewrite already-stored content for `stock`.
    ///
    /// Selects rows whose content matches the `LIKE` pattern and replaces the
    /// pattern's literal text (with `%` removed) by `replacement`. Returns the
    /// `(before, after)` pairs; rows are only written when `commit` is set.
    #[instrument(level = "info", skip(self, replacement))]
    pub async fn replace_all(
        &self,
        stock: &str,
        pattern: &str,
        replacement: &str,
        commit: bool,
    ) -> Result<Vec<(String, String)>> {
        let literal = pattern.replace('%', "");
        let mut conn = self.connect().await?;
        let mut tx = conn.begin().await?;

        let contents: Vec<String> =
            sqlx::query_scalar("SELECT content FROM headlines WHERE stock = ?1 AND content LIKE ?2")
                .bind(stock)
                .bind(pattern)
                .fetch_all(&mut *tx)
                .await?;

        let mut changes = Vec::with_capacity(contents.len());
        for content in contents {
            let rewritten = content.replace(&literal, replacement);
            if commit {
                sqlx::query("UPDATE headlines SET content = ?1 WHERE stock = ?2 AND content = ?3")
                    .bind(&rewritten)
                    .bind(stock)
                    .bind(&content)
                    .execute(&mut *tx)
                    .await?;
            }
            changes.push((content, rewritten));
        }

        tx.commit().await?;
        conn.close().await?;
        info!(matched = changes.len(), commit, "Replace-all finished");
        Ok(changes)
    }

    /// All stored headlines for `stock`, in insertion order.
    pub async fn headlines_for(&self, stock: &str) -> Result<Vec<Headline>> {
        let mut conn = self.connect().await?;
        let rows: Vec<(String, String, String, String, String, Option<i64>)> = sqlx::query_as(
            "SELECT stock, date, source, content, rawcontent, sentimentlabel FROM headlines WHERE stock = ?1 ORDER BY rowid",
        )
        .bind(stock)
        .fetch_all(&mut conn)
        .await?;
        conn.close().await?;

        Ok(rows
            .into_iter()
            .map(
                |(stock, date, source, content, raw_content, sentiment_label)| Headline {
                    stock,
                    date,
                    source,
                    content,
                    raw_content,
                    sentiment_label,
                },
            )
            .collect())
    }

    /// Row count of `table`.
    pub async fn count(&self, table: Table) -> Result<i64> {
        let mut conn = self.connect().await?;
        let query = format!("SELECT COUNT(*) FROM {}", table.name());
        let count: i64 = sqlx::query_scalar(&query).fetch_one(&mut conn).await?;
        conn.close().await?;
        Ok(count)
    }
}
