//! SQLite-backed dead-letter store (sqlx).
//!
//! Durable alternative to the in-memory store so entries survive restarts and
//! can be inspected or replayed from the CLI.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::sqlite::{SqlitePoolOptions, SqliteRow};
use sqlx::{Pool, Row, Sqlite};

use super::entry::DlqEntry;
use super::store::DlqStore;

/// Percent-encode a path for use in a sqlite:// URI so spaces and special chars don't break parsing.
fn path_to_sqlite_uri(path: &Path) -> String {
    let s = path.to_string_lossy();
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '%' => out.push_str("%25"),
            ' ' => out.push_str("%20"),
            '#' => out.push_str("%23"),
            '?' => out.push_str("%3F"),
            '&' => out.push_str("%26"),
            c => out.push(c),
        }
    }
    format!("sqlite://{}", out)
}

/// Handle to the SQLite dead-letter database.
///
/// The default file lives under the XDG state directory:
/// `~/.local/state/resilink/dlq.db`.
#[derive(Clone)]
pub struct SqliteDlqStore {
    pool: Pool<Sqlite>,
    capacity: Option<u64>,
}

impl SqliteDlqStore {
    /// Default database path.
    pub fn default_path() -> Result<PathBuf> {
        let xdg_dirs = xdg::BaseDirectories::with_prefix("resilink")?;
        Ok(xdg_dirs.place_state_file("dlq.db")?)
    }

    /// Open (or create) the default database and run migrations.
    pub async fn open_default(capacity: Option<u64>) -> Result<Self> {
        let path = Self::default_path()?;
        Self::open_at(&path, capacity).await
    }

    /// Open (or create) the database at a specific path. Creates parent dirs if needed.
    /// `None` or `Some(0)` capacity means unbounded.
    pub async fn open_at(path: impl AsRef<Path>, capacity: Option<u64>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("create dir: {}", parent.display()))?;
        }
        let uri = path_to_sqlite_uri(path) + "?mode=rwc";
        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect(&uri)
            .await
            .with_context(|| format!("open dead-letter db: {}", path.display()))?;
        let store = Self {
            pool,
            capacity: capacity.filter(|c| *c > 0),
        };
        store.migrate().await?;
        Ok(store)
    }

    async fn migrate(&self) -> Result<()> {
        // `seq` keeps FIFO order; `id` is the public identifier.
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS dlq_entries (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                id TEXT NOT NULL UNIQUE,
                url TEXT NOT NULL,
                method TEXT NOT NULL,
                headers_json TEXT NOT NULL,
                body TEXT,
                error_description TEXT NOT NULL,
                retry_count INTEGER NOT NULL,
                integration_name TEXT NOT NULL,
                enqueued_at INTEGER NOT NULL
            );
            "#,
        )
        .execute(&self.pool)
        .await?;
        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS dlq_entries_integration
            ON dlq_entries (integration_name, seq);
            "#,
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

fn row_to_entry(row: &SqliteRow) -> Result<DlqEntry> {
    let headers_json: String = row.get("headers_json");
    let headers: BTreeMap<String, String> =
        serde_json::from_str(&headers_json).context("parse stored headers")?;
    let retry_count: i64 = row.get("retry_count");
    Ok(DlqEntry {
        id: row.get("id"),
        url: row.get("url"),
        method: row.get("method"),
        headers,
        body: row.get("body"),
        error_description: row.get("error_description"),
        retry_count: u32::try_from(retry_count).unwrap_or(u32::MAX),
        integration_name: row.get("integration_name"),
        enqueued_at: row.get("enqueued_at"),
    })
}

#[async_trait]
impl DlqStore for SqliteDlqStore {
    async fn push(&self, entry: DlqEntry) -> Result<u64> {
        let headers_json = serde_json::to_string(&entry.headers)?;
        let mut tx = self.pool.begin().await?;
        sqlx::query(
            r#"
            INSERT INTO dlq_entries (
                id, url, method, headers_json, body,
                error_description, retry_count, integration_name, enqueued_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&entry.id)
        .bind(&entry.url)
        .bind(&entry.method)
        .bind(headers_json)
        .bind(&entry.body)
        .bind(&entry.error_description)
        .bind(i64::from(entry.retry_count))
        .bind(&entry.integration_name)
        .bind(entry.enqueued_at)
        .execute(&mut *tx)
        .await?;

        let mut evicted = 0;
        if let Some(cap) = self.capacity {
            let count: i64 = sqlx::query("SELECT COUNT(*) AS n FROM dlq_entries")
                .fetch_one(&mut *tx)
                .await?
                .get("n");
            let excess = (count as u64).saturating_sub(cap);
            if excess > 0 {
                evicted = sqlx::query(
                    r#"
                    DELETE FROM dlq_entries
                    WHERE seq IN (
                        SELECT seq FROM dlq_entries ORDER BY seq ASC LIMIT ?1
                    )
                    "#,
                )
                .bind(excess as i64)
                .execute(&mut *tx)
                .await?
                .rows_affected();
            }
        }
        tx.commit().await?;
        Ok(evicted)
    }

    async fn list(&self, integration: Option<&str>) -> Result<Vec<DlqEntry>> {
        let rows = match integration {
            Some(name) => {
                sqlx::query(
                    r#"
                    SELECT * FROM dlq_entries
                    WHERE integration_name = ?1
                    ORDER BY seq ASC
                    "#,
                )
                .bind(name)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query("SELECT * FROM dlq_entries ORDER BY seq ASC")
                    .fetch_all(&self.pool)
                    .await?
            }
        };
        rows.iter().map(row_to_entry).collect()
    }

    async fn get(&self, id: &str) -> Result<Option<DlqEntry>> {
        let row = sqlx::query("SELECT * FROM dlq_entries WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(row_to_entry).transpose()
    }

    async fn remove(&self, id: &str) -> Result<Option<DlqEntry>> {
        let mut tx = self.pool.begin().await?;
        let row = sqlx::query("SELECT * FROM dlq_entries WHERE id = ?1")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
        let Some(row) = row else {
            tx.commit().await?;
            return Ok(None);
        };
        let entry = row_to_entry(&row)?;
        sqlx::query("DELETE FROM dlq_entries WHERE id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(Some(entry))
    }

    async fn clear(&self) -> Result<u64> {
        let r = sqlx::query("DELETE FROM dlq_entries")
            .execute(&self.pool)
            .await?;
        Ok(r.rows_affected())
    }

    async fn len(&self) -> Result<u64> {
        let count: i64 = sqlx::query("SELECT COUNT(*) AS n FROM dlq_entries")
            .fetch_one(&self.pool)
            .await?
            .get("n");
        Ok(count as u64)
    }
}

#[cfg(test)]
/// Open an in-memory database for tests (no disk I/O).
pub(crate) async fn open_memory(capacity: Option<u64>) -> Result<SqliteDlqStore> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await?;
    let store = SqliteDlqStore {
        pool,
        capacity: capacity.filter(|c| *c > 0),
    };
    store.migrate().await?;
    Ok(store)
}
