use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::app::ports::FanStorePort;
use crate::constants::FANS_TABLE;
use crate::error::{FanError, Result};
use crate::types::FanSubmission;

/// SQLite-backed submission store. Every call opens its own connection and drops it afterwards.
#[derive(Debug, Clone)]
pub struct SqliteFanStore {
    path: PathBuf,
}

impl SqliteFanStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn open(path: &Path) -> Result<Connection> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        Ok(Connection::open(path)?)
    }

    /// Creates the table if it does not exist yet.
    pub fn init_schema(&self) -> Result<()> {
        let conn = Self::open(&self.path)?;
        conn.execute_batch(&format!(
            r#"
            CREATE TABLE IF NOT EXISTS {FANS_TABLE} (
                id                INTEGER PRIMARY KEY AUTOINCREMENT,
                name              TEXT NOT NULL,
                tax_id            TEXT NOT NULL,
                address           TEXT NOT NULL,
                interests         TEXT NOT NULL,
                events_2024       TEXT NOT NULL,
                purchases_2024    TEXT NOT NULL,
                detected_themes   TEXT NOT NULL,
                followed_channels TEXT NOT NULL,
                validated_links   TEXT NOT NULL,
                submitted_at      TEXT NOT NULL
            );
            "#
        ))?;
        info!(path = %self.path.display(), "Submission table ready");
        Ok(())
    }

    fn insert_blocking(path: &Path, s: &FanSubmission) -> Result<()> {
        let conn = Self::open(path)?;
        conn.execute(
            &format!(
                "INSERT INTO {FANS_TABLE} (name, tax_id, address, interests, events_2024, purchases_2024, \
                 detected_themes, followed_channels, validated_links, submitted_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)"
            ),
            params![
                s.name,
                s.tax_id,
                s.address,
                s.interests,
                s.events_2024,
                s.purchases_2024,
                s.detected_themes,
                s.followed_channels,
                s.validated_links,
                s.submitted_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    fn list_blocking(path: &Path) -> Result<Vec<FanSubmission>> {
        let conn = Self::open(path)?;
        let mut stmt = conn.prepare(&format!(
            "SELECT name, tax_id, address, interests, events_2024, purchases_2024, \
             detected_themes, followed_channels, validated_links, submitted_at \
             FROM {FANS_TABLE} ORDER BY name, id"
        ))?;
        let rows = stmt.query_map([], row_to_submission)?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }
}

fn row_to_submission(row: &Row<'_>) -> rusqlite::Result<FanSubmission> {
    let submitted_at: String = row.get(9)?;
    let submitted_at = DateTime::parse_from_rfc3339(&submitted_at)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(9, rusqlite::types::Type::Text, Box::new(e))
        })?;
    Ok(FanSubmission {
        name: row.get(0)?,
        tax_id: row.get(1)?,
        address: row.get(2)?,
        interests: row.get(3)?,
        events_2024: row.get(4)?,
        purchases_2024: row.get(5)?,
        detected_themes: row.get(6)?,
        followed_channels: row.get(7)?,
        validated_links: row.get(8)?,
        submitted_at,
    })
}

fn join_error(e: tokio::task::JoinError) -> FanError {
    FanError::Database {
        message: format!("database task failed: {e}"),
    }
}

#[async_trait]
impl FanStorePort for SqliteFanStore {
    async fn insert(&self, submission: &FanSubmission) -> Result<()> {
        let path = self.path.clone();
        let submission = submission.clone();
        tokio::task::spawn_blocking(move || Self::insert_blocking(&path, &submission))
            .await
            .map_err(join_error)??;
        debug!("Submission row inserted");
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<FanSubmission>> {
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || Self::list_blocking(&path))
            .await
            .map_err(join_error)?
    }
}
