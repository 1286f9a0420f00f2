//! Magpie Storage Gateway
//!
//! SQLite-backed persistence for standardized defects and platform tokens.
//!
//! # Architecture
//!
//! One [`DefectStore`] owns one connection, opened at construction and
//! released on drop — no per-call open/close and no finalizer-dependent
//! cleanup. The schema is embedded and applied at open, so a fresh
//! database file is usable immediately.
//!
//! Idempotence contract: `(repo_id, issue_id)` is UNIQUE and inserts go
//! through `INSERT OR IGNORE`. The duplicate pre-check exists to save
//! extraction spend; the constraint is what actually guarantees
//! exactly-once persistence across re-runs.
//!
//! # Examples
//!
//! ```
//! use magpie_store::DefectStore;
//! use magpie_domain::Platform;
//!
//! let store = DefectStore::open_in_memory().unwrap();
//! assert_eq!(store.get_token(Platform::Github).unwrap(), None);
//! ```

#![warn(missing_docs)]

use chrono::Utc;
use magpie_domain::{Platform, StandardizedDefect};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// A required key field was empty
    #[error("{0} is required and was empty")]
    MissingKey(&'static str),

    /// A field could not be serialized for storage
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

/// SQLite-backed store for defects and platform tokens
pub struct DefectStore {
    conn: Connection,
}

impl DefectStore {
    /// Open (or create) the database at `path` and apply the schema.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use magpie_store::DefectStore;
    ///
    /// let store = DefectStore::open("magpie.db").unwrap();
    /// ```
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        Self::with_connection(conn)
    }

    /// Open an in-memory database (tests, dry runs)
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self, StoreError> {
        let store = Self { conn };
        store.conn.execute_batch(include_str!("schema.sql"))?;
        Ok(store)
    }

    /// Look up the single active token for a platform.
    ///
    /// Absence is `Ok(None)`, not an error — collectors work
    /// unauthenticated against public repositories.
    pub fn get_token(&self, platform: Platform) -> Result<Option<String>, StoreError> {
        let token = self
            .conn
            .query_row(
                "SELECT token FROM token_config
                 WHERE platform = ?1 AND is_active = 1
                 LIMIT 1",
                params![platform.as_str()],
                |row| row.get(0),
            )
            .optional()?;
        Ok(token)
    }

    /// Store a token for a platform, deactivating any previous one
    pub fn put_token(&mut self, platform: Platform, token: &str) -> Result<(), StoreError> {
        let tx = self.conn.transaction()?;
        tx.execute(
            "UPDATE token_config SET is_active = 0 WHERE platform = ?1",
            params![platform.as_str()],
        )?;
        tx.execute(
            "INSERT INTO token_config (platform, token, is_active) VALUES (?1, ?2, 1)",
            params![platform.as_str(), token],
        )?;
        tx.commit()?;
        Ok(())
    }

    /// Whether a defect with this composite key is already persisted.
    ///
    /// Returns `false` when either key part is empty/zero — not yet
    /// checkable; the insert's uniqueness constraint has the final word.
    pub fn is_duplicate(&self, repo_id: &str, issue_id: i64) -> Result<bool, StoreError> {
        if repo_id.is_empty() || issue_id <= 0 {
            return Ok(false);
        }
        let exists = self
            .conn
            .query_row(
                "SELECT 1 FROM standardized_defect
                 WHERE repo_id = ?1 AND issue_id = ?2
                 LIMIT 1",
                params![repo_id, issue_id],
                |_| Ok(true),
            )
            .optional()?
            .unwrap_or(false);
        Ok(exists)
    }

    /// Insert one defect record with insert-ignore semantics.
    ///
    /// Returns the generated row id on a genuine insert and `None` when
    /// the composite key already exists. Empty `repo_id` or a
    /// non-positive `issue_id` is a [`StoreError::MissingKey`]. The write
    /// runs in a transaction; any failure rolls it back.
    pub fn insert_one(&mut self, record: &StandardizedDefect) -> Result<Option<i64>, StoreError> {
        if record.repo_id.is_empty() {
            return Err(StoreError::MissingKey("repo_id"));
        }
        if record.issue_id <= 0 {
            return Err(StoreError::MissingKey("issue_id"));
        }

        let steps = serde_json::to_string(&record.steps_to_reproduce)
            .map_err(|e| StoreError::InvalidData(e.to_string()))?;
        let record_at = Utc::now().to_rfc3339();

        let tx = self.conn.transaction()?;
        let inserted = tx.execute(
            "INSERT OR IGNORE INTO standardized_defect (
                repo_id, issue_id, title, description, version,
                steps_to_reproduce, severity, stack_trace, url,
                created_at, record_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                record.repo_id,
                record.issue_id,
                record.title,
                record.description,
                record.version,
                steps,
                record.severity.as_str(),
                record.stack_trace,
                record.url,
                record.created_at,
                record_at,
            ],
        )?;
        let row_id = (inserted > 0).then(|| tx.last_insert_rowid());
        tx.commit()?;

        debug!(
            repo_id = %record.repo_id,
            issue_id = record.issue_id,
            inserted = row_id.is_some(),
            "insert_one complete"
        );
        Ok(row_id)
    }

    /// Number of persisted defect records
    pub fn defect_count(&self) -> Result<i64, StoreError> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM standardized_defect", [], |row| row.get(0))?;
        Ok(count)
    }
}
