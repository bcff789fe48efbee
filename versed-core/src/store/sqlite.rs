//! SQLite-backed [`Repository`].
//!
//! Each passage is one row. The columns queries filter and sort on are
//! stored as scalars; the full passage (paragraphs included) is JSON inside
//! a BLOB column:
//!
//! ```sql
//! CREATE TABLE IF NOT EXISTS passages (
//!     id         TEXT PRIMARY KEY,
//!     idx        INTEGER NOT NULL,
//!     is_example INTEGER NOT NULL,
//!     is_new     INTEGER NOT NULL,
//!     created_at TEXT NOT NULL,
//!     data       BLOB NOT NULL,
//!     updated_at TEXT NOT NULL,
//!     checksum   TEXT
//! );
//! CREATE UNIQUE INDEX IF NOT EXISTS passages_user_idx
//!     ON passages (idx) WHERE is_example = 0;
//! ```
//!
//! - A transaction is opened on the first write and committed by `save`,
//!   so reads on the same connection see pending writes.
//! - The partial unique index keeps user indexes unique while examples keep
//!   their own seed order.
//! - An optional CRC-32 checksum of the JSON detects save corruption.
//! - Backup support via SQLite's online-backup API, refused while a write
//!   is pending.

use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::Utc;
use rusqlite::{Connection, OpenFlags, Row, params};
use tracing::{debug, info, warn};

use crate::config::PersistenceConfig;
use crate::error::{Result, VersedError};
use crate::model::Passage;
use crate::types::PassageId;

use super::{PassageQuery, PassageSort, Repository};

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS passages (
        id         TEXT PRIMARY KEY,
        idx        INTEGER NOT NULL,
        is_example INTEGER NOT NULL,
        is_new     INTEGER NOT NULL,
        created_at TEXT NOT NULL,
        data       BLOB NOT NULL,
        updated_at TEXT NOT NULL,
        checksum   TEXT
    );
    CREATE UNIQUE INDEX IF NOT EXISTS passages_user_idx
        ON passages (idx) WHERE is_example = 0;";

const QUERY_ASC: &str = "SELECT id, data, checksum FROM passages
     WHERE (?1 IS NULL OR is_example = ?1) AND (?2 IS NULL OR is_new = ?2)
     ORDER BY idx ASC, created_at ASC, id ASC";

const QUERY_DESC: &str = "SELECT id, data, checksum FROM passages
     WHERE (?1 IS NULL OR is_example = ?1) AND (?2 IS NULL OR is_new = ?2)
     ORDER BY idx DESC, created_at ASC, id ASC";

// ---------------------------------------------------------------------------
// CRC-32 checksum helper
// ---------------------------------------------------------------------------

/// CRC-32 (ISO 3309) of `data` as a lowercase hex string.
fn crc32_hex(data: &[u8]) -> String {
    format!("{:08x}", crc32_compute(data))
}

fn crc32_compute(data: &[u8]) -> u32 {
    const POLY: u32 = 0xEDB8_8320;
    let mut crc: u32 = 0xFFFF_FFFF;
    for &byte in data {
        crc ^= u32::from(byte);
        for _ in 0..8 {
            crc = if crc & 1 == 1 { (crc >> 1) ^ POLY } else { crc >> 1 };
        }
    }
    !crc
}

// ---------------------------------------------------------------------------
// SqliteStore
// ---------------------------------------------------------------------------

/// Handle to an open SQLite database holding one user's passages.
///
/// # Usage
///
/// ```no_run
/// # use versed_core::store::{Repository, SqliteStore};
/// # use versed_core::config::PersistenceConfig;
/// # use versed_core::model::{Passage, PassageDraft};
/// let mut store = SqliteStore::open("versed.db", &PersistenceConfig::default())?;
/// store.insert(Passage::new(0, PassageDraft::goal("Jesus wept."), chrono::Utc::now()))?;
/// store.save()?;
/// # Ok::<(), versed_core::error::VersedError>(())
/// ```
pub struct SqliteStore {
    conn: Connection,
    config: PersistenceConfig,
    db_path: PathBuf,
}

impl std::fmt::Debug for SqliteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteStore")
            .field("db_path", &self.db_path)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl SqliteStore {
    /// Open (or create) a database at `path`.
    ///
    /// The schema is created if it does not exist. WAL mode is enabled when
    /// `config.wal_mode` is `true`.
    ///
    /// # Errors
    ///
    /// Returns [`VersedError::Database`] on SQLite failures.
    pub fn open<P: AsRef<Path>>(path: P, config: &PersistenceConfig) -> Result<Self> {
        let db_path = path.as_ref().to_path_buf();
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_CREATE
            | OpenFlags::SQLITE_OPEN_NO_MUTEX;

        let conn = Connection::open_with_flags(&db_path, flags)?;

        if config.wal_mode {
            conn.execute_batch("PRAGMA journal_mode = WAL;")?;
        }
        conn.execute_batch("PRAGMA synchronous = NORMAL;")?;
        conn.execute_batch("PRAGMA busy_timeout = 5000;")?;
        conn.execute_batch(SCHEMA)?;

        info!(
            path = %db_path.display(),
            wal = config.wal_mode,
            "Versed store opened"
        );

        Ok(Self {
            conn,
            config: config.clone(),
            db_path,
        })
    }

    /// Open an in-memory database (useful for tests and previews).
    ///
    /// # Errors
    ///
    /// Returns [`VersedError::Database`] on SQLite failures.
    pub fn open_in_memory(config: &PersistenceConfig) -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;

        Ok(Self {
            conn,
            config: config.clone(),
            db_path: PathBuf::from(":memory:"),
        })
    }

    fn begin_if_needed(&self) -> Result<()> {
        if self.conn.is_autocommit() {
            self.conn.execute_batch("BEGIN IMMEDIATE;")?;
        }
        Ok(())
    }

    fn encode(&self, passage: &Passage) -> Result<(Vec<u8>, Option<String>)> {
        let json =
            serde_json::to_vec(passage).map_err(|e| VersedError::Serialization(e.to_string()))?;
        let checksum = self.config.checksum_enabled.then(|| crc32_hex(&json));
        Ok((json, checksum))
    }

    fn decode(&self, row: &Row<'_>) -> Result<Passage> {
        let id: String = row.get(0)?;
        let data: Vec<u8> = row.get(1)?;
        let stored_checksum: Option<String> = row.get(2)?;

        if self.config.checksum_enabled
            && let Some(expected) = stored_checksum
        {
            let actual = crc32_hex(&data);
            if expected != actual {
                warn!(
                    passage = %id,
                    expected = %expected,
                    actual = %actual,
                    "Checksum mismatch, possible save corruption"
                );
            }
        }

        serde_json::from_slice(&data).map_err(|e| VersedError::Serialization(e.to_string()))
    }

    fn user_index_taken(&self, passage: &Passage) -> Result<bool> {
        if passage.is_example {
            return Ok(false);
        }
        let taken = self
            .conn
            .prepare_cached(
                "SELECT 1 FROM passages WHERE is_example = 0 AND idx = ?1 AND id != ?2",
            )?
            .exists(params![passage.index, passage.id.0.to_string()])?;
        Ok(taken)
    }

    /// Return the total number of stored passages (pending ones included).
    ///
    /// # Errors
    ///
    /// Returns [`VersedError::Database`] on SQLite failures.
    pub fn passage_count(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM passages", [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or_default())
    }

    // ------------------------------------------------------------------
    // Backup
    // ------------------------------------------------------------------

    /// Back up the database to `dest_path` using SQLite's online-backup API.
    ///
    /// The store's own write transaction would block the backup, so this
    /// refuses to run while changes are pending.
    ///
    /// # Errors
    ///
    /// Returns [`VersedError::UnsavedChanges`] if a write is pending, or
    /// [`VersedError::Database`] on SQLite failures.
    pub fn backup<P: AsRef<Path>>(&self, dest_path: P) -> Result<()> {
        if self.has_changes() {
            return Err(VersedError::UnsavedChanges);
        }
        let start = Instant::now();
        let mut dest = Connection::open(dest_path.as_ref())?;
        let backup = rusqlite::backup::Backup::new(&self.conn, &mut dest)?;

        // Step through 256 pages at a time, sleeping 50ms between steps.
        backup.run_to_completion(256, std::time::Duration::from_millis(50), None)?;

        info!(
            dest = %dest_path.as_ref().display(),
            elapsed_ms = start.elapsed().as_millis(),
            "Database backup completed"
        );
        Ok(())
    }

    /// Create a numbered backup alongside the database file, rotating old
    /// backups so that at most `config.backup_count` are kept.
    ///
    /// # Errors
    ///
    /// Returns [`VersedError::UnsavedChanges`] if a write is pending, or
    /// [`VersedError::Database`] / [`VersedError::Io`] on failure.
    pub fn create_rotating_backup(&self) -> Result<()> {
        if self.db_path.as_os_str() == ":memory:" {
            return Ok(());
        }

        let max = self.config.backup_count;
        if max == 0 {
            return Ok(());
        }
        if self.has_changes() {
            return Err(VersedError::UnsavedChanges);
        }

        for i in (1..max).rev() {
            let src = self.backup_path(i);
            if src.exists() {
                std::fs::rename(&src, self.backup_path(i + 1))?;
            }
        }

        let oldest = self.backup_path(max + 1);
        if oldest.exists() {
            std::fs::remove_file(&oldest)?;
        }

        self.backup(self.backup_path(1))?;
        info!(max_backups = max, "Rotating backup created");
        Ok(())
    }

    /// Path to a numbered backup file (e.g. `versed.db.bak.1`).
    fn backup_path(&self, n: u32) -> PathBuf {
        let mut p = self.db_path.clone();
        let ext = format!(
            "{}.bak.{n}",
            p.extension()
                .map_or(String::new(), |e| e.to_string_lossy().into_owned())
        );
        p.set_extension(ext);
        p
    }

    // ------------------------------------------------------------------
    // Utility
    // ------------------------------------------------------------------

    /// Path to the database file (or `:memory:`).
    #[must_use]
    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    /// Run an integrity check. `Ok(false)` means corruption was detected.
    ///
    /// # Errors
    ///
    /// Returns [`VersedError::Database`] if the check query itself fails.
    pub fn integrity_check(&self) -> Result<bool> {
        let result: String = self
            .conn
            .query_row("PRAGMA integrity_check", [], |row| row.get(0))?;
        Ok(result == "ok")
    }
}

impl Repository for SqliteStore {
    fn insert(&mut self, passage: Passage) -> Result<()> {
        if self.user_index_taken(&passage)? {
            return Err(VersedError::DuplicateIndex(passage.index));
        }
        let (json, checksum) = self.encode(&passage)?;
        self.begin_if_needed()?;
        self.conn.execute(
            "INSERT INTO passages
                (id, idx, is_example, is_new, created_at, data, updated_at, checksum)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                passage.id.0.to_string(),
                passage.index,
                passage.is_example,
                passage.is_new,
                passage.created_at.to_rfc3339(),
                json,
                Utc::now().to_rfc3339(),
                checksum,
            ],
        )?;
        debug!(
            passage = %passage.id,
            index = passage.index,
            bytes = json.len(),
            "Inserted passage"
        );
        Ok(())
    }

    fn update(&mut self, passage: &Passage) -> Result<()> {
        if self.user_index_taken(passage)? {
            return Err(VersedError::DuplicateIndex(passage.index));
        }
        let (json, checksum) = self.encode(passage)?;
        self.begin_if_needed()?;
        let changed = self.conn.execute(
            "UPDATE passages SET
                idx = ?2, is_example = ?3, is_new = ?4,
                data = ?5, updated_at = ?6, checksum = ?7
             WHERE id = ?1",
            params![
                passage.id.0.to_string(),
                passage.index,
                passage.is_example,
                passage.is_new,
                json,
                Utc::now().to_rfc3339(),
                checksum,
            ],
        )?;
        if changed == 0 {
            return Err(VersedError::PassageNotFound(passage.id));
        }
        Ok(())
    }

    fn delete(&mut self, id: PassageId) -> Result<bool> {
        self.begin_if_needed()?;
        let deleted = self
            .conn
            .execute("DELETE FROM passages WHERE id = ?1", params![id.0.to_string()])?;
        Ok(deleted > 0)
    }

    fn get(&self, id: PassageId) -> Result<Option<Passage>> {
        let mut stmt = self
            .conn
            .prepare_cached("SELECT id, data, checksum FROM passages WHERE id = ?1")?;
        let mut rows = stmt.query(params![id.0.to_string()])?;
        rows.next()?.map(|row| self.decode(row)).transpose()
    }

    fn query(&self, query: &PassageQuery) -> Result<Vec<Passage>> {
        let start = Instant::now();
        let sql = match query.sort {
            PassageSort::IndexAscending => QUERY_ASC,
            PassageSort::IndexDescending => QUERY_DESC,
        };
        let mut stmt = self.conn.prepare_cached(sql)?;
        let mut rows = stmt.query(params![query.is_example, query.is_new])?;

        let mut passages = Vec::new();
        while let Some(row) = rows.next()? {
            passages.push(self.decode(row)?);
        }

        debug!(
            matched = passages.len(),
            elapsed_us = start.elapsed().as_micros(),
            "Queried passages"
        );
        Ok(passages)
    }

    fn save(&mut self) -> Result<()> {
        if self.conn.is_autocommit() {
            return Ok(());
        }
        let start = Instant::now();
        self.conn.execute_batch("COMMIT;")?;
        debug!(elapsed_us = start.elapsed().as_micros(), "Saved pending changes");
        Ok(())
    }

    fn rollback(&mut self) -> Result<()> {
        if !self.conn.is_autocommit() {
            self.conn.execute_batch("ROLLBACK;")?;
        }
        Ok(())
    }

    fn has_changes(&self) -> bool {
        !self.conn.is_autocommit()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
