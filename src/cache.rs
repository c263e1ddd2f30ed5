//! Content-addressed SQLite cache of invariant records, in WAL mode.
//!
//! A record is stored as JSON under the blake3 hash of the operation name,
//! the field order and the serialized input, so identical inputs always hit
//! the same row and any change to them misses.

use camino::{Utf8Path, Utf8PathBuf};
use rusqlite::{Connection, OptionalExtension, params};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::fs;
use thiserror::Error;
use tracing::{debug, warn};

pub const CACHE_DIR: &str = ".quadrangle";
const DB_FILE: &str = "cache.sqlite";
const SCHEMA_VERSION: i32 = 1;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Cache not initialized at {0}. Run `quadrangle analyze` with the cache enabled first.")]
    NotInitialized(Utf8PathBuf),
}

/// blake3 hash of (operation, field order, serialized input), hex encoded.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    hex: String,
    operation: String,
    field_order: Option<u32>,
}

impl CacheKey {
    pub fn new<T: Serialize + ?Sized>(
        operation: &str,
        field_order: Option<u32>,
        input: &T,
    ) -> Result<Self, CacheError> {
        let mut hasher = blake3::Hasher::new();
        hasher.update(operation.as_bytes());
        hasher.update(&[0]);
        hasher.update(&field_order.unwrap_or(0).to_le_bytes());
        hasher.update(&serde_json::to_vec(input)?);
        Ok(Self {
            hex: hasher.finalize().to_hex().to_string(),
            operation: operation.to_string(),
            field_order,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.hex
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub record_count: usize,
    /// Records per operation name.
    pub operations: BTreeMap<String, usize>,
    pub db_size_bytes: u64,
}

pub struct RecordCache {
    conn: Connection,
    path: Option<Utf8PathBuf>,
}

impl RecordCache {
    /// Open or create the cache database under `dir`.
    pub fn open(dir: &Utf8Path) -> Result<Self, CacheError> {
        if !dir.exists() {
            fs::create_dir_all(dir)?;
        }
        let db_path = Self::db_path(dir);
        let conn = Connection::open(&db_path)?;

        conn.execute_batch(
            r#"
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA cache_size = -64000;
            PRAGMA busy_timeout = 5000;
            "#,
        )?;

        let cache = Self {
            conn,
            path: Some(db_path),
        };
        cache.init_schema()?;
        Ok(cache)
    }

    /// Open an existing cache, error if it doesn't exist.
    pub fn open_existing(dir: &Utf8Path) -> Result<Self, CacheError> {
        let db_path = Self::db_path(dir);
        if !db_path.exists() {
            return Err(CacheError::NotInitialized(db_path));
        }
        let conn = Connection::open(&db_path)?;
        conn.execute_batch(
            r#"
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA busy_timeout = 5000;
            "#,
        )?;
        let cache = Self {
            conn,
            path: Some(db_path),
        };
        cache.init_schema()?;
        Ok(cache)
    }

    /// A private database that disappears when dropped.
    pub fn open_in_memory() -> Result<Self, CacheError> {
        let cache = Self {
            conn: Connection::open_in_memory()?,
            path: None,
        };
        cache.init_schema()?;
        Ok(cache)
    }

    pub fn exists(dir: &Utf8Path) -> bool {
        Self::db_path(dir).exists()
    }

    pub fn db_path(dir: &Utf8Path) -> Utf8PathBuf {
        dir.join(DB_FILE)
    }

    fn init_schema(&self) -> Result<(), CacheError> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS meta (
                key TEXT PRIMARY KEY,
                value TEXT
            );

            CREATE TABLE IF NOT EXISTS records (
                key TEXT PRIMARY KEY,
                operation TEXT NOT NULL,
                field_order INTEGER,
                payload TEXT NOT NULL,
                created_at INTEGER NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_records_operation ON records(operation);
            "#,
        )?;

        let current_version: i32 = self
            .conn
            .query_row(
                "SELECT COALESCE((SELECT value FROM meta WHERE key = 'schema_version'), '0')",
                [],
                |row| {
                    let v: String = row.get(0)?;
                    Ok(v.parse().unwrap_or(0))
                },
            )
            .unwrap_or(0);

        // records are recomputable, so an old layout is simply dropped
        if current_version != 0 && current_version != SCHEMA_VERSION {
            warn!(
                found = current_version,
                expected = SCHEMA_VERSION,
                "cache schema changed, discarding records"
            );
            self.conn.execute("DELETE FROM records", [])?;
        }

        self.conn.execute(
            "INSERT OR REPLACE INTO meta (key, value) VALUES ('schema_version', ?)",
            params![SCHEMA_VERSION.to_string()],
        )?;
        Ok(())
    }

    pub fn get<T: DeserializeOwned>(&self, key: &CacheKey) -> Result<Option<T>, CacheError> {
        let payload: Option<String> = self
            .conn
            .query_row(
                "SELECT payload FROM records WHERE key = ?",
                params![key.hex],
                |row| row.get(0),
            )
            .optional()?;
        match payload {
            Some(json) => {
                debug!(operation = %key.operation, key = %key.hex, "cache hit");
                Ok(Some(serde_json::from_str(&json)?))
            }
            None => Ok(None),
        }
    }

    pub fn put<T: Serialize>(&self, key: &CacheKey, value: &T) -> Result<(), CacheError> {
        let payload = serde_json::to_string(value)?;
        let now = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs() as i64)
            .unwrap_or(0);
        self.conn.execute(
            r#"
            INSERT OR REPLACE INTO records (key, operation, field_order, payload, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
            params![key.hex, key.operation, key.field_order, payload, now],
        )?;
        Ok(())
    }

    /// Return the cached record for `key`, or compute and store it.
    pub fn get_or_compute<T, E>(
        &self,
        key: &CacheKey,
        compute: impl FnOnce() -> Result<T, E>,
    ) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        E: From<CacheError>,
    {
        if let Some(hit) = self.get(key)? {
            return Ok(hit);
        }
        let value = compute()?;
        self.put(key, &value)?;
        Ok(value)
    }

    /// Remove every record; returns how many were removed.
    pub fn clear(&self) -> Result<usize, CacheError> {
        Ok(self.conn.execute("DELETE FROM records", [])?)
    }

    pub fn stats(&self) -> Result<CacheStats, CacheError> {
        let mut stmt = self
            .conn
            .prepare("SELECT operation, COUNT(*) FROM records GROUP BY operation ORDER BY operation")?;
        let operations = stmt
            .query_map([], |row| {
                let op: String = row.get(0)?;
                let count: i64 = row.get(1)?;
                Ok((op, count as usize))
            })?
            .collect::<Result<BTreeMap<_, _>, _>>()?;

        let db_size = self
            .path
            .as_ref()
            .and_then(|p| fs::metadata(p).ok())
            .map(|m| m.len())
            .unwrap_or(0);

        Ok(CacheStats {
            record_count: operations.values().sum(),
            operations,
            db_size_bytes: db_size,
        })
    }
}
