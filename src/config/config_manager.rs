// ==========================================
// Tecnova POS - configuration manager
// ==========================================
// Responsibility: load / query / override configuration
// Storage: config_kv table (key-value + scope)
// ==========================================

use crate::config::import_config_trait::ImportConfigReader;
use crate::db::{configure_sqlite_connection, open_sqlite_connection};
use crate::domain::import::{
    ImportMode, DEFAULT_BATCH_SIZE, DEFAULT_MAX_FILE_BYTES, MAX_BATCH_SIZE,
};
use crate::repository::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, Connection};
use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use tracing::warn;

const GLOBAL_SCOPE: &str = "global";

// ==========================================
// ConfigManager
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// Opens a dedicated connection.
    ///
    /// # Arguments
    /// - db_path: database file path
    ///
    /// # Returns
    /// - Err(RepositoryError): the database could not be opened
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Shares an existing connection (PRAGMAs re-applied, idempotent).
    ///
    /// # Arguments
    /// - conn: connection also used by the repository
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> RepositoryResult<Self> {
        {
            let guard = conn
                .lock()
                .map_err(|e| RepositoryError::LockError(e.to_string()))?;
            configure_sqlite_connection(&guard)?;
        }

        Ok(Self { conn })
    }

    /// Reads a `global` scope value.
    ///
    /// # Arguments
    /// - key: one of `config_keys`
    ///
    /// # Returns
    /// - Some(String): stored value
    /// - None: key not configured
    pub fn get_global_config_value(&self, key: &str) -> RepositoryResult<Option<String>> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = ?1 AND key = ?2",
            params![GLOBAL_SCOPE, key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Inserts or overwrites a `global` scope value.
    ///
    /// # Arguments
    /// - key: one of `config_keys`
    /// - value: stored as text; parsed on read, so malformed values only log a warning
    ///
    /// # Returns
    /// - Err(RepositoryError): write failed or the lock is poisoned
    pub fn set_global_config_value(&self, key: &str, value: &str) -> RepositoryResult<()> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))?;

        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value, updated_at) VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?3, updated_at = ?4",
            params![GLOBAL_SCOPE, key, value, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    /// All `global` values, ordered by key.
    ///
    /// # Returns
    /// - BTreeMap<key, value>: empty when nothing is configured
    pub fn get_config_snapshot(&self) -> RepositoryResult<BTreeMap<String, String>> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))?;

        let mut stmt =
            conn.prepare("SELECT key, value FROM config_kv WHERE scope_id = ?1 ORDER BY key")?;
        let rows = stmt.query_map(params![GLOBAL_SCOPE], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut snapshot = BTreeMap::new();
        for row in rows {
            let (key, value) = row?;
            snapshot.insert(key, value);
        }
        Ok(snapshot)
    }

    /// Parses a stored value, falling back to `default` when absent or malformed.
    fn get_parsed_or_default<T>(&self, key: &str, default: T) -> RepositoryResult<T>
    where
        T: FromStr + std::fmt::Display,
    {
        let raw = match self.get_global_config_value(key)? {
            Some(v) => v,
            None => return Ok(default),
        };

        match raw.trim().parse::<T>() {
            Ok(value) => Ok(value),
            Err(_) => {
                warn!(config_key = key, value = %raw, fallback = %default, "malformed config value");
                Ok(default)
            }
        }
    }
}

#[async_trait]
impl ImportConfigReader for ConfigManager {
    /// Falls back below 1 and clamps above `MAX_BATCH_SIZE`.
    async fn get_batch_size(&self) -> RepositoryResult<usize> {
        let value = self.get_parsed_or_default(config_keys::BATCH_SIZE, DEFAULT_BATCH_SIZE)?;
        if value < 1 {
            warn!(config_key = config_keys::BATCH_SIZE, value, "batch size must be positive");
            return Ok(DEFAULT_BATCH_SIZE);
        }
        if value > MAX_BATCH_SIZE {
            warn!(
                config_key = config_keys::BATCH_SIZE,
                value,
                max = MAX_BATCH_SIZE,
                "batch size clamped"
            );
            return Ok(MAX_BATCH_SIZE);
        }
        Ok(value)
    }

    async fn get_max_file_bytes(&self) -> RepositoryResult<usize> {
        self.get_parsed_or_default(config_keys::MAX_FILE_BYTES, DEFAULT_MAX_FILE_BYTES)
    }

    async fn get_default_mode(&self) -> RepositoryResult<ImportMode> {
        let raw = self.get_global_config_value(config_keys::DEFAULT_MODE)?;
        match raw.as_deref().map(str::trim) {
            None => Ok(ImportMode::Insert),
            Some("insert") => Ok(ImportMode::Insert),
            Some("upsert") => Ok(ImportMode::Upsert),
            Some(other) => {
                warn!(config_key = config_keys::DEFAULT_MODE, value = other, "unknown import mode");
                Ok(ImportMode::Insert)
            }
        }
    }

    async fn get_default_dry_run(&self) -> RepositoryResult<bool> {
        self.get_parsed_or_default(config_keys::DEFAULT_DRY_RUN, true)
    }

    async fn get_rate_limit_max_requests(&self) -> RepositoryResult<usize> {
        self.get_parsed_or_default(config_keys::RATE_LIMIT_MAX_REQUESTS, 30)
    }

    async fn get_rate_limit_window_ms(&self) -> RepositoryResult<u64> {
        self.get_parsed_or_default(config_keys::RATE_LIMIT_WINDOW_MS, 60_000)
    }
}

// ==========================================
// Config keys
// ==========================================
pub mod config_keys {
    // pipeline
    pub const BATCH_SIZE: &str = "import.batch_size";
    pub const MAX_FILE_BYTES: &str = "import.max_file_bytes";
    pub const DEFAULT_MODE: &str = "import.default_mode";
    pub const DEFAULT_DRY_RUN: &str = "import.default_dry_run";

    // rate limiting
    pub const RATE_LIMIT_MAX_REQUESTS: &str = "import.rate_limit.max_requests";
    pub const RATE_LIMIT_WINDOW_MS: &str = "import.rate_limit.window_ms";
}
