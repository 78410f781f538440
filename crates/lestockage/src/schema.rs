// Storage schema and database management

use crate::error::{Result, StorageError};
use chrono::NaiveDateTime;
use lemodele::dates::{parse_iso, to_iso};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Database path
    pub db_path: String,

    /// Whether to enable WAL mode
    pub wal_enabled: bool,

    /// Cache size in pages
    pub cache_size_pages: Option<usize>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_path: "lesuivi.db".to_string(),
            wal_enabled: true,
            cache_size_pages: Some(10000),
        }
    }
}

const PROJECTS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS projects (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    owner TEXT NOT NULL,
    description TEXT,
    status TEXT NOT NULL DEFAULT 'not_started',
    start_date TEXT NOT NULL,
    deadline TEXT NOT NULL,
    completion_percentage REAL NOT NULL DEFAULT 0.0,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
)
"#;

const MILESTONES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS milestones (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    project_id INTEGER NOT NULL,
    name TEXT NOT NULL,
    description TEXT,
    target_date TEXT NOT NULL,
    completion_date TEXT,
    status TEXT NOT NULL DEFAULT 'pending',
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    FOREIGN KEY (project_id) REFERENCES projects(id) ON DELETE CASCADE
)
"#;

const RISKS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS risks (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    project_id INTEGER NOT NULL,
    name TEXT NOT NULL,
    description TEXT,
    severity TEXT NOT NULL,
    mitigation_plan TEXT,
    status TEXT NOT NULL DEFAULT 'Open',
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    FOREIGN KEY (project_id) REFERENCES projects(id) ON DELETE CASCADE
)
"#;

const INDEXES: [&str; 2] = [
    "CREATE INDEX IF NOT EXISTS idx_milestones_project ON milestones(project_id)",
    "CREATE INDEX IF NOT EXISTS idx_risks_project ON risks(project_id)",
];

/// Main storage interface
pub struct Storage {
    conn: Connection,
    config: StorageConfig,
}

impl Storage {
    /// Open storage with default config
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with_config(path, StorageConfig::default())
    }

    /// Open the database named by `config.db_path`
    pub fn from_config(config: &StorageConfig) -> Result<Self> {
        Self::open_with_config(&config.db_path, config.clone())
    }

    /// Open storage with custom config
    pub fn open_with_config<P: AsRef<Path>>(path: P, config: StorageConfig) -> Result<Self> {
        let conn = Connection::open(path.as_ref())?;

        if config.wal_enabled {
            conn.pragma_update(None, "journal_mode", "WAL")?;
        }

        if let Some(cache_size) = config.cache_size_pages {
            conn.pragma_update(None, "cache_size", cache_size)?;
        }

        tracing::debug!(path = %path.as_ref().display(), "Opened tracker database");
        Self::with_connection(conn, config)
    }

    /// Open a private in-memory database
    pub fn open_in_memory() -> Result<Self> {
        let config = StorageConfig {
            db_path: ":memory:".to_string(),
            wal_enabled: false,
            cache_size_pages: None,
        };
        Self::with_connection(Connection::open_in_memory()?, config)
    }

    fn with_connection(conn: Connection, config: StorageConfig) -> Result<Self> {
        conn.pragma_update(None, "foreign_keys", "ON")?;
        let mut storage = Self { conn, config };
        storage.initialize_schema()?;
        Ok(storage)
    }

    /// Initialize database schema
    fn initialize_schema(&mut self) -> Result<()> {
        self.conn.execute(PROJECTS_TABLE, [])?;
        self.conn.execute(MILESTONES_TABLE, [])?;
        self.conn.execute(RISKS_TABLE, [])?;
        for index_sql in INDEXES {
            self.conn.execute(index_sql, [])?;
        }
        Ok(())
    }

    /// Get the underlying connection
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Get mutable connection
    pub fn conn_mut(&mut self) -> &mut Connection {
        &mut self.conn
    }

    /// Active configuration
    pub fn config(&self) -> &StorageConfig {
        &self.config
    }

    /// Checkpoint the WAL into the main database file
    pub fn close(&mut self) -> Result<()> {
        if self.config.wal_enabled {
            self.conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE)")?;
        }
        Ok(())
    }
}

/// Encode a timestamp for a TEXT column.
pub(crate) fn encode_ts(value: NaiveDateTime) -> String {
    to_iso(value)
}

/// Decode a TEXT timestamp column.
pub(crate) fn decode_ts(table: &'static str, id: i64, column: &str, raw: &str) -> Result<NaiveDateTime> {
    parse_iso(raw).ok_or_else(|| StorageError::corrupt(table, id, format!("{column} {raw:?} is not a timestamp")))
}

/// Decode an optional TEXT timestamp column.
pub(crate) fn decode_opt_ts(
    table: &'static str,
    id: i64,
    column: &str,
    raw: Option<String>,
) -> Result<Option<NaiveDateTime>> {
    raw.map(|value| decode_ts(table, id, column, &value)).transpose()
}
