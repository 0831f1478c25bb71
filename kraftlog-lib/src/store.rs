//src/store.rs
use rusqlite::{params, Connection, OptionalExtension};
use serde::{de::DeserializeOwned, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Storage keys, one per collection. The in-progress session key is absent
/// whenever no session is active.
pub mod keys {
    pub const EXERCISES: &str = "exercises";
    pub const TEMPLATES: &str = "templates";
    pub const HISTORY: &str = "history";
    pub const WEIGHT_LOGS: &str = "weight_logs";
    pub const ACTIVE_SESSION: &str = "active_session";
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database connection failed")]
    Connection(#[from] rusqlite::Error),
    #[error("Failed to get application data directory")]
    DataDir,
    #[error("I/O error accessing database file")]
    Io(#[from] std::io::Error),
    #[error("Stored document for key '{key}' is not valid JSON: {source}")]
    Parse {
        key: String,
        source: serde_json::Error,
    },
    #[error("Failed to serialize document for key '{key}': {source}")]
    Serialize {
        key: String,
        source: serde_json::Error,
    },
}

const DB_FILE_NAME: &str = "kraftlog.sqlite";

/// Gets the path to the store file within the app's data directory.
/// Exposed at crate root as `get_db_path_util`.
pub fn get_db_path() -> Result<PathBuf, StoreError> {
    let data_dir = dirs::data_dir().ok_or(StoreError::DataDir)?;
    let app_dir = data_dir.join("kraftlog");
    if !app_dir.exists() {
        std::fs::create_dir_all(&app_dir)?;
    }
    Ok(app_dir.join(DB_FILE_NAME))
}

/// A durable mapping from string keys to JSON documents.
///
/// Every `save` re-serializes and overwrites the whole document for its
/// key; there is no incremental persistence and no cross-key transaction.
pub struct Store {
    conn: Connection,
}

impl Store {
    /// Opens (and initializes) the store at the given path.
    /// # Errors
    /// Returns `StoreError::Connection` if SQLite cannot open the file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        init(&conn)?;
        Ok(Self { conn })
    }

    /// Opens an in-memory store, used by tests.
    /// # Errors
    /// Returns `StoreError::Connection` on SQLite failure.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        init(&conn)?;
        Ok(Self { conn })
    }

    /// Loads and deserializes the document stored under `key`.
    ///
    /// Absence is `Ok(None)`; a present but malformed document is
    /// `Err(StoreError::Parse)` so callers can apply the substitution
    /// policy explicitly.
    /// # Errors
    /// `StoreError::Connection` on query failure, `StoreError::Parse` on
    /// malformed JSON.
    pub fn load<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StoreError> {
        let raw: Option<String> = self
            .conn
            .query_row(
                "SELECT value FROM documents WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        match raw {
            None => Ok(None),
            Some(text) => serde_json::from_str(&text)
                .map(Some)
                .map_err(|source| StoreError::Parse {
                    key: key.to_string(),
                    source,
                }),
        }
    }

    /// The documented recovery policy "on error, substitute default/empty"
    /// as an explicit function: an absent or unreadable document yields
    /// `fallback()`. Corruption is logged, never surfaced.
    pub fn load_or_else<T, F>(&self, key: &str, fallback: F) -> T
    where
        T: DeserializeOwned,
        F: FnOnce() -> T,
    {
        match self.load(key) {
            Ok(Some(value)) => value,
            Ok(None) => fallback(),
            Err(err) => {
                tracing::warn!(key, error = %err, "substituting default for unreadable document");
                fallback()
            }
        }
    }

    /// Serializes `value` and overwrites the document under `key`.
    /// # Errors
    /// `StoreError::Serialize` if serialization fails, `StoreError::Connection`
    /// if the write fails.
    pub fn save<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), StoreError> {
        let text = serde_json::to_string(value).map_err(|source| StoreError::Serialize {
            key: key.to_string(),
            source,
        })?;
        self.conn.execute(
            "INSERT OR REPLACE INTO documents (key, value) VALUES (?1, ?2)",
            params![key, text],
        )?;
        Ok(())
    }

    /// Deletes the document under `key` (no-op when absent).
    /// # Errors
    /// `StoreError::Connection` if the delete fails.
    pub fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.conn
            .execute("DELETE FROM documents WHERE key = ?1", params![key])?;
        Ok(())
    }
}

fn init(conn: &Connection) -> Result<(), StoreError> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS documents (
            key TEXT PRIMARY KEY NOT NULL,
            value TEXT NOT NULL
        )",
        [],
    )?;
    Ok(())
}
