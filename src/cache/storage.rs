//! Cache store implementations: SQLite on disk, in-memory, and a no-op.

use chrono::{DateTime, Utc};
use color_eyre::{eyre::eyre, Result as EyreResult};
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::{FetchError, Result};

use super::traits::{CacheStore, CachedText};

/// Store that doesn't cache anything.
/// Used when caching is disabled - every lookup misses.
pub struct NoopStore;

impl CacheStore for NoopStore {
  fn get(&self, _key: &str) -> Result<Option<CachedText>> {
    Ok(None) // Always miss
  }

  fn set(&self, _key: &str, _text: &str) -> Result<()> {
    Ok(()) // Discard
  }

  fn clear(&self) -> Result<usize> {
    Ok(0)
  }
}

/// Process-local store. Responses are kept for the current run only.
#[derive(Default)]
pub struct MemoryStore {
  entries: Mutex<HashMap<String, CachedText>>,
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }

  fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, CachedText>>> {
    self
      .entries
      .lock()
      .map_err(|e| FetchError::Storage(format!("Lock poisoned: {}", e)))
  }

  /// Number of entries currently stored.
  #[cfg(test)]
  pub fn len(&self) -> usize {
    self.lock().map(|entries| entries.len()).unwrap_or(0)
  }
}

impl CacheStore for MemoryStore {
  fn get(&self, key: &str) -> Result<Option<CachedText>> {
    Ok(self.lock()?.get(key).cloned())
  }

  fn set(&self, key: &str, text: &str) -> Result<()> {
    self.lock()?.insert(
      key.to_string(),
      CachedText {
        text: text.to_string(),
        cached_at: Utc::now(),
      },
    );
    Ok(())
  }

  fn clear(&self) -> Result<usize> {
    let mut entries = self.lock()?;
    let count = entries.len();
    entries.clear();
    Ok(count)
  }
}

/// SQLite-backed store. One row per request URL.
pub struct SqliteStore {
  conn: Mutex<Connection>,
}

/// Schema for the response cache.
const CACHE_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS response_cache (
    key TEXT PRIMARY KEY,
    body TEXT NOT NULL,
    cached_at TEXT NOT NULL DEFAULT (datetime('now'))
);
"#;

impl SqliteStore {
  /// Open or create the store at `path`, or at the default location.
  pub fn open(path: Option<&Path>) -> EyreResult<Self> {
    let path = match path {
      Some(p) => p.to_path_buf(),
      None => Self::default_path()?,
    };

    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent)
        .map_err(|e| eyre!("Failed to create cache directory: {}", e))?;
    }

    let conn = Connection::open(&path)
      .map_err(|e| eyre!("Failed to open cache database at {}: {}", path.display(), e))?;

    Self::with_connection(conn)
  }

  #[cfg(test)]
  pub fn in_memory() -> EyreResult<Self> {
    let conn =
      Connection::open_in_memory().map_err(|e| eyre!("Failed to open in-memory cache: {}", e))?;
    Self::with_connection(conn)
  }

  fn with_connection(conn: Connection) -> EyreResult<Self> {
    conn
      .execute_batch(CACHE_SCHEMA)
      .map_err(|e| eyre!("Failed to run cache migrations: {}", e))?;

    Ok(Self {
      conn: Mutex::new(conn),
    })
  }

  /// Get the default database path.
  pub fn default_path() -> EyreResult<PathBuf> {
    let data_dir = dirs::data_dir()
      .or_else(|| dirs::home_dir().map(|p| p.join(".local/share")))
      .ok_or_else(|| eyre!("Could not determine data directory"))?;

    Ok(data_dir.join("postpager").join("cache.db"))
  }

  fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
    self
      .conn
      .lock()
      .map_err(|e| FetchError::Storage(format!("Lock poisoned: {}", e)))
  }
}

impl CacheStore for SqliteStore {
  fn get(&self, key: &str) -> Result<Option<CachedText>> {
    let conn = self.lock()?;

    let row: Option<(String, String)> = conn
      .query_row(
        "SELECT body, cached_at FROM response_cache WHERE key = ?",
        params![key],
        |row| Ok((row.get(0)?, row.get(1)?)),
      )
      .optional()?;

    match row {
      Some((text, cached_at)) => Ok(Some(CachedText {
        text,
        cached_at: parse_datetime(&cached_at)?,
      })),
      None => Ok(None),
    }
  }

  fn set(&self, key: &str, text: &str) -> Result<()> {
    let conn = self.lock()?;

    conn.execute(
      "INSERT OR REPLACE INTO response_cache (key, body, cached_at)
       VALUES (?, ?, datetime('now'))",
      params![key, text],
    )?;

    Ok(())
  }

  fn clear(&self) -> Result<usize> {
    let conn = self.lock()?;
    let removed = conn.execute("DELETE FROM response_cache", [])?;
    Ok(removed)
  }
}

/// Parse a datetime string from SQLite format.
fn parse_datetime(s: &str) -> Result<DateTime<Utc>> {
  // SQLite stores as "YYYY-MM-DD HH:MM:SS"
  chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
    .map(|dt| dt.and_utc())
    .map_err(|e| FetchError::Storage(format!("Failed to parse datetime '{}': {}", s, e)))
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::TempDir;

  #[test]
  fn test_sqlite_miss_then_hit() {
    let store = SqliteStore::in_memory().unwrap();

    assert!(store.get("https://api/posts").unwrap().is_none());

    store.set("https://api/posts", "[1,2,3]").unwrap();
    let cached = store.get("https://api/posts").unwrap().unwrap();
    assert_eq!(cached.text, "[1,2,3]");
  }

  #[test]
  fn test_sqlite_keys_are_full_urls() {
    let store = SqliteStore::in_memory().unwrap();
    store.set("https://a/users/1", "{\"id\":1}").unwrap();

    assert!(store.get("https://b/users/1").unwrap().is_none());
    assert!(store.get("https://a/users/1").unwrap().is_some());
  }

  #[test]
  fn test_sqlite_persists_across_reopen() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("nested").join("cache.db");

    {
      let store = SqliteStore::open(Some(&path)).unwrap();
      store.set("https://api/x", "{}").unwrap();
    }

    let store = SqliteStore::open(Some(&path)).unwrap();
    assert_eq!(store.get("https://api/x").unwrap().unwrap().text, "{}");
  }

  #[test]
  fn test_sqlite_clear() {
    let store = SqliteStore::in_memory().unwrap();
    store.set("a", "1").unwrap();
    store.set("b", "2").unwrap();

    assert_eq!(store.clear().unwrap(), 2);
    assert!(store.get("a").unwrap().is_none());
  }

  #[test]
  fn test_memory_store() {
    let store = MemoryStore::new();
    store.set("k", "\"v\"").unwrap();

    assert_eq!(store.len(), 1);
    assert_eq!(store.get("k").unwrap().unwrap().text, "\"v\"");
    assert_eq!(store.clear().unwrap(), 1);
    assert_eq!(store.len(), 0);
  }

  #[test]
  fn test_noop_store_always_misses() {
    let store = NoopStore;
    store.set("k", "1").unwrap();
    assert!(store.get("k").unwrap().is_none());
  }

  #[test]
  fn test_parse_datetime() {
    let dt = parse_datetime("2024-03-01 12:30:00").unwrap();
    assert_eq!(dt.to_rfc3339(), "2024-03-01T12:30:00+00:00");
    assert!(parse_datetime("yesterday").is_err());
  }
}
