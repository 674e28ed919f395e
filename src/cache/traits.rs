//! Core types shared by the cache stores and the cache layer.

use chrono::{DateTime, Utc};

use crate::error::Result;

/// Raw JSON text held by a store, plus when it was written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedText {
  pub text: String,
  pub cached_at: DateTime<Utc>,
}

/// A persistent string-keyed store.
///
/// Keys are full request URLs. Entries never expire and are never removed by
/// the fetch path; only `clear` (an explicit, external action) drops them.
pub trait CacheStore: Send + Sync {
  /// Look up the text stored under `key`.
  fn get(&self, key: &str) -> Result<Option<CachedText>>;

  /// Store `text` under `key`.
  fn set(&self, key: &str, text: &str) -> Result<()>;

  /// Remove every entry, returning how many were dropped.
  fn clear(&self) -> Result<usize>;
}

impl<S: CacheStore + ?Sized> CacheStore for Box<S> {
  fn get(&self, key: &str) -> Result<Option<CachedText>> {
    (**self).get(key)
  }

  fn set(&self, key: &str, text: &str) -> Result<()> {
    (**self).set(key, text)
  }

  fn clear(&self) -> Result<usize> {
    (**self).clear()
  }
}

/// Result of a resolve, including where the data came from.
#[derive(Debug, Clone)]
pub struct CacheResult<T> {
  pub data: T,
  pub source: CacheSource,
}

impl<T> CacheResult<T> {
  pub fn from_network(data: T) -> Self {
    Self {
      data,
      source: CacheSource::Network,
    }
  }

  pub fn from_cache(data: T, cached_at: DateTime<Utc>) -> Self {
    Self {
      data,
      source: CacheSource::Cache { cached_at },
    }
  }
}

/// Indicates where resolved data came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheSource {
  /// Fetched over the network and written to the store
  Network,
  /// Served from the store without a network call
  Cache { cached_at: DateTime<Utc> },
}

impl CacheSource {
  pub fn is_cache(&self) -> bool {
    matches!(self, CacheSource::Cache { .. })
  }
}
