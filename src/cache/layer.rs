//! Cache layer that orchestrates cache lookups with network fetching.

use serde_json::Value;
use std::future::Future;
use std::sync::Arc;
use tracing::debug;

use crate::error::{FetchError, Result};

use super::traits::{CacheResult, CacheStore};

/// Read-through cache over a [`CacheStore`].
///
/// A hit is returned without touching the network. A miss runs the fetcher,
/// parses its body and stores the re-serialized JSON under the key. Entries
/// are never refreshed once written.
pub struct CacheLayer<S: CacheStore> {
  storage: Arc<S>,
}

impl<S: CacheStore> CacheLayer<S> {
  /// Create a new cache layer with the given storage backend.
  pub fn new(storage: S) -> Self {
    Self {
      storage: Arc::new(storage),
    }
  }

  #[cfg(test)]
  pub fn storage(&self) -> &S {
    &self.storage
  }

  /// Resolve `key` to parsed JSON.
  ///
  /// 1. Cached text present - parse it and return, or fail with
  ///    `CacheCorruption` if it no longer parses
  /// 2. Otherwise run `fetcher`, parse the body, store it, return it
  pub async fn resolve<F, Fut>(&self, key: &str, fetcher: F) -> Result<CacheResult<Value>>
  where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<String>>,
  {
    if let Some(cached) = self.storage.get(key)? {
      return match serde_json::from_str::<Value>(&cached.text) {
        Ok(value) => {
          debug!(key, "cache hit");
          Ok(CacheResult::from_cache(value, cached.cached_at))
        }
        Err(source) => Err(FetchError::CacheCorruption {
          key: key.to_string(),
          raw: cached.text,
          source,
        }),
      };
    }

    debug!(key, "cache miss");
    let body = fetcher().await?;
    let value: Value = serde_json::from_str(&body)?;
    self.storage.set(key, &serde_json::to_string(&value)?)?;

    Ok(CacheResult::from_network(value))
  }
}

impl<S: CacheStore> Clone for CacheLayer<S> {
  fn clone(&self) -> Self {
    Self {
      storage: Arc::clone(&self.storage),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::cache::storage::MemoryStore;
  use crate::cache::CacheSource;
  use serde_json::json;
  use std::sync::atomic::{AtomicUsize, Ordering};

  fn counting_fetcher<'a>(
    calls: &'a AtomicUsize,
    body: &'static str,
  ) -> impl FnOnce() -> std::future::Ready<Result<String>> + 'a {
    move || {
      calls.fetch_add(1, Ordering::SeqCst);
      std::future::ready(Ok(body.to_string()))
    }
  }

  #[tokio::test]
  async fn test_miss_fetches_once_and_stores() {
    let cache = CacheLayer::new(MemoryStore::new());
    let calls = AtomicUsize::new(0);

    let result = cache
      .resolve("https://api/x", counting_fetcher(&calls, r#"{"id": 1}"#))
      .await
      .unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(result.data, json!({"id": 1}));
    assert_eq!(result.source, CacheSource::Network);

    let stored = cache.storage().get("https://api/x").unwrap().unwrap();
    assert_eq!(stored.text, r#"{"id":1}"#);
  }

  #[tokio::test]
  async fn test_second_resolve_hits_cache() {
    let cache = CacheLayer::new(MemoryStore::new());
    let calls = AtomicUsize::new(0);

    let first = cache
      .resolve("https://api/x", counting_fetcher(&calls, "[1, 2]"))
      .await
      .unwrap();
    let second = cache
      .resolve("https://api/x", counting_fetcher(&calls, "[9]"))
      .await
      .unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(first.data, second.data);
    assert!(second.source.is_cache());
  }

  #[tokio::test]
  async fn test_prepopulated_entry_needs_no_network() {
    let store = MemoryStore::new();
    store.set("https://api/users/1", r#"{"id":1}"#).unwrap();
    let cache = CacheLayer::new(store);
    let calls = AtomicUsize::new(0);

    let result = cache
      .resolve("https://api/users/1", counting_fetcher(&calls, "{}"))
      .await
      .unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_eq!(result.data, json!({"id": 1}));
  }

  #[tokio::test]
  async fn test_corrupt_entry_is_reported_without_fetching() {
    let store = MemoryStore::new();
    store.set("https://api/x", "{not json").unwrap();
    let cache = CacheLayer::new(store);
    let calls = AtomicUsize::new(0);

    let err = cache
      .resolve("https://api/x", counting_fetcher(&calls, "{}"))
      .await
      .unwrap_err();

    assert_eq!(calls.load(Ordering::SeqCst), 0);
    match err {
      FetchError::CacheCorruption { key, raw, .. } => {
        assert_eq!(key, "https://api/x");
        assert_eq!(raw, "{not json");
      }
      other => panic!("expected cache corruption, got {:?}", other),
    }
  }

  #[tokio::test]
  async fn test_network_error_propagates_and_stores_nothing() {
    let cache = CacheLayer::new(MemoryStore::new());

    let err = cache
      .resolve("https://api/x", || async {
        Err(FetchError::Status {
          status: reqwest::StatusCode::INTERNAL_SERVER_ERROR,
          url: "https://api/x".to_string(),
        })
      })
      .await
      .unwrap_err();

    assert!(err.is_network());
    assert_eq!(cache.storage().len(), 0);
  }

  #[tokio::test]
  async fn test_unparseable_body_is_decode_error() {
    let cache = CacheLayer::new(MemoryStore::new());

    let err = cache
      .resolve("https://api/x", || async { Ok("<html>".to_string()) })
      .await
      .unwrap_err();

    assert!(matches!(err, FetchError::Decode(_)));
    assert_eq!(cache.storage().len(), 0);
  }
}
