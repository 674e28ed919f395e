//! Error types for the fetch and cache layers.

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FetchError {
  #[error("Network error: {0}")]
  Network(#[from] reqwest::Error),

  #[error("HTTP {status} from {url}")]
  Status { status: StatusCode, url: String },

  /// Stored text under `key` is not valid JSON.
  #[error("Could not parse cached response for {key}: {raw}")]
  CacheCorruption {
    key: String,
    raw: String,
    #[source]
    source: serde_json::Error,
  },

  #[error("Unexpected response shape: {0}")]
  Decode(#[from] serde_json::Error),

  #[error("Cache storage error: {0}")]
  Storage(String),

  #[error("Invalid URL: {0}")]
  Url(#[from] url::ParseError),
}

impl FetchError {
  /// Transport failures and non-success statuses. These are the only errors
  /// worth retrying.
  pub fn is_network(&self) -> bool {
    matches!(self, FetchError::Network(_) | FetchError::Status { .. })
  }

  pub fn is_cache_corruption(&self) -> bool {
    matches!(self, FetchError::CacheCorruption { .. })
  }
}

impl From<rusqlite::Error> for FetchError {
  fn from(e: rusqlite::Error) -> Self {
    FetchError::Storage(e.to_string())
  }
}

pub type Result<T> = std::result::Result<T, FetchError>;

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_status_is_network() {
    let err = FetchError::Status {
      status: StatusCode::BAD_GATEWAY,
      url: "https://api/posts".to_string(),
    };
    assert!(err.is_network());
    assert!(!err.is_cache_corruption());
  }

  #[test]
  fn test_cache_corruption_carries_raw_text() {
    let source = serde_json::from_str::<serde_json::Value>("{oops").unwrap_err();
    let err = FetchError::CacheCorruption {
      key: "https://api/x".to_string(),
      raw: "{oops".to_string(),
      source,
    };
    assert!(err.is_cache_corruption());
    assert!(!err.is_network());
    assert!(err.to_string().contains("{oops"));
  }

  #[test]
  fn test_storage_is_not_network() {
    assert!(!FetchError::Storage("locked".to_string()).is_network());
  }
}
