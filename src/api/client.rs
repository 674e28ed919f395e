//! HTTP transport and endpoint construction for the blog API.

use color_eyre::{eyre::eyre, Result as EyreResult};
use reqwest::Client;
use std::future::Future;
use std::time::Duration;
use tracing::warn;
use url::Url;

use crate::config::ApiConfig;
use crate::error::{FetchError, Result};

const USER_AGENT: &str = concat!("postpager/", env!("CARGO_PKG_VERSION"));

/// Something that can GET a URL and hand back the response body.
pub trait Transport: Send + Sync {
  fn get_text(&self, url: &Url) -> impl Future<Output = Result<String>> + Send;
}

/// reqwest-backed transport with retries for network failures.
#[derive(Clone)]
pub struct HttpTransport {
  client: Client,
  retries: u32,
  backoff: Duration,
}

impl HttpTransport {
  pub fn new(config: &ApiConfig) -> EyreResult<Self> {
    let client = Client::builder()
      .user_agent(USER_AGENT)
      .timeout(config.timeout())
      .build()
      .map_err(|e| eyre!("Failed to create HTTP client: {}", e))?;

    Ok(Self {
      client,
      retries: config.retries,
      backoff: config.retry_backoff(),
    })
  }

  async fn get_once(&self, url: &Url) -> Result<String> {
    let response = self.client.get(url.clone()).send().await?;

    let status = response.status();
    if !status.is_success() {
      return Err(FetchError::Status {
        status,
        url: url.to_string(),
      });
    }

    Ok(response.text().await?)
  }
}

impl Transport for HttpTransport {
  async fn get_text(&self, url: &Url) -> Result<String> {
    with_retries(self.retries, self.backoff, || self.get_once(url)).await
  }
}

/// Run `attempt` until it succeeds, fails with a non-network error, or has
/// been retried `retries` times. The n-th retry waits `backoff * n`.
pub async fn with_retries<F, Fut>(retries: u32, backoff: Duration, mut attempt: F) -> Result<String>
where
  F: FnMut() -> Fut,
  Fut: Future<Output = Result<String>>,
{
  let mut tries = 0;
  loop {
    match attempt().await {
      Err(e) if e.is_network() && tries < retries => {
        tries += 1;
        warn!(error = %e, attempt = tries, "request failed, retrying");
        tokio::time::sleep(backoff * tries).await;
      }
      result => return result,
    }
  }
}

/// URLs for the three resources the client reads.
#[derive(Debug, Clone)]
pub struct Endpoints {
  base: Url,
}

impl Endpoints {
  pub fn new(base_url: &str) -> Result<Self> {
    let mut base = Url::parse(base_url)?;
    // Without a trailing slash `join` would replace the last path segment.
    if !base.path().ends_with('/') {
      let path = format!("{}/", base.path());
      base.set_path(&path);
    }
    Ok(Self { base })
  }

  pub fn base(&self) -> &Url {
    &self.base
  }

  pub fn posts(&self) -> Result<Url> {
    Ok(self.base.join("posts")?)
  }

  pub fn comments(&self, post_id: u64) -> Result<Url> {
    Ok(self.base.join(&format!("posts/{}/comments", post_id))?)
  }

  pub fn user(&self, user_id: u64) -> Result<Url> {
    Ok(self.base.join(&format!("users/{}", user_id))?)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use reqwest::StatusCode;
  use std::sync::atomic::{AtomicU32, Ordering};

  #[test]
  fn test_endpoints() {
    let endpoints = Endpoints::new("https://jsonplaceholder.typicode.com").unwrap();
    assert_eq!(
      endpoints.posts().unwrap().as_str(),
      "https://jsonplaceholder.typicode.com/posts"
    );
    assert_eq!(
      endpoints.comments(7).unwrap().as_str(),
      "https://jsonplaceholder.typicode.com/posts/7/comments"
    );
    assert_eq!(
      endpoints.user(3).unwrap().as_str(),
      "https://jsonplaceholder.typicode.com/users/3"
    );
  }

  #[test]
  fn test_endpoints_keep_base_path() {
    let endpoints = Endpoints::new("http://localhost:8080/api/v1").unwrap();
    assert_eq!(
      endpoints.posts().unwrap().as_str(),
      "http://localhost:8080/api/v1/posts"
    );
  }

  #[test]
  fn test_endpoints_reject_garbage() {
    assert!(matches!(
      Endpoints::new("not a url"),
      Err(FetchError::Url(_))
    ));
  }

  fn server_error() -> FetchError {
    FetchError::Status {
      status: StatusCode::SERVICE_UNAVAILABLE,
      url: "https://api/posts".to_string(),
    }
  }

  #[tokio::test]
  async fn test_retries_network_errors_then_succeeds() {
    let calls = AtomicU32::new(0);

    let result = with_retries(2, Duration::ZERO, || {
      let n = calls.fetch_add(1, Ordering::SeqCst);
      async move {
        if n < 2 {
          Err(server_error())
        } else {
          Ok("[]".to_string())
        }
      }
    })
    .await;

    assert_eq!(result.unwrap(), "[]");
    assert_eq!(calls.load(Ordering::SeqCst), 3);
  }

  #[tokio::test]
  async fn test_gives_up_after_retries() {
    let calls = AtomicU32::new(0);

    let result = with_retries(1, Duration::ZERO, || {
      calls.fetch_add(1, Ordering::SeqCst);
      async { Err(server_error()) }
    })
    .await;

    assert!(result.unwrap_err().is_network());
    assert_eq!(calls.load(Ordering::SeqCst), 2);
  }

  #[tokio::test]
  async fn test_does_not_retry_other_errors() {
    let calls = AtomicU32::new(0);

    let result = with_retries(5, Duration::ZERO, || {
      calls.fetch_add(1, Ordering::SeqCst);
      async { Err(FetchError::Storage("disk full".to_string())) }
    })
    .await;

    assert!(matches!(result, Err(FetchError::Storage(_))));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
  }
}
