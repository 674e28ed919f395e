//! Blog API client that resolves every request through the response cache.

use futures::{stream, StreamExt, TryStreamExt};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{info, warn};
use url::Url;

use crate::cache::{CacheLayer, CacheResult, CacheSource, CacheStore};
use crate::error::Result;
use crate::pagination::PageState;

use super::client::{Endpoints, Transport};
use super::types::{Comment, Post, User};

/// One page of posts ready to be drawn.
#[derive(Debug, Clone)]
pub struct Page {
  /// Window the posts were cut from, with `total` filled in
  pub state: PageState,
  pub posts: Vec<Post>,
  /// Authors of `posts`, in first-appearance order
  pub authors: Vec<User>,
  /// Where the post collection came from
  pub source: CacheSource,
}

impl Page {
  pub fn author_of(&self, post: &Post) -> Option<&User> {
    self.authors.iter().find(|user| user.id == post.user_id)
  }
}

/// Blog API client with transparent caching.
///
/// Callers only see typed results; whether a response came from the network
/// or the store is reported through [`CacheResult::source`].
pub struct CachedApiClient<T: Transport, S: CacheStore> {
  transport: Arc<T>,
  endpoints: Endpoints,
  cache: CacheLayer<S>,
  author_concurrency: usize,
}

impl<T: Transport, S: CacheStore> CachedApiClient<T, S> {
  pub fn new(transport: T, endpoints: Endpoints, storage: S) -> Self {
    Self {
      transport: Arc::new(transport),
      endpoints,
      cache: CacheLayer::new(storage),
      author_concurrency: 1,
    }
  }

  /// Allow up to `n` author lookups in flight at once.
  pub fn with_author_concurrency(mut self, n: usize) -> Self {
    self.author_concurrency = n.max(1);
    self
  }

  pub fn endpoints(&self) -> &Endpoints {
    &self.endpoints
  }

  #[cfg(test)]
  pub fn storage(&self) -> &S {
    self.cache.storage()
  }

  /// Resolve `url` to JSON, from the store when possible.
  pub async fn resolve(&self, url: &Url) -> Result<CacheResult<Value>> {
    let transport = &self.transport;
    self
      .cache
      .resolve(url.as_str(), || transport.get_text(url))
      .await
      .inspect_err(|e| {
        if e.is_cache_corruption() {
          warn!(%url, "stored response is not valid JSON; run with --clear-cache to drop it");
        }
      })
  }

  /// Resolve `url` and deserialize the result.
  pub async fn resolve_as<D: DeserializeOwned>(&self, url: &Url) -> Result<CacheResult<D>> {
    let result = self.resolve(url).await?;
    Ok(CacheResult {
      data: serde_json::from_value(result.data)?,
      source: result.source,
    })
  }

  /// The full post collection.
  pub async fn get_posts(&self) -> Result<CacheResult<Vec<Post>>> {
    self.resolve_as(&self.endpoints.posts()?).await
  }

  pub async fn get_user(&self, user_id: u64) -> Result<User> {
    let result = self.resolve_as(&self.endpoints.user(user_id)?).await?;
    Ok(result.data)
  }

  /// Comments for one post, independent of the page being shown.
  pub async fn load_comments(&self, post_id: u64) -> Result<Vec<Comment>> {
    let result = self.resolve_as(&self.endpoints.comments(post_id)?).await?;
    Ok(result.data)
  }

  /// Authors for `posts`, one lookup per distinct user id.
  ///
  /// Lookups run with bounded concurrency; the result keeps the order in which
  /// each author first appears in `posts`.
  pub async fn load_authors(&self, posts: &[Post]) -> Result<Vec<User>> {
    let mut seen = HashSet::new();
    let user_ids: Vec<u64> = posts
      .iter()
      .map(|post| post.user_id)
      .filter(|id| seen.insert(*id))
      .collect();

    stream::iter(user_ids)
      .map(|id| self.get_user(id))
      .buffered(self.author_concurrency)
      .try_collect()
      .await
  }

  /// Fetch the collection, cut out the window for `state`, and load authors.
  pub async fn load_page(&self, state: PageState) -> Result<Page> {
    let posts = self.get_posts().await?;
    let state = state.with_total(posts.data.len());
    let visible = state.slice(&posts.data).to_vec();

    info!(
      page = state.current_page(),
      total = posts.data.len(),
      shown = visible.len(),
      from_cache = posts.source.is_cache(),
      "page loaded"
    );

    let authors = self.load_authors(&visible).await?;

    Ok(Page {
      state,
      posts: visible,
      authors,
      source: posts.source,
    })
  }
}

impl<T: Transport, S: CacheStore> Clone for CachedApiClient<T, S> {
  fn clone(&self) -> Self {
    Self {
      transport: Arc::clone(&self.transport),
      endpoints: self.endpoints.clone(),
      cache: self.cache.clone(),
      author_concurrency: self.author_concurrency,
    }
  }
}
