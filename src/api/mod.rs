//! Blog API access: transport, endpoints, record types and the cached client.

pub mod cached_client;
pub mod client;
pub mod types;

pub use cached_client::{CachedApiClient, Page};
pub use client::{Endpoints, HttpTransport};
pub use types::{Comment, Post, User};

use crate::cache::CacheStore;

/// The client the application runs with.
pub type ApiClient = CachedApiClient<HttpTransport, Box<dyn CacheStore>>;
