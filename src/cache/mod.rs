//! URL-keyed response cache.
//!
//! This module provides a read-through cache that:
//! - Stores raw JSON text keyed by the full request URL
//! - Serves hits without a network call
//! - Never expires or refreshes an entry once written
//! - Reports unparseable stored text as a distinct error

mod layer;
mod storage;
mod traits;

pub use layer::CacheLayer;
pub use storage::{MemoryStore, NoopStore, SqliteStore};
pub use traits::{CacheResult, CacheSource, CacheStore};
