mod api;
mod app;
mod cache;
mod config;
mod error;
mod event;
mod logging;
mod pagination;
mod query;
mod ui;

use clap::Parser;
use color_eyre::{eyre::eyre, Result};
use std::path::PathBuf;
use tracing::info;

use crate::api::{ApiClient, CachedApiClient, Endpoints, HttpTransport};
use crate::cache::{CacheStore, MemoryStore, NoopStore, SqliteStore};

#[derive(Parser, Debug)]
#[command(name = "postpager")]
#[command(about = "Browse blog posts, authors and comments from a JSON API, with a local response cache")]
#[command(version)]
struct Args {
  /// Path to config file (default: $XDG_CONFIG_HOME/postpager/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// API base URL
  #[arg(short, long)]
  base_url: Option<String>,

  /// Posts per page
  #[arg(long)]
  per_page: Option<usize>,

  /// Page to open first
  #[arg(short, long, default_value_t = 1)]
  page: usize,

  /// Don't read or write the response cache
  #[arg(long)]
  no_cache: bool,

  /// Cache responses in memory for this run only
  #[arg(long, conflicts_with = "no_cache")]
  ephemeral: bool,

  /// Empty the response cache and exit
  #[arg(long)]
  clear_cache: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let args = Args::parse();

  // Load configuration
  let mut config = config::Config::load(args.config.as_deref())?;

  // Command line overrides
  if let Some(base_url) = args.base_url {
    config.api.base_url = base_url;
  }
  if let Some(per_page) = args.per_page {
    if per_page == 0 {
      return Err(eyre!("--per-page must be at least 1"));
    }
    config.pagination.per_page = per_page;
  }
  if args.no_cache {
    config.cache.enabled = false;
  }

  if args.clear_cache {
    let store = SqliteStore::open(config.cache.path.as_deref())?;
    let removed = store.clear()?;
    println!("Removed {} cached responses", removed);
    return Ok(());
  }

  let _log_guard = logging::init()?;
  info!(base_url = %config.api.base_url, cache = config.cache.enabled, "starting");

  let storage: Box<dyn CacheStore> = if !config.cache.enabled {
    Box::new(NoopStore)
  } else if args.ephemeral {
    Box::new(MemoryStore::new())
  } else {
    Box::new(SqliteStore::open(config.cache.path.as_deref())?)
  };

  let client: ApiClient = CachedApiClient::new(
    HttpTransport::new(&config.api)?,
    Endpoints::new(&config.api.base_url)?,
    storage,
  )
  .with_author_concurrency(config.author_concurrency);

  // Initialize and run the app
  let mut app = app::App::new(client, config.pagination.per_page, args.page);
  app.run().await?;

  Ok(())
}
