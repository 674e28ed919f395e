//! Async query abstraction for loading data behind the UI.
//!
//! A `Query<T>` runs one future at a time on the tokio runtime and delivers the
//! result to the event loop through a channel. Every run is tagged with a
//! generation number: starting a new run aborts the previous task, and any
//! result that still arrives from an older generation is dropped. A slow
//! response for page 2 can therefore never overwrite page 3.
//!
//! # Example
//!
//! ```ignore
//! let mut query = Query::new();
//! let client = client.clone();
//! query.run(async move { client.load_page(state).await.map_err(|e| e.to_string()) });
//!
//! // In event loop tick
//! if let Some(Settled::Error(e)) = query.poll() {
//!     // Report it; the last good data stays visible
//! }
//! ```

use std::future::Future;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// The state of a query
#[derive(Debug, Clone)]
pub enum QueryState<T> {
  /// Query has not been started
  Idle,
  /// Query is currently fetching data
  Loading,
  /// Query completed successfully
  Success(T),
  /// Query failed with an error
  Error(String),
}

impl<T> QueryState<T> {
  pub fn is_loading(&self) -> bool {
    matches!(self, QueryState::Loading)
  }

  pub fn is_error(&self) -> bool {
    matches!(self, QueryState::Error(_))
  }

  pub fn data(&self) -> Option<&T> {
    match self {
      QueryState::Success(data) => Some(data),
      _ => None,
    }
  }

  pub fn error(&self) -> Option<&str> {
    match self {
      QueryState::Error(e) => Some(e),
      _ => None,
    }
  }
}

type Tagged<T> = (u64, Result<T, String>);

/// Outcome of a `poll` that changed the state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Settled {
  Success,
  Error(String),
}

/// Async query with generation-tagged results.
pub struct Query<T> {
  state: QueryState<T>,
  /// Last successful data, kept visible while a newer run is loading
  previous: Option<T>,
  generation: u64,
  tx: mpsc::UnboundedSender<Tagged<T>>,
  rx: mpsc::UnboundedReceiver<Tagged<T>>,
  task: Option<JoinHandle<()>>,
}

impl<T: Send + 'static> Query<T> {
  pub fn new() -> Self {
    let (tx, rx) = mpsc::unbounded_channel();
    Self {
      state: QueryState::Idle,
      previous: None,
      generation: 0,
      tx,
      rx,
      task: None,
    }
  }

  /// Get the current state of the query.
  pub fn state(&self) -> &QueryState<T> {
    &self.state
  }

  /// Data from the latest successful run, even while a newer run is loading.
  pub fn data(&self) -> Option<&T> {
    self.state.data().or(self.previous.as_ref())
  }

  pub fn is_loading(&self) -> bool {
    self.state.is_loading()
  }

  pub fn is_error(&self) -> bool {
    self.state.is_error()
  }

  /// Start `future`, superseding any run still in flight.
  pub fn run<Fut>(&mut self, future: Fut)
  where
    Fut: Future<Output = Result<T, String>> + Send + 'static,
  {
    if let Some(task) = self.task.take() {
      task.abort();
    }

    self.generation += 1;
    let generation = self.generation;

    let state = std::mem::replace(&mut self.state, QueryState::Loading);
    if let QueryState::Success(data) = state {
      self.previous = Some(data);
    }

    let tx = self.tx.clone();
    self.task = Some(tokio::spawn(async move {
      let result = future.await;
      // Ignore send errors - the query may have been dropped
      let _ = tx.send((generation, result));
    }));
  }

  /// Drain finished runs without blocking.
  ///
  /// Returns the outcome if the current generation settled during this call.
  /// Call this in your event loop tick handler.
  pub fn poll(&mut self) -> Option<Settled> {
    let mut settled = None;

    while let Ok((generation, result)) = self.rx.try_recv() {
      if generation != self.generation {
        // Superseded by a newer run
        continue;
      }

      self.task = None;
      match result {
        Ok(data) => {
          self.state = QueryState::Success(data);
          self.previous = None;
          settled = Some(Settled::Success);
        }
        Err(error) => {
          settled = Some(Settled::Error(error.clone()));
          self.state = QueryState::Error(error);
        }
      }
    }

    settled
  }
}

impl<T: Send + 'static> Default for Query<T> {
  fn default() -> Self {
    Self::new()
  }
}

impl<T> Drop for Query<T> {
  fn drop(&mut self) {
    if let Some(task) = self.task.take() {
      task.abort();
    }
  }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Query<T> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Query")
      .field("state", &self.state)
      .field("generation", &self.generation)
      .finish_non_exhaustive()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::time::Duration;

  #[tokio::test]
  async fn test_query_success() {
    let mut query = Query::new();
    assert!(matches!(query.state(), QueryState::Idle));

    query.run(async { Ok::<_, String>(vec![1, 2, 3]) });
    assert!(query.is_loading());

    // Wait for the result
    tokio::time::sleep(Duration::from_millis(10)).await;

    assert_eq!(query.poll(), Some(Settled::Success));
    assert!(matches!(query.state(), QueryState::Success(_)));
    assert_eq!(query.data(), Some(&vec![1, 2, 3]));
  }

  #[tokio::test]
  async fn test_query_error() {
    let mut query: Query<i32> = Query::new();

    query.run(async { Err("Something went wrong".to_string()) });
    tokio::time::sleep(Duration::from_millis(10)).await;

    assert_eq!(
      query.poll(),
      Some(Settled::Error("Something went wrong".to_string()))
    );
    assert!(query.is_error());
    assert_eq!(query.state().error(), Some("Something went wrong"));
  }

  #[tokio::test]
  async fn test_poll_without_result_is_none() {
    let mut query: Query<i32> = Query::new();
    assert_eq!(query.poll(), None);

    query.run(async {
      tokio::time::sleep(Duration::from_millis(100)).await;
      Ok(1)
    });
    assert_eq!(query.poll(), None);
    assert!(query.is_loading());
  }

  #[tokio::test]
  async fn test_newer_run_wins_over_slow_older_run() {
    let mut query = Query::new();

    query.run(async {
      tokio::time::sleep(Duration::from_millis(50)).await;
      Ok::<_, String>("page 2")
    });
    query.run(async { Ok::<_, String>("page 3") });

    tokio::time::sleep(Duration::from_millis(100)).await;
    query.poll();

    assert_eq!(query.data(), Some(&"page 3"));
  }

  #[tokio::test]
  async fn test_stale_result_is_dropped() {
    let mut query = Query::new();

    // First run finishes immediately but is not polled before the second starts
    query.run(async { Ok::<_, String>(1) });
    tokio::time::sleep(Duration::from_millis(10)).await;
    query.run(async {
      tokio::time::sleep(Duration::from_millis(50)).await;
      Ok::<_, String>(2)
    });

    assert_eq!(query.poll(), None);
    assert!(query.is_loading());

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(query.poll(), Some(Settled::Success));
    assert_eq!(query.data(), Some(&2));
  }

  #[tokio::test]
  async fn test_previous_data_visible_while_reloading() {
    let mut query = Query::new();
    query.run(async { Ok::<_, String>(1) });
    tokio::time::sleep(Duration::from_millis(10)).await;
    query.poll();

    query.run(async {
      tokio::time::sleep(Duration::from_millis(100)).await;
      Ok::<_, String>(2)
    });

    assert!(query.is_loading());
    assert_eq!(query.data(), Some(&1));
  }
}
