use crate::api::{ApiClient, Comment, Page, Post};
use crate::event::{Event, EventHandler};
use crate::pagination::PageState;
use crate::query::{Query, Settled};
use crate::ui;
use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{
  disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::prelude::*;
use ratatui::widgets::ListState;
use std::collections::HashMap;
use std::io::{stdout, Stdout};
use std::time::Duration;
use tracing::{error, info};

/// Main application state.
///
/// Owns the requested page window and every in-flight load. All state changes
/// happen on the event loop; loads report back through their `Query`.
pub struct App {
  client: ApiClient,

  /// Window most recently asked for
  page_state: PageState,

  /// Load of the current page, including its authors
  page: Query<Page>,

  /// Selected post within the current page
  list_state: ListState,

  /// Comment loads, by post id
  comments: HashMap<u64, Query<Vec<Comment>>>,

  /// Last error shown in the status bar
  status: Option<String>,

  /// Whether to quit
  should_quit: bool,
}

impl App {
  pub fn new(client: ApiClient, per_page: usize, initial_page: usize) -> Self {
    Self {
      client,
      page_state: PageState::new(per_page).go_to_page(initial_page),
      page: Query::new(),
      list_state: ListState::default(),
      comments: HashMap::new(),
      status: None,
      should_quit: false,
    }
  }

  pub async fn run(&mut self) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let mut events = EventHandler::new(Duration::from_millis(100));

    // Initial data load
    self.go_to_page(self.page_state);

    let result = self.event_loop(&mut terminal, &mut events).await;

    // Cleanup terminal
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    result
  }

  async fn event_loop(
    &mut self,
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    events: &mut EventHandler,
  ) -> Result<()> {
    while !self.should_quit {
      terminal.draw(|frame| ui::draw(frame, self))?;

      match events.next().await {
        Some(Event::Key(key)) => self.handle_key(key),
        Some(Event::Tick) => self.tick(),
        Some(Event::Resize) => {}
        None => break,
      }
    }
    Ok(())
  }

  // ==========================================================================
  // Page controller
  // ==========================================================================

  /// Ask for the window described by `state`.
  ///
  /// A load still running for an earlier request is abandoned; its result can
  /// no longer replace what this one shows.
  fn go_to_page(&mut self, state: PageState) {
    self.page_state = state;
    info!(page = state.current_page(), "loading page");

    let client = self.client.clone();
    self
      .page
      .run(async move { client.load_page(state).await.map_err(|e| e.to_string()) });
  }

  fn reload_page(&mut self) {
    self.go_to_page(self.page_state);
  }

  /// Next page, stopping at the last one once the total is known.
  fn next_page(&mut self) {
    let next = self.page_state.next_page();
    match self.page_state.page_count() {
      Some(count) if next.current_page() > count.max(1) => {}
      _ => self.go_to_page(next),
    }
  }

  fn prev_page(&mut self) {
    if self.page_state.current_page() > 1 {
      self.go_to_page(self.page_state.prev_page());
    }
  }

  /// Start loading comments for `post_id` unless a load is already running.
  fn load_comments(&mut self, post_id: u64) {
    let query = self.comments.entry(post_id).or_default();
    if query.is_loading() {
      return;
    }

    let client = self.client.clone();
    query.run(async move {
      client
        .load_comments(post_id)
        .await
        .map_err(|e| e.to_string())
    });
  }

  fn tick(&mut self) {
    match self.page.poll() {
      Some(Settled::Success) => {
        if let Some(page) = self.page.data() {
          // Adopt the total learned from this fetch
          self.page_state = page.state;
          let selection = if page.posts.is_empty() { None } else { Some(0) };
          self.list_state.select(selection);
        }
      }
      Some(Settled::Error(e)) => {
        // Go back to the window that is still on screen
        if let Some(page) = self.page.data() {
          self.page_state = page.state;
        }
        self.report_error("page load failed", e);
      }
      None => {}
    }

    let mut failures = Vec::new();
    for (post_id, query) in self.comments.iter_mut() {
      if let Some(Settled::Error(e)) = query.poll() {
        failures.push((*post_id, e));
      }
    }
    for (post_id, e) in failures {
      self.report_error(&format!("comments for post {} failed", post_id), e);
    }
  }

  /// The single place load errors end up: log it and show it, leave the rest of
  /// the screen as it was.
  fn report_error(&mut self, context: &str, message: String) {
    error!(error = %message, "{}", context);
    self.status = Some(format!("{}: {}", context, message));
  }

  // ==========================================================================
  // Input
  // ==========================================================================

  fn handle_key(&mut self, key: KeyEvent) {
    match key.code {
      KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
      KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
        self.should_quit = true;
      }
      KeyCode::Char('n') | KeyCode::Right => self.next_page(),
      KeyCode::Char('p') | KeyCode::Left => self.prev_page(),
      KeyCode::Char('g') | KeyCode::Home => self.go_to_page(self.page_state.go_to_page(1)),
      KeyCode::Char('G') | KeyCode::End => {
        if self.page_state.total.is_some() {
          self.go_to_page(self.page_state.last_page());
        }
      }
      KeyCode::Char('j') | KeyCode::Down => self.list_state.select_next(),
      KeyCode::Char('k') | KeyCode::Up => self.list_state.select_previous(),
      KeyCode::Char('c') | KeyCode::Enter => {
        if let Some(post_id) = self.selected_post().map(|post| post.id) {
          self.load_comments(post_id);
        }
      }
      KeyCode::Char('r') => self.reload_page(),
      KeyCode::Char('x') => self.status = None,
      _ => {}
    }
  }

  // ==========================================================================
  // Accessors for rendering
  // ==========================================================================

  pub fn base_url(&self) -> &str {
    self.client.endpoints().base().as_str()
  }

  pub fn page_state(&self) -> &PageState {
    &self.page_state
  }

  pub fn page_query(&self) -> &Query<Page> {
    &self.page
  }

  /// The page load and the list selection, borrowed together for rendering.
  pub fn post_list_parts(&mut self) -> (&Query<Page>, &mut ListState) {
    (&self.page, &mut self.list_state)
  }

  pub fn selected_post(&self) -> Option<&Post> {
    let index = self.list_state.selected()?;
    self.page.data()?.posts.get(index)
  }

  pub fn comments_for(&self, post_id: u64) -> Option<&Query<Vec<Comment>>> {
    self.comments.get(&post_id)
  }

  pub fn status(&self) -> Option<&str> {
    self.status.as_deref()
  }
}
