mod renderfns;
mod views;

use crate::app::App;
use ratatui::prelude::*;
use ratatui::widgets::ListState;

/// Main draw function
pub fn draw(frame: &mut Frame, app: &mut App) {
  let chunks = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(1), // Header
      Constraint::Length(1), // Pagination (top)
      Constraint::Min(1),    // Main content
      Constraint::Length(1), // Pagination (bottom)
      Constraint::Length(1), // Status bar
    ])
    .split(frame.area());

  let state = *app.page_state();
  let source = app.page_query().data().map(|page| page.source);

  renderfns::draw_header(
    frame,
    chunks[0],
    app.base_url(),
    &state,
    source,
    app.page_query().is_loading(),
  );
  renderfns::draw_pagination(frame, chunks[1], &state);
  renderfns::draw_pagination(frame, chunks[3], &state);

  let columns = Layout::default()
    .direction(Direction::Horizontal)
    .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
    .split(chunks[2]);

  {
    let (query, list_state) = app.post_list_parts();
    views::draw_post_list(frame, columns[0], query, &state, list_state);
  }

  let post = app.selected_post();
  let author = post.and_then(|post| {
    app
      .page_query()
      .data()
      .and_then(|page| page.author_of(post))
  });
  let comments = post.and_then(|post| app.comments_for(post.id));
  views::draw_post_detail(frame, columns[1], post, author, comments);

  renderfns::draw_footer(frame, chunks[4], app.status());
}

/// Keep the list selection inside `0..len`.
pub fn ensure_valid_selection(list_state: &mut ListState, len: usize) {
  match list_state.selected() {
    _ if len == 0 => list_state.select(None),
    None => list_state.select(Some(0)),
    Some(i) if i >= len => list_state.select(Some(len - 1)),
    Some(_) => {}
  }
}
