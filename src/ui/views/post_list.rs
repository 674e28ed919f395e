use crate::api::Page;
use crate::pagination::PageState;
use crate::query::Query;
use crate::ui::ensure_valid_selection;
use crate::ui::renderfns::truncate;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};

/// Draw the posts of the current page with their authors
pub fn draw_post_list(
  frame: &mut Frame,
  area: Rect,
  query: &Query<Page>,
  state: &PageState,
  list_state: &mut ListState,
) {
  let page = query.data();
  let len = page.map(|p| p.posts.len()).unwrap_or(0);
  ensure_valid_selection(list_state, len);

  let title = match (query.state().error(), page) {
    (Some(e), None) => format!(" Posts (error: {}) ", truncate(e, 40)),
    (None, None) if query.is_loading() => " Posts (loading...) ".to_string(),
    _ => format!(" Posts {}-{} ", state.first, state.last),
  };

  let block = Block::default()
    .title(title)
    .title_alignment(Alignment::Center)
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::Blue));

  let Some(page) = page.filter(|p| !p.posts.is_empty()) else {
    let content = if query.is_loading() {
      "Loading posts...".to_string()
    } else if query.is_error() {
      "Failed to load posts. Press 'r' to retry.".to_string()
    } else if state.is_past_end() {
      format!("No posts on page {}.", state.current_page())
    } else {
      "No posts.".to_string()
    };
    let paragraph = Paragraph::new(content)
      .block(block)
      .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(paragraph, area);
    return;
  };

  let title_width = (area.width as usize).saturating_sub(24);
  let items: Vec<ListItem> = page
    .posts
    .iter()
    .map(|post| {
      let author = page
        .author_of(post)
        .map(|user| user.username.clone())
        .unwrap_or_else(|| "…".to_string());

      let line = Line::from(vec![
        Span::styled(format!("{:>4}", post.id), Style::default().fg(Color::Cyan)),
        Span::raw(" "),
        Span::styled(
          format!("{:<12}", truncate(&author, 12)),
          Style::default().fg(Color::Yellow),
        ),
        Span::raw(" "),
        Span::raw(truncate(&post.title, title_width)),
      ]);
      ListItem::new(line)
    })
    .collect();

  let list = List::new(items)
    .block(block)
    .highlight_style(
      Style::default()
        .bg(Color::DarkGray)
        .add_modifier(Modifier::BOLD),
    )
    .highlight_symbol("> ");

  frame.render_stateful_widget(list, area, list_state);
}
