use chrono::Utc;
use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

use crate::cache::CacheSource;
use crate::pagination::PageState;

use super::utils::format_age;

/// Draw the header bar with host, page position, and data source
pub fn draw_header(
  frame: &mut Frame,
  area: Rect,
  base_url: &str,
  state: &PageState,
  source: Option<CacheSource>,
  loading: bool,
) {
  let separator = || Span::styled("│", Style::default().fg(Color::DarkGray));

  let mut spans = vec![
    Span::styled(" postpager ", Style::default().fg(Color::Cyan).bold()),
    separator(),
    Span::styled(
      format!(" {} ", extract_domain(base_url)),
      Style::default().fg(Color::White),
    ),
    separator(),
    Span::styled(
      format!(" {} ", page_label(state)),
      Style::default().fg(Color::Yellow).bold(),
    ),
  ];

  let source_label = match source {
    Some(CacheSource::Network) => Some(("network".to_string(), Color::Green)),
    Some(CacheSource::Cache { cached_at }) => Some((
      format!("cached {}", format_age(cached_at, Utc::now())),
      Color::Magenta,
    )),
    None => None,
  };
  if let Some((label, color)) = source_label {
    spans.push(separator());
    spans.push(Span::styled(format!(" {} ", label), Style::default().fg(color)));
  }

  if loading {
    spans.push(Span::styled(" loading...", Style::default().fg(Color::DarkGray)));
  }

  let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Black));

  frame.render_widget(paragraph, area);
}

/// "page 2/3", or just "page 2" before the total is known
fn page_label(state: &PageState) -> String {
  match state.page_count() {
    Some(count) => format!("page {}/{}", state.current_page(), count),
    None => format!("page {}", state.current_page()),
  }
}

/// Extract the host from the API base URL
fn extract_domain(url: &str) -> &str {
  url
    .strip_prefix("https://")
    .or_else(|| url.strip_prefix("http://"))
    .unwrap_or(url)
    .split('/')
    .next()
    .unwrap_or(url)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_extract_domain() {
    assert_eq!(
      extract_domain("https://jsonplaceholder.typicode.com/"),
      "jsonplaceholder.typicode.com"
    );
    assert_eq!(extract_domain("http://localhost:8080/api/"), "localhost:8080");
  }

  #[test]
  fn test_page_label() {
    let state = PageState::new(10).go_to_page(2);
    assert_eq!(page_label(&state), "page 2");
    assert_eq!(page_label(&state.with_total(25)), "page 2/3");
  }
}
