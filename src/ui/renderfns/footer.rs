use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

const HINTS: &[(&str, &str)] = &[
  ("n/p", "page"),
  ("g/G", "first/last"),
  ("j/k", "select"),
  ("c", "comments"),
  ("r", "reload"),
  ("q", "quit"),
];

/// Draw the status bar: the last error if there is one, key hints otherwise
pub fn draw_footer(frame: &mut Frame, area: Rect, status: Option<&str>) {
  let line = match status {
    Some(message) => Line::from(vec![
      Span::styled(" error ", Style::default().fg(Color::Black).bg(Color::Red)),
      Span::styled(format!(" {}", message), Style::default().fg(Color::Red)),
      Span::styled("  <x> dismiss", Style::default().fg(Color::DarkGray)),
    ]),
    None => {
      let mut spans = vec![Span::raw(" ")];
      for (key, label) in HINTS {
        spans.push(Span::styled(format!("<{}>", key), Style::default().fg(Color::Cyan)));
        spans.push(Span::styled(
          format!(" {}   ", label),
          Style::default().fg(Color::DarkGray),
        ));
      }
      Line::from(spans)
    }
  };

  let paragraph = Paragraph::new(line).style(Style::default().bg(Color::Black));
  frame.render_widget(paragraph, area);
}
