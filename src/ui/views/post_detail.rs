use crate::api::{Comment, Post, User};
use crate::query::{Query, QueryState};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

/// Draw the selected post, its author, and its comments once loaded
pub fn draw_post_detail(
  frame: &mut Frame,
  area: Rect,
  post: Option<&Post>,
  author: Option<&User>,
  comments: Option<&Query<Vec<Comment>>>,
) {
  let block = Block::default()
    .title(" Post ")
    .title_alignment(Alignment::Center)
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::Blue));

  let inner = block.inner(area);
  frame.render_widget(block, area);

  let Some(post) = post else {
    let paragraph = Paragraph::new("No post selected.").style(Style::default().fg(Color::DarkGray));
    frame.render_widget(paragraph, inner);
    return;
  };

  let mut lines = vec![
    Line::from(Span::styled(
      format!("{}: {}", post.id, post.title),
      Style::default().fg(Color::White).bold(),
    )),
    Line::from(vec![
      Span::styled("by ", Style::default().fg(Color::DarkGray)),
      Span::styled(
        author.map(author_label).unwrap_or_else(|| "…".to_string()),
        Style::default().fg(Color::Yellow),
      ),
    ]),
    Line::raw(""),
  ];
  lines.extend(post.body.lines().map(|l| Line::raw(l.to_string())));
  lines.push(Line::raw(""));
  lines.extend(comment_lines(comments));

  let paragraph = Paragraph::new(lines).wrap(Wrap { trim: true });
  frame.render_widget(paragraph, inner);
}

fn author_label(user: &User) -> String {
  if user.name.is_empty() {
    user.username.clone()
  } else {
    format!("{} ({})", user.username, user.name)
  }
}

fn comment_lines(comments: Option<&Query<Vec<Comment>>>) -> Vec<Line<'static>> {
  let heading = |text: String| {
    Line::from(Span::styled(
      text,
      Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
    ))
  };

  let Some(query) = comments else {
    return vec![Line::from(Span::styled(
      "Press 'c' to load comments.",
      Style::default().fg(Color::DarkGray),
    ))];
  };

  match query.state() {
    QueryState::Idle => Vec::new(),
    QueryState::Loading => vec![heading("Comments (loading...)".to_string())],
    QueryState::Error(e) => vec![
      heading("Comments".to_string()),
      Line::from(Span::styled(
        format!("Error: {} (press 'c' to retry)", e),
        Style::default().fg(Color::Red),
      )),
    ],
    QueryState::Success(comments) => {
      let mut lines = vec![heading(format!("Comments ({})", comments.len()))];
      for comment in comments {
        lines.push(Line::raw(""));
        lines.push(Line::from(vec![
          Span::styled(comment.email.clone(), Style::default().fg(Color::Green)),
          Span::styled(
            format!("  #{}", comment.id),
            Style::default().fg(Color::DarkGray),
          ),
        ]));
        lines.extend(comment.body.lines().map(|l| Line::raw(l.to_string())));
      }
      lines
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  fn user(value: serde_json::Value) -> User {
    serde_json::from_value(value).unwrap()
  }

  #[test]
  fn test_author_label() {
    assert_eq!(
      author_label(&user(json!({"id": 1, "username": "Bret", "name": "Leanne Graham"}))),
      "Bret (Leanne Graham)"
    );
    assert_eq!(author_label(&user(json!({"id": 2, "username": "Antonette"}))), "Antonette");
  }

  #[test]
  fn test_comment_lines_before_loading() {
    let lines = comment_lines(None);
    assert_eq!(lines.len(), 1);
  }
}
