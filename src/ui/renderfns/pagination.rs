use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

use crate::pagination::PageState;

/// Most page numbers shown before the bar starts eliding.
const MAX_SLOTS: usize = 11;

/// One slot in the pagination bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
  Page(usize),
  Gap,
}

/// Draw the row of page numbers with the current page highlighted.
///
/// Draws nothing while the total is unknown.
pub fn draw_pagination(frame: &mut Frame, area: Rect, state: &PageState) {
  let Some(count) = state.page_count() else {
    return;
  };
  let current = state.current_page();

  let mut spans = vec![Span::raw(" ")];
  for slot in page_slots(current, count, MAX_SLOTS) {
    match slot {
      Slot::Page(n) if n == current => spans.push(Span::styled(
        format!("[{}]", n),
        Style::default().fg(Color::Black).bg(Color::Cyan).bold(),
      )),
      Slot::Page(n) => spans.push(Span::styled(
        format!(" {} ", n),
        Style::default().fg(Color::White),
      )),
      Slot::Gap => spans.push(Span::styled(" … ", Style::default().fg(Color::DarkGray))),
    }
  }

  let paragraph = Paragraph::new(Line::from(spans)).alignment(Alignment::Center);
  frame.render_widget(paragraph, area);
}

/// Page numbers to show for `count` pages, keeping the first, the last and a
/// window around `current` when there are more than `max` pages.
pub fn page_slots(current: usize, count: usize, max: usize) -> Vec<Slot> {
  if count <= max {
    return (1..=count).map(Slot::Page).collect();
  }

  // first, gap, window, gap, last
  let window = max.saturating_sub(4).max(1);
  let half = window / 2;
  let start = current
    .saturating_sub(half)
    .clamp(2, count.saturating_sub(window).max(2));
  let end = (start + window - 1).min(count - 1);

  let mut slots = vec![Slot::Page(1)];
  if start > 2 {
    slots.push(Slot::Gap);
  }
  slots.extend((start..=end).map(Slot::Page));
  if end < count - 1 {
    slots.push(Slot::Gap);
  }
  slots.push(Slot::Page(count));
  slots
}

#[cfg(test)]
mod tests {
  use super::*;

  fn pages(slots: &[Slot]) -> Vec<usize> {
    slots
      .iter()
      .filter_map(|s| match s {
        Slot::Page(n) => Some(*n),
        Slot::Gap => None,
      })
      .collect()
  }

  #[test]
  fn test_few_pages_shows_all() {
    assert_eq!(
      page_slots(2, 3, 11),
      vec![Slot::Page(1), Slot::Page(2), Slot::Page(3)]
    );
  }

  #[test]
  fn test_no_pages() {
    assert!(page_slots(1, 0, 11).is_empty());
  }

  #[test]
  fn test_window_in_the_middle() {
    let slots = page_slots(50, 100, 11);
    assert_eq!(slots.first(), Some(&Slot::Page(1)));
    assert_eq!(slots.last(), Some(&Slot::Page(100)));
    assert_eq!(slots.iter().filter(|s| **s == Slot::Gap).count(), 2);
    assert!(pages(&slots).contains(&50));
    assert!(slots.len() <= 11);
  }

  #[test]
  fn test_window_at_start() {
    let slots = page_slots(1, 100, 11);
    assert_eq!(&slots[..3], &[Slot::Page(1), Slot::Page(2), Slot::Page(3)]);
    assert_eq!(slots.iter().filter(|s| **s == Slot::Gap).count(), 1);
  }

  #[test]
  fn test_window_at_end() {
    let slots = page_slots(100, 100, 11);
    assert!(pages(&slots).contains(&99));
    assert_eq!(slots.last(), Some(&Slot::Page(100)));
    assert_eq!(slots.iter().filter(|s| **s == Slot::Gap).count(), 1);
  }

  #[test]
  fn test_current_past_end_still_renders() {
    let slots = page_slots(150, 100, 11);
    assert_eq!(slots.last(), Some(&Slot::Page(100)));
  }
}
