//! Client-side pagination over a fully fetched collection.
//!
//! Page transitions are pure: every operation takes a `PageState` by value and
//! returns the next one. The page controller in `app` owns the current state.

/// Default number of items per page.
pub const DEFAULT_PER_PAGE: usize = 10;

/// The visible window over the post list.
///
/// `first` and `last` are 1-based and inclusive. `total` stays `None` until the
/// first successful fetch; nothing that depends on the page count should be
/// shown before then.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageState {
  pub first: usize,
  pub last: usize,
  pub per_page: usize,
  pub total: Option<usize>,
}

impl Default for PageState {
  fn default() -> Self {
    Self::new(DEFAULT_PER_PAGE)
  }
}

impl PageState {
  /// State for page 1 with the given window size (at least 1).
  pub fn new(per_page: usize) -> Self {
    let per_page = per_page.max(1);
    Self {
      first: 1,
      last: per_page,
      per_page,
      total: None,
    }
  }

  /// Move the window to `page`. Page 0 is treated as page 1.
  ///
  /// Pages past the end are allowed and produce an empty slice. The page is
  /// capped so that `last` still fits in a `usize`.
  pub fn go_to_page(self, page: usize) -> Self {
    let page = page.clamp(1, usize::MAX / self.per_page);
    Self {
      first: (page - 1) * self.per_page + 1,
      last: page * self.per_page,
      ..self
    }
  }

  /// Record the size of the full collection after a fetch.
  pub fn with_total(self, total: usize) -> Self {
    Self {
      total: Some(total),
      ..self
    }
  }

  /// `ceil(total / per_page)`, once the total is known.
  pub fn page_count(&self) -> Option<usize> {
    self.total.map(|total| total.div_ceil(self.per_page))
  }

  /// `ceil(first / per_page)`.
  pub fn current_page(&self) -> usize {
    self.first.div_ceil(self.per_page)
  }

  /// Whether the window lies past the last item.
  pub fn is_past_end(&self) -> bool {
    self.total.is_some_and(|total| self.first > total)
  }

  pub fn next_page(self) -> Self {
    self.go_to_page(self.current_page().saturating_add(1))
  }

  /// Previous page, staying on page 1.
  pub fn prev_page(self) -> Self {
    self.go_to_page(self.current_page().saturating_sub(1))
  }

  /// Last page, or the current one while the total is unknown.
  pub fn last_page(self) -> Self {
    match self.page_count() {
      Some(count) => self.go_to_page(count),
      None => self,
    }
  }

  /// The `[first-1, last)` slice of `items`, cut short at the end.
  pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
    let start = (self.first - 1).min(items.len());
    let end = self.last.min(items.len());
    &items[start..end]
  }
}
