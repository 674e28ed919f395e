use chrono::{DateTime, Utc};

/// Truncate a string to a maximum number of characters, adding "..." if truncated
pub fn truncate(s: &str, max_len: usize) -> String {
  if s.chars().count() <= max_len {
    s.to_string()
  } else {
    let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
    format!("{}...", kept)
  }
}

/// Human-readable age of a cache entry, e.g. "3m ago"
pub fn format_age(cached_at: DateTime<Utc>, now: DateTime<Utc>) -> String {
  let secs = (now - cached_at).num_seconds().max(0);
  match secs {
    0..=59 => "just now".to_string(),
    60..=3599 => format!("{}m ago", secs / 60),
    3600..=86_399 => format!("{}h ago", secs / 3600),
    _ => format!("{}d ago", secs / 86_400),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::Duration;

  #[test]
  fn test_truncate_short_string() {
    assert_eq!(truncate("hello", 10), "hello");
  }

  #[test]
  fn test_truncate_exact_length() {
    assert_eq!(truncate("hello", 5), "hello");
  }

  #[test]
  fn test_truncate_long_string() {
    assert_eq!(truncate("hello world", 8), "hello...");
  }

  #[test]
  fn test_truncate_multibyte() {
    assert_eq!(truncate("héllo wörld", 8), "héllo...");
  }

  #[test]
  fn test_format_age() {
    let now = Utc::now();
    assert_eq!(format_age(now - Duration::seconds(5), now), "just now");
    assert_eq!(format_age(now - Duration::minutes(3), now), "3m ago");
    assert_eq!(format_age(now - Duration::hours(2), now), "2h ago");
    assert_eq!(format_age(now - Duration::days(4), now), "4d ago");
  }

  #[test]
  fn test_format_age_future_is_now() {
    let now = Utc::now();
    assert_eq!(format_age(now + Duration::minutes(1), now), "just now");
  }
}
