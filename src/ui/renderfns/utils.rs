use ratatui::prelude::Color;

/// Truncate a string to at most `max_len` characters, adding "..." if truncated
pub fn truncate(s: &str, max_len: usize) -> String {
  if s.chars().count() <= max_len {
    s.to_string()
  } else {
    let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
    format!("{}...", kept)
  }
}

/// Display color for a GitHub issue state
pub fn state_color(state: &str) -> Color {
  match state {
    "OPEN" => Color::Green,
    "CLOSED" => Color::Magenta,
    _ => Color::White,
  }
}

/// Strip tags from a GitHub `*HTML` field for one-line display.
pub fn plain_text(html: &str) -> String {
  let mut out = String::with_capacity(html.len());
  let mut in_tag = false;
  for c in html.chars() {
    match c {
      '<' => in_tag = true,
      '>' if in_tag => {
        in_tag = false;
        out.push(' ');
      }
      _ if !in_tag => out.push(c),
      _ => {}
    }
  }
  let text = out
    .replace("&amp;", "&")
    .replace("&lt;", "<")
    .replace("&gt;", ">")
    .replace("&quot;", "\"")
    .replace("&#39;", "'");
  text.split_whitespace().collect::<Vec<_>>().join(" ")
}
