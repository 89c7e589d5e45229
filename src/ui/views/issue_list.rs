use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap};

use crate::filter::IssueFilter;
use crate::github::{CachedGithubClient, Issue};
use crate::lists::{CommentStatus, IssueList};
use crate::ui::components::{InputResult, TextInput};
use crate::ui::ensure_valid_selection;
use crate::ui::renderfns::{plain_text, state_color, truncate};
use crate::ui::view::{ShortcutInfo, View, ViewAction};

/// Which part of the view receives navigation keys
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Focus {
  Toggle,
  List,
}

/// Issues of one repository behind the open/closed/hidden toggle
pub struct IssueListView {
  list: IssueList,
  list_state: ListState,
  focus: Focus,
  composer: Option<TextInput>,
  composer_error: Option<String>,
  notice: Option<String>,
}

impl IssueListView {
  pub fn new(client: CachedGithubClient, owner: &str, name: &str) -> Self {
    Self {
      list: IssueList::new(client, owner, name),
      list_state: ListState::default(),
      focus: Focus::List,
      composer: None,
      composer_error: None,
      notice: None,
    }
  }

  fn selected(&self) -> Option<Issue> {
    let idx = self.list_state.selected()?;
    self.list.issues().into_iter().nth(idx)
  }

  fn set_focus(&mut self, focus: Focus) {
    if self.focus == focus {
      return;
    }
    self.focus = focus;
    if focus == Focus::Toggle {
      // Focusing the toggle is the hover that warms the next list
      self.list.trigger_hover();
    }
  }

  fn activate_toggle(&mut self) {
    self.list.trigger_filter_transition();
    self.list_state.select(None);
    self.notice = None;
  }

  fn select_next(&mut self) {
    let len = self.list.issues().len();
    let at_end = self.list_state.selected().is_some_and(|i| i + 1 >= len);
    if at_end && self.list.trigger_load_more() {
      return;
    }
    self.list_state.select_next();
  }

  fn handle_composer_key(&mut self, key: KeyEvent) {
    let Some(composer) = self.composer.as_mut() else {
      return;
    };
    match composer.handle_key(key) {
      InputResult::Submitted(body) => {
        let Some(issue) = self.selected() else {
          self.composer_error = Some("No issue selected".to_string());
          return;
        };
        self.composer_error = match comment_rejection(self.list.comment_status(), &body) {
          Some(reason) => Some(reason.to_string()),
          None if self.list.add_comment(&issue.id, &body) => None,
          None => Some("Comment not sent".to_string()),
        };
      }
      InputResult::Cancelled => {
        self.composer = None;
        self.composer_error = None;
      }
      InputResult::Consumed | InputResult::NotHandled => {}
    }
  }

  fn render_toggle(&self, frame: &mut Frame, area: Rect) {
    let focused = self.focus == Focus::Toggle;
    let style = if focused {
      Style::default().fg(Color::Black).bg(Color::Cyan).bold()
    } else {
      Style::default().fg(Color::Cyan)
    };
    let line = Line::from(vec![
      Span::raw(" "),
      Span::styled(format!("[ {} ]", self.list.filter().transition_label()), style),
      Span::styled(
        format!("  showing: {}", self.list.filter().label()),
        Style::default().fg(Color::DarkGray),
      ),
    ]);
    frame.render_widget(Paragraph::new(line), area);
  }

  fn title(&self) -> String {
    let repo = self.list.full_name();
    let Some(live) = self.list.live() else {
      return format!(" Issues [{}] ", repo);
    };
    let state = self.list.filter().label();
    if live.is_loading() {
      return format!(" {} issues [{}] (loading...) ", state, repo);
    }
    if let Some(e) = live.error() {
      return format!(" {} issues [{}] (error: {}) ", state, repo, e);
    }
    let len = live.state().map(|s| s.len()).unwrap_or(0);
    let more = if live.is_loading_more() {
      " loading more..."
    } else if live.can_load_more() {
      "+"
    } else {
      ""
    };
    format!(" {} issues [{}] ({}{}) ", state, repo, len, more)
  }

  fn render_list(&mut self, frame: &mut Frame, area: Rect, issues: &[Issue]) {
    ensure_valid_selection(&mut self.list_state, issues.len());

    let border = if self.focus == Focus::List {
      Color::Blue
    } else {
      Color::DarkGray
    };
    let block = Block::default()
      .title(self.title())
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(border));

    let live = self.list.live();
    let loading = live.is_some_and(|l| l.is_loading());
    if issues.is_empty() && !loading {
      let content = match (self.list.filter(), live.and_then(|l| l.error())) {
        (IssueFilter::None, _) => "Issues hidden. Tab to the toggle and press Enter (or f).",
        (_, Some(_)) => "Failed to load issues. Press 'r' to retry.",
        (IssueFilter::Open, None) => "No open issues.",
        (IssueFilter::Closed, None) => "No closed issues.",
      };
      let paragraph = Paragraph::new(content)
        .block(block)
        .style(Style::default().fg(Color::DarkGray));
      frame.render_widget(paragraph, area);
      return;
    }

    let items: Vec<ListItem> = issues
      .iter()
      .map(|issue| {
        let line = Line::from(vec![
          Span::styled(
            format!("#{:<7}", issue.number),
            Style::default().fg(Color::Cyan),
          ),
          Span::styled(
            format!("{:<8}", issue.state.to_lowercase()),
            Style::default().fg(state_color(&issue.state)),
          ),
          Span::raw(truncate(&issue.title, 72)),
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

    frame.render_stateful_widget(list, area, &mut self.list_state);
  }

  fn render_preview(&self, frame: &mut Frame, area: Rect, issue: Option<&Issue>) {
    let block = Block::default()
      .borders(Borders::TOP)
      .border_style(Style::default().fg(Color::DarkGray));
    let text = match issue {
      Some(issue) => {
        let body = issue
          .body_html
          .as_deref()
          .map(plain_text)
          .filter(|b| !b.is_empty())
          .unwrap_or_else(|| "No description provided.".to_string());
        format!("{}\n{}", issue.url, body)
      }
      None => String::new(),
    };
    let paragraph = Paragraph::new(text)
      .block(block)
      .wrap(Wrap { trim: true })
      .style(Style::default().fg(Color::Gray));
    frame.render_widget(paragraph, area);
  }

  fn render_composer(&self, frame: &mut Frame, area: Rect, composer: &TextInput) {
    let title = match (self.list.comment_status(), &self.composer_error) {
      (CommentStatus::Sending, _) => " Comment (sending...) ".to_string(),
      (_, Some(e)) => format!(" Comment (error: {}) ", e),
      _ => " Comment (Enter to send, Esc to cancel) ".to_string(),
    };
    let block = Block::default()
      .title(title)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Yellow));
    let line = Line::from(vec![
      Span::raw(composer.value()),
      Span::styled("_", Style::default().fg(Color::Yellow)),
    ]);
    frame.render_widget(Paragraph::new(line).block(block), area);
  }
}

/// Why a composer submission cannot be sent right now
fn comment_rejection(status: &CommentStatus, body: &str) -> Option<&'static str> {
  if body.trim().is_empty() {
    Some("Comment is empty")
  } else if *status == CommentStatus::Sending {
    Some("Comment already sending")
  } else {
    None
  }
}

impl View for IssueListView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    if self.composer.is_some() {
      self.handle_composer_key(key);
      return ViewAction::None;
    }

    match key.code {
      KeyCode::Tab | KeyCode::BackTab => {
        let next = match self.focus {
          Focus::List => Focus::Toggle,
          Focus::Toggle => Focus::List,
        };
        self.set_focus(next);
      }
      KeyCode::Char('f') => self.activate_toggle(),
      KeyCode::Enter if self.focus == Focus::Toggle => self.activate_toggle(),
      KeyCode::Char('j') | KeyCode::Down if self.focus == Focus::List => self.select_next(),
      KeyCode::Char('k') | KeyCode::Up if self.focus == Focus::List => {
        self.list_state.select_previous()
      }
      KeyCode::Char('m') => {
        self.list.trigger_load_more();
      }
      KeyCode::Char('r') => {
        self.list.refresh();
      }
      KeyCode::Char('c') => {
        if self.selected().is_some() {
          self.composer = Some(TextInput::new());
          self.composer_error = None;
          self.notice = None;
        }
      }
      KeyCode::Char('q') | KeyCode::Esc => return ViewAction::Pop,
      _ => {}
    }
    ViewAction::None
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    let composer_height = if self.composer.is_some() { 3 } else { 0 };
    let chunks = Layout::default()
      .direction(Direction::Vertical)
      .constraints([
        Constraint::Length(1),               // Toggle
        Constraint::Min(3),                  // List
        Constraint::Length(5),               // Preview
        Constraint::Length(composer_height), // Composer
      ])
      .split(area);

    self.render_toggle(frame, chunks[0]);
    let issues = self.list.issues();
    self.render_list(frame, chunks[1], &issues);
    let selected = self.list_state.selected().and_then(|i| issues.get(i));
    self.render_preview(frame, chunks[2], selected);
    if let Some(composer) = &self.composer {
      self.render_composer(frame, chunks[3], composer);
    }
  }

  fn breadcrumb_label(&self) -> String {
    format!("Issues [{}]", self.list.full_name())
  }

  fn context(&self) -> Option<String> {
    Some(self.list.full_name())
  }

  fn tick(&mut self) {
    self.list.tick();
    match self.list.take_comment_outcome() {
      Some(Ok(comment)) => {
        self.composer = None;
        self.composer_error = None;
        self.notice = Some(format!("Comment {} added", comment.id));
      }
      Some(Err(e)) => self.composer_error = Some(e),
      None => {}
    }
  }

  fn is_editing(&self) -> bool {
    self.composer.is_some()
  }

  fn status(&self) -> Option<String> {
    self
      .list
      .live()
      .and_then(|l| l.more_error())
      .map(|e| format!("load more failed: {}", e))
      .or_else(|| self.notice.clone())
  }

  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    vec![
      ShortcutInfo::new(":", "command").with_priority(10),
      ShortcutInfo::new("tab", "focus toggle").with_priority(15),
      ShortcutInfo::new("f", "toggle").with_priority(20),
      ShortcutInfo::new("m", "more").with_priority(25),
      ShortcutInfo::new("c", "comment").with_priority(27),
      ShortcutInfo::new("r", "refresh").with_priority(28),
      ShortcutInfo::new("q", "back").with_priority(30),
    ]
  }
}
