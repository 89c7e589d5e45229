use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};

use crate::github::{CachedGithubClient, Repository};
use crate::lists::RepositoryList;
use crate::ui::ensure_valid_selection;
use crate::ui::renderfns::{plain_text, truncate};
use crate::ui::view::{ShortcutInfo, View, ViewAction};
use crate::ui::views::IssueListView;

/// The viewer's repositories
pub struct RepositoryListView {
  list: RepositoryList,
  list_state: ListState,
}

impl RepositoryListView {
  pub fn new(client: CachedGithubClient) -> Self {
    Self {
      list: RepositoryList::new(client),
      list_state: ListState::default(),
    }
  }

  fn selected(&self) -> Option<Repository> {
    let idx = self.list_state.selected()?;
    self.list.repositories().into_iter().nth(idx)
  }

  fn select_next(&mut self) {
    let len = self.list.repositories().len();
    let at_end = self.list_state.selected().is_some_and(|i| i + 1 >= len);
    if at_end && self.list.trigger_load_more() {
      return;
    }
    self.list_state.select_next();
  }

  fn title(&self) -> String {
    let Some(live) = self.list.live() else {
      return " Repositories ".to_string();
    };
    if live.is_loading() {
      return " Repositories (loading...) ".to_string();
    }
    if let Some(e) = live.error() {
      return format!(" Repositories (error: {}) ", e);
    }
    let len = live.state().map(|s| s.len()).unwrap_or(0);
    let more = if live.is_loading_more() {
      " loading more..."
    } else if live.can_load_more() {
      "+"
    } else {
      ""
    };
    format!(" Repositories ({}{}) ", len, more)
  }

  fn render_list(&mut self, frame: &mut Frame, area: Rect) {
    let repositories = self.list.repositories();
    ensure_valid_selection(&mut self.list_state, repositories.len());

    let block = Block::default()
      .title(self.title())
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));

    let loading = self.list.live().is_some_and(|l| l.is_loading());
    if repositories.is_empty() && !loading {
      let content = if self.list.live().and_then(|l| l.error()).is_some() {
        "Failed to load repositories. Press 'r' to retry."
      } else {
        "No repositories found."
      };
      let paragraph = Paragraph::new(content)
        .block(block)
        .style(Style::default().fg(Color::DarkGray));
      frame.render_widget(paragraph, area);
      return;
    }

    let items: Vec<ListItem> = repositories
      .iter()
      .map(|repo| {
        let (star, star_style) = if self.list.is_star_pending(&repo.id) {
          ("…", Style::default().fg(Color::DarkGray))
        } else if repo.viewer_has_starred {
          ("★", Style::default().fg(Color::Yellow))
        } else {
          ("☆", Style::default().fg(Color::DarkGray))
        };
        let language = repo
          .primary_language
          .as_ref()
          .map(|l| l.name.as_str())
          .unwrap_or("");
        let description = repo
          .description_html
          .as_deref()
          .map(plain_text)
          .unwrap_or_default();

        let line = Line::from(vec![
          Span::styled(format!("{} ", star), star_style),
          Span::styled(
            format!("{:<32}", truncate(&repo.full_name(), 32)),
            Style::default().fg(Color::Cyan),
          ),
          Span::styled(
            format!("{:>7} ", repo.stargazers.total_count),
            Style::default().fg(Color::Yellow),
          ),
          Span::styled(
            format!("{:<12}", truncate(language, 12)),
            Style::default().fg(Color::Green),
          ),
          Span::raw(truncate(&description, 60)),
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
}

impl View for RepositoryListView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    match key.code {
      KeyCode::Char('j') | KeyCode::Down => self.select_next(),
      KeyCode::Char('k') | KeyCode::Up => self.list_state.select_previous(),
      KeyCode::Char('m') => {
        self.list.trigger_load_more();
      }
      KeyCode::Char('r') => {
        self.list.refresh();
      }
      KeyCode::Char('s') => {
        if let Some(repo) = self.selected() {
          self
            .list
            .trigger_star_toggle(&repo.id, repo.viewer_has_starred);
        }
      }
      KeyCode::Enter => {
        if let Some(repo) = self.selected() {
          if let Some(owner) = &repo.owner {
            return ViewAction::Push(Box::new(IssueListView::new(
              self.list.client().clone(),
              &owner.login,
              &repo.name,
            )));
          }
        }
      }
      KeyCode::Char('q') | KeyCode::Esc => return ViewAction::Pop,
      _ => {}
    }
    ViewAction::None
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    self.render_list(frame, area);
  }

  fn breadcrumb_label(&self) -> String {
    "Repositories".to_string()
  }

  fn context(&self) -> Option<String> {
    self
      .list
      .repositories()
      .first()
      .and_then(|r| r.owner.as_ref())
      .map(|o| o.login.clone())
  }

  fn tick(&mut self) {
    self.list.tick();
  }

  fn status(&self) -> Option<String> {
    self
      .list
      .star_error()
      .map(|e| format!("star failed: {}", e))
      .or_else(|| {
        self
          .list
          .live()
          .and_then(|l| l.more_error())
          .map(|e| format!("load more failed: {}", e))
      })
  }

  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    vec![
      ShortcutInfo::new(":", "command").with_priority(10),
      ShortcutInfo::new("s", "star").with_priority(20),
      ShortcutInfo::new("m", "more").with_priority(25),
      ShortcutInfo::new("r", "refresh").with_priority(28),
      ShortcutInfo::new("enter", "issues").with_priority(29),
      ShortcutInfo::new("q", "back").with_priority(30),
    ]
  }
}
