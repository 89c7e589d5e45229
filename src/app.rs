use crate::commands::{self, Invocation};
use crate::config::Config;
use crate::event::{Event, EventHandler};
use crate::github::CachedGithubClient;
use crate::ui;
use crate::ui::components::{CommandEvent, CommandInput, KeyResult};
use crate::ui::renderfns::extract_domain;
use crate::ui::view::{ShortcutInfo, View, ViewAction};
use crate::ui::views::{IssueListView, RepositoryListView};
use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{
  disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::prelude::*;
use std::io::stdout;
use std::time::Duration;
use tracing::{info, warn};

/// Main application state
pub struct App {
  /// Navigation stack - root is always at index 0
  view_stack: Vec<Box<dyn View>>,

  command: CommandInput,

  config: Config,

  /// Shared by every view, so all lists see one entity store
  client: CachedGithubClient,

  /// Last command that could not be run
  command_error: Option<String>,

  should_quit: bool,
}

impl App {
  /// Opens on `repository`'s issues if given, otherwise on the viewer's
  /// repositories.
  pub fn new(config: Config, repository: Option<(String, String)>) -> Result<Self> {
    let client = CachedGithubClient::new(&config)?;
    let root: Box<dyn View> = match repository {
      Some((owner, name)) => Box::new(IssueListView::new(client.clone(), &owner, &name)),
      None => Box::new(RepositoryListView::new(client.clone())),
    };

    Ok(Self {
      view_stack: vec![root],
      command: CommandInput::new(),
      config,
      client,
      command_error: None,
      should_quit: false,
    })
  }

  pub async fn run(&mut self) -> Result<()> {
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let result = self.event_loop().await;

    // Restore the terminal even if the loop failed
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;
    result
  }

  async fn event_loop(&mut self) -> Result<()> {
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;
    let mut events = EventHandler::new(Duration::from_millis(100));

    while !self.should_quit {
      terminal.draw(|frame| ui::draw(frame, self))?;

      match events.next().await {
        Some(event) => self.handle_event(event),
        None => break,
      }
    }
    info!("exiting");
    Ok(())
  }

  fn handle_event(&mut self, event: Event) {
    match event {
      Event::Key(key) => self.handle_key(key),
      Event::Tick => {
        // Fold finished requests before the views poll them
        self.client.apply_effects();
        for view in &mut self.view_stack {
          view.tick();
        }
      }
    }
  }

  fn handle_key(&mut self, key: KeyEvent) {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
      self.should_quit = true;
      return;
    }

    let editing = self.view_stack.last().is_some_and(|v| v.is_editing());
    if !editing {
      match self.command.handle_key(key) {
        KeyResult::Handled => return,
        KeyResult::Event(CommandEvent::Submitted(line)) => {
          self.execute(&line);
          return;
        }
        KeyResult::Event(CommandEvent::Cancelled) => return,
        KeyResult::NotHandled => {}
      }
    }

    let action = match self.view_stack.last_mut() {
      Some(view) => view.handle_key(key),
      None => ViewAction::None,
    };
    match action {
      ViewAction::None => {}
      ViewAction::Push(view) => self.view_stack.push(view),
      ViewAction::Pop => {
        if self.view_stack.len() > 1 {
          self.view_stack.pop();
        } else {
          self.should_quit = true;
        }
      }
    }
  }

  fn execute(&mut self, line: &str) {
    self.command_error = None;
    match commands::parse(line, self.config.default_repository.as_deref()) {
      Ok(Invocation::Repositories) => {
        self.replace_root(Box::new(RepositoryListView::new(self.client.clone())));
      }
      Ok(Invocation::Issues { owner, name }) => {
        self.replace_root(Box::new(IssueListView::new(self.client.clone(), &owner, &name)));
      }
      Ok(Invocation::Quit) => self.should_quit = true,
      Err(e) => {
        warn!(command = line, error = %e, "command failed");
        self.command_error = Some(e);
      }
    }
  }

  fn replace_root(&mut self, view: Box<dyn View>) {
    info!(view = %view.breadcrumb_label(), "switch root view");
    self.view_stack.clear();
    self.view_stack.push(view);
  }

  // Accessors for UI rendering

  pub fn current_view_mut(&mut self) -> Option<&mut Box<dyn View>> {
    self.view_stack.last_mut()
  }

  pub fn command_input(&self) -> &CommandInput {
    &self.command
  }

  pub fn title(&self) -> &str {
    self
      .config
      .title
      .as_deref()
      .unwrap_or_else(|| extract_domain(&self.config.github.url))
  }

  pub fn context(&self) -> String {
    self
      .view_stack
      .last()
      .and_then(|v| v.context())
      .unwrap_or_default()
  }

  pub fn shortcuts(&self) -> Vec<ShortcutInfo> {
    self
      .view_stack
      .last()
      .map(|v| v.shortcuts())
      .unwrap_or_default()
  }

  pub fn status(&self) -> Option<String> {
    self
      .command_error
      .clone()
      .or_else(|| self.view_stack.last().and_then(|v| v.status()))
  }

  pub fn view_breadcrumb(&self) -> Vec<String> {
    self
      .view_stack
      .iter()
      .map(|v| v.breadcrumb_label())
      .collect()
  }
}
