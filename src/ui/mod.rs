pub mod components;
pub mod renderfns;
pub mod view;
pub mod views;

use ratatui::prelude::*;
use ratatui::widgets::ListState;

use crate::app::App;

/// Main draw function: header, current view, footer
pub fn draw(frame: &mut Frame, app: &mut App) {
  let chunks = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(1), // Header
      Constraint::Min(1),    // Current view
      Constraint::Length(1), // Footer
    ])
    .split(frame.area());

  let shortcuts = app.shortcuts();
  let context = app.context();
  renderfns::draw_header(frame, chunks[0], app.title(), &context, &shortcuts);

  let breadcrumb = app.view_breadcrumb();
  let status = app.status();
  if let Some(view) = app.current_view_mut() {
    view.render(frame, chunks[1]);
  }
  app.command_input().render_overlay(frame, chunks[1]);

  renderfns::draw_footer(frame, chunks[2], &breadcrumb, status.as_deref());
}

/// Keep a list selection inside `0..len`, selecting the first row when
/// items appear.
pub fn ensure_valid_selection(state: &mut ListState, len: usize) {
  if len == 0 {
    state.select(None);
    return;
  }
  match state.selected() {
    None => state.select(Some(0)),
    Some(i) if i >= len => state.select(Some(len - 1)),
    Some(_) => {}
  }
}
