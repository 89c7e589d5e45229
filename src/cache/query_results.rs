//! Root result slots: the last known page state of each list query.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::debug;

use super::pagination::PageState;

/// Identity of a list query, independent of its pagination cursor.
pub trait QueryKey {
  /// Stable, fixed-length key for slot lookup
  fn cache_hash(&self) -> String;

  /// Human-readable description for logs
  fn description(&self) -> String;
}

/// Query key → last known `PageState`.
///
/// Slots are written by first-page fetches (including prefetches) and by
/// "load more" merges, so re-activating a list restores everything loaded so
/// far. Like `EntityStore`, this is a shared handle.
#[derive(Clone, Default)]
pub struct QueryResults {
  slots: Arc<Mutex<HashMap<String, PageState>>>,
}

impl QueryResults {
  pub fn new() -> Self {
    Self::default()
  }

  fn lock(&self) -> MutexGuard<'_, HashMap<String, PageState>> {
    self.slots.lock().unwrap_or_else(PoisonError::into_inner)
  }

  pub fn get(&self, query: &impl QueryKey) -> Option<PageState> {
    self.lock().get(&query.cache_hash()).cloned()
  }

  pub fn contains(&self, query: &impl QueryKey) -> bool {
    self.lock().contains_key(&query.cache_hash())
  }

  pub fn put(&self, query: &impl QueryKey, state: PageState) {
    debug!(query = %query.description(), edges = state.len(), "store query result");
    self.lock().insert(query.cache_hash(), state);
  }

  pub fn len(&self) -> usize {
    self.lock().len()
  }

  pub fn is_empty(&self) -> bool {
    self.lock().is_empty()
  }
}
