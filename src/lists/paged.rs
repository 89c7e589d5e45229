//! Shared machinery of a paginated list controller.

use std::collections::HashSet;
use tracing::{debug, info, warn};

use crate::cache::{Fragment, PageAggregator, PageResult, PageState, QueryKey, QueryResults};
use crate::github::{CachedGithubClient, GithubQueryKey, RequestError};
use crate::operation::Operations;

/// Completion of a page request, already folded into the store.
#[derive(Debug)]
pub enum PageEvent {
  /// First page of a query, fetched for display or as a prefetch
  First {
    query: GithubQueryKey,
    prefetch: bool,
    result: Result<PageState, String>,
  },
  /// A "load more" page merged after the list state it was requested from
  More {
    query: GithubQueryKey,
    result: Result<PageState, String>,
  },
}

/// The list currently rendered.
#[derive(Debug, Clone)]
pub struct LiveQuery {
  query: GithubQueryKey,
  state: Option<PageState>,
  error: Option<String>,
  loading_more: bool,
  more_error: Option<String>,
}

impl LiveQuery {
  fn new(query: GithubQueryKey) -> Self {
    Self {
      query,
      state: None,
      error: None,
      loading_more: false,
      more_error: None,
    }
  }

  pub fn query(&self) -> &GithubQueryKey {
    &self.query
  }

  pub fn state(&self) -> Option<&PageState> {
    self.state.as_ref()
  }

  /// Why the first page failed
  pub fn error(&self) -> Option<&str> {
    self.error.as_deref()
  }

  pub fn is_loading(&self) -> bool {
    self.state.is_none() && self.error.is_none()
  }

  pub fn is_loading_more(&self) -> bool {
    self.loading_more
  }

  /// Why the last "load more" failed
  pub fn more_error(&self) -> Option<&str> {
    self.more_error.as_deref()
  }

  pub fn can_load_more(&self) -> bool {
    !self.loading_more && self.state.as_ref().is_some_and(|s| s.has_next_page)
  }
}

/// One live list plus the first-page requests of lists that may become live.
///
/// Results of every request are folded into the store on the client's effect
/// queue, whichever list is live when they arrive and whether or not this
/// controller still exists. Slots are written by first pages (cache-first
/// activation later reads them) and by "load more" merges of the live list.
pub struct PagedList<M> {
  client: CachedGithubClient,
  live: Option<LiveQuery>,
  pending_first: HashSet<GithubQueryKey>,
  ops: Operations<M>,
  wrap: fn(PageEvent) -> M,
}

impl<M: Send + 'static> PagedList<M> {
  pub fn new(client: CachedGithubClient, wrap: fn(PageEvent) -> M) -> Self {
    Self {
      client,
      live: None,
      pending_first: HashSet::new(),
      ops: Operations::new(),
      wrap,
    }
  }

  pub fn client(&self) -> &CachedGithubClient {
    &self.client
  }

  pub fn live(&self) -> Option<&LiveQuery> {
    self.live.as_ref()
  }

  pub fn current_page(&self) -> Option<&PageState> {
    self.live.as_ref().and_then(LiveQuery::state)
  }

  pub fn ops(&mut self) -> &mut Operations<M> {
    &mut self.ops
  }

  /// Fold pending completions, then collect this list's messages.
  pub fn poll(&mut self) -> Vec<M> {
    self.client.apply_effects();
    self.ops.poll()
  }

  pub fn is_busy(&self) -> bool {
    self.ops.in_flight() > 0
  }

  /// Make `query` the live list, or show nothing for `None`.
  ///
  /// A warm slot seeds the list without any request.
  pub fn activate(&mut self, query: Option<GithubQueryKey>) {
    let Some(query) = query else {
      self.live = None;
      return;
    };

    // Slots must reflect every request that has already completed
    self.client.apply_effects();
    let mut live = LiveQuery::new(query.clone());
    if let Some(state) = self.client.results().get(&query) {
      info!(query = %query.description(), edges = state.len(), "activate from cache");
      live.state = Some(state);
      self.live = Some(live);
      return;
    }

    self.live = Some(live);
    self.fetch_first(query, false);
  }

  /// Re-fetch the live list's first page, ignoring its slot.
  pub fn refresh(&mut self) -> bool {
    let Some(live) = self.live.as_mut() else {
      return false;
    };
    let query = live.query.clone();
    *live = LiveQuery::new(query.clone());
    self.fetch_first(query, false)
  }

  /// Warm `query`'s slot without touching the live list.
  pub fn prefetch(&mut self, query: GithubQueryKey) -> bool {
    if self.client.is_warm(&query) || self.pending_first.contains(&query) {
      debug!(query = %query.description(), "prefetch skipped");
      return false;
    }
    self.fetch_first(query, true)
  }

  fn fetch_first(&mut self, query: GithubQueryKey, prefetch: bool) -> bool {
    if !self.pending_first.insert(query.clone()) {
      return false;
    }
    debug!(query = %query.description(), prefetch, "fetch first page");
    let wrap = self.wrap;
    let aggregator = self.client.aggregator(&query);
    let results = self.client.results().clone();
    let future = self.client.client().fetch_page(&query, None);
    self.ops.spawn(self.client.effects(), future, move |result| {
      let result = store_first_page(&aggregator, &results, &query, prefetch, result);
      wrap(PageEvent::First {
        query,
        prefetch,
        result,
      })
    });
    true
  }

  /// Request the page after the live list's end cursor.
  ///
  /// Refused while another "load more" of the list is pending, or when the
  /// server reported no next page.
  pub fn load_more(&mut self) -> bool {
    let Some(live) = self.live.as_mut() else {
      return false;
    };
    if !live.can_load_more() {
      return false;
    }
    let previous = live.state.clone().unwrap_or_default();
    let cursor = previous.end_cursor.clone();
    live.loading_more = true;
    live.more_error = None;
    let query = live.query.clone();

    debug!(query = %query.description(), cursor = ?cursor, "load more");
    let wrap = self.wrap;
    let aggregator = self.client.aggregator(&query);
    let future = self.client.client().fetch_page(&query, cursor.as_deref());
    self.ops.spawn(self.client.effects(), future, move |result| {
      let result = store_next_page(&aggregator, &query, previous, result);
      wrap(PageEvent::More { query, result })
    });
    true
  }

  pub fn fold(&mut self, event: PageEvent) {
    match event {
      PageEvent::First {
        query,
        prefetch,
        result,
      } => self.fold_first(query, prefetch, result),
      PageEvent::More { query, result } => self.fold_more(query, result),
    }
  }

  fn fold_first(&mut self, query: GithubQueryKey, prefetch: bool, result: Result<PageState, String>) {
    self.pending_first.remove(&query);
    let live = self
      .live
      .as_mut()
      .filter(|l| l.query == query && l.state.is_none());
    let Some(live) = live else {
      debug!(query = %query.description(), prefetch, "first page kept for later");
      return;
    };

    match result {
      Ok(state) => {
        info!(query = %query.description(), edges = state.len(), prefetch, "first page");
        // A refresh replaces whatever the slot held
        self.client.results().put(&query, state.clone());
        live.state = Some(state);
        live.error = None;
      }
      Err(message) => live.error = Some(message),
    }
  }

  fn fold_more(&mut self, query: GithubQueryKey, result: Result<PageState, String>) {
    let live = self
      .live
      .as_mut()
      .filter(|l| l.query == query && l.loading_more);
    let Some(live) = live else {
      // The list is no longer live: its nodes are stored, its edges dropped
      debug!(query = %query.description(), "load more result for inactive list");
      return;
    };

    live.loading_more = false;
    match result {
      Ok(state) => {
        info!(query = %query.description(), edges = state.len(), has_next_page = state.has_next_page, "loaded more");
        self.client.results().put(&query, state.clone());
        live.state = Some(state);
      }
      Err(message) => live.more_error = Some(message),
    }
  }

  /// Typed rows of the live list, in list order.
  ///
  /// Entries whose entity cannot be read back are skipped.
  pub fn records<T: Fragment>(&self) -> Vec<T> {
    let Some(state) = self.current_page() else {
      return Vec::new();
    };
    state
      .keys()
      .filter_map(|key| match self.client.store().read::<T>(key) {
        Ok(record) => Some(record),
        Err(e) => {
          debug!(entity = %key, error = %e, "unreadable list entry");
          None
        }
      })
      .collect()
  }
}

/// Record a first page's nodes and fill the query's slot if it is empty.
fn store_first_page(
  aggregator: &PageAggregator,
  results: &QueryResults,
  query: &GithubQueryKey,
  prefetch: bool,
  result: Result<PageResult, RequestError>,
) -> Result<PageState, String> {
  let state = result
    .map_err(|e| e.to_string())
    .and_then(|page| aggregator.initial(page).map_err(|e| e.to_string()));
  match &state {
    Ok(state) if !results.contains(query) => results.put(query, state.clone()),
    Ok(_) => {}
    Err(message) => {
      warn!(query = %query.description(), error = %message, prefetch, "first page failed")
    }
  }
  state
}

/// Record a "load more" page's nodes and merge it after `previous`.
fn store_next_page(
  aggregator: &PageAggregator,
  query: &GithubQueryKey,
  previous: PageState,
  result: Result<PageResult, RequestError>,
) -> Result<PageState, String> {
  let merged = result
    .map_err(|e| e.to_string())
    .and_then(|page| aggregator.merge(previous, Some(page)).map_err(|e| e.to_string()));
  if let Err(message) = &merged {
    warn!(query = %query.description(), error = %message, "load more failed");
  }
  merged
}
