use serde_json::Value;
use std::collections::HashSet;
use tracing::{debug, info, warn};

use crate::cache::{CacheError, MutationReconciler, PageState, StarAction};
use crate::github::{CachedGithubClient, GithubQueryKey, Repository, RequestError, TransportError};

use super::paged::{LiveQuery, PageEvent, PagedList};

#[derive(Debug)]
pub enum RepositoryMessage {
  Page(PageEvent),
  /// A star mutation, already reconciled into the store when it succeeded
  Star {
    entity_id: String,
    action: StarAction,
    result: Result<i64, RequestError>,
  },
}

/// The viewer's repositories, most starred first, with star toggles.
pub struct RepositoryList {
  paged: PagedList<RepositoryMessage>,
  pending_stars: HashSet<String>,
  star_error: Option<String>,
}

impl RepositoryList {
  /// Activates the list immediately (from its slot if warm).
  pub fn new(client: CachedGithubClient) -> Self {
    let mut paged = PagedList::new(client, RepositoryMessage::Page);
    paged.activate(Some(GithubQueryKey::ViewerRepositories));
    Self {
      paged,
      pending_stars: HashSet::new(),
      star_error: None,
    }
  }

  pub fn client(&self) -> &CachedGithubClient {
    self.paged.client()
  }

  pub fn current_page(&self) -> Option<&PageState> {
    self.paged.current_page()
  }

  pub fn live(&self) -> Option<&LiveQuery> {
    self.paged.live()
  }

  pub fn repositories(&self) -> Vec<Repository> {
    self.paged.records()
  }

  pub fn trigger_load_more(&mut self) -> bool {
    self.paged.load_more()
  }

  pub fn refresh(&mut self) -> bool {
    self.paged.refresh()
  }

  pub fn is_busy(&self) -> bool {
    self.paged.is_busy()
  }

  /// Star or unstar `entity_id` depending on its cached flag.
  ///
  /// The cache changes only once the server confirms. Returns the mutation
  /// sent, or `None` if one is already pending for this entity.
  pub fn trigger_star_toggle(
    &mut self,
    entity_id: &str,
    currently_starred: bool,
  ) -> Option<StarAction> {
    if !self.pending_stars.insert(entity_id.to_string()) {
      debug!(entity = entity_id, "star toggle already pending");
      return None;
    }
    let action = StarAction::for_starred(currently_starred);
    self.star_error = None;
    info!(entity = entity_id, ?action, "star toggle");

    let client = self.paged.client().clone();
    let future = client.client().star(action, entity_id);
    let reconciler = client.reconciler();
    let entity_id = entity_id.to_string();
    self.paged.ops().spawn(client.effects(), future, move |result| {
      let result = reconcile_star(&reconciler, &entity_id, action, result);
      RepositoryMessage::Star {
        entity_id,
        action,
        result,
      }
    });
    Some(action)
  }

  pub fn is_star_pending(&self, entity_id: &str) -> bool {
    self.pending_stars.contains(entity_id)
  }

  /// Last failed star toggle
  pub fn star_error(&self) -> Option<&str> {
    self.star_error.as_deref()
  }

  /// Fold completed requests. Returns true if anything arrived.
  pub fn tick(&mut self) -> bool {
    let messages = self.paged.poll();
    let changed = !messages.is_empty();
    for message in messages {
      match message {
        RepositoryMessage::Page(event) => self.paged.fold(event),
        RepositoryMessage::Star {
          entity_id,
          action,
          result,
        } => self.fold_star(&entity_id, action, result),
      }
    }
    changed
  }

  fn fold_star(&mut self, entity_id: &str, action: StarAction, result: Result<i64, RequestError>) {
    self.pending_stars.remove(entity_id);
    match result {
      Ok(_) => {}
      Err(RequestError::Cache(CacheError::MissingEntity(key))) => {
        info!(entity = %key, ?action, "star target not cached, refreshing list");
        self.paged.refresh();
      }
      Err(e) => self.star_error = Some(e.to_string()),
    }
  }
}

/// Fold a finished star mutation into the store exactly once.
fn reconcile_star(
  reconciler: &MutationReconciler,
  entity_id: &str,
  action: StarAction,
  result: Result<Value, TransportError>,
) -> Result<i64, RequestError> {
  let outcome = match result {
    Ok(data) => reconciler
      .apply_star_result(action, &data)
      .map_err(RequestError::from),
    Err(e) => Err(RequestError::from(e)),
  };
  match &outcome {
    Ok(total) => info!(entity = entity_id, ?action, total, "star reconciled"),
    Err(RequestError::Cache(CacheError::MissingEntity(_))) => {}
    Err(e) => warn!(entity = entity_id, ?action, error = %e, "star mutation failed"),
  }
  outcome
}
