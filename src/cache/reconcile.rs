//! Applying mutation side effects to cached fragments.

use serde_json::Value;
use tracing::{debug, warn};

use super::error::CacheError;
use super::key::EntityKey;
use super::record::{EntityRecord, FieldValue};
use super::selection::Selection;
use super::store::EntityStore;

/// A pure rewrite of one entity's cached fragment.
///
/// Implementations may only use the current record (and whatever the
/// mutation payload told them at construction); no network access.
pub trait MutationDelta {
  fn apply(&self, key: &EntityKey, current: &EntityRecord) -> Result<EntityRecord, CacheError>;
}

/// Which star mutation a click fires, resolved from the cached flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StarAction {
  AddStar,
  RemoveStar,
}

impl StarAction {
  /// Starred rows offer "remove star", unstarred rows "add star".
  pub fn for_starred(viewer_has_starred: bool) -> Self {
    if viewer_has_starred {
      StarAction::RemoveStar
    } else {
      StarAction::AddStar
    }
  }

  pub fn delta(self) -> StarDelta {
    match self {
      StarAction::AddStar => StarDelta { direction: 1 },
      StarAction::RemoveStar => StarDelta { direction: -1 },
    }
  }

  /// Root field of the mutation payload
  pub fn root_field(self) -> &'static str {
    match self {
      StarAction::AddStar => "addStar",
      StarAction::RemoveStar => "removeStar",
    }
  }
}

/// Adjusts `stargazers.totalCount` by one in either direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StarDelta {
  direction: i64,
}

impl StarDelta {
  pub fn direction(&self) -> i64 {
    self.direction
  }
}

impl MutationDelta for StarDelta {
  fn apply(&self, key: &EntityKey, current: &EntityRecord) -> Result<EntityRecord, CacheError> {
    let missing = || CacheError::MissingField {
      key: key.clone(),
      field: "stargazers.totalCount".to_string(),
    };
    let mut stargazers = current
      .get("stargazers")
      .and_then(FieldValue::as_record)
      .cloned()
      .ok_or_else(missing)?;
    let total = stargazers
      .get("totalCount")
      .and_then(FieldValue::as_i64)
      .ok_or_else(missing)?;

    stargazers.insert("totalCount", total + self.direction);
    let mut next = current.clone();
    next.insert("stargazers", stargazers);
    Ok(next)
  }
}

/// Fields the star reconciler reads and writes
pub fn star_selection() -> Selection {
  Selection::new()
    .nested("stargazers", Selection::new().field("totalCount"))
    .field("viewerHasStarred")
}

/// `stargazers.totalCount` of a star fragment
pub fn star_total(record: &EntityRecord) -> Option<i64> {
  record
    .get("stargazers")?
    .as_record()?
    .get("totalCount")?
    .as_i64()
}

/// Reads a fragment, derives its successor and writes it back.
#[derive(Clone)]
pub struct MutationReconciler {
  store: EntityStore,
}

impl MutationReconciler {
  pub fn new(store: EntityStore) -> Self {
    Self { store }
  }

  /// Apply `delta` to `key`'s fragment.
  ///
  /// On any error the store is left unchanged.
  pub fn reconcile(
    &self,
    key: &EntityKey,
    selection: &Selection,
    delta: &dyn MutationDelta,
  ) -> Result<EntityRecord, CacheError> {
    let current = self.store.read_fragment(key, selection)?;
    let next = delta.apply(key, &current)?;
    self.store.write_fragment(key, selection, next.clone());
    Ok(next)
  }

  /// Adjust a repository's star count and return the new total.
  pub fn apply_star_delta(&self, entity_id: &str, action: StarAction) -> Result<i64, CacheError> {
    let key = EntityKey::repository(entity_id);
    let next = self.reconcile(&key, &star_selection(), &action.delta())?;
    let total = star_total(&next).unwrap_or_default();
    debug!(entity = %key, ?action, total, "applied star delta");
    Ok(total)
  }

  /// Fold a successful star mutation's `data` into the cache.
  ///
  /// The payload's `starrable { id viewerHasStarred }` is written first, then
  /// the count delta runs once. An entity that was never cached is left
  /// alone: the caller should re-fetch instead.
  pub fn apply_star_result(&self, action: StarAction, data: &Value) -> Result<i64, CacheError> {
    let starrable = data
      .get(action.root_field())
      .and_then(|p| p.get("starrable"))
      .ok_or(CacheError::MissingId)?;
    let id = starrable
      .get("id")
      .and_then(Value::as_str)
      .ok_or(CacheError::MissingId)?;
    let type_name = starrable
      .get("__typename")
      .and_then(Value::as_str)
      .unwrap_or("Repository");
    let key = EntityKey::new(type_name, id);

    if !self.store.contains(&key) {
      warn!(entity = %key, "star result for uncached entity; skipping cache update");
      return Err(CacheError::MissingEntity(key));
    }

    // Counts must be valid before anything is written
    let current = self.store.read_fragment(&key, &star_selection())?;
    let next = action.delta().apply(&key, &current)?;

    self.store.write_node(type_name, starrable)?;
    let mut counted = EntityRecord::new();
    if let Some(stargazers) = next.get("stargazers") {
      counted.insert("stargazers", stargazers.clone());
    }
    self.store.write_fragment(&key, &star_selection(), counted);

    let total = star_total(&next).unwrap_or_default();
    debug!(entity = %key, ?action, total, "reconciled star mutation");
    Ok(total)
  }
}
