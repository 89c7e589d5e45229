//! Folding cursor-paginated connection pages into one list.

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use super::error::CacheError;
use super::key::EntityKey;
use super::store::EntityStore;

/// One item of a paginated list at a specific position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
  pub cursor: Option<String>,
  pub node: EntityKey,
}

/// Accumulated state of one logical list.
///
/// `edges` only ever grows within one aggregator lifetime and keeps server
/// order. The frontier (`end_cursor`, `has_next_page`) always describes the
/// most recently folded page.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PageState {
  pub edges: Vec<Edge>,
  pub end_cursor: Option<String>,
  pub has_next_page: bool,
}

impl PageState {
  pub fn len(&self) -> usize {
    self.edges.len()
  }

  pub fn is_empty(&self) -> bool {
    self.edges.is_empty()
  }

  pub fn keys(&self) -> impl Iterator<Item = &EntityKey> {
    self.edges.iter().map(|e| &e.node)
  }
}

// ============================================================================
// Wire shape of a connection
// ============================================================================

#[derive(Debug, Deserialize)]
struct ApiEdge {
  #[serde(default)]
  cursor: Option<String>,
  node: Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiPageInfo {
  end_cursor: Option<String>,
  has_next_page: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiConnection {
  #[serde(default)]
  edges: Vec<ApiEdge>,
  page_info: ApiPageInfo,
}

/// One fetched page, not yet folded into the store.
#[derive(Debug, Clone, PartialEq)]
pub struct PageResult {
  /// `(cursor, raw node)` in server order
  pub edges: Vec<(Option<String>, Value)>,
  pub end_cursor: Option<String>,
  pub has_next_page: bool,
}

impl PageResult {
  /// Parse a connection object (`{ edges: [{ node }], pageInfo }`).
  pub fn from_connection(connection: &Value) -> Result<Self, CacheError> {
    let parsed: ApiConnection = serde_json::from_value(connection.clone())
      .map_err(|e| CacheError::MalformedPage(e.to_string()))?;

    Ok(Self {
      edges: parsed
        .edges
        .into_iter()
        .map(|e| (e.cursor, e.node))
        .collect(),
      end_cursor: parsed.page_info.end_cursor,
      has_next_page: parsed.page_info.has_next_page,
    })
  }
}

// ============================================================================
// Aggregator
// ============================================================================

/// Merges successive pages of one list, recording every node in the store.
///
/// The aggregator never fetches on its own; callers hand it results.
#[derive(Clone)]
pub struct PageAggregator {
  store: EntityStore,
  node_type: &'static str,
}

impl PageAggregator {
  /// `node_type` is the entity type of the list's nodes, used when the
  /// server omits `__typename`.
  pub fn new(store: EntityStore, node_type: &'static str) -> Self {
    Self { store, node_type }
  }

  pub fn node_type(&self) -> &'static str {
    self.node_type
  }

  /// Seed a list from its first page.
  pub fn initial(&self, page: PageResult) -> Result<PageState, CacheError> {
    self.merge(PageState::default(), Some(page))
  }

  /// Fold `more` after `previous`.
  ///
  /// An absent page (still in flight, or failed) returns `previous` as is.
  /// Nodes are written to the store before any edge references them; if a
  /// node has no id the whole page is rejected and `previous` is unaffected
  /// (nodes written before the bad one stay cached, which is harmless).
  pub fn merge(
    &self,
    previous: PageState,
    more: Option<PageResult>,
  ) -> Result<PageState, CacheError> {
    let Some(page) = more else {
      return Ok(previous);
    };

    let mut new_edges = Vec::with_capacity(page.edges.len());
    for (cursor, node) in &page.edges {
      let key = self.store.write_node(self.node_type, node)?;
      new_edges.push(Edge {
        cursor: cursor.clone(),
        node: key,
      });
    }

    debug!(
      node_type = self.node_type,
      existing = previous.edges.len(),
      added = new_edges.len(),
      has_next_page = page.has_next_page,
      "merge page"
    );

    let mut edges = previous.edges;
    edges.extend(new_edges);
    Ok(PageState {
      edges,
      end_cursor: page.end_cursor,
      has_next_page: page.has_next_page,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::cache::FieldValue;
  use serde_json::json;

  fn issue_page(ids: std::ops::RangeInclusive<u32>, has_next: bool) -> PageResult {
    let edges: Vec<Value> = ids
      .clone()
      .map(|i| json!({ "cursor": format!("c{i}"), "node": { "id": format!("i{i}"), "number": i } }))
      .collect();
    let end = ids.last().map(|i| format!("c{i}"));
    PageResult::from_connection(&json!({
      "edges": edges,
      "pageInfo": { "endCursor": end, "hasNextPage": has_next }
    }))
    .unwrap()
  }

  fn ids(state: &PageState) -> Vec<&str> {
    state.keys().map(|k| k.id.as_str()).collect()
  }

  #[test]
  fn test_initial_records_nodes() {
    let store = EntityStore::new();
    let agg = PageAggregator::new(store.clone(), "Issue");
    let state = agg.initial(issue_page(1..=3, true)).unwrap();

    assert_eq!(ids(&state), vec!["i1", "i2", "i3"]);
    assert_eq!(state.end_cursor.as_deref(), Some("c3"));
    assert!(state.has_next_page);
    assert_eq!(store.len(), 3);
    let record = store.get(&EntityKey::new("Issue", "i2")).unwrap();
    assert_eq!(record.get("number").and_then(FieldValue::as_i64), Some(2));
  }

  #[test]
  fn test_merge_none_is_noop() {
    let agg = PageAggregator::new(EntityStore::new(), "Issue");
    let state = agg.initial(issue_page(1..=2, true)).unwrap();
    let merged = agg.merge(state.clone(), None).unwrap();
    assert_eq!(merged, state);
  }

  #[test]
  fn test_merge_appends_in_call_order() {
    let agg = PageAggregator::new(EntityStore::new(), "Issue");
    let sizes = [5usize, 3, 1];
    let mut state = PageState::default();
    let mut next = 1u32;
    for size in sizes {
      let last = next + size as u32 - 1;
      state = agg.merge(state, Some(issue_page(next..=last, true))).unwrap();
      next = last + 1;
    }

    assert_eq!(state.len(), sizes.iter().sum::<usize>());
    let expected: Vec<String> = (1..next).map(|i| format!("i{i}")).collect();
    assert_eq!(ids(&state), expected.iter().map(String::as_str).collect::<Vec<_>>());
  }

  #[test]
  fn test_merge_does_not_deduplicate() {
    let agg = PageAggregator::new(EntityStore::new(), "Issue");
    let state = agg.initial(issue_page(1..=2, true)).unwrap();
    let state = agg.merge(state, Some(issue_page(2..=3, false))).unwrap();
    assert_eq!(ids(&state), vec!["i1", "i2", "i2", "i3"]);
  }

  #[test]
  fn test_frontier_replaced_not_merged() {
    let agg = PageAggregator::new(EntityStore::new(), "Issue");
    let state = agg.initial(issue_page(1..=5, true)).unwrap();
    let empty = PageResult {
      edges: Vec::new(),
      end_cursor: None,
      has_next_page: false,
    };
    let state = agg.merge(state, Some(empty)).unwrap();
    assert_eq!(state.len(), 5);
    assert_eq!(state.end_cursor, None);
    assert!(!state.has_next_page);
  }

  #[test]
  fn test_node_without_id_rejects_page() {
    let agg = PageAggregator::new(EntityStore::new(), "Issue");
    let state = agg.initial(issue_page(1..=1, true)).unwrap();
    let bad = PageResult::from_connection(&json!({
      "edges": [{ "node": { "title": "no id" } }],
      "pageInfo": { "endCursor": "x", "hasNextPage": false }
    }))
    .unwrap();
    assert_eq!(agg.merge(state, Some(bad)), Err(CacheError::MissingId));
  }

  #[test]
  fn test_seven_issues_in_pages_of_five() {
    let agg = PageAggregator::new(EntityStore::new(), "Issue");
    let first = agg.initial(issue_page(1..=5, true)).unwrap();
    assert_eq!(first.end_cursor.as_deref(), Some("c5"));

    let last = agg.merge(first, Some(issue_page(6..=7, false))).unwrap();
    assert_eq!(last.len(), 7);
    assert_eq!(ids(&last), vec!["i1", "i2", "i3", "i4", "i5", "i6", "i7"]);
    assert!(!last.has_next_page);
  }

  #[test]
  fn test_connection_without_cursors() {
    let page = PageResult::from_connection(&json!({
      "edges": [{ "node": { "id": "r1" } }],
      "pageInfo": { "endCursor": null, "hasNextPage": false }
    }))
    .unwrap();
    assert_eq!(page.edges[0].0, None);
  }

  #[test]
  fn test_malformed_connection() {
    let err = PageResult::from_connection(&json!({ "edges": [] })).unwrap_err();
    assert!(matches!(err, CacheError::MalformedPage(_)));
  }
}
