//! Scripted transport and response fixtures for tests.

use futures::future::{self, BoxFuture};
use futures::FutureExt;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex, PoisonError};

use super::transport::{Transport, TransportError};

#[derive(Debug, Clone, PartialEq)]
pub struct Request {
  pub document: &'static str,
  pub variables: Value,
}

type Handler = dyn Fn(&'static str, &Value) -> Result<Value, TransportError> + Send + Sync;

/// Answers each request from a handler and records it.
#[derive(Clone)]
pub struct MockTransport {
  handler: Arc<Handler>,
  requests: Arc<Mutex<Vec<Request>>>,
}

impl MockTransport {
  pub fn new(
    handler: impl Fn(&'static str, &Value) -> Result<Value, TransportError> + Send + Sync + 'static,
  ) -> Self {
    Self {
      handler: Arc::new(handler),
      requests: Arc::new(Mutex::new(Vec::new())),
    }
  }

  pub fn requests(&self) -> Vec<Request> {
    self
      .requests
      .lock()
      .unwrap_or_else(PoisonError::into_inner)
      .clone()
  }

  /// Requests made with `document`
  pub fn count(&self, document: &str) -> usize {
    self
      .requests()
      .iter()
      .filter(|r| r.document == document)
      .count()
  }
}

impl Transport for MockTransport {
  fn execute(
    &self,
    document: &'static str,
    variables: Value,
  ) -> BoxFuture<'static, Result<Value, TransportError>> {
    let result = (self.handler)(document, &variables);
    self
      .requests
      .lock()
      .unwrap_or_else(PoisonError::into_inner)
      .push(Request {
        document,
        variables,
      });
    future::ready(result).boxed()
  }
}

// ============================================================================
// Fixtures
// ============================================================================

pub fn issue_node(id: &str, number: u64, state: &str) -> Value {
  json!({
    "id": id,
    "number": number,
    "state": state,
    "title": format!("Issue {number}"),
    "url": format!("https://github.com/octo/hello/issues/{number}"),
    "bodyHTML": ""
  })
}

pub fn repository_node(id: &str, stars: i64, starred: bool) -> Value {
  json!({
    "id": id,
    "name": format!("name-{id}"),
    "url": format!("https://github.com/octo/{id}"),
    "descriptionHTML": null,
    "primaryLanguage": { "name": "Rust" },
    "owner": { "__typename": "User", "id": "user-1", "login": "octo", "url": "https://github.com/octo" },
    "stargazers": { "totalCount": stars },
    "viewerHasStarred": starred,
    "watchers": { "totalCount": 1 },
    "viewerSubscription": "SUBSCRIBED"
  })
}

/// A connection over `nodes`, cursors `c<position>` starting after `offset`
pub fn connection(nodes: Vec<Value>, offset: usize, has_next_page: bool) -> Value {
  let count = nodes.len();
  let edges: Vec<Value> = nodes
    .into_iter()
    .enumerate()
    .map(|(i, node)| json!({ "cursor": format!("c{}", offset + i + 1), "node": node }))
    .collect();
  let end_cursor = (count > 0).then(|| format!("c{}", offset + count));
  json!({
    "edges": edges,
    "pageInfo": { "endCursor": end_cursor, "hasNextPage": has_next_page }
  })
}

/// `count` issues in `state`, paged by the request's `first` and `cursor`
pub fn paged_issues(state_prefix: &str, state: &str, count: usize, variables: &Value) -> Value {
  let first = variables["first"].as_u64().unwrap_or(5) as usize;
  let offset = variables["cursor"]
    .as_str()
    .and_then(|c| c.trim_start_matches('c').parse::<usize>().ok())
    .unwrap_or(0);
  let end = (offset + first).min(count);
  let nodes = (offset + 1..=end)
    .map(|n| issue_node(&format!("{state_prefix}{n}"), n as u64, state))
    .collect();
  json!({ "repository": { "issues": connection(nodes, offset, end < count) } })
}
