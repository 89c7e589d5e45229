use serde_json::Value;
use tracing::{info, warn};

use crate::cache::{EntityStore, Fragment, PageState};
use crate::filter::IssueFilter;
use crate::github::{CachedGithubClient, Comment, GithubQueryKey, Issue, TransportError};

use super::paged::{LiveQuery, PageEvent, PagedList};

#[derive(Debug)]
pub enum IssueMessage {
  Page(PageEvent),
  Comment(Result<Comment, String>),
}

/// Progress of the comment composer's last submission.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CommentStatus {
  #[default]
  Idle,
  Sending,
  Sent(Comment),
  Failed(String),
}

/// Issues of one repository behind the open/closed/hidden toggle.
pub struct IssueList {
  owner: String,
  name: String,
  filter: IssueFilter,
  paged: PagedList<IssueMessage>,
  comment: CommentStatus,
}

impl IssueList {
  /// Starts hidden; nothing is fetched until the toggle is activated.
  pub fn new(client: CachedGithubClient, owner: &str, name: &str) -> Self {
    Self {
      owner: owner.to_string(),
      name: name.to_string(),
      filter: IssueFilter::default(),
      paged: PagedList::new(client, IssueMessage::Page),
      comment: CommentStatus::default(),
    }
  }

  pub fn full_name(&self) -> String {
    format!("{}/{}", self.owner, self.name)
  }

  pub fn filter(&self) -> IssueFilter {
    self.filter
  }

  /// Advance the toggle and make the new state's list live.
  pub fn trigger_filter_transition(&mut self) -> IssueFilter {
    self.filter = IssueFilter::on_activate(self.filter);
    info!(repository = %self.full_name(), filter = self.filter.label(), "filter transition");
    self
      .paged
      .activate(GithubQueryKey::issues(&self.owner, &self.name, self.filter));
    self.filter
  }

  /// The toggle gained focus: warm the list it would switch to.
  pub fn trigger_hover(&mut self) -> bool {
    self.prefetch(self.filter)
  }

  /// Fetch the first page of `current.next()` into its slot.
  ///
  /// Returns false when the next state shows nothing, its slot is warm, or
  /// its first page is already in flight.
  pub fn prefetch(&mut self, current: IssueFilter) -> bool {
    match GithubQueryKey::issues(&self.owner, &self.name, current.next()) {
      Some(query) => self.paged.prefetch(query),
      None => false,
    }
  }

  pub fn trigger_load_more(&mut self) -> bool {
    self.paged.load_more()
  }

  pub fn refresh(&mut self) -> bool {
    self.paged.refresh()
  }

  pub fn current_page(&self) -> Option<&PageState> {
    self.paged.current_page()
  }

  pub fn live(&self) -> Option<&LiveQuery> {
    self.paged.live()
  }

  pub fn issues(&self) -> Vec<Issue> {
    self.paged.records()
  }

  pub fn is_busy(&self) -> bool {
    self.paged.is_busy()
  }

  /// Post a comment on `subject_id`. Blank bodies are rejected locally.
  pub fn add_comment(&mut self, subject_id: &str, body: &str) -> bool {
    let body = body.trim();
    if body.is_empty() || self.comment == CommentStatus::Sending {
      return false;
    }
    self.comment = CommentStatus::Sending;
    let client = self.paged.client().clone();
    let future = client.client().add_comment(subject_id, body);
    let store = client.store().clone();
    let subject_id = subject_id.to_string();
    self.paged.ops().spawn(client.effects(), future, move |result| {
      let result = store_comment(&store, &subject_id, result);
      IssueMessage::Comment(result)
    });
    true
  }

  pub fn comment_status(&self) -> &CommentStatus {
    &self.comment
  }

  /// Hand out a finished submission once, resetting the composer state.
  pub fn take_comment_outcome(&mut self) -> Option<Result<Comment, String>> {
    match std::mem::take(&mut self.comment) {
      CommentStatus::Sent(comment) => Some(Ok(comment)),
      CommentStatus::Failed(message) => Some(Err(message)),
      other => {
        self.comment = other;
        None
      }
    }
  }

  /// Fold completed requests. Returns true if anything arrived.
  pub fn tick(&mut self) -> bool {
    let messages = self.paged.poll();
    let changed = !messages.is_empty();
    for message in messages {
      match message {
        IssueMessage::Page(event) => self.paged.fold(event),
        IssueMessage::Comment(result) => self.fold_comment(result),
      }
    }
    changed
  }

  fn fold_comment(&mut self, result: Result<Comment, String>) {
    self.comment = match result {
      Ok(comment) => CommentStatus::Sent(comment),
      Err(message) => CommentStatus::Failed(message),
    };
  }
}

/// Normalize the created comment and read it back.
fn store_comment(
  store: &EntityStore,
  subject_id: &str,
  result: Result<Value, TransportError>,
) -> Result<Comment, String> {
  let outcome = result.map_err(|e| e.to_string()).and_then(|data| {
    let node = data
      .get("addComment")
      .and_then(|p| p.get("commentEdge"))
      .and_then(|e| e.get("node"))
      .ok_or_else(|| "comment response has no node".to_string())?;
    let key = store
      .write_node(Comment::TYPE_NAME, node)
      .map_err(|e| e.to_string())?;
    store.read::<Comment>(&key).map_err(|e| e.to_string())
  });
  match &outcome {
    Ok(comment) => info!(subject = subject_id, comment = %comment.id, "comment added"),
    Err(message) => warn!(subject = subject_id, error = %message, "comment failed"),
  }
  outcome
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::cache::{EntityKey, QueryKey};
  use crate::github::documents::{ADD_COMMENT, GET_ISSUES_OF_REPO};
  use crate::github::mock::{paged_issues, MockTransport};
  use crate::github::GithubClient;
  use crate::lists::testing::settle;
  use serde_json::json;
  use std::sync::Arc;
  use std::time::Duration;

  /// 7 open issues, 3 closed ones
  fn handler(document: &'static str, vars: &Value) -> Result<Value, TransportError> {
    if document == ADD_COMMENT {
      return Ok(json!({ "addComment": { "commentEdge": { "node": {
        "__typename": "IssueComment",
        "id": "comment-1",
        "body": vars["body"],
        "createdAt": "2026-10-14T09:00:00Z",
        "author": { "login": "octo" }
      } } } }));
    }
    match vars["issueState"].as_str() {
      Some("OPEN") => Ok(paged_issues("o", "OPEN", 7, vars)),
      Some("CLOSED") => Ok(paged_issues("x", "CLOSED", 3, vars)),
      _ => Err(TransportError::Graphql("bad state".to_string())),
    }
  }

  fn setup(
    handler: impl Fn(&'static str, &Value) -> Result<Value, TransportError> + Send + Sync + 'static,
  ) -> (MockTransport, CachedGithubClient, IssueList) {
    let mock = MockTransport::new(handler);
    let client =
      CachedGithubClient::from_client(GithubClient::with_transport(Arc::new(mock.clone()), 5));
    let list = IssueList::new(client.clone(), "octo", "hello");
    (mock, client, list)
  }

  async fn settled(list: &mut IssueList) {
    settle(|| {
      list.tick();
      list.is_busy()
    })
    .await;
  }

  fn numbers(list: &IssueList) -> Vec<u64> {
    list.issues().iter().map(|i| i.number).collect()
  }

  #[tokio::test]
  async fn test_starts_hidden_without_requests() {
    let (mock, _, list) = setup(handler);
    assert_eq!(list.filter(), IssueFilter::None);
    assert!(list.current_page().is_none());
    assert!(mock.requests().is_empty());
  }

  #[tokio::test]
  async fn test_seven_open_issues_in_pages_of_five() {
    let (mock, _, mut list) = setup(handler);
    assert_eq!(list.trigger_filter_transition(), IssueFilter::Open);
    assert!(list.live().unwrap().is_loading());
    settled(&mut list).await;

    let page = list.current_page().unwrap();
    assert_eq!(page.len(), 5);
    assert_eq!(page.end_cursor.as_deref(), Some("c5"));
    assert!(page.has_next_page);

    assert!(list.trigger_load_more());
    settled(&mut list).await;

    let page = list.current_page().unwrap();
    assert_eq!(page.len(), 7);
    assert!(!page.has_next_page);
    assert_eq!(numbers(&list), vec![1, 2, 3, 4, 5, 6, 7]);

    assert!(!list.trigger_load_more());
    assert_eq!(mock.count(GET_ISSUES_OF_REPO), 2);
    assert_eq!(mock.requests()[1].variables["cursor"], "c5");
  }

  #[tokio::test]
  async fn test_prefetch_leaves_live_list_untouched() {
    let (mock, client, mut list) = setup(handler);
    list.trigger_filter_transition();
    settled(&mut list).await;
    let open = list.current_page().cloned();

    assert!(list.trigger_hover());
    settled(&mut list).await;

    assert_eq!(list.current_page().cloned(), open);
    assert_eq!(list.filter(), IssueFilter::Open);
    assert!(client.store().contains(&EntityKey::new("Issue", "x1")));
    let closed = GithubQueryKey::issues("octo", "hello", IssueFilter::Closed).unwrap();
    assert!(client.results().contains(&closed));
    assert_eq!(mock.requests()[1].variables["issueState"], "CLOSED");
  }

  #[tokio::test]
  async fn test_activation_after_prefetch_makes_no_request() {
    let (mock, _, mut list) = setup(handler);
    list.trigger_filter_transition();
    settled(&mut list).await;
    list.trigger_hover();
    settled(&mut list).await;
    let before = mock.requests().len();

    assert_eq!(list.trigger_filter_transition(), IssueFilter::Closed);
    assert_eq!(list.current_page().map(PageState::len), Some(3));
    assert!(!list.is_busy());
    assert_eq!(mock.requests().len(), before);
  }

  #[tokio::test]
  async fn test_activation_waits_for_prefetch_in_flight() {
    let (mock, _, mut list) = setup(handler);
    list.trigger_filter_transition();
    settled(&mut list).await;

    assert!(list.trigger_hover());
    assert!(!list.trigger_hover());
    list.trigger_filter_transition();
    assert!(list.live().unwrap().is_loading());
    settled(&mut list).await;

    assert_eq!(list.current_page().map(PageState::len), Some(3));
    assert_eq!(mock.count(GET_ISSUES_OF_REPO), 2);
  }

  #[tokio::test]
  async fn test_hover_before_hidden_does_nothing() {
    let (mock, _, mut list) = setup(handler);
    list.trigger_filter_transition();
    list.trigger_filter_transition();
    settled(&mut list).await;
    assert_eq!(list.filter(), IssueFilter::Closed);

    let before = mock.requests().len();
    assert!(!list.trigger_hover());
    assert_eq!(mock.requests().len(), before);
  }

  #[tokio::test]
  async fn test_concurrent_load_more_is_refused() {
    let (mock, _, mut list) = setup(handler);
    list.trigger_filter_transition();
    settled(&mut list).await;

    assert!(list.trigger_load_more());
    assert!(list.live().unwrap().is_loading_more());
    assert!(!list.trigger_load_more());
    settled(&mut list).await;

    let more = mock
      .requests()
      .iter()
      .filter(|r| r.variables["cursor"] == "c5")
      .count();
    assert_eq!(more, 1);
    assert_eq!(list.current_page().map(PageState::len), Some(7));
  }

  #[tokio::test]
  async fn test_failed_load_more_keeps_state() {
    let (_, _, mut list) = setup(|document, vars| {
      if vars["cursor"].is_null() {
        handler(document, vars)
      } else {
        Err(TransportError::Http("502 Bad Gateway".to_string()))
      }
    });
    list.trigger_filter_transition();
    settled(&mut list).await;
    let before = list.current_page().cloned();

    assert!(list.trigger_load_more());
    settled(&mut list).await;

    assert_eq!(list.current_page().cloned(), before);
    let live = list.live().unwrap();
    assert!(live.more_error().unwrap().contains("502"));
    assert!(live.can_load_more());
  }

  #[tokio::test]
  async fn test_first_page_error_is_surfaced() {
    let (_, _, mut list) = setup(|_, _| Err(TransportError::Graphql("Could not resolve to a Repository".to_string())));
    list.trigger_filter_transition();
    settled(&mut list).await;

    let live = list.live().unwrap();
    assert!(!live.is_loading());
    assert_eq!(live.error(), Some("Could not resolve to a Repository"));
    assert!(list.current_page().is_none());
  }

  #[tokio::test]
  async fn test_cycle_back_to_hidden_and_reopen_from_slot() {
    let (mock, _, mut list) = setup(handler);
    list.trigger_filter_transition();
    settled(&mut list).await;
    list.trigger_load_more();
    settled(&mut list).await;
    list.trigger_filter_transition();
    settled(&mut list).await;

    assert_eq!(list.trigger_filter_transition(), IssueFilter::None);
    assert!(list.current_page().is_none());
    assert!(list.issues().is_empty());

    let before = mock.requests().len();
    list.trigger_filter_transition();
    assert_eq!(list.current_page().map(PageState::len), Some(7));
    assert_eq!(mock.requests().len(), before);
  }

  #[tokio::test]
  async fn test_refresh_bypasses_slot() {
    let (mock, _, mut list) = setup(handler);
    list.trigger_filter_transition();
    settled(&mut list).await;

    assert!(list.refresh());
    assert!(list.current_page().is_none());
    settled(&mut list).await;
    assert_eq!(list.current_page().map(PageState::len), Some(5));
    assert_eq!(mock.count(GET_ISSUES_OF_REPO), 2);
  }

  #[tokio::test]
  async fn test_results_are_stored_after_list_is_dropped() {
    let (mock, client, mut list) = setup(handler);
    list.trigger_filter_transition();
    settled(&mut list).await;

    assert!(list.trigger_hover());
    assert!(list.trigger_load_more());
    drop(list);
    tokio::time::sleep(Duration::from_millis(20)).await;
    client.apply_effects();

    assert!(client.store().contains(&EntityKey::new("Issue", "x1")));
    assert!(client.store().contains(&EntityKey::new("Issue", "o7")));

    let mut again = IssueList::new(client.clone(), "octo", "hello");
    again.trigger_filter_transition();
    assert_eq!(again.current_page().map(PageState::len), Some(5));
    again.trigger_filter_transition();
    assert_eq!(again.current_page().map(PageState::len), Some(3));
    assert_eq!(mock.requests().len(), 3);
  }

  #[tokio::test]
  async fn test_comment_is_stored_after_list_is_dropped() {
    let (_, client, mut list) = setup(handler);
    assert!(list.add_comment("o1", "Late"));
    drop(list);
    tokio::time::sleep(Duration::from_millis(20)).await;

    assert_eq!(client.apply_effects(), 1);
    let comment: Comment = client
      .store()
      .read(&EntityKey::new("IssueComment", "comment-1"))
      .unwrap();
    assert_eq!(comment.body, "Late");
  }

  #[tokio::test]
  async fn test_empty_comment_is_rejected_locally() {
    let (mock, _, mut list) = setup(handler);
    assert!(!list.add_comment("o1", "   "));
    assert_eq!(list.comment_status(), &CommentStatus::Idle);
    assert!(mock.requests().is_empty());
  }

  #[tokio::test]
  async fn test_comment_is_normalized() {
    let (mock, client, mut list) = setup(handler);
    assert!(list.add_comment("o1", "Looks good"));
    assert!(!list.add_comment("o1", "again"));
    settled(&mut list).await;

    let comment = list.take_comment_outcome().unwrap().unwrap();
    assert_eq!(comment.body, "Looks good");
    assert_eq!(comment.author.map(|a| a.login).as_deref(), Some("octo"));
    assert!(client
      .store()
      .contains(&EntityKey::new("IssueComment", "comment-1")));
    assert_eq!(list.comment_status(), &CommentStatus::Idle);
    assert_eq!(mock.requests()[0].variables["subjectId"], "o1");
  }

  #[tokio::test]
  async fn test_comment_failure_is_reported() {
    let (_, _, mut list) = setup(|_, _| Err(TransportError::Http("401 Unauthorized".to_string())));
    list.add_comment("o1", "hello");
    settled(&mut list).await;
    let outcome = list.take_comment_outcome().unwrap();
    assert!(outcome.unwrap_err().contains("401"));
  }

  #[test]
  fn test_query_description_names_state() {
    let query = GithubQueryKey::issues("octo", "hello", IssueFilter::Closed).unwrap();
    assert_eq!(query.description(), "closed issues of octo/hello");
  }
}
