//! Query keys for GitHub list queries.

use serde_json::{json, Value};
use sha2::{Digest, Sha256};

use crate::cache::{CacheError, PageResult, QueryKey};
use crate::filter::IssueFilter;

use super::documents::{GET_ISSUES_OF_REPO, GET_REPOS_OF_CURRENT_USER};

/// Identity of a paginated GitHub list, cursor excluded.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum GithubQueryKey {
  /// Issues of one repository in one state (`OPEN` or `CLOSED`)
  RepositoryIssues {
    owner: String,
    name: String,
    issue_state: String,
  },
  /// The viewer's own repositories, most starred first
  ViewerRepositories,
}

impl GithubQueryKey {
  /// Key for the issue list a filter shows, or `None` when it shows nothing.
  pub fn issues(owner: &str, name: &str, filter: IssueFilter) -> Option<Self> {
    filter.issue_state().map(|state| Self::RepositoryIssues {
      owner: owner.to_string(),
      name: name.to_string(),
      issue_state: state.to_string(),
    })
  }

  pub fn document(&self) -> &'static str {
    match self {
      Self::RepositoryIssues { .. } => GET_ISSUES_OF_REPO,
      Self::ViewerRepositories => GET_REPOS_OF_CURRENT_USER,
    }
  }

  /// Entity type of the list's nodes
  pub fn node_type(&self) -> &'static str {
    match self {
      Self::RepositoryIssues { .. } => "Issue",
      Self::ViewerRepositories => "Repository",
    }
  }

  pub fn variables(&self, first: u32, cursor: Option<&str>) -> Value {
    match self {
      Self::RepositoryIssues {
        owner,
        name,
        issue_state,
      } => json!({
        "repositoryOwner": owner,
        "repositoryName": name,
        "issueState": issue_state,
        "first": first,
        "cursor": cursor,
      }),
      Self::ViewerRepositories => json!({
        "first": first,
        "cursor": cursor,
      }),
    }
  }

  /// Pull the connection out of a response's `data`.
  pub fn page(&self, data: &Value) -> Result<PageResult, CacheError> {
    let connection = match self {
      Self::RepositoryIssues { owner, name, .. } => data
        .get("repository")
        .filter(|r| !r.is_null())
        .ok_or_else(|| {
          CacheError::MalformedPage(format!("repository {}/{} not found", owner, name))
        })?
        .get("issues"),
      Self::ViewerRepositories => data.get("viewer").and_then(|v| v.get("repositories")),
    };
    let connection = connection
      .ok_or_else(|| CacheError::MalformedPage(format!("{} has no connection", self.description())))?;
    PageResult::from_connection(connection)
  }
}

impl QueryKey for GithubQueryKey {
  fn cache_hash(&self) -> String {
    let input = match self {
      Self::RepositoryIssues {
        owner,
        name,
        issue_state,
      } => format!(
        "issues:{}/{}:{}",
        owner.to_lowercase(),
        name.to_lowercase(),
        issue_state
      ),
      Self::ViewerRepositories => "viewer_repositories".to_string(),
    };

    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize())
  }

  fn description(&self) -> String {
    match self {
      Self::RepositoryIssues {
        owner,
        name,
        issue_state,
      } => format!("{} issues of {}/{}", issue_state.to_lowercase(), owner, name),
      Self::ViewerRepositories => "viewer repositories".to_string(),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_hidden_filter_has_no_query() {
    assert_eq!(GithubQueryKey::issues("a", "b", IssueFilter::None), None);
    let open = GithubQueryKey::issues("a", "b", IssueFilter::Open).unwrap();
    assert_eq!(
      open,
      GithubQueryKey::RepositoryIssues {
        owner: "a".to_string(),
        name: "b".to_string(),
        issue_state: "OPEN".to_string(),
      }
    );
  }

  #[test]
  fn test_cache_hash_separates_states() {
    let open = GithubQueryKey::issues("rust-lang", "rust", IssueFilter::Open).unwrap();
    let closed = GithubQueryKey::issues("rust-lang", "rust", IssueFilter::Closed).unwrap();
    assert_ne!(open.cache_hash(), closed.cache_hash());
    assert_eq!(open.cache_hash().len(), 64);
  }

  #[test]
  fn test_cache_hash_ignores_owner_case() {
    let a = GithubQueryKey::issues("Rust-Lang", "Rust", IssueFilter::Open).unwrap();
    let b = GithubQueryKey::issues("rust-lang", "rust", IssueFilter::Open).unwrap();
    assert_eq!(a.cache_hash(), b.cache_hash());
  }

  #[test]
  fn test_variables_carry_page_size_and_cursor() {
    let key = GithubQueryKey::issues("o", "n", IssueFilter::Closed).unwrap();
    let vars = key.variables(5, Some("c5"));
    assert_eq!(vars["issueState"], "CLOSED");
    assert_eq!(vars["first"], 5);
    assert_eq!(vars["cursor"], "c5");

    let vars = GithubQueryKey::ViewerRepositories.variables(5, None);
    assert!(vars["cursor"].is_null());
  }

  #[test]
  fn test_page_extraction() {
    let data = json!({
      "viewer": { "repositories": {
        "edges": [{ "cursor": "c1", "node": { "id": "r1" } }],
        "pageInfo": { "endCursor": "c1", "hasNextPage": false }
      } }
    });
    let page = GithubQueryKey::ViewerRepositories.page(&data).unwrap();
    assert_eq!(page.edges.len(), 1);

    let key = GithubQueryKey::issues("o", "missing", IssueFilter::Open).unwrap();
    let err = key.page(&json!({ "repository": null })).unwrap_err();
    assert!(matches!(err, CacheError::MalformedPage(_)));
  }
}
