use serde::Deserialize;

use crate::cache::{Fragment, Selection};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Language {
  pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Owner {
  pub login: String,
  pub url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Count {
  pub total_count: i64,
}

/// Repository row as rendered in the profile list
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Repository {
  pub id: String,
  pub name: String,
  pub url: String,
  #[serde(rename = "descriptionHTML", default)]
  pub description_html: Option<String>,
  #[serde(default)]
  pub primary_language: Option<Language>,
  #[serde(default)]
  pub owner: Option<Owner>,
  pub stargazers: Count,
  #[serde(default)]
  pub watchers: Option<Count>,
  #[serde(default)]
  pub viewer_subscription: Option<String>,
  pub viewer_has_starred: bool,
}

impl Fragment for Repository {
  const TYPE_NAME: &'static str = "Repository";

  fn selection() -> Selection {
    Selection::new()
      .field("id")
      .field("name")
      .field("url")
      .field("descriptionHTML")
      .nested("primaryLanguage", Selection::new().field("name"))
      .nested(
        "owner",
        Selection::new().field("id").field("login").field("url"),
      )
      .nested("stargazers", Selection::new().field("totalCount"))
      .field("viewerHasStarred")
      .nested("watchers", Selection::new().field("totalCount"))
      .field("viewerSubscription")
  }
}

impl Repository {
  pub fn full_name(&self) -> String {
    match &self.owner {
      Some(owner) => format!("{}/{}", owner.login, self.name),
      None => self.name.clone(),
    }
  }
}

/// Issue row of a repository's issue list
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
  pub id: String,
  pub number: u64,
  pub state: String,
  pub title: String,
  pub url: String,
  #[serde(rename = "bodyHTML", default)]
  pub body_html: Option<String>,
}

impl Fragment for Issue {
  const TYPE_NAME: &'static str = "Issue";

  fn selection() -> Selection {
    Selection::new()
      .field("id")
      .field("number")
      .field("state")
      .field("title")
      .field("url")
      .field("bodyHTML")
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Author {
  pub login: String,
}

/// A comment created through the composer
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
  pub id: String,
  pub body: String,
  #[serde(default)]
  pub created_at: Option<String>,
  #[serde(default)]
  pub author: Option<Author>,
}

impl Fragment for Comment {
  const TYPE_NAME: &'static str = "IssueComment";

  fn selection() -> Selection {
    Selection::new()
      .field("id")
      .field("body")
      .field("createdAt")
      .nested("author", Selection::new().field("login"))
  }
}
