//! GraphQL transport: execute one document with variables.

use futures::future::BoxFuture;
use futures::FutureExt;
use reqwest::header::USER_AGENT;
use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::debug;
use url::Url;

/// Failure of a single `execute` call.
///
/// These are shown to the user as is and never retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
  /// Connection failure or non-success HTTP status
  #[error("request failed: {0}")]
  Http(String),
  /// The server answered with GraphQL errors
  #[error("{0}")]
  Graphql(String),
  /// The body could not be understood
  #[error("invalid response: {0}")]
  Decode(String),
}

/// Executes queries and mutations against the remote graph API.
///
/// Exactly one of data or error is returned per call.
pub trait Transport: Send + Sync {
  fn execute(
    &self,
    document: &'static str,
    variables: Value,
  ) -> BoxFuture<'static, Result<Value, TransportError>>;
}

#[derive(Debug, Deserialize)]
struct ApiGraphqlError {
  message: String,
}

#[derive(Debug, Deserialize)]
struct ApiGraphqlResponse {
  data: Option<Value>,
  #[serde(default)]
  errors: Vec<ApiGraphqlError>,
}

/// Interpret a GraphQL response body.
fn into_data(response: ApiGraphqlResponse) -> Result<Value, TransportError> {
  if !response.errors.is_empty() {
    let messages: Vec<String> = response.errors.into_iter().map(|e| e.message).collect();
    return Err(TransportError::Graphql(messages.join("; ")));
  }
  match response.data {
    Some(Value::Null) | None => Err(TransportError::Decode(
      "response has neither data nor errors".to_string(),
    )),
    Some(data) => Ok(data),
  }
}

/// HTTP transport for the GitHub GraphQL endpoint (bearer token auth).
#[derive(Clone)]
pub struct HttpTransport {
  client: reqwest::Client,
  endpoint: Url,
  token: String,
}

impl HttpTransport {
  pub fn new(endpoint: Url, token: String) -> Self {
    Self {
      client: reqwest::Client::new(),
      endpoint,
      token,
    }
  }
}

impl Transport for HttpTransport {
  fn execute(
    &self,
    document: &'static str,
    variables: Value,
  ) -> BoxFuture<'static, Result<Value, TransportError>> {
    let request = self
      .client
      .post(self.endpoint.clone())
      .bearer_auth(&self.token)
      .header(USER_AGENT, concat!("gh9s/", env!("CARGO_PKG_VERSION")))
      .json(&json!({ "query": document, "variables": variables }));

    async move {
      let response = request
        .send()
        .await
        .map_err(|e| TransportError::Http(e.to_string()))?;

      let status = response.status();
      if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(TransportError::Http(format!("{}: {}", status, body.trim())));
      }

      let body: ApiGraphqlResponse = response
        .json()
        .await
        .map_err(|e| TransportError::Decode(e.to_string()))?;
      debug!(
        errors = body.errors.len(),
        has_data = body.data.is_some(),
        "graphql response"
      );
      into_data(body)
    }
    .boxed()
  }
}
