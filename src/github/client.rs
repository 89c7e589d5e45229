use color_eyre::Result;
use futures::future::BoxFuture;
use futures::FutureExt;
use serde_json::{json, Value};
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

use crate::cache::{
  CacheError, EntityStore, MutationReconciler, PageAggregator, PageResult, QueryResults,
  StarAction,
};
use crate::config::{Config, DEFAULT_PAGE_SIZE};
use crate::operation::EffectQueue;

use super::cache::GithubQueryKey;
use super::documents::{ADD_COMMENT, STAR_REPO, UN_STAR_REPO};
use super::transport::{HttpTransport, Transport, TransportError};

/// Failure of a page fetch: either the request or the shape of its answer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
  #[error(transparent)]
  Transport(#[from] TransportError),
  #[error(transparent)]
  Cache(#[from] CacheError),
}

/// GitHub GraphQL client.
///
/// Every call returns a `'static` future so it can be spawned by the caller.
#[derive(Clone)]
pub struct GithubClient {
  transport: Arc<dyn Transport>,
  page_size: u32,
}

impl GithubClient {
  pub fn new(config: &Config) -> Result<Self> {
    let token = Config::get_api_token()?;
    let endpoint = config.github.endpoint()?;
    info!(endpoint = %endpoint, page_size = config.page_size, "github client");
    Ok(Self::with_transport(
      Arc::new(HttpTransport::new(endpoint, token)),
      config.page_size,
    ))
  }

  pub fn with_transport(transport: Arc<dyn Transport>, page_size: u32) -> Self {
    Self {
      transport,
      page_size: if page_size == 0 {
        DEFAULT_PAGE_SIZE
      } else {
        page_size
      },
    }
  }

  pub fn page_size(&self) -> u32 {
    self.page_size
  }

  /// Fetch one page of `query` after `cursor` (the first page if `None`).
  pub fn fetch_page(
    &self,
    query: &GithubQueryKey,
    cursor: Option<&str>,
  ) -> BoxFuture<'static, Result<PageResult, RequestError>> {
    let request = self
      .transport
      .execute(query.document(), query.variables(self.page_size, cursor));
    let query = query.clone();
    async move {
      let data = request.await?;
      Ok(query.page(&data)?)
    }
    .boxed()
  }

  /// Run `action` against a starrable, returning the mutation's `data`.
  pub fn star(
    &self,
    action: StarAction,
    entity_id: &str,
  ) -> BoxFuture<'static, Result<Value, TransportError>> {
    let document = match action {
      StarAction::AddStar => STAR_REPO,
      StarAction::RemoveStar => UN_STAR_REPO,
    };
    self.transport.execute(document, json!({ "id": entity_id }))
  }

  pub fn add_comment(
    &self,
    subject_id: &str,
    body: &str,
  ) -> BoxFuture<'static, Result<Value, TransportError>> {
    self
      .transport
      .execute(ADD_COMMENT, json!({ "subjectId": subject_id, "body": body }))
  }
}

/// GitHub client bundled with the shared entity store, query slots and the
/// queue of completed requests waiting to be folded into them.
///
/// Clones share one store, one set of slots and one queue.
#[derive(Clone)]
pub struct CachedGithubClient {
  inner: GithubClient,
  store: EntityStore,
  results: QueryResults,
  effects: EffectQueue,
}

impl CachedGithubClient {
  pub fn new(config: &Config) -> Result<Self> {
    Ok(Self::from_client(GithubClient::new(config)?))
  }

  pub fn from_client(inner: GithubClient) -> Self {
    Self {
      inner,
      store: EntityStore::new(),
      results: QueryResults::new(),
      effects: EffectQueue::new(),
    }
  }

  pub fn client(&self) -> &GithubClient {
    &self.inner
  }

  pub fn store(&self) -> &EntityStore {
    &self.store
  }

  pub fn results(&self) -> &QueryResults {
    &self.results
  }

  pub fn effects(&self) -> &EffectQueue {
    &self.effects
  }

  /// Fold every completed request into the store, whichever controller
  /// started it.
  pub fn apply_effects(&self) -> usize {
    self.effects.apply_pending()
  }

  pub fn reconciler(&self) -> MutationReconciler {
    MutationReconciler::new(self.store.clone())
  }

  pub fn aggregator(&self, query: &GithubQueryKey) -> PageAggregator {
    PageAggregator::new(self.store.clone(), query.node_type())
  }

  /// Whether `query` already has a slot
  pub fn is_warm(&self, query: &GithubQueryKey) -> bool {
    self.results.contains(query)
  }
}
