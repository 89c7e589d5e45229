//! Errors raised by the entity cache.

use thiserror::Error;

use super::key::EntityKey;

/// Failures of cache reads, writes and reconciliation.
///
/// None of these are transport failures: they describe what the cache holds
/// (or fails to hold), never whether the server was reachable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CacheError {
  /// A fragment read targeted a key that was never written.
  #[error("no cached entity for {0}")]
  MissingEntity(EntityKey),
  /// The entity exists but lacks a field a delta needs.
  #[error("cached entity {key} has no usable field '{field}'")]
  MissingField { key: EntityKey, field: String },
  /// A cached entity could not be decoded into a typed fragment.
  #[error("cached entity {key} does not match fragment: {reason}")]
  Shape { key: EntityKey, reason: String },
  /// A server object that should carry identity had no string `id`.
  #[error("server object has no string 'id'")]
  MissingId,
  /// A paginated response did not have the connection shape.
  #[error("malformed page: {0}")]
  MalformedPage(String),
}
