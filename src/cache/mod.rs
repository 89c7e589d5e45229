//! Normalized client-side result cache.
//!
//! This module provides a GitHub-agnostic cache that:
//! - Stores each server entity once, keyed by `(type name, id)`
//! - Reads and writes entity fragments scoped by a field selection
//! - Folds cursor-paginated pages into append-only lists
//! - Applies mutation side effects by rewriting cached fragments
//!
//! Everything lives in memory for the process lifetime.

mod error;
mod fragment;
mod key;
mod pagination;
mod query_results;
mod reconcile;
mod record;
mod selection;
mod store;

pub use error::CacheError;
pub use fragment::Fragment;
pub use key::EntityKey;
pub use pagination::{Edge, PageAggregator, PageResult, PageState};
pub use query_results::{QueryKey, QueryResults};
pub use reconcile::{
  star_selection, star_total, MutationDelta, MutationReconciler, StarAction, StarDelta,
};
pub use record::{EntityRecord, FieldValue};
pub use selection::{Field, Selection};
pub use store::EntityStore;
