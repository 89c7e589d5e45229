pub mod cache;
pub mod client;
pub mod documents;
#[cfg(test)]
pub mod mock;
pub mod transport;
pub mod types;

pub use cache::GithubQueryKey;
pub use client::{CachedGithubClient, GithubClient, RequestError};
pub use transport::{Transport, TransportError};
pub use types::{Comment, Issue, Repository};
