//! List controllers: what the views render and the requests they trigger.

mod issue_list;
mod paged;
mod repository_list;

pub use issue_list::{CommentStatus, IssueList, IssueMessage};
pub use paged::{LiveQuery, PageEvent, PagedList};
pub use repository_list::{RepositoryList, RepositoryMessage};

#[cfg(test)]
pub(crate) mod testing {
  use std::time::Duration;

  /// Tick until `step` reports nothing in flight.
  pub async fn settle(mut step: impl FnMut() -> bool) {
    for _ in 0..100 {
      tokio::time::sleep(Duration::from_millis(2)).await;
      if !step() {
        return;
      }
    }
    panic!("operations did not settle");
  }
}
