mod issue_list;
mod repository_list;

pub use issue_list::IssueListView;
pub use repository_list::RepositoryListView;
