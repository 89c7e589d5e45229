/// Which issues of a repository are listed.
///
/// The toggle button cycles `None → Open → Closed → None`; `None` renders no
/// list at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum IssueFilter {
  #[default]
  None,
  Open,
  Closed,
}

impl IssueFilter {
  /// The fixed cyclic transition
  pub fn next(self) -> Self {
    match self {
      IssueFilter::None => IssueFilter::Open,
      IssueFilter::Open => IssueFilter::Closed,
      IssueFilter::Closed => IssueFilter::None,
    }
  }

  /// State to persist after the toggle is activated in `current`.
  pub fn on_activate(current: Self) -> Self {
    current.next()
  }

  /// Whether a list is rendered in this state
  pub fn is_shown(self) -> bool {
    !matches!(self, IssueFilter::None)
  }

  /// GraphQL `IssueState` value for the query, if any
  pub fn issue_state(self) -> Option<&'static str> {
    match self {
      IssueFilter::None => None,
      IssueFilter::Open => Some("OPEN"),
      IssueFilter::Closed => Some("CLOSED"),
    }
  }

  /// Label of the toggle while in this state (it names the next state)
  pub fn transition_label(self) -> &'static str {
    match self {
      IssueFilter::None => "Show Open Issues",
      IssueFilter::Open => "Show Closed Issues",
      IssueFilter::Closed => "Hide Issues",
    }
  }

  pub fn label(self) -> &'static str {
    match self {
      IssueFilter::None => "hidden",
      IssueFilter::Open => "open",
      IssueFilter::Closed => "closed",
    }
  }
}
