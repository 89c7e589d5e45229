use std::fmt;

/// Identity of a cached entity: the server type name plus its id.
///
/// Two fetches producing the same key describe the same logical entity,
/// regardless of which query returned them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityKey {
  pub type_name: String,
  pub id: String,
}

impl EntityKey {
  pub fn new(type_name: impl Into<String>, id: impl Into<String>) -> Self {
    Self {
      type_name: type_name.into(),
      id: id.into(),
    }
  }

  /// Key of a repository by node id (`Repository:<id>`)
  pub fn repository(id: impl Into<String>) -> Self {
    Self::new("Repository", id)
  }

  /// Parse the `Type:id` form produced by `Display`.
  ///
  /// The id may itself contain colons, so only the first one splits.
  pub fn parse(s: &str) -> Option<Self> {
    let (type_name, id) = s.split_once(':')?;
    if type_name.is_empty() || id.is_empty() {
      return None;
    }
    Some(Self::new(type_name, id))
  }
}

impl fmt::Display for EntityKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}:{}", self.type_name, self.id)
  }
}
