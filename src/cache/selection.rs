//! Field selections used to scope fragment reads and writes.

/// One selected field, optionally with a nested selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
  pub name: String,
  pub selection: Option<Selection>,
}

/// An ordered set of selected fields, the cache-side mirror of a GraphQL
/// fragment body.
///
/// ```ignore
/// let repo = Selection::new()
///   .field("id")
///   .nested("stargazers", Selection::new().field("totalCount"))
///   .field("viewerHasStarred");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Selection {
  fields: Vec<Field>,
}

impl Selection {
  pub fn new() -> Self {
    Self::default()
  }

  /// Add a leaf field
  pub fn field(mut self, name: &str) -> Self {
    self.push(name, None);
    self
  }

  /// Add a field with a nested selection
  pub fn nested(mut self, name: &str, selection: Selection) -> Self {
    self.push(name, Some(selection));
    self
  }

  fn push(&mut self, name: &str, selection: Option<Selection>) {
    // Re-selecting a field replaces the earlier entry in place
    if let Some(existing) = self.fields.iter_mut().find(|f| f.name == name) {
      existing.selection = selection;
      return;
    }
    self.fields.push(Field {
      name: name.to_string(),
      selection,
    });
  }

  pub fn fields(&self) -> &[Field] {
    &self.fields
  }

  pub fn get(&self, name: &str) -> Option<&Field> {
    self.fields.iter().find(|f| f.name == name)
  }

  pub fn contains(&self, name: &str) -> bool {
    self.get(name).is_some()
  }

  /// Union of two selections; nested selections are unioned recursively.
  pub fn union(mut self, other: &Selection) -> Self {
    for field in &other.fields {
      match self.fields.iter_mut().find(|f| f.name == field.name) {
        Some(existing) => {
          existing.selection = match (existing.selection.take(), &field.selection) {
            (Some(a), Some(b)) => Some(a.union(b)),
            (Some(a), None) => Some(a),
            (None, b) => b.clone(),
          };
        }
        None => self.fields.push(field.clone()),
      }
    }
    self
  }
}
