//! Typed views over cached fragments.

use serde::de::DeserializeOwned;

use super::error::CacheError;
use super::key::EntityKey;
use super::selection::Selection;
use super::store::EntityStore;

/// A domain type that is read out of the store through a fixed selection.
pub trait Fragment: DeserializeOwned {
  /// Entity type name of the fragment's root
  const TYPE_NAME: &'static str;

  fn selection() -> Selection;
}

impl EntityStore {
  /// Read `key` through `T`'s selection and decode it.
  pub fn read<T: Fragment>(&self, key: &EntityKey) -> Result<T, CacheError> {
    let record = self.read_fragment(key, &T::selection())?;
    serde_json::from_value(record.to_json()).map_err(|e| CacheError::Shape {
      key: key.clone(),
      reason: e.to_string(),
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde::Deserialize;
  use serde_json::json;

  #[derive(Debug, Deserialize, PartialEq)]
  #[serde(rename_all = "camelCase")]
  struct Labelled {
    id: String,
    display_name: String,
  }

  impl Fragment for Labelled {
    const TYPE_NAME: &'static str = "Label";

    fn selection() -> Selection {
      Selection::new().field("id").field("displayName")
    }
  }

  #[test]
  fn test_read_typed_fragment() {
    let store = EntityStore::new();
    let key = store
      .write_node("Label", &json!({ "id": "l1", "displayName": "bug", "color": "red" }))
      .unwrap();

    let label: Labelled = store.read(&key).unwrap();
    assert_eq!(
      label,
      Labelled {
        id: "l1".to_string(),
        display_name: "bug".to_string()
      }
    );
  }

  #[test]
  fn test_read_reports_shape_mismatch() {
    let store = EntityStore::new();
    let key = store.write_node("Label", &json!({ "id": "l1" })).unwrap();
    let err = store.read::<Labelled>(&key).unwrap_err();
    assert!(matches!(err, CacheError::Shape { .. }));
  }
}
