//! Normalized field sets stored per entity.

use serde_json::{Map, Value};
use std::collections::BTreeMap;

use super::key::EntityKey;

/// A single cached field value.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
  /// JSON scalar, including null
  Scalar(Value),
  /// Embedded object without identity (e.g. `stargazers { totalCount }`)
  Record(EntityRecord),
  /// Link to another normalized entity
  Ref(EntityKey),
  /// List of values (usually refs)
  List(Vec<FieldValue>),
}

impl FieldValue {
  /// Convert a raw server value without normalizing anything.
  pub fn from_json(value: &Value) -> Self {
    match value {
      Value::Object(map) => FieldValue::Record(EntityRecord::from_json(map)),
      Value::Array(items) => FieldValue::List(items.iter().map(FieldValue::from_json).collect()),
      scalar => FieldValue::Scalar(scalar.clone()),
    }
  }

  /// Render back to JSON. Unresolved refs render as `{"__ref": "Type:id"}`.
  pub fn to_json(&self) -> Value {
    match self {
      FieldValue::Scalar(v) => v.clone(),
      FieldValue::Record(r) => r.to_json(),
      FieldValue::Ref(key) => serde_json::json!({ "__ref": key.to_string() }),
      FieldValue::List(items) => Value::Array(items.iter().map(FieldValue::to_json).collect()),
    }
  }

  pub fn as_i64(&self) -> Option<i64> {
    match self {
      FieldValue::Scalar(v) => v.as_i64(),
      _ => None,
    }
  }

  pub fn as_bool(&self) -> Option<bool> {
    match self {
      FieldValue::Scalar(v) => v.as_bool(),
      _ => None,
    }
  }

  pub fn as_str(&self) -> Option<&str> {
    match self {
      FieldValue::Scalar(v) => v.as_str(),
      _ => None,
    }
  }

  pub fn as_record(&self) -> Option<&EntityRecord> {
    match self {
      FieldValue::Record(r) => Some(r),
      _ => None,
    }
  }
}

impl From<Value> for FieldValue {
  fn from(value: Value) -> Self {
    FieldValue::from_json(&value)
  }
}

/// Field name to value mapping for one entity (or one embedded object).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EntityRecord {
  fields: BTreeMap<String, FieldValue>,
}

impl EntityRecord {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn from_json(map: &Map<String, Value>) -> Self {
    Self {
      fields: map
        .iter()
        .map(|(k, v)| (k.clone(), FieldValue::from_json(v)))
        .collect(),
    }
  }

  pub fn to_json(&self) -> Value {
    Value::Object(
      self
        .fields
        .iter()
        .map(|(k, v)| (k.clone(), v.to_json()))
        .collect(),
    )
  }

  /// Builder-style insert
  pub fn with(mut self, name: &str, value: impl Into<FieldValue>) -> Self {
    self.insert(name, value);
    self
  }

  pub fn insert(&mut self, name: &str, value: impl Into<FieldValue>) {
    self.fields.insert(name.to_string(), value.into());
  }

  pub fn get(&self, name: &str) -> Option<&FieldValue> {
    self.fields.get(name)
  }

  pub fn remove(&mut self, name: &str) -> Option<FieldValue> {
    self.fields.remove(name)
  }

  pub fn contains(&self, name: &str) -> bool {
    self.fields.contains_key(name)
  }

  pub fn len(&self) -> usize {
    self.fields.len()
  }

  pub fn is_empty(&self) -> bool {
    self.fields.is_empty()
  }

  pub fn iter(&self) -> impl Iterator<Item = (&String, &FieldValue)> {
    self.fields.iter()
  }

  pub fn into_fields(self) -> impl Iterator<Item = (String, FieldValue)> {
    self.fields.into_iter()
  }

  /// Shallow per-field overwrite: fields in `other` win, all others stay.
  pub fn merge(&mut self, other: EntityRecord) {
    self.fields.extend(other.fields);
  }

  /// Server identity of this object, if it carries one.
  ///
  /// Returns `(typename, id)`; the typename is absent when the server did not
  /// send `__typename`.
  pub fn identity(&self) -> Option<(Option<&str>, &str)> {
    let id = self.get("id")?.as_str()?;
    let type_name = self.get("__typename").and_then(FieldValue::as_str);
    Some((type_name, id))
  }
}

impl From<EntityRecord> for FieldValue {
  fn from(record: EntityRecord) -> Self {
    FieldValue::Record(record)
  }
}

impl From<EntityKey> for FieldValue {
  fn from(key: EntityKey) -> Self {
    FieldValue::Ref(key)
  }
}

impl From<i64> for FieldValue {
  fn from(n: i64) -> Self {
    FieldValue::Scalar(Value::from(n))
  }
}

impl From<bool> for FieldValue {
  fn from(b: bool) -> Self {
    FieldValue::Scalar(Value::Bool(b))
  }
}

impl From<&str> for FieldValue {
  fn from(s: &str) -> Self {
    FieldValue::Scalar(Value::String(s.to_string()))
  }
}
