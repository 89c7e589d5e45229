//! Normalized entity store.

use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::trace;

use super::error::CacheError;
use super::key::EntityKey;
use super::record::{EntityRecord, FieldValue};
use super::selection::Selection;

type Entities = HashMap<EntityKey, EntityRecord>;

/// Process-lifetime store of server entities keyed by `(type, id)`.
///
/// This is a cheap cloneable handle: every clone sees the same entities.
/// Construct one at startup and pass it to every component that reads or
/// writes entity data.
#[derive(Clone, Default)]
pub struct EntityStore {
  entities: Arc<Mutex<Entities>>,
}

impl EntityStore {
  pub fn new() -> Self {
    Self::default()
  }

  fn lock(&self) -> MutexGuard<'_, Entities> {
    // Writes are whole-field replacements, so a poisoned map is still coherent
    self.entities.lock().unwrap_or_else(PoisonError::into_inner)
  }

  /// Read the fields of `key` restricted to `selection`.
  ///
  /// References with a nested selection are resolved to embedded records.
  /// Selected fields the record does not hold are left out.
  pub fn read_fragment(
    &self,
    key: &EntityKey,
    selection: &Selection,
  ) -> Result<EntityRecord, CacheError> {
    let entities = self.lock();
    read_entity(&entities, key, selection)
  }

  /// Merge the selected fields of `record` into `key`, creating it if absent.
  ///
  /// Embedded objects that carry `id` and `__typename` are stored as their
  /// own entities and linked by reference.
  /// A field already linked to an entity stays linked: an embedded record
  /// naming the same entity (or no identity at all, as `read_fragment`
  /// returns it) is merged into that entity instead of replacing the link.
  pub fn write_fragment(&self, key: &EntityKey, selection: &Selection, record: EntityRecord) {
    let mut entities = self.lock();
    let restricted = restrict(record, selection);
    let normalized = normalize_linked(&mut entities, key, restricted);
    merge_into(&mut entities, key, normalized);
  }

  /// Normalize one server object and return its key.
  ///
  /// `default_type` names the entity when the object has no `__typename`,
  /// which is the case for list nodes of a statically known type.
  pub fn write_node(&self, default_type: &str, node: &Value) -> Result<EntityKey, CacheError> {
    let map = node.as_object().ok_or(CacheError::MissingId)?;
    let record = EntityRecord::from_json(map);
    let key = match record.identity() {
      Some((type_name, id)) => EntityKey::new(type_name.unwrap_or(default_type), id),
      None => return Err(CacheError::MissingId),
    };

    let mut entities = self.lock();
    let normalized = normalize_fields(&mut entities, record);
    merge_into(&mut entities, &key, normalized);
    Ok(key)
  }

  /// Full stored record for `key`, with references left unresolved
  pub fn get(&self, key: &EntityKey) -> Option<EntityRecord> {
    self.lock().get(key).cloned()
  }

  pub fn contains(&self, key: &EntityKey) -> bool {
    self.lock().contains_key(key)
  }

  pub fn len(&self) -> usize {
    self.lock().len()
  }

  pub fn is_empty(&self) -> bool {
    self.lock().is_empty()
  }
}

fn merge_into(entities: &mut Entities, key: &EntityKey, record: EntityRecord) {
  trace!(entity = %key, fields = record.len(), "write entity");
  entities.entry(key.clone()).or_default().merge(record);
}

fn read_entity(
  entities: &Entities,
  key: &EntityKey,
  selection: &Selection,
) -> Result<EntityRecord, CacheError> {
  let stored = entities
    .get(key)
    .ok_or_else(|| CacheError::MissingEntity(key.clone()))?;
  read_record(entities, stored, selection)
}

fn read_record(
  entities: &Entities,
  record: &EntityRecord,
  selection: &Selection,
) -> Result<EntityRecord, CacheError> {
  let mut out = EntityRecord::new();
  for field in selection.fields() {
    if let Some(value) = record.get(&field.name) {
      let resolved = read_value(entities, value, field.selection.as_ref())?;
      out.insert(&field.name, resolved);
    }
  }
  Ok(out)
}

fn read_value(
  entities: &Entities,
  value: &FieldValue,
  selection: Option<&Selection>,
) -> Result<FieldValue, CacheError> {
  Ok(match (value, selection) {
    (FieldValue::Ref(key), Some(sub)) => FieldValue::Record(read_entity(entities, key, sub)?),
    (FieldValue::Record(record), Some(sub)) => {
      FieldValue::Record(read_record(entities, record, sub)?)
    }
    (FieldValue::List(items), sub) => FieldValue::List(
      items
        .iter()
        .map(|item| read_value(entities, item, sub))
        .collect::<Result<_, _>>()?,
    ),
    (other, _) => other.clone(),
  })
}

/// Keep only the selected fields, recursing into embedded records.
fn restrict(mut record: EntityRecord, selection: &Selection) -> EntityRecord {
  let mut out = EntityRecord::new();
  for field in selection.fields() {
    if let Some(value) = record.remove(&field.name) {
      let value = match (value, &field.selection) {
        (FieldValue::Record(inner), Some(sub)) => FieldValue::Record(restrict(inner, sub)),
        (value, _) => value,
      };
      out.insert(&field.name, value);
    }
  }
  out
}

/// Normalize the fields written to `key`, keeping its existing references.
fn normalize_linked(entities: &mut Entities, key: &EntityKey, record: EntityRecord) -> EntityRecord {
  let mut out = EntityRecord::new();
  for (name, value) in record.into_fields() {
    let target = match (&value, entities.get(key).and_then(|r| r.get(&name))) {
      (FieldValue::Record(inner), Some(FieldValue::Ref(target))) if refers_to(inner, target) => {
        Some(target.clone())
      }
      _ => None,
    };
    let value = match (value, target) {
      (FieldValue::Record(inner), Some(target)) => {
        let normalized = normalize_fields(entities, inner);
        merge_into(entities, &target, normalized);
        FieldValue::Ref(target)
      }
      (value, _) => normalize_value(entities, value),
    };
    out.insert(&name, value);
  }
  out
}

/// Whether an embedded record may stand for the entity `target`.
fn refers_to(record: &EntityRecord, target: &EntityKey) -> bool {
  match record.identity() {
    Some((Some(type_name), id)) => type_name == target.type_name && id == target.id,
    Some((None, id)) => id == target.id,
    None => true,
  }
}

fn normalize_fields(entities: &mut Entities, record: EntityRecord) -> EntityRecord {
  let mut out = EntityRecord::new();
  for (name, value) in record.into_fields() {
    out.insert(&name, normalize_value(entities, value));
  }
  out
}

fn normalize_value(entities: &mut Entities, value: FieldValue) -> FieldValue {
  match value {
    FieldValue::Record(record) => {
      let identity = record
        .identity()
        .and_then(|(type_name, id)| type_name.map(|t| EntityKey::new(t, id)));
      // Without a typename there is no safe key; keep it embedded
      let Some(key) = identity else {
        return FieldValue::Record(normalize_fields(entities, record));
      };
      let normalized = normalize_fields(entities, record);
      merge_into(entities, &key, normalized);
      FieldValue::Ref(key)
    }
    FieldValue::List(items) => FieldValue::List(
      items
        .into_iter()
        .map(|item| normalize_value(entities, item))
        .collect(),
    ),
    other => other,
  }
}
