//! Change tracking for records passed to `persist`.

use std::collections::BTreeMap;
use std::ops::{Deref, DerefMut};

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{DomainError, DomainResult};
use crate::record::{Record, RecordKey};

/// Changed attributes mapped to their value before the change.
///
/// Attributes of a record that has never been saved map to `null`.
pub type DirtyAttributes = BTreeMap<String, Value>;

/// A record together with the state it was last loaded or saved in.
#[derive(Debug, Clone)]
pub struct Tracked<E: Record> {
    current: E,
    original: Option<E>,
}

impl<E: Record> Tracked<E> {
    /// Wrap a record that does not exist in the data source yet.
    pub fn new(entity: E) -> Self {
        Self {
            current: entity,
            original: None,
        }
    }

    /// Wrap a record as it was read from the data source.
    pub fn loaded(entity: E) -> Self {
        Self {
            original: Some(entity.clone()),
            current: entity,
        }
    }

    pub fn is_new(&self) -> bool {
        self.original.is_none()
    }

    pub fn get(&self) -> &E {
        &self.current
    }

    pub fn into_inner(self) -> E {
        self.current
    }

    /// Attributes that differ from the last synced state.
    pub fn dirty(&self) -> DomainResult<DirtyAttributes> {
        let current = attributes(&self.current)?;

        let Some(original) = &self.original else {
            let empty_key = self.current.key().is_empty();
            return Ok(current
                .into_iter()
                .filter(|(name, value)| {
                    !value.is_null() && !(empty_key && name.as_str() == E::KEY_FIELD)
                })
                .map(|(name, _)| (name, Value::Null))
                .collect());
        };

        let original = attributes(original)?;
        Ok(current
            .into_iter()
            .filter_map(|(name, value)| {
                let before = original.get(&name).cloned().unwrap_or(Value::Null);
                (before != value).then_some((name, before))
            })
            .collect())
    }

    /// Replace both states with what the data source returned after a save.
    pub fn sync(&mut self, saved: E) {
        self.original = Some(saved.clone());
        self.current = saved;
    }
}

impl<E: Record> Deref for Tracked<E> {
    type Target = E;

    fn deref(&self) -> &E {
        &self.current
    }
}

impl<E: Record> DerefMut for Tracked<E> {
    fn deref_mut(&mut self) -> &mut E {
        &mut self.current
    }
}

/// Add `amount` to an integer attribute in place, returning its previous value.
pub fn adjust_field<E: Record>(entity: &mut E, field: &str, amount: i64) -> DomainResult<Value> {
    let mut map = attributes(entity)?;
    let previous = map.get(field).cloned().ok_or_else(|| {
        DomainError::invalid_argument(format!("{} has no attribute `{}`", E::NAME, field))
    })?;
    let current = previous.as_i64().ok_or_else(|| {
        DomainError::invalid_argument(format!("{}.{} is not an integer", E::NAME, field))
    })?;
    let adjusted = current.checked_add(amount).ok_or_else(|| {
        DomainError::invalid_argument(format!("{}.{} would overflow", E::NAME, field))
    })?;

    map.insert(field.to_string(), Value::from(adjusted));
    *entity = serde_json::from_value(Value::Object(map))?;
    Ok(previous)
}

fn attributes<T: Serialize>(entity: &T) -> DomainResult<Map<String, Value>> {
    match serde_json::to_value(entity)? {
        Value::Object(map) => Ok(map),
        _ => Err(DomainError::internal("records must serialize to an attribute map")),
    }
}
