//! Cache key derivation and the cached value envelope.

use std::fmt::Display;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::constants::{FIELD_KEY_SEPARATOR, FIELD_KEY_SUFFIX, PRIMARY_KEY_SEPARATOR};
use crate::record::FieldValue;

/// Key under which a record is cached by primary key, e.g. `post:1`.
pub fn primary_key_cache_key(name: &str, id: &impl Display) -> String {
    format!("{}{}{}", name.to_lowercase(), PRIMARY_KEY_SEPARATOR, id)
}

/// Key under which the primary key of a record is cached for a field lookup,
/// e.g. `post-text-id:<sha256 of the value>`.
pub fn field_cache_key(name: &str, field: &str, value: &FieldValue) -> String {
    let prefix = format!("{}{}{}{}", name, FIELD_KEY_SEPARATOR, field, FIELD_KEY_SUFFIX);
    format!("{}{}", prefix.to_lowercase(), value_digest(value))
}

/// Hex encoded SHA-256 of the value's string form.
pub fn value_digest(value: &FieldValue) -> String {
    let mut hasher = Sha256::new();
    hasher.update(value.to_string().as_bytes());
    hex::encode(hasher.finalize())
}

/// Entry stored under a primary key cache key.
///
/// `Missing` records that the data source had no row for the key, so repeated
/// lookups of an absent record do not reach the data source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", content = "value", rename_all = "lowercase")]
pub enum Cached<T> {
    Found(T),
    Missing,
}

impl<T> Cached<T> {
    pub fn into_option(self) -> Option<T> {
        match self {
            Cached::Found(value) => Some(value),
            Cached::Missing => None,
        }
    }
}

impl<T> From<Option<T>> for Cached<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => Cached::Found(value),
            None => Cached::Missing,
        }
    }
}
