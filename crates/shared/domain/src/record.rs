//! Record traits shared by every repository.

use std::fmt::{self, Debug, Display};
use std::hash::Hash;

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};
use uuid::Uuid;

use crate::constants::{DEFAULT_KEY_FIELD, DELETED_AT_FIELD};

/// Primary key of a record.
///
/// An empty key (zero, empty string, nil uuid) never reaches the data source.
pub trait RecordKey:
    Clone + Debug + Display + Eq + Hash + Serialize + DeserializeOwned + Send + Sync + 'static
{
    fn is_empty(&self) -> bool;
}

macro_rules! integer_keys {
    ($($ty:ty),*) => {
        $(
            impl RecordKey for $ty {
                fn is_empty(&self) -> bool {
                    *self == 0
                }
            }
        )*
    };
}

integer_keys!(i32, i64, u32, u64);

impl RecordKey for String {
    fn is_empty(&self) -> bool {
        str::is_empty(self)
    }
}

impl RecordKey for Uuid {
    fn is_empty(&self) -> bool {
        self.is_nil()
    }
}

/// A persisted entity with a stable name and a single primary key.
///
/// Records serialize to a flat attribute map whose keys are the column names.
pub trait Record: Clone + Debug + Serialize + DeserializeOwned + Send + Sync + 'static {
    type Key: RecordKey;

    /// Human readable record name, used for cache keys and not-found messages
    const NAME: &'static str;

    /// Name of the primary key attribute
    const KEY_FIELD: &'static str = DEFAULT_KEY_FIELD;

    fn key(&self) -> Self::Key;
}

/// Records that are hidden by a deletion timestamp instead of being removed.
pub trait SoftDeletable: Record {
    /// Attribute holding the deletion timestamp
    const DELETED_AT: &'static str = DELETED_AT_FIELD;

    fn deleted_at(&self) -> Option<DateTime<Utc>>;

    fn set_deleted_at(&mut self, at: Option<DateTime<Utc>>);

    fn trashed(&self) -> bool {
        self.deleted_at().is_some()
    }
}

/// Value used to look a record up by one of its attributes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldValue {
    Text(String),
    Int(i64),
    Bool(bool),
    Uuid(Uuid),
}

impl FieldValue {
    /// Empty values short-circuit lookups without touching cache or database.
    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Text(s) => s.is_empty(),
            FieldValue::Int(i) => *i == 0,
            FieldValue::Bool(b) => !b,
            FieldValue::Uuid(u) => u.is_nil(),
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            FieldValue::Text(s) => serde_json::Value::from(s.as_str()),
            FieldValue::Int(i) => serde_json::Value::from(*i),
            FieldValue::Bool(b) => serde_json::Value::from(*b),
            FieldValue::Uuid(u) => serde_json::Value::from(u.to_string()),
        }
    }
}

impl Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(s) => write!(f, "{}", s),
            FieldValue::Int(i) => write!(f, "{}", i),
            FieldValue::Bool(b) => write!(f, "{}", u8::from(*b)),
            FieldValue::Uuid(u) => write!(f, "{}", u),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

impl From<i64> for FieldValue {
    fn from(i: i64) -> Self {
        FieldValue::Int(i)
    }
}

impl From<i32> for FieldValue {
    fn from(i: i32) -> Self {
        FieldValue::Int(i64::from(i))
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Bool(b)
    }
}

impl From<Uuid> for FieldValue {
    fn from(u: Uuid) -> Self {
        FieldValue::Uuid(u)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_keys() {
        assert!(0i32.is_empty());
        assert!(!7i64.is_empty());
        assert!(RecordKey::is_empty(&String::new()));
        assert!(Uuid::nil().is_empty());
        assert!(!Uuid::new_v4().is_empty());
    }

    #[test]
    fn test_empty_field_values() {
        assert!(FieldValue::from("").is_empty());
        assert!(FieldValue::from(0).is_empty());
        assert!(FieldValue::from(false).is_empty());
        assert!(!FieldValue::from("Model 1").is_empty());
        assert!(!FieldValue::from(true).is_empty());
    }

    #[test]
    fn test_field_value_display() {
        assert_eq!(FieldValue::from("abc").to_string(), "abc");
        assert_eq!(FieldValue::from(42).to_string(), "42");
        assert_eq!(FieldValue::from(true).to_string(), "1");
    }
}
