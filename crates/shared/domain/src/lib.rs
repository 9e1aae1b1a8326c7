//! Domain layer - records, keys and cache key derivation.
//!
//! This crate contains pure domain logic with no infrastructure dependencies.
//! The repository crate builds its storage and caching behaviour on these types.

pub mod cache_key;
pub mod constants;
pub mod error;
pub mod record;
pub mod tracked;

pub use cache_key::{field_cache_key, primary_key_cache_key, value_digest, Cached};
pub use constants::*;
pub use error::{DomainError, DomainResult};
pub use record::{FieldValue, Record, RecordKey, SoftDeletable};
pub use tracked::{adjust_field, DirtyAttributes, Tracked};
