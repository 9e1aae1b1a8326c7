//! Domain-level constants.
//!
//! These constants fix the cache key layout and the messages shared by every repository.

// =============================================================================
// Records
// =============================================================================

/// Key field assumed when a record does not name its own
pub const DEFAULT_KEY_FIELD: &str = "id";

/// Column holding the soft delete timestamp
pub const DELETED_AT_FIELD: &str = "deleted_at";

// =============================================================================
// Cache keys
// =============================================================================

/// Separates the record name from the key value in primary key cache keys
pub const PRIMARY_KEY_SEPARATOR: &str = ":";

/// Separates the record name from the field name in field cache keys
pub const FIELD_KEY_SEPARATOR: &str = "-";

/// Appended to the field name before the value digest
pub const FIELD_KEY_SUFFIX: &str = "-id:";

// =============================================================================
// Validation
// =============================================================================

/// Raised when a field lookup is attempted without a field name
pub const MISSING_FIELD_MESSAGE: &str = "A field must be specified.";
