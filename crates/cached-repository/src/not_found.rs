//! Construction of the error returned by the `*_or_fail` lookups.

use std::fmt;
use std::sync::Arc;

use common::{AppError, RepositoryConfig};

/// What a failed lookup was looking for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotFoundContext<'a> {
    /// Record name, e.g. `Post`
    pub entity: &'a str,
    /// Attribute that was searched, the key field for key lookups
    pub field: &'a str,
    pub value: String,
}

/// Builds the error for a failed `*_or_fail` lookup.
pub type NotFoundFactory = Arc<dyn Fn(&NotFoundContext<'_>) -> AppError + Send + Sync>;

fn default_not_found(context: &NotFoundContext<'_>) -> AppError {
    AppError::not_found(context.entity, context.field, context.value.clone())
}

/// Per-repository options.
#[derive(Clone)]
pub struct RepositoryOptions {
    pub config: RepositoryConfig,
    not_found: NotFoundFactory,
}

impl RepositoryOptions {
    pub fn new(config: RepositoryConfig) -> Self {
        Self {
            config,
            not_found: Arc::new(default_not_found),
        }
    }

    /// Replace the error raised when an `*_or_fail` lookup finds nothing.
    pub fn with_not_found<F>(mut self, factory: F) -> Self
    where
        F: Fn(&NotFoundContext<'_>) -> AppError + Send + Sync + 'static,
    {
        self.not_found = Arc::new(factory);
        self
    }

    pub fn not_found_error(&self, entity: &str, field: &str, value: String) -> AppError {
        (self.not_found)(&NotFoundContext {
            entity,
            field,
            value,
        })
    }
}

impl Default for RepositoryOptions {
    fn default() -> Self {
        Self::new(RepositoryConfig::default())
    }
}

impl fmt::Debug for RepositoryOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RepositoryOptions")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
