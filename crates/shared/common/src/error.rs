//! Unified error handling for repositories and the services built on them.
//!
//! Provides a single error type that wraps:
//! - Argument and lookup failures raised by repositories
//! - Data source (sea-orm) and cache (redis) failures
//! - Errors produced by host-supplied not-found factories

use domain::DomainError;
use thiserror::Error;

/// Application error types.
#[derive(Error, Debug)]
pub enum AppError {
    // Caller errors
    #[error("{0}")]
    InvalidArgument(String),

    #[error("The {} you were looking for could not be found.", .entity.to_lowercase())]
    NotFound {
        entity: String,
        field: String,
        value: String,
    },

    /// Error built by a host-supplied not-found factory
    #[error("{0}")]
    Host(Box<dyn std::error::Error + Send + Sync>),

    // External service errors
    #[cfg(feature = "database")]
    #[error("Database error")]
    Database(#[from] sea_orm::DbErr),

    #[cfg(feature = "cache")]
    #[error("Cache error")]
    Cache(#[from] redis::RedisError),

    #[error("Cache entry could not be encoded or decoded")]
    Serialization(#[from] serde_json::Error),

    // Internal
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Get error code for callers
    pub fn code(&self) -> &'static str {
        match self {
            AppError::InvalidArgument(_) => "INVALID_ARGUMENT",
            AppError::NotFound { .. } => "NOT_FOUND",
            AppError::Host(_) => "HOST_ERROR",
            #[cfg(feature = "database")]
            AppError::Database(_) => "DATABASE_ERROR",
            #[cfg(feature = "cache")]
            AppError::Cache(_) => "CACHE_ERROR",
            AppError::Serialization(_) => "SERIALIZATION_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, AppError::NotFound { .. })
    }

    /// Get user-facing message (hides internal details)
    pub fn user_message(&self) -> String {
        match self {
            #[cfg(feature = "database")]
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                "A database error occurred".to_string()
            }
            #[cfg(feature = "cache")]
            AppError::Cache(e) => {
                tracing::error!("Cache error: {:?}", e);
                "A cache error occurred".to_string()
            }
            AppError::Serialization(e) => {
                tracing::error!("Serialization error: {:?}", e);
                "A cache error occurred".to_string()
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                "An internal error occurred".to_string()
            }

            // Use default message for others
            _ => self.to_string(),
        }
    }
}

// =============================================================================
// Domain Error Conversion
// =============================================================================

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::InvalidArgument(msg) => AppError::InvalidArgument(msg),
            DomainError::Serialization(msg) => AppError::Internal(msg),
            DomainError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

/// Result type alias
pub type AppResult<T> = Result<T, AppError>;

/// Convenience constructors
impl AppError {
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        AppError::InvalidArgument(msg.into())
    }

    pub fn not_found(
        entity: impl Into<String>,
        field: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        AppError::NotFound {
            entity: entity.into(),
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn host(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        AppError::Host(err.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::Internal(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message() {
        let err = AppError::not_found("BlogPost", "id", "3");
        assert_eq!(
            err.to_string(),
            "The blogpost you were looking for could not be found."
        );
        assert_eq!(err.code(), "NOT_FOUND");
        assert!(err.is_not_found());
    }

    #[test]
    fn test_domain_error_conversion() {
        let err: AppError = DomainError::invalid_argument("A field must be specified.").into();
        assert!(matches!(err, AppError::InvalidArgument(ref msg) if msg == "A field must be specified."));
    }

    #[test]
    fn test_host_error_keeps_message() {
        let err = AppError::host("post 9 is gone");
        assert_eq!(err.to_string(), "post 9 is gone");
        assert_eq!(err.code(), "HOST_ERROR");
    }
}
