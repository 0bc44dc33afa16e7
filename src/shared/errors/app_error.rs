use serde::Serialize;
use thiserror::Error;

use super::field_errors::FieldErrors;

#[derive(Error, Debug, Serialize)]
#[serde(tag = "type", content = "message")]
pub enum AppError {
    #[error("Validation failed")]
    Validation(FieldErrors),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Validation failure on a single field.
    pub fn validation(field: &str, message: &str) -> Self {
        AppError::Validation(FieldErrors::single(field, message))
    }

    /// True for errors that a slug-allocating create may retry after
    /// regenerating its slug (unique constraint fired between the
    /// existence pre-flight and the insert).
    pub fn is_conflict(&self) -> bool {
        matches!(self, AppError::Conflict(_))
    }
}

impl From<diesel::result::Error> for AppError {
    fn from(err: diesel::result::Error) -> Self {
        use diesel::result::{DatabaseErrorKind, Error};
        match err {
            Error::NotFound => AppError::NotFound("Record not found".to_string()),
            Error::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
                AppError::Conflict(format!(
                    "Unique constraint violated: {}",
                    info.constraint_name().unwrap_or("unknown")
                ))
            }
            Error::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, info) => {
                AppError::Conflict(format!(
                    "Record is still referenced: {}",
                    info.constraint_name().unwrap_or("unknown")
                ))
            }
            _ => AppError::Database(err.to_string()),
        }
    }
}

impl From<diesel::r2d2::PoolError> for AppError {
    fn from(err: diesel::r2d2::PoolError) -> Self {
        AppError::Database(format!("Database pool error: {}", err))
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(err: tokio::task::JoinError) -> Self {
        AppError::Internal(format!("Blocking task failed: {}", err))
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diesel_not_found_maps_to_not_found() {
        let err: AppError = diesel::result::Error::NotFound.into();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[test]
    fn single_field_validation_carries_the_field() {
        let err = AppError::validation("title", "Title is required");
        match err {
            AppError::Validation(fields) => {
                assert_eq!(fields.get("title"), Some("Title is required"));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn conflict_is_retryable() {
        assert!(AppError::Conflict("slug taken".into()).is_conflict());
        assert!(!AppError::NotFound("gone".into()).is_conflict());
    }
}
