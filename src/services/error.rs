use thiserror::Error;

use crate::database::manager::DatabaseError;
use crate::filter::FilterError;

/// Failure kinds returned by the domain services.
///
/// `NotFound` and `Forbidden` stay distinct: a missing record is never
/// reported as a permission failure.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{field}: {message}")]
    Validation { field: String, message: String },

    #[error("{0}")]
    StateConflict(String),

    #[error(transparent)]
    Database(DatabaseError),
}

impl ServiceError {
    pub fn not_found(message: impl Into<String>) -> Self {
        ServiceError::NotFound(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ServiceError::Forbidden(message.into())
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        ServiceError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ServiceError::StateConflict(message.into())
    }
}

impl From<DatabaseError> for ServiceError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::NotFound(what) => ServiceError::NotFound(format!("{} not found", what)),
            other => ServiceError::Database(other),
        }
    }
}

impl From<FilterError> for ServiceError {
    fn from(err: FilterError) -> Self {
        match err {
            FilterError::InvalidPage(msg) => ServiceError::validation("page", msg),
            FilterError::InvalidLimit(msg) => ServiceError::validation("limit", msg),
        }
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;
