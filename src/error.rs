//! Service error type shared by the repository, service and API layers

use crate::validation::ValidationError;

/// Errors surfaced by patient operations.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Validation failed: {}", summarize(.0))]
    Validation(Vec<ValidationError>),
    #[error("Patient not found with id: {0}")]
    NotFound(i64),
    #[error("Storage error: {0}")]
    Storage(String),
}

impl ServiceError {
    /// Single-field validation failure
    pub fn invalid(field: &str, code: &str, message: &str) -> Self {
        ServiceError::Validation(vec![ValidationError {
            field: field.to_string(),
            code: code.to_string(),
            message: message.to_string(),
        }])
    }

    /// Short machine-readable kind, used as the `error` field of API responses
    pub fn kind(&self) -> &'static str {
        match self {
            ServiceError::Validation(_) => "validation_error",
            ServiceError::NotFound(_) => "not_found",
            ServiceError::Storage(_) => "storage_error",
        }
    }
}

impl From<sqlx::Error> for ServiceError {
    fn from(e: sqlx::Error) -> Self {
        ServiceError::Storage(e.to_string())
    }
}

fn summarize(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join(", ")
}

pub type Result<T> = std::result::Result<T, ServiceError>;
