//! Error handling for the Warehouse Inventory Management Platform
//!
//! Every error renders as `{"success": false, "error": {code, message, field?}}`

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use shared::ValidationError;
use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Validation errors
    #[error("Validation error: {message}")]
    Validation { field: String, message: String },

    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<String>),

    #[error("Resource not found: {0}")]
    NotFound(String),

    // Natural-language query errors
    #[error("Generated query rejected: {0}")]
    UnsafeQuery(String),

    #[error("SQL execution error: {0}")]
    QueryExecution(String),

    // External service errors
    #[error("Language model error: {0}")]
    LanguageModel(String),

    #[error("Inventory feed error: {0}")]
    InventoryFeed(String),

    // Database errors
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    // Internal errors
    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Internal server error")]
    InternalError(#[from] anyhow::Error),
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::MissingFields(fields) => AppError::MissingFields(fields),
            ValidationError::Invalid { field, message } => AppError::Validation { field, message },
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        shared::summarize(&errors).into()
    }
}

/// Error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl AppError {
    fn status_and_detail(&self) -> (StatusCode, ErrorDetail) {
        match self {
            AppError::Validation { field, message } => (
                StatusCode::BAD_REQUEST,
                ErrorDetail {
                    code: "VALIDATION_ERROR".to_string(),
                    message: message.clone(),
                    field: Some(field.clone()),
                },
            ),
            AppError::MissingFields(fields) => (
                StatusCode::BAD_REQUEST,
                ErrorDetail {
                    code: "MISSING_FIELDS".to_string(),
                    message: "Missing required fields".to_string(),
                    field: Some(fields.join(",")),
                },
            ),
            AppError::NotFound(resource) => (
                StatusCode::NOT_FOUND,
                ErrorDetail {
                    code: "NOT_FOUND".to_string(),
                    message: format!("{} not found", resource),
                    field: None,
                },
            ),
            AppError::UnsafeQuery(reason) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorDetail {
                    code: "UNSAFE_QUERY".to_string(),
                    message: format!("Generated SQL was rejected: {}", reason),
                    field: None,
                },
            ),
            AppError::QueryExecution(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorDetail {
                    code: "QUERY_EXECUTION_ERROR".to_string(),
                    message: format!("SQL execution error: {}", msg),
                    field: None,
                },
            ),
            AppError::LanguageModel(msg) => (
                StatusCode::BAD_GATEWAY,
                ErrorDetail {
                    code: "LANGUAGE_MODEL_ERROR".to_string(),
                    message: format!("Language model error: {}", msg),
                    field: None,
                },
            ),
            AppError::InventoryFeed(_) => (
                StatusCode::BAD_GATEWAY,
                ErrorDetail {
                    code: "INVENTORY_FEED_ERROR".to_string(),
                    message: "Failed to fetch inventory data".to_string(),
                    field: None,
                },
            ),
            AppError::DatabaseError(sqlx::Error::Database(db)) if db.is_unique_violation() => (
                StatusCode::CONFLICT,
                ErrorDetail {
                    code: "DUPLICATE_ENTRY".to_string(),
                    message: "A record with the same unique key already exists".to_string(),
                    field: db.constraint().map(str::to_string),
                },
            ),
            AppError::DatabaseError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail {
                    code: "DATABASE_ERROR".to_string(),
                    message: "A database error occurred".to_string(),
                    field: None,
                },
            ),
            AppError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail {
                    code: "INTERNAL_ERROR".to_string(),
                    message: msg.clone(),
                    field: None,
                },
            ),
            AppError::InternalError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail {
                    code: "INTERNAL_ERROR".to_string(),
                    message: "An internal server error occurred".to_string(),
                    field: None,
                },
            ),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status_and_detail().0
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_detail) = self.status_and_detail();

        // Log the error for debugging
        tracing::error!("Error: {:?}", self);

        (
            status,
            Json(ErrorResponse {
                success: false,
                error: error_detail,
            }),
        )
            .into_response()
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            AppError::NotFound("Warehouse".to_string()).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::MissingFields(vec!["quantity".to_string()]).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::UnsafeQuery("multiple statements".to_string()).status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            AppError::InventoryFeed("refused".to_string()).status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            AppError::DatabaseError(sqlx::Error::RowNotFound).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_validation_error_conversion() {
        let err: AppError = ValidationError::MissingFields(vec!["productName".to_string()]).into();
        assert!(matches!(err, AppError::MissingFields(ref f) if f == &["productName"]));
    }
}
