use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

// Every failure a request can hit, mapped to the JSON `{error}` contract.
// Nothing here is fatal to the process; the boundary always answers.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("validation failed")]
    Validation(#[from] validator::ValidationErrors),

    #[error("{0} not found")]
    NotFound(&'static str),

    // Unparseable request body or path parameter.
    #[error("{0}")]
    BadRequest(String),

    #[error("related records still reference this row")]
    ForeignKeyConflict,

    #[error("database error")]
    Database(#[from] sqlx::Error),

    #[error("internal server error")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Validation error for a single field, built without a derive pass.
    /// Lets the service layer enforce required fields when called directly.
    pub fn invalid(field: &'static str, message: &str) -> Self {
        let mut errors = validator::ValidationErrors::new();
        let mut error = validator::ValidationError::new("invalid");
        error.message = Some(message.to_string().into());
        errors.add(field, error);
        AppError::Validation(errors)
    }

    pub fn required(field: &'static str) -> Self {
        Self::invalid(field, &format!("{field} is required"))
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::Validation(errors) => {
                let mut messages: Vec<String> = errors
                    .field_errors()
                    .values()
                    .flat_map(|field_errors| field_errors.iter())
                    .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                    .collect();
                messages.sort();
                let message = if messages.is_empty() {
                    "one or more fields are invalid".to_string()
                } else {
                    messages.join(", ")
                };
                (StatusCode::BAD_REQUEST, message)
            }

            // The API reports unknown ids as a plain client error, not 404.
            AppError::NotFound(entity) => {
                (StatusCode::BAD_REQUEST, format!("{entity} not found"))
            }

            AppError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),

            AppError::ForeignKeyConflict => (
                StatusCode::CONFLICT,
                "Cannot delete account because related records exist. Delete opportunities first."
                    .to_string(),
            ),

            // Unclassified store failures: log the detail, answer generically.
            AppError::Database(e) => {
                tracing::error!("database error: {e}");
                (StatusCode::BAD_REQUEST, "database request failed".to_string())
            }

            AppError::Internal(e) => {
                tracing::error!("internal server error: {e:#}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "an unexpected error occurred".to_string(),
                )
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
