pub mod advice_handlers;
pub mod appliance_handlers;
pub mod auth_handlers;
pub mod invoice_handlers;
pub mod metrics_handlers;
pub mod user_handlers;

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::ValidationErrors;

use crate::services::ServiceError;

/// Error response structure
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(error: &str, message: &str) -> Self {
        Self {
            error: error.to_string(),
            message: message.to_string(),
        }
    }
}

pub(crate) fn error_response(status: StatusCode, error: &str, message: &str) -> Response {
    (status, Json(ErrorResponse::new(error, message))).into_response()
}

/// 400 response listing every failed field as `field: message`
pub(crate) fn validation_failure(errors: &ValidationErrors) -> Response {
    let mut fields: Vec<String> = errors
        .field_errors()
        .iter()
        .map(|(field, errors)| {
            let messages: Vec<String> = errors
                .iter()
                .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                .collect();
            format!("{}: {}", field, messages.join(", "))
        })
        .collect();
    fields.sort();

    error_response(StatusCode::BAD_REQUEST, "validation_error", &fields.join("; "))
}

/// Unwrap a JSON body, reporting malformed payloads with the common error body
pub(crate) fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, Response> {
    payload.map(|Json(body)| body).map_err(|rejection| {
        error_response(
            StatusCode::BAD_REQUEST,
            "validation_error",
            &rejection.body_text(),
        )
    })
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match &self {
            ServiceError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, "validation_error", msg.as_str())
            }
            ServiceError::PasswordMismatch => (
                StatusCode::BAD_REQUEST,
                "password_mismatch",
                "Passwords do not match",
            ),
            ServiceError::InvalidInput(msg) => {
                (StatusCode::BAD_REQUEST, "invalid_input", msg.as_str())
            }
            ServiceError::UserNotFound => {
                (StatusCode::NOT_FOUND, "user_not_found", "User not found")
            }
            ServiceError::EntryNotFound => {
                (StatusCode::NOT_FOUND, "entry_not_found", "Entry not found")
            }
            ServiceError::AdviceNotFound => (
                StatusCode::NOT_FOUND,
                "advice_not_found",
                "Advice not found for this user",
            ),
            ServiceError::Forbidden => (
                StatusCode::FORBIDDEN,
                "forbidden",
                "Not allowed to access another user's data",
            ),
            ServiceError::DatabaseError(msg) => {
                tracing::error!(error = %msg, "Storage operation failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "database_error",
                    "Storage operation failed",
                )
            }
        };

        error_response(status, error_type, message)
    }
}
