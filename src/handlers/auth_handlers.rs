use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use validator::Validate;

use super::{ErrorResponse, error_response, json_body, validation_failure};
use crate::models::auth::{AuthToken, LoginRequest};
use crate::models::user::{CreateUserRequest, User};
use crate::services::auth_service::{AuthError, AuthService};

/// Convert AuthError to HTTP response
impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match &self {
            AuthError::DuplicateEmail => (
                StatusCode::CONFLICT,
                "duplicate_email",
                "Email already exists",
            ),
            AuthError::PasswordMismatch => (
                StatusCode::BAD_REQUEST,
                "password_mismatch",
                "Passwords do not match",
            ),
            AuthError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "invalid_credentials",
                "Invalid email or password",
            ),
            AuthError::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                "invalid_token",
                "Invalid authentication token",
            ),
            AuthError::TokenExpired => (
                StatusCode::UNAUTHORIZED,
                "token_expired",
                "Authentication token has expired",
            ),
            AuthError::DatabaseError(msg) => {
                tracing::error!(error = %msg, "Authentication storage failure");
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

/// Handler for household registration
#[utoipa::path(
    post,
    path = "/registro",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User successfully registered", body = User),
        (status = 400, description = "Validation error or password mismatch", body = ErrorResponse),
        (status = 409, description = "Email already exists", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn register_handler(
    State(auth_service): State<Arc<dyn AuthService>>,
    payload: Result<Json<CreateUserRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<User>), Response> {
    let request = json_body(payload)?;
    if let Err(validation_errors) = request.validate() {
        return Err(validation_failure(&validation_errors));
    }

    match auth_service.register(request).await {
        Ok(user) => Ok((StatusCode::CREATED, Json(user))),
        Err(e) => Err(e.into_response()),
    }
}

/// Handler for login
///
/// Authenticates a user and returns a JWT token.
#[utoipa::path(
    post,
    path = "/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthToken),
        (status = 401, description = "Invalid credentials", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn login_handler(
    State(auth_service): State<Arc<dyn AuthService>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<AuthToken>, Response> {
    let request = json_body(payload)?;

    match auth_service.login(request).await {
        Ok(token) => Ok(Json(token)),
        Err(e) => Err(e.into_response()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::SubsidyTier;
    use crate::repositories::InMemoryStore;
    use crate::services::auth_service::AuthServiceImpl;
    use chrono::Duration;

    fn auth_service() -> Arc<dyn AuthService> {
        Arc::new(AuthServiceImpl::new(
            Arc::new(InMemoryStore::new()),
            "test_secret".to_string(),
            Duration::hours(24),
        ))
    }

    fn registration(email: &str) -> CreateUserRequest {
        CreateUserRequest {
            email: email.to_string(),
            password: "password123".to_string(),
            password_confirmation: None,
            name: "Test User".to_string(),
            location: "Neuquén".to_string(),
            subsidy_tier: SubsidyTier::Low,
        }
    }

    #[tokio::test]
    async fn test_register_handler_success() {
        let result = register_handler(
            State(auth_service()),
            Ok(Json(registration("test@example.com"))),
        )
        .await;

        let (status, Json(user)) = result.unwrap();
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(user.name, "Test User");
        assert_eq!(user.email, "test@example.com");
    }

    #[tokio::test]
    async fn test_register_handler_validation_error() {
        let result = register_handler(
            State(auth_service()),
            Ok(Json(registration("invalid-email"))),
        )
        .await;

        let response = result.unwrap_err();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_register_handler_duplicate_email() {
        let service = auth_service();
        let _ = register_handler(
            State(service.clone()),
            Ok(Json(registration("test@example.com"))),
        )
        .await;

        let result = register_handler(
            State(service),
            Ok(Json(registration("test@example.com"))),
        )
        .await;
        assert_eq!(result.unwrap_err().status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_login_handler_success_and_failure() {
        let service = auth_service();
        let _ = register_handler(
            State(service.clone()),
            Ok(Json(registration("test@example.com"))),
        )
        .await;

        let ok = login_handler(
            State(service.clone()),
            Ok(Json(LoginRequest {
                email: "test@example.com".to_string(),
                password: "password123".to_string(),
            })),
        )
        .await;
        let Json(token) = ok.unwrap();
        assert!(!token.token.is_empty());

        let wrong = login_handler(
            State(service),
            Ok(Json(LoginRequest {
                email: "test@example.com".to_string(),
                password: "wrongpassword".to_string(),
            })),
        )
        .await;
        assert_eq!(wrong.unwrap_err().status(), StatusCode::UNAUTHORIZED);
    }
}
