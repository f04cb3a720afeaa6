use axum::{
    extract::{Request, State},
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use uuid::Uuid;

use crate::handlers::error_response;
use crate::services::auth_service::{self, AuthService};

/// Extension type to store authenticated user ID in request
#[derive(Clone, Debug)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
}

/// Auth middleware that validates JWT tokens and adds user_id to request extensions
pub async fn auth_middleware(
    State(auth_service): State<Arc<dyn AuthService>>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let auth_header = headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or(AuthError::MissingToken)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(AuthError::InvalidTokenFormat)?;

    let user_id = auth_service
        .validate_token(token)
        .await
        .map_err(|e| match e {
            auth_service::AuthError::TokenExpired => AuthError::TokenExpired,
            _ => AuthError::InvalidToken,
        })?;

    request
        .extensions_mut()
        .insert(AuthenticatedUser { user_id });

    Ok(next.run(request).await)
}

/// Auth middleware errors
#[derive(Debug, PartialEq, Eq)]
pub enum AuthError {
    MissingToken,
    InvalidTokenFormat,
    InvalidToken,
    TokenExpired,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (error_type, message) = match self {
            AuthError::MissingToken => ("missing_token", "Missing authorization token"),
            AuthError::InvalidTokenFormat => (
                "invalid_token",
                "Invalid authorization header format. Expected: Bearer <token>",
            ),
            AuthError::InvalidToken => ("invalid_token", "Invalid or malformed token"),
            AuthError::TokenExpired => ("token_expired", "Token has expired"),
        };

        error_response(StatusCode::UNAUTHORIZED, error_type, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::ErrorResponse;
    use crate::models::auth::{AuthToken, LoginRequest};
    use crate::models::user::{CreateUserRequest, SubsidyTier, User};
    use crate::repositories::InMemoryStore;
    use crate::services::auth_service::AuthServiceImpl;
    use axum::{
        Extension, Json, Router,
        body::Body,
        http::{Request, StatusCode},
        middleware,
        routing::get,
    };
    use chrono::Duration;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    async fn protected_handler(Extension(user): Extension<AuthenticatedUser>) -> impl IntoResponse {
        Json(json!({
            "user_id": user.user_id.to_string(),
            "message": "Access granted"
        }))
    }

    fn auth_service(ttl: Duration) -> Arc<dyn AuthService> {
        Arc::new(AuthServiceImpl::new(
            Arc::new(InMemoryStore::new()),
            "test_secret".to_string(),
            ttl,
        ))
    }

    fn create_test_app(auth_service: Arc<dyn AuthService>) -> Router {
        Router::new()
            .route("/protected", get(protected_handler))
            .layer(middleware::from_fn_with_state(
                auth_service.clone(),
                auth_middleware,
            ))
            .with_state(auth_service)
    }

    async fn create_test_user_and_token(auth_service: &Arc<dyn AuthService>) -> (User, AuthToken) {
        let user = auth_service
            .register(CreateUserRequest {
                email: "hogar@example.com".to_string(),
                password: "password123".to_string(),
                password_confirmation: None,
                name: "Hogar".to_string(),
                location: "Corrientes".to_string(),
                subsidy_tier: SubsidyTier::Low,
            })
            .await
            .unwrap();

        let token = auth_service
            .login(LoginRequest {
                email: "hogar@example.com".to_string(),
                password: "password123".to_string(),
            })
            .await
            .unwrap();

        (user, token)
    }

    async fn send(app: Router, authorization: Option<&str>) -> (StatusCode, Value) {
        let mut builder = Request::builder().uri("/protected");
        if let Some(value) = authorization {
            builder = builder.header("Authorization", value);
        }
        let response = app
            .oneshot(builder.body(Body::empty()).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_middleware_with_valid_token() {
        let auth_service = auth_service(Duration::hours(24));
        let (user, token) = create_test_user_and_token(&auth_service).await;

        let (status, body) = send(
            create_test_app(auth_service),
            Some(&format!("Bearer {}", token.token)),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["user_id"], user.id.to_string());
        assert_eq!(body["message"], "Access granted");
    }

    #[tokio::test]
    async fn test_middleware_without_token() {
        let (status, body) = send(create_test_app(auth_service(Duration::hours(24))), None).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        let error: ErrorResponse = serde_json::from_value(body).unwrap();
        assert_eq!(error.error, "missing_token");
        assert!(error.message.contains("Missing authorization token"));
    }

    #[tokio::test]
    async fn test_middleware_with_invalid_token() {
        let (status, body) = send(
            create_test_app(auth_service(Duration::hours(24))),
            Some("Bearer invalid_token_here"),
        )
        .await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "invalid_token");
        assert_eq!(body["message"], "Invalid or malformed token");
    }

    #[tokio::test]
    async fn test_middleware_with_malformed_header() {
        let (status, body) = send(
            create_test_app(auth_service(Duration::hours(24))),
            Some("some_token"),
        )
        .await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "invalid_token");
        assert!(
            body["message"]
                .as_str()
                .unwrap()
                .contains("Invalid authorization header format")
        );
    }

    #[tokio::test]
    async fn test_middleware_with_expired_token() {
        let auth_service = auth_service(Duration::hours(-2));
        let (_, token) = create_test_user_and_token(&auth_service).await;

        let (status, body) = send(
            create_test_app(auth_service),
            Some(&format!("Bearer {}", token.token)),
        )
        .await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "token_expired");
    }
}
