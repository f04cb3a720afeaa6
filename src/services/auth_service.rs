use async_trait::async_trait;
use bcrypt::{DEFAULT_COST, hash, verify};
use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::models::auth::{AuthToken, LoginRequest};
use crate::models::user::{CreateUserRequest, User};
use crate::repositories::{RepositoryError, UserRepository};

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String, // user id
    exp: i64,
}

/// Authentication service errors
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Email already exists")]
    DuplicateEmail,

    #[error("Passwords do not match")]
    PasswordMismatch,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Token expired")]
    TokenExpired,

    #[error("Database error: {0}")]
    DatabaseError(String),
}

/// Trait defining authentication service operations
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Register a new household
    async fn register(&self, request: CreateUserRequest) -> Result<User, AuthError>;

    /// Authenticate user and return JWT token
    async fn login(&self, request: LoginRequest) -> Result<AuthToken, AuthError>;

    /// Validate JWT token and return the user id
    async fn validate_token(&self, token: &str) -> Result<Uuid, AuthError>;
}

pub(crate) fn hash_password(password: &str) -> Result<String, String> {
    hash(password, DEFAULT_COST).map_err(|e| format!("Password hashing failed: {}", e))
}

/// Implementation of AuthService
pub struct AuthServiceImpl {
    user_repository: Arc<dyn UserRepository>,
    jwt_secret: String,
    token_ttl: Duration,
}

impl AuthServiceImpl {
    pub fn new(
        user_repository: Arc<dyn UserRepository>,
        jwt_secret: String,
        token_ttl: Duration,
    ) -> Self {
        Self {
            user_repository,
            jwt_secret,
            token_ttl,
        }
    }

    fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
        verify(password, hash)
            .map_err(|e| AuthError::DatabaseError(format!("Password verification failed: {}", e)))
    }

    fn generate_jwt(&self, user_id: Uuid) -> Result<AuthToken, AuthError> {
        let expiration = Utc::now() + self.token_ttl;

        let claims = Claims {
            sub: user_id.to_string(),
            exp: expiration.timestamp(),
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )
        .map_err(|e| AuthError::DatabaseError(format!("Token generation failed: {}", e)))?;

        Ok(AuthToken {
            token,
            expires_at: expiration,
            user_id,
        })
    }

    fn decode_jwt(&self, token: &str) -> Result<Uuid, AuthError> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            _ => AuthError::InvalidToken,
        })?;

        Uuid::parse_str(&token_data.claims.sub).map_err(|_| AuthError::InvalidToken)
    }
}

#[async_trait]
impl AuthService for AuthServiceImpl {
    async fn register(&self, request: CreateUserRequest) -> Result<User, AuthError> {
        if let Some(confirmation) = &request.password_confirmation {
            if *confirmation != request.password {
                return Err(AuthError::PasswordMismatch);
            }
        }

        let password_hash = hash_password(&request.password).map_err(AuthError::DatabaseError)?;

        let user = self
            .user_repository
            .create(request, password_hash)
            .await
            .map_err(|e| match e {
                RepositoryError::ConstraintViolation(_) => AuthError::DuplicateEmail,
                RepositoryError::DatabaseError(msg) => AuthError::DatabaseError(msg),
                RepositoryError::NotFound => {
                    AuthError::DatabaseError("Unexpected error".to_string())
                }
            })?;

        tracing::info!(user_id = %user.id, tier = user.subsidy_tier.as_str(), "Registered user");
        Ok(user)
    }

    async fn login(&self, request: LoginRequest) -> Result<AuthToken, AuthError> {
        let user = self
            .user_repository
            .find_by_email(&request.email)
            .await
            .map_err(|e| AuthError::DatabaseError(e.to_string()))?
            .ok_or(AuthError::InvalidCredentials)?;

        if !Self::verify_password(&request.password, &user.password_hash)? {
            tracing::debug!(user_id = %user.id, "Rejected login with wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        self.generate_jwt(user.id)
    }

    async fn validate_token(&self, token: &str) -> Result<Uuid, AuthError> {
        self.decode_jwt(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::SubsidyTier;
    use crate::repositories::InMemoryStore;

    fn service() -> AuthServiceImpl {
        AuthServiceImpl::new(
            Arc::new(InMemoryStore::new()),
            "test_secret".to_string(),
            Duration::hours(24),
        )
    }

    fn registration(email: &str) -> CreateUserRequest {
        CreateUserRequest {
            email: email.to_string(),
            password: "password123".to_string(),
            password_confirmation: Some("password123".to_string()),
            name: "Test User".to_string(),
            location: "Posadas".to_string(),
            subsidy_tier: SubsidyTier::Medium,
        }
    }

    fn login(email: &str, password: &str) -> LoginRequest {
        LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn test_register_success() {
        let user = service()
            .register(registration("test@example.com"))
            .await
            .unwrap();

        assert_eq!(user.name, "Test User");
        assert_eq!(user.email, "test@example.com");
        assert_eq!(user.points, 0);
        assert_ne!(user.password_hash, "password123");
    }

    #[tokio::test]
    async fn test_register_duplicate_email() {
        let service = service();
        service
            .register(registration("test@example.com"))
            .await
            .unwrap();

        let result = service.register(registration("test@example.com")).await;
        assert!(matches!(result, Err(AuthError::DuplicateEmail)));
    }

    #[tokio::test]
    async fn test_register_password_mismatch() {
        let mut request = registration("test@example.com");
        request.password_confirmation = Some("different123".to_string());

        let result = service().register(request).await;
        assert!(matches!(result, Err(AuthError::PasswordMismatch)));
    }

    #[tokio::test]
    async fn test_login_success() {
        let service = service();
        let user = service
            .register(registration("test@example.com"))
            .await
            .unwrap();

        let token = service
            .login(login("test@example.com", "password123"))
            .await
            .unwrap();

        assert!(!token.token.is_empty());
        assert_eq!(token.user_id, user.id);
        assert!(token.expires_at > Utc::now() + Duration::hours(23));
    }

    #[tokio::test]
    async fn test_login_invalid_credentials() {
        let service = service();
        service
            .register(registration("test@example.com"))
            .await
            .unwrap();

        let result = service
            .login(login("test@example.com", "wrongpassword"))
            .await;
        assert!(matches!(result, Err(AuthError::InvalidCredentials)));

        let result = service
            .login(login("nobody@example.com", "password123"))
            .await;
        assert!(matches!(result, Err(AuthError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_validate_token_round_trip() {
        let service = service();
        let user = service
            .register(registration("test@example.com"))
            .await
            .unwrap();
        let token = service
            .login(login("test@example.com", "password123"))
            .await
            .unwrap();

        assert_eq!(service.validate_token(&token.token).await.unwrap(), user.id);
    }

    #[tokio::test]
    async fn test_validate_token_invalid() {
        let result = service().validate_token("invalid_token").await;
        assert!(matches!(result, Err(AuthError::InvalidToken)));
    }

    #[tokio::test]
    async fn test_token_signed_with_other_secret_is_rejected() {
        let store = Arc::new(InMemoryStore::new());
        let issuer = AuthServiceImpl::new(store.clone(), "secret_a".to_string(), Duration::hours(1));
        let verifier = AuthServiceImpl::new(store, "secret_b".to_string(), Duration::hours(1));

        issuer
            .register(registration("test@example.com"))
            .await
            .unwrap();
        let token = issuer
            .login(login("test@example.com", "password123"))
            .await
            .unwrap();

        let result = verifier.validate_token(&token.token).await;
        assert!(matches!(result, Err(AuthError::InvalidToken)));
    }

    #[tokio::test]
    async fn test_expired_token_is_reported() {
        let service = AuthServiceImpl::new(
            Arc::new(InMemoryStore::new()),
            "test_secret".to_string(),
            Duration::hours(-2),
        );
        service
            .register(registration("test@example.com"))
            .await
            .unwrap();
        let token = service
            .login(login("test@example.com", "password123"))
            .await
            .unwrap();

        let result = service.validate_token(&token.token).await;
        assert!(matches!(result, Err(AuthError::TokenExpired)));
    }
}
