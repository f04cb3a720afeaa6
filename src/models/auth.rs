use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Request payload for user login
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "username": "usuario1@example.com",
    "password": "password123"
}))]
pub struct LoginRequest {
    #[serde(rename = "username", alias = "email")]
    pub email: String,
    pub password: String,
}

/// Authentication token response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "token": "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...",
    "expires_at": "2024-01-16T12:00:00Z",
    "usuario_id": "550e8400-e29b-41d4-a716-446655440000"
}))]
pub struct AuthToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    #[serde(rename = "usuario_id")]
    pub user_id: Uuid,
}
