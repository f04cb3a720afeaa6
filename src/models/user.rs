use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Subsidy level granted to a household; a higher subsidy means a lower price per kWh
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema, PartialEq, Eq, Hash)]
pub enum SubsidyTier {
    #[serde(rename = "alto", alias = "high")]
    High,
    #[serde(rename = "medio", alias = "medium")]
    Medium,
    #[serde(rename = "bajo", alias = "low")]
    Low,
}

impl SubsidyTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubsidyTier::High => "alto",
            SubsidyTier::Medium => "medio",
            SubsidyTier::Low => "bajo",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "alto" | "high" => Some(SubsidyTier::High),
            "medio" | "medium" => Some(SubsidyTier::Medium),
            "bajo" | "low" => Some(SubsidyTier::Low),
            _ => None,
        }
    }
}

/// User entity representing a registered household
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct User {
    pub id: Uuid,
    /// Login name; always an email address
    #[serde(rename = "username")]
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "ubicacion")]
    pub location: String,
    #[serde(rename = "nivel_subsidio")]
    pub subsidy_tier: SubsidyTier,
    #[serde(rename = "puntos_sostenibilidad")]
    pub points: u32,
    pub created_at: DateTime<Utc>,
}

/// Request payload for user registration
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[schema(example = json!({
    "username": "usuario1@example.com",
    "password": "password123",
    "nombre": "Ana Gómez",
    "ubicacion": "Resistencia, Chaco",
    "nivel_subsidio": "medio"
}))]
pub struct CreateUserRequest {
    #[serde(rename = "username", alias = "email")]
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,

    #[serde(rename = "confirmar_password", default)]
    pub password_confirmation: Option<String>,

    #[serde(rename = "nombre", alias = "name")]
    #[validate(length(
        min = 1,
        max = 100,
        message = "Name must be between 1 and 100 characters"
    ))]
    pub name: String,

    #[serde(rename = "ubicacion", alias = "location", default)]
    #[validate(length(max = 100, message = "Location must be at most 100 characters"))]
    pub location: String,

    #[serde(rename = "nivel_subsidio", alias = "subsidy_tier")]
    pub subsidy_tier: SubsidyTier,
}

/// Request payload for a partial profile update; omitted fields are left untouched
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[schema(example = json!({
    "nombre": "Ana María Gómez",
    "nivel_subsidio": "alto"
}))]
pub struct UpdateUserRequest {
    #[serde(rename = "nombre", alias = "name", default)]
    #[validate(length(
        min = 1,
        max = 100,
        message = "Name must be between 1 and 100 characters"
    ))]
    pub name: Option<String>,

    #[serde(rename = "ubicacion", alias = "location", default)]
    #[validate(length(max = 100, message = "Location must be at most 100 characters"))]
    pub location: Option<String>,

    #[serde(rename = "nivel_subsidio", alias = "subsidy_tier", default)]
    pub subsidy_tier: Option<SubsidyTier>,

    #[serde(default)]
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: Option<String>,

    #[serde(rename = "confirmar_password", default)]
    pub password_confirmation: Option<String>,
}

impl UpdateUserRequest {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.location.is_none()
            && self.subsidy_tier.is_none()
            && self.password.is_none()
    }
}

/// Profile changes after validation and password hashing
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub name: Option<String>,
    pub location: Option<String>,
    pub subsidy_tier: Option<SubsidyTier>,
    pub password_hash: Option<String>,
}
