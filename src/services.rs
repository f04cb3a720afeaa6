pub mod advice_service;
pub mod auth_service;
pub mod calculator;
pub mod inventory_service;
pub mod invoice_service;
pub mod metrics_service;
pub mod user_service;

use uuid::Uuid;

use crate::models::user::User;
use crate::repositories::{RepositoryError, UserRepository};
use calculator::CalculationError;

/// Errors shared by the per-user resource services
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Passwords do not match")]
    PasswordMismatch,

    #[error("User not found")]
    UserNotFound,

    #[error("Entry not found")]
    EntryNotFound,

    #[error("Advice not found")]
    AdviceNotFound,

    #[error("Not allowed to access another user's data")]
    Forbidden,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<RepositoryError> for ServiceError {
    fn from(error: RepositoryError) -> Self {
        match error {
            RepositoryError::NotFound => ServiceError::EntryNotFound,
            RepositoryError::DatabaseError(msg) => ServiceError::DatabaseError(msg),
            RepositoryError::ConstraintViolation(msg) => ServiceError::Validation(msg),
        }
    }
}

impl From<CalculationError> for ServiceError {
    fn from(error: CalculationError) -> Self {
        match error {
            CalculationError::InvalidInput(msg) => ServiceError::InvalidInput(msg),
        }
    }
}

/// Resolve the user named in a request path and check the caller owns it.
///
/// `owner` is either the user id or the login email. An unknown user is
/// `UserNotFound`; somebody else's data is `Forbidden`.
pub(crate) async fn resolve_owner(
    users: &dyn UserRepository,
    actor: Uuid,
    owner: &str,
) -> Result<User, ServiceError> {
    let user = match Uuid::parse_str(owner) {
        Ok(id) => users.find_by_id(id).await?,
        Err(_) => users.find_by_email(owner).await?,
    }
    .ok_or(ServiceError::UserNotFound)?;

    if user.id != actor {
        tracing::warn!(actor = %actor, owner = %user.id, "Refused access to another user's data");
        return Err(ServiceError::Forbidden);
    }

    Ok(user)
}
