use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use super::auth_service::hash_password;
use super::{ServiceError, resolve_owner};
use crate::models::user::{UpdateUserRequest, User, UserChanges};
use crate::repositories::{RepositoryError, UserRepository};

/// Profile read and edit operations
#[async_trait]
pub trait UserService: Send + Sync {
    async fn get_profile(&self, actor: Uuid, owner: &str) -> Result<User, ServiceError>;

    /// Partial update; an empty request returns the stored profile unchanged
    async fn update_profile(
        &self,
        actor: Uuid,
        owner: &str,
        request: UpdateUserRequest,
    ) -> Result<User, ServiceError>;
}

pub struct UserServiceImpl {
    user_repository: Arc<dyn UserRepository>,
}

impl UserServiceImpl {
    pub fn new(user_repository: Arc<dyn UserRepository>) -> Self {
        Self { user_repository }
    }
}

#[async_trait]
impl UserService for UserServiceImpl {
    async fn get_profile(&self, actor: Uuid, owner: &str) -> Result<User, ServiceError> {
        resolve_owner(self.user_repository.as_ref(), actor, owner).await
    }

    async fn update_profile(
        &self,
        actor: Uuid,
        owner: &str,
        request: UpdateUserRequest,
    ) -> Result<User, ServiceError> {
        let user = resolve_owner(self.user_repository.as_ref(), actor, owner).await?;

        if request.is_empty() {
            return Ok(user);
        }

        let password_hash = match &request.password {
            Some(password) => {
                if request.password_confirmation.as_deref() != Some(password.as_str()) {
                    return Err(ServiceError::PasswordMismatch);
                }
                Some(hash_password(password).map_err(ServiceError::DatabaseError)?)
            }
            None => None,
        };

        let changes = UserChanges {
            name: request.name,
            location: request.location,
            subsidy_tier: request.subsidy_tier,
            password_hash,
        };

        let updated = self
            .user_repository
            .update(user.id, changes)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => ServiceError::UserNotFound,
                other => other.into(),
            })?;

        tracing::info!(user_id = %updated.id, "Updated profile");
        Ok(updated)
    }
}
