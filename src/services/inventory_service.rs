use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use super::{ServiceError, resolve_owner};
use crate::models::appliance::{Appliance, CreateApplianceRequest, UpdateApplianceRequest};
use crate::repositories::{ApplianceRepository, UserRepository};

/// Appliance inventory of a household
#[async_trait]
pub trait InventoryService: Send + Sync {
    async fn list_appliances(
        &self,
        actor: Uuid,
        owner: &str,
    ) -> Result<Vec<Appliance>, ServiceError>;

    async fn add_appliance(
        &self,
        actor: Uuid,
        owner: &str,
        request: CreateApplianceRequest,
    ) -> Result<Appliance, ServiceError>;

    /// Partial update; an empty request leaves the appliance untouched
    async fn update_appliance(
        &self,
        actor: Uuid,
        owner: &str,
        appliance_id: Uuid,
        request: UpdateApplianceRequest,
    ) -> Result<Appliance, ServiceError>;

    async fn delete_appliance(
        &self,
        actor: Uuid,
        owner: &str,
        appliance_id: Uuid,
    ) -> Result<(), ServiceError>;
}

pub struct InventoryServiceImpl {
    user_repository: Arc<dyn UserRepository>,
    appliance_repository: Arc<dyn ApplianceRepository>,
}

impl InventoryServiceImpl {
    pub fn new(
        user_repository: Arc<dyn UserRepository>,
        appliance_repository: Arc<dyn ApplianceRepository>,
    ) -> Self {
        Self {
            user_repository,
            appliance_repository,
        }
    }
}

#[async_trait]
impl InventoryService for InventoryServiceImpl {
    async fn list_appliances(
        &self,
        actor: Uuid,
        owner: &str,
    ) -> Result<Vec<Appliance>, ServiceError> {
        let user = resolve_owner(self.user_repository.as_ref(), actor, owner).await?;

        Ok(self.appliance_repository.find_by_user(user.id).await?)
    }

    async fn add_appliance(
        &self,
        actor: Uuid,
        owner: &str,
        request: CreateApplianceRequest,
    ) -> Result<Appliance, ServiceError> {
        let user = resolve_owner(self.user_repository.as_ref(), actor, owner).await?;
        let now = Utc::now();

        let appliance = Appliance {
            id: Uuid::new_v4(),
            user_id: user.id,
            name: request.name.trim().to_string(),
            quantity: request.quantity,
            power_watts: request.power_watts,
            efficiency: request.efficiency.unwrap_or_default(),
            hours_per_day: request.hours_per_day,
            days_per_month: request.days_per_month,
            created_at: now,
            updated_at: now,
        };

        let created = self.appliance_repository.create(appliance).await?;

        tracing::info!(
            user_id = %user.id,
            appliance_id = %created.id,
            total_kwh = created.monthly_kwh(),
            "Added appliance"
        );
        Ok(created)
    }

    async fn update_appliance(
        &self,
        actor: Uuid,
        owner: &str,
        appliance_id: Uuid,
        request: UpdateApplianceRequest,
    ) -> Result<Appliance, ServiceError> {
        let user = resolve_owner(self.user_repository.as_ref(), actor, owner).await?;

        let existing = self
            .appliance_repository
            .find_by_id(user.id, appliance_id)
            .await?
            .ok_or(ServiceError::EntryNotFound)?;

        if request.is_empty() {
            return Ok(existing);
        }

        Ok(self
            .appliance_repository
            .update(request.apply_to(&existing))
            .await?)
    }

    async fn delete_appliance(
        &self,
        actor: Uuid,
        owner: &str,
        appliance_id: Uuid,
    ) -> Result<(), ServiceError> {
        let user = resolve_owner(self.user_repository.as_ref(), actor, owner).await?;

        self.appliance_repository
            .delete(user.id, appliance_id)
            .await?;

        tracing::info!(user_id = %user.id, appliance_id = %appliance_id, "Deleted appliance");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::appliance::EfficiencyLabel;
    use crate::models::user::{CreateUserRequest, SubsidyTier, User};
    use crate::repositories::InMemoryStore;

    async fn setup() -> (InventoryServiceImpl, User) {
        let store = Arc::new(InMemoryStore::new());
        let user = UserRepository::create(
            store.as_ref(),
            CreateUserRequest {
                email: "ana@example.com".to_string(),
                password: "password123".to_string(),
                password_confirmation: None,
                name: "Ana".to_string(),
                location: String::new(),
                subsidy_tier: SubsidyTier::Medium,
            },
            "hash".to_string(),
        )
        .await
        .unwrap();

        (InventoryServiceImpl::new(store.clone(), store), user)
    }

    fn television() -> CreateApplianceRequest {
        CreateApplianceRequest {
            name: "Televisor".to_string(),
            quantity: 1,
            power_watts: 100.0,
            efficiency: None,
            hours_per_day: 5.0,
            days_per_month: 30,
        }
    }

    #[tokio::test]
    async fn test_add_appliance_derives_monthly_kwh() {
        let (service, user) = setup().await;
        let appliance = service
            .add_appliance(user.id, "ana@example.com", television())
            .await
            .unwrap();

        assert_eq!(appliance.user_id, user.id);
        assert_eq!(appliance.efficiency, EfficiencyLabel::A);
        assert_eq!(appliance.monthly_kwh(), 15.0);

        let listed = service
            .list_appliances(user.id, "ana@example.com")
            .await
            .unwrap();
        assert_eq!(listed, vec![appliance]);
    }

    #[tokio::test]
    async fn test_update_with_empty_payload_is_a_no_op() {
        let (service, user) = setup().await;
        let owner = user.id.to_string();
        let appliance = service
            .add_appliance(user.id, &owner, television())
            .await
            .unwrap();

        let unchanged = service
            .update_appliance(user.id, &owner, appliance.id, UpdateApplianceRequest::default())
            .await
            .unwrap();

        assert_eq!(unchanged, appliance);
    }

    #[tokio::test]
    async fn test_update_merges_provided_fields() {
        let (service, user) = setup().await;
        let owner = user.id.to_string();
        let appliance = service
            .add_appliance(user.id, &owner, television())
            .await
            .unwrap();

        let request = UpdateApplianceRequest {
            hours_per_day: Some(2.0),
            ..Default::default()
        };
        let updated = service
            .update_appliance(user.id, &owner, appliance.id, request)
            .await
            .unwrap();

        assert_eq!(updated.hours_per_day, 2.0);
        assert_eq!(updated.power_watts, 100.0);
        assert_eq!(updated.name, "Televisor");
        assert_eq!(updated.monthly_kwh(), 6.0);
        assert!(updated.updated_at >= appliance.updated_at);
    }

    #[tokio::test]
    async fn test_delete_unknown_appliance_leaves_list_unchanged() {
        let (service, user) = setup().await;
        let owner = user.id.to_string();
        service
            .add_appliance(user.id, &owner, television())
            .await
            .unwrap();

        let result = service
            .delete_appliance(user.id, &owner, Uuid::new_v4())
            .await;
        assert!(matches!(result, Err(ServiceError::EntryNotFound)));

        let listed = service.list_appliances(user.id, &owner).await.unwrap();
        assert_eq!(listed.len(), 1);
    }

    #[tokio::test]
    async fn test_foreign_inventory_is_forbidden() {
        let (service, user) = setup().await;
        let result = service
            .add_appliance(Uuid::new_v4(), &user.id.to_string(), television())
            .await;
        assert!(matches!(result, Err(ServiceError::Forbidden)));
    }
}
