//! Process-local storage, partitioned by user.
//!
//! One `InMemoryStore` implements every repository trait, so a single
//! instance is shared behind the different `Arc<dyn ...>` handles. Guards are
//! never held across an `.await`.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::{HashMap, HashSet};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

use super::{
    AdviceRepository, ApplianceRepository, InvoiceRepository, RepositoryError, UserRepository,
};
use crate::models::appliance::Appliance;
use crate::models::invoice::Invoice;
use crate::models::user::{CreateUserRequest, User, UserChanges};
use crate::services::calculator::newest_first;

/// Everything owned by one user
struct UserPartition {
    user: User,
    appliances: Vec<Appliance>,
    invoices: Vec<Invoice>,
    completed_advice: HashSet<String>,
}

impl UserPartition {
    fn new(user: User) -> Self {
        Self {
            user,
            appliances: Vec::new(),
            invoices: Vec::new(),
            completed_advice: HashSet::new(),
        }
    }
}

#[derive(Default)]
pub struct InMemoryStore {
    partitions: RwLock<HashMap<Uuid, UserPartition>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, HashMap<Uuid, UserPartition>>, RepositoryError> {
        self.partitions
            .read()
            .map_err(|_| RepositoryError::DatabaseError("store lock poisoned".to_string()))
    }

    fn write(
        &self,
    ) -> Result<RwLockWriteGuard<'_, HashMap<Uuid, UserPartition>>, RepositoryError> {
        self.partitions
            .write()
            .map_err(|_| RepositoryError::DatabaseError("store lock poisoned".to_string()))
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn create(
        &self,
        user: CreateUserRequest,
        password_hash: String,
    ) -> Result<User, RepositoryError> {
        let mut partitions = self.write()?;

        if partitions.values().any(|p| p.user.email == user.email) {
            return Err(RepositoryError::ConstraintViolation(
                "Email already exists".to_string(),
            ));
        }

        let new_user = User {
            id: Uuid::new_v4(),
            email: user.email,
            password_hash,
            name: user.name,
            location: user.location,
            subsidy_tier: user.subsidy_tier,
            points: 0,
            created_at: Utc::now(),
        };

        partitions.insert(new_user.id, UserPartition::new(new_user.clone()));
        Ok(new_user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        let partitions = self.read()?;
        Ok(partitions
            .values()
            .find(|p| p.user.email == email)
            .map(|p| p.user.clone()))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepositoryError> {
        let partitions = self.read()?;
        Ok(partitions.get(&id).map(|p| p.user.clone()))
    }

    async fn update(&self, id: Uuid, changes: UserChanges) -> Result<User, RepositoryError> {
        let mut partitions = self.write()?;
        let user = &mut partitions
            .get_mut(&id)
            .ok_or(RepositoryError::NotFound)?
            .user;

        if let Some(name) = changes.name {
            user.name = name;
        }
        if let Some(location) = changes.location {
            user.location = location;
        }
        if let Some(tier) = changes.subsidy_tier {
            user.subsidy_tier = tier;
        }
        if let Some(hash) = changes.password_hash {
            user.password_hash = hash;
        }

        Ok(user.clone())
    }
}

#[async_trait]
impl ApplianceRepository for InMemoryStore {
    async fn create(&self, appliance: Appliance) -> Result<Appliance, RepositoryError> {
        let mut partitions = self.write()?;
        let partition = partitions
            .get_mut(&appliance.user_id)
            .ok_or(RepositoryError::NotFound)?;

        partition.appliances.push(appliance.clone());
        Ok(appliance)
    }

    async fn find_by_user(&self, user_id: Uuid) -> Result<Vec<Appliance>, RepositoryError> {
        let partitions = self.read()?;
        Ok(partitions
            .get(&user_id)
            .map(|p| p.appliances.clone())
            .unwrap_or_default())
    }

    async fn find_by_id(
        &self,
        user_id: Uuid,
        id: Uuid,
    ) -> Result<Option<Appliance>, RepositoryError> {
        let partitions = self.read()?;
        Ok(partitions
            .get(&user_id)
            .and_then(|p| p.appliances.iter().find(|a| a.id == id))
            .cloned())
    }

    async fn update(&self, appliance: Appliance) -> Result<Appliance, RepositoryError> {
        let mut partitions = self.write()?;
        let stored = partitions
            .get_mut(&appliance.user_id)
            .and_then(|p| p.appliances.iter_mut().find(|a| a.id == appliance.id))
            .ok_or(RepositoryError::NotFound)?;

        *stored = appliance.clone();
        Ok(appliance)
    }

    async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<(), RepositoryError> {
        let mut partitions = self.write()?;
        let appliances = &mut partitions
            .get_mut(&user_id)
            .ok_or(RepositoryError::NotFound)?
            .appliances;

        let position = appliances
            .iter()
            .position(|a| a.id == id)
            .ok_or(RepositoryError::NotFound)?;
        appliances.remove(position);
        Ok(())
    }
}

#[async_trait]
impl InvoiceRepository for InMemoryStore {
    async fn create(&self, invoice: Invoice) -> Result<Invoice, RepositoryError> {
        let mut partitions = self.write()?;
        let partition = partitions
            .get_mut(&invoice.user_id)
            .ok_or(RepositoryError::NotFound)?;

        partition.invoices.push(invoice.clone());
        Ok(invoice)
    }

    async fn find_by_user(&self, user_id: Uuid) -> Result<Vec<Invoice>, RepositoryError> {
        let partitions = self.read()?;
        Ok(partitions
            .get(&user_id)
            .map(|p| newest_first(&p.invoices).into_iter().cloned().collect())
            .unwrap_or_default())
    }

    async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<(), RepositoryError> {
        let mut partitions = self.write()?;
        let invoices = &mut partitions
            .get_mut(&user_id)
            .ok_or(RepositoryError::NotFound)?
            .invoices;

        let position = invoices
            .iter()
            .position(|i| i.id == id)
            .ok_or(RepositoryError::NotFound)?;
        invoices.remove(position);
        Ok(())
    }
}

#[async_trait]
impl AdviceRepository for InMemoryStore {
    async fn find_completed(&self, user_id: Uuid) -> Result<HashSet<String>, RepositoryError> {
        let partitions = self.read()?;
        Ok(partitions
            .get(&user_id)
            .map(|p| p.completed_advice.clone())
            .unwrap_or_default())
    }

    async fn complete(
        &self,
        user_id: Uuid,
        advice_id: &str,
        points: u32,
    ) -> Result<bool, RepositoryError> {
        let mut partitions = self.write()?;
        let partition = partitions
            .get_mut(&user_id)
            .ok_or(RepositoryError::NotFound)?;

        if !partition.completed_advice.insert(advice_id.to_string()) {
            return Ok(false);
        }

        partition.user.points = partition.user.points.saturating_add(points);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::appliance::EfficiencyLabel;
    use crate::models::invoice::Month;
    use crate::models::user::SubsidyTier;
    use rust_decimal::Decimal;

    fn registration(email: &str) -> CreateUserRequest {
        CreateUserRequest {
            email: email.to_string(),
            password: "password123".to_string(),
            password_confirmation: None,
            name: "Ana".to_string(),
            location: "Corrientes".to_string(),
            subsidy_tier: SubsidyTier::Medium,
        }
    }

    fn appliance(user_id: Uuid) -> Appliance {
        Appliance {
            id: Uuid::new_v4(),
            user_id,
            name: "Heladera".to_string(),
            quantity: 1,
            power_watts: 150.0,
            efficiency: EfficiencyLabel::A,
            hours_per_day: 24.0,
            days_per_month: 30,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn invoice(user_id: Uuid, month: Month, year: i32) -> Invoice {
        Invoice {
            id: Uuid::new_v4(),
            user_id,
            month,
            year,
            consumption_kwh: 200.0,
            cost: Decimal::from(15000),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_duplicate_email_is_rejected() {
        let store = InMemoryStore::new();
        UserRepository::create(&store, registration("a@example.com"), "hash".to_string())
            .await
            .unwrap();

        let result =
            UserRepository::create(&store, registration("a@example.com"), "hash".to_string()).await;
        assert!(matches!(
            result,
            Err(RepositoryError::ConstraintViolation(_))
        ));
    }

    #[tokio::test]
    async fn test_partitions_are_isolated() {
        let store = InMemoryStore::new();
        let ana = UserRepository::create(&store, registration("a@example.com"), "h".to_string())
            .await
            .unwrap();
        let bruno = UserRepository::create(&store, registration("b@example.com"), "h".to_string())
            .await
            .unwrap();

        let item = ApplianceRepository::create(&store, appliance(ana.id))
            .await
            .unwrap();

        assert_eq!(
            ApplianceRepository::find_by_user(&store, ana.id)
                .await
                .unwrap()
                .len(),
            1
        );
        assert!(
            ApplianceRepository::find_by_user(&store, bruno.id)
                .await
                .unwrap()
                .is_empty()
        );
        assert!(matches!(
            ApplianceRepository::delete(&store, bruno.id, item.id).await,
            Err(RepositoryError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_invoices_are_listed_newest_first() {
        let store = InMemoryStore::new();
        let user = UserRepository::create(&store, registration("a@example.com"), "h".to_string())
            .await
            .unwrap();

        for (month, year) in [
            (Month::Marzo, 2024),
            (Month::Diciembre, 2023),
            (Month::Enero, 2025),
        ] {
            InvoiceRepository::create(&store, invoice(user.id, month, year))
                .await
                .unwrap();
        }

        let periods: Vec<(i32, u8)> = InvoiceRepository::find_by_user(&store, user.id)
            .await
            .unwrap()
            .iter()
            .map(Invoice::period)
            .collect();
        assert_eq!(periods, vec![(2025, 1), (2024, 3), (2023, 12)]);
    }

    #[tokio::test]
    async fn test_completing_advice_awards_points_once() {
        let store = InMemoryStore::new();
        let user = UserRepository::create(&store, registration("a@example.com"), "h".to_string())
            .await
            .unwrap();

        assert!(store.complete(user.id, "desconectar-standby", 10).await.unwrap());
        assert!(!store.complete(user.id, "desconectar-standby", 10).await.unwrap());

        let stored = UserRepository::find_by_id(&store, user.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.points, 10);
        assert!(
            store
                .find_completed(user.id)
                .await
                .unwrap()
                .contains("desconectar-standby")
        );
    }

    #[tokio::test]
    async fn test_update_keeps_omitted_fields() {
        let store = InMemoryStore::new();
        let user = UserRepository::create(&store, registration("a@example.com"), "h".to_string())
            .await
            .unwrap();

        let changes = UserChanges {
            subsidy_tier: Some(SubsidyTier::High),
            ..Default::default()
        };
        let updated = UserRepository::update(&store, user.id, changes).await.unwrap();

        assert_eq!(updated.subsidy_tier, SubsidyTier::High);
        assert_eq!(updated.name, "Ana");
        assert_eq!(updated.password_hash, "h");
    }
}
