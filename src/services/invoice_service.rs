use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use super::{ServiceError, resolve_owner};
use crate::models::invoice::{CreateInvoiceRequest, Invoice};
use crate::repositories::{InvoiceRepository, UserRepository};

/// Utility invoices of a household. Invoices are never edited.
#[async_trait]
pub trait InvoiceService: Send + Sync {
    /// Invoices sorted by billing period, newest first
    async fn list_invoices(&self, actor: Uuid, owner: &str) -> Result<Vec<Invoice>, ServiceError>;

    async fn add_invoice(
        &self,
        actor: Uuid,
        owner: &str,
        request: CreateInvoiceRequest,
    ) -> Result<Invoice, ServiceError>;

    async fn delete_invoice(
        &self,
        actor: Uuid,
        owner: &str,
        invoice_id: Uuid,
    ) -> Result<(), ServiceError>;
}

pub struct InvoiceServiceImpl {
    user_repository: Arc<dyn UserRepository>,
    invoice_repository: Arc<dyn InvoiceRepository>,
}

impl InvoiceServiceImpl {
    pub fn new(
        user_repository: Arc<dyn UserRepository>,
        invoice_repository: Arc<dyn InvoiceRepository>,
    ) -> Self {
        Self {
            user_repository,
            invoice_repository,
        }
    }
}

#[async_trait]
impl InvoiceService for InvoiceServiceImpl {
    async fn list_invoices(&self, actor: Uuid, owner: &str) -> Result<Vec<Invoice>, ServiceError> {
        let user = resolve_owner(self.user_repository.as_ref(), actor, owner).await?;
        Ok(self.invoice_repository.find_by_user(user.id).await?)
    }

    async fn add_invoice(
        &self,
        actor: Uuid,
        owner: &str,
        request: CreateInvoiceRequest,
    ) -> Result<Invoice, ServiceError> {
        let user = resolve_owner(self.user_repository.as_ref(), actor, owner).await?;

        let invoice = Invoice {
            id: Uuid::new_v4(),
            user_id: user.id,
            month: request.month,
            year: request.year,
            consumption_kwh: request.consumption_kwh,
            cost: request.cost.round_dp(2),
            created_at: Utc::now(),
        };

        let created = self.invoice_repository.create(invoice).await?;

        tracing::info!(
            user_id = %user.id,
            invoice_id = %created.id,
            year = created.year,
            month = created.month.number(),
            "Registered invoice"
        );
        Ok(created)
    }

    async fn delete_invoice(
        &self,
        actor: Uuid,
        owner: &str,
        invoice_id: Uuid,
    ) -> Result<(), ServiceError> {
        let user = resolve_owner(self.user_repository.as_ref(), actor, owner).await?;
        self.invoice_repository.delete(user.id, invoice_id).await?;

        tracing::info!(user_id = %user.id, invoice_id = %invoice_id, "Deleted invoice");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::invoice::Month;
    use crate::models::user::{CreateUserRequest, SubsidyTier, User};
    use crate::repositories::InMemoryStore;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    async fn setup() -> (InvoiceServiceImpl, User) {
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

        (InvoiceServiceImpl::new(store.clone(), store), user)
    }

    fn request(month: Month, year: i32, kwh: f64, cost: &str) -> CreateInvoiceRequest {
        CreateInvoiceRequest {
            month,
            year,
            consumption_kwh: kwh,
            cost: Decimal::from_str(cost).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_add_and_list_newest_first() {
        let (service, user) = setup().await;
        let owner = user.email.clone();

        service
            .add_invoice(user.id, &owner, request(Month::Enero, 2024, 200.0, "15000"))
            .await
            .unwrap();
        service
            .add_invoice(user.id, &owner, request(Month::Marzo, 2024, 180.0, "13500"))
            .await
            .unwrap();

        let invoices = service.list_invoices(user.id, &owner).await.unwrap();
        assert_eq!(invoices.len(), 2);
        assert_eq!(invoices[0].month, Month::Marzo);
        assert_eq!(invoices[1].month, Month::Enero);
    }

    #[tokio::test]
    async fn test_cost_is_stored_in_cents() {
        let (service, user) = setup().await;
        let invoice = service
            .add_invoice(
                user.id,
                &user.email,
                request(Month::Enero, 2024, 200.0, "15000.456"),
            )
            .await
            .unwrap();

        assert_eq!(invoice.cost, Decimal::from_str("15000.46").unwrap());
    }

    #[tokio::test]
    async fn test_delete_invoice() {
        let (service, user) = setup().await;
        let invoice = service
            .add_invoice(user.id, &user.email, request(Month::Enero, 2024, 200.0, "0"))
            .await
            .unwrap();

        service
            .delete_invoice(user.id, &user.email, invoice.id)
            .await
            .unwrap();

        let result = service.delete_invoice(user.id, &user.email, invoice.id).await;
        assert!(matches!(result, Err(ServiceError::EntryNotFound)));
        assert!(service.list_invoices(user.id, &user.email).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_owner_is_not_found() {
        let (service, user) = setup().await;
        let result = service.list_invoices(user.id, "nadie@example.com").await;
        assert!(matches!(result, Err(ServiceError::UserNotFound)));
    }
}
