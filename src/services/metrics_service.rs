use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use super::advice_service::{AdviceGenerator, with_completion};
use super::calculator::{self, Tariff};
use super::{ServiceError, resolve_owner};
use crate::models::metrics::{
    ConsumptionRequest, CostEstimate, FootprintEstimate, MetricsSummary, ProfileMetrics,
};
use crate::repositories::{
    AdviceRepository, ApplianceRepository, InvoiceRepository, UserRepository,
};

/// Rollups over a household's data plus the stateless calculator
#[async_trait]
pub trait MetricsService: Send + Sync {
    async fn summary(&self, actor: Uuid, owner: &str) -> Result<MetricsSummary, ServiceError>;

    async fn profile(&self, actor: Uuid, owner: &str) -> Result<ProfileMetrics, ServiceError>;

    fn estimate_cost(&self, request: &ConsumptionRequest) -> Result<CostEstimate, ServiceError>;

    fn estimate_footprint(
        &self,
        request: &ConsumptionRequest,
    ) -> Result<FootprintEstimate, ServiceError>;
}

pub struct MetricsServiceImpl {
    user_repository: Arc<dyn UserRepository>,
    appliance_repository: Arc<dyn ApplianceRepository>,
    invoice_repository: Arc<dyn InvoiceRepository>,
    advice_repository: Arc<dyn AdviceRepository>,
    generator: Arc<dyn AdviceGenerator>,
    tariff: Tariff,
}

impl MetricsServiceImpl {
    pub fn new(
        user_repository: Arc<dyn UserRepository>,
        appliance_repository: Arc<dyn ApplianceRepository>,
        invoice_repository: Arc<dyn InvoiceRepository>,
        advice_repository: Arc<dyn AdviceRepository>,
        generator: Arc<dyn AdviceGenerator>,
        tariff: Tariff,
    ) -> Self {
        Self {
            user_repository,
            appliance_repository,
            invoice_repository,
            advice_repository,
            generator,
            tariff,
        }
    }
}

#[async_trait]
impl MetricsService for MetricsServiceImpl {
    async fn summary(&self, actor: Uuid, owner: &str) -> Result<MetricsSummary, ServiceError> {
        let user = resolve_owner(self.user_repository.as_ref(), actor, owner).await?;

        let (invoices, appliances, completed) = tokio::try_join!(
            self.invoice_repository.find_by_user(user.id),
            self.appliance_repository.find_by_user(user.id),
            self.advice_repository.find_completed(user.id),
        )?;
        let advice = with_completion(self.generator.generate(&invoices, &appliances), &completed);

        let summary =
            calculator::aggregate_summary(&self.tariff, &user, &invoices, &appliances, &advice)?;

        tracing::debug!(
            user_id = %user.id,
            invoices = invoices.len(),
            appliances = appliances.len(),
            "Computed metrics summary"
        );
        Ok(summary)
    }

    async fn profile(&self, actor: Uuid, owner: &str) -> Result<ProfileMetrics, ServiceError> {
        let user = resolve_owner(self.user_repository.as_ref(), actor, owner).await?;

        let (invoices, appliances) = tokio::try_join!(
            self.invoice_repository.find_by_user(user.id),
            self.appliance_repository.find_by_user(user.id),
        )?;

        Ok(calculator::aggregate_profile(
            &self.tariff,
            &user,
            &invoices,
            &appliances,
        )?)
    }

    fn estimate_cost(&self, request: &ConsumptionRequest) -> Result<CostEstimate, ServiceError> {
        let estimated_cost = self
            .tariff
            .estimate_cost(request.kwh, request.subsidy_tier)?;

        Ok(CostEstimate {
            estimated_cost,
            currency: self.tariff.currency().to_string(),
        })
    }

    fn estimate_footprint(
        &self,
        request: &ConsumptionRequest,
    ) -> Result<FootprintEstimate, ServiceError> {
        let co2_kg = self
            .tariff
            .estimate_carbon_footprint(request.kwh, request.subsidy_tier)?;

        Ok(FootprintEstimate {
            co2_kg,
            trees_equivalent: calculator::trees_equivalent(co2_kg),
        })
    }
}
