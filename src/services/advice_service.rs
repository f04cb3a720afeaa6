//! Sustainability advice: rule-based generation and completion tracking.

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;
use uuid::Uuid;

use super::calculator::newest_first;
use super::{ServiceError, resolve_owner};
use crate::models::advice::{AdviceCompletion, AdviceItem};
use crate::models::appliance::Appliance;
use crate::models::invoice::Invoice;
use crate::repositories::{
    AdviceRepository, ApplianceRepository, InvoiceRepository, RepositoryError, UserRepository,
};

/// Points granted the first time an advice item is completed
pub const ADVICE_POINTS: u32 = 10;

/// Monthly consumption above which the household is flagged
pub const HIGH_CONSUMPTION_KWH: f64 = 300.0;

/// Produces advice for a household from its invoices and appliances.
///
/// Items come back with `completed == false`; completion state is applied by
/// the caller. Ids must be stable for the same situation.
pub trait AdviceGenerator: Send + Sync {
    fn generate(&self, invoices: &[Invoice], appliances: &[Appliance]) -> Vec<AdviceItem>;
}

/// Fixed rules over the latest invoices and the appliance inventory
#[derive(Debug, Default, Clone, Copy)]
pub struct RuleBasedAdvisor;

fn item(id: impl Into<String>, text: impl Into<String>, urgent: bool) -> AdviceItem {
    AdviceItem {
        id: id.into(),
        text: text.into(),
        urgent,
        completed: false,
    }
}

fn name_mentions(appliance: &Appliance, keywords: &[&str]) -> bool {
    let name = appliance.name.to_lowercase();
    keywords.iter().any(|keyword| name.contains(keyword))
}

impl AdviceGenerator for RuleBasedAdvisor {
    fn generate(&self, invoices: &[Invoice], appliances: &[Appliance]) -> Vec<AdviceItem> {
        let mut advice = Vec::new();
        let sorted = newest_first(invoices);

        if let [latest, previous, ..] = sorted.as_slice() {
            if latest.consumption_kwh > previous.consumption_kwh {
                advice.push(item(
                    "consumo-en-aumento",
                    format!(
                        "Tu consumo subió de {:.0} kWh a {:.0} kWh respecto de la factura anterior. \
                         Revisá qué equipos usaste más este mes.",
                        previous.consumption_kwh, latest.consumption_kwh
                    ),
                    true,
                ));
            }
        }

        if let Some(latest) = sorted.first() {
            if latest.consumption_kwh > HIGH_CONSUMPTION_KWH {
                advice.push(item(
                    "consumo-elevado",
                    format!(
                        "Tu última factura registra {:.0} kWh, por encima de {:.0} kWh. \
                         Escalonar el uso de los equipos de mayor potencia ayuda a bajarlo.",
                        latest.consumption_kwh, HIGH_CONSUMPTION_KWH
                    ),
                    true,
                ));
            }
        }

        advice.push(item(
            "desconectar-standby",
            "Desconectá los electrodomésticos que no uses: el modo standby sigue consumiendo energía.",
            false,
        ));

        if appliances
            .iter()
            .any(|a| name_mentions(a, &["aire acondicionado", "acondicionado"]))
        {
            advice.push(item(
                "aire-acondicionado-24",
                "Configurá el aire acondicionado en 24 °C: cada grado menos aumenta el consumo.",
                false,
            ));
        }

        if appliances.iter().any(|a| {
            name_mentions(a, &["lámpara", "lampara", "foco", "luz", "iluminación"])
                && a.efficiency.is_below_a()
        }) {
            advice.push(item(
                "iluminacion-led",
                "Reemplazá las lámparas de baja eficiencia por luces LED.",
                false,
            ));
        }

        for appliance in appliances.iter().filter(|a| a.efficiency.is_inefficient()) {
            advice.push(item(
                format!("eficiencia-{}", appliance.id),
                format!(
                    "Tu {} tiene etiqueta {}. Al renovarlo, elegí un modelo clase A o superior.",
                    appliance.name,
                    appliance.efficiency.as_str()
                ),
                false,
            ));
        }

        if appliances.iter().any(|a| name_mentions(a, &["termotanque"])) {
            advice.push(item(
                "termotanque-temperatura",
                "Bajá la temperatura del termotanque eléctrico a 50 °C.",
                false,
            ));
        }

        advice
    }
}

/// Flag the items whose id is in `completed`
pub fn with_completion(items: Vec<AdviceItem>, completed: &HashSet<String>) -> Vec<AdviceItem> {
    items
        .into_iter()
        .map(|mut item| {
            item.completed = completed.contains(&item.id);
            item
        })
        .collect()
}

#[async_trait]
pub trait AdviceService: Send + Sync {
    async fn list_advice(&self, actor: Uuid, owner: &str) -> Result<Vec<AdviceItem>, ServiceError>;

    /// Complete an advice item. Points are awarded once; repeating is a no-op.
    async fn mark_completed(
        &self,
        actor: Uuid,
        owner: &str,
        advice_id: &str,
    ) -> Result<AdviceCompletion, ServiceError>;
}

pub struct AdviceServiceImpl {
    user_repository: Arc<dyn UserRepository>,
    appliance_repository: Arc<dyn ApplianceRepository>,
    invoice_repository: Arc<dyn InvoiceRepository>,
    advice_repository: Arc<dyn AdviceRepository>,
    generator: Arc<dyn AdviceGenerator>,
}

impl AdviceServiceImpl {
    pub fn new(
        user_repository: Arc<dyn UserRepository>,
        appliance_repository: Arc<dyn ApplianceRepository>,
        invoice_repository: Arc<dyn InvoiceRepository>,
        advice_repository: Arc<dyn AdviceRepository>,
        generator: Arc<dyn AdviceGenerator>,
    ) -> Self {
        Self {
            user_repository,
            appliance_repository,
            invoice_repository,
            advice_repository,
            generator,
        }
    }

    async fn current_advice(&self, user_id: Uuid) -> Result<Vec<AdviceItem>, ServiceError> {
        let (invoices, appliances, completed) = tokio::try_join!(
            self.invoice_repository.find_by_user(user_id),
            self.appliance_repository.find_by_user(user_id),
            self.advice_repository.find_completed(user_id),
        )?;

        Ok(with_completion(
            self.generator.generate(&invoices, &appliances),
            &completed,
        ))
    }
}

#[async_trait]
impl AdviceService for AdviceServiceImpl {
    async fn list_advice(&self, actor: Uuid, owner: &str) -> Result<Vec<AdviceItem>, ServiceError> {
        let user = resolve_owner(self.user_repository.as_ref(), actor, owner).await?;
        self.current_advice(user.id).await
    }

    async fn mark_completed(
        &self,
        actor: Uuid,
        owner: &str,
        advice_id: &str,
    ) -> Result<AdviceCompletion, ServiceError> {
        let user = resolve_owner(self.user_repository.as_ref(), actor, owner).await?;

        let advice = self.current_advice(user.id).await?;
        let already_completed = match advice.iter().find(|item| item.id == advice_id) {
            Some(item) => item.completed,
            // Completed earlier but no longer generated
            None => {
                let completed = self.advice_repository.find_completed(user.id).await?;
                if !completed.contains(advice_id) {
                    return Err(ServiceError::AdviceNotFound);
                }
                true
            }
        };

        let awarded = if already_completed {
            false
        } else {
            self.advice_repository
                .complete(user.id, advice_id, ADVICE_POINTS)
                .await
                .map_err(|e| match e {
                    RepositoryError::NotFound => ServiceError::UserNotFound,
                    other => other.into(),
                })?
        };

        let points = self
            .user_repository
            .find_by_id(user.id)
            .await?
            .map(|u| u.points)
            .ok_or(ServiceError::UserNotFound)?;

        if awarded {
            tracing::info!(user_id = %user.id, advice_id, points, "Advice completed");
        }

        Ok(AdviceCompletion {
            advice_id: advice_id.to_string(),
            points,
            awarded: if awarded { ADVICE_POINTS } else { 0 },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::appliance::EfficiencyLabel;
    use crate::models::invoice::Month;
    use crate::models::user::{CreateUserRequest, SubsidyTier, User};
    use crate::repositories::InMemoryStore;
    use chrono::Utc;
    use rust_decimal::Decimal;

    fn invoice(month: Month, kwh: f64) -> Invoice {
        Invoice {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            month,
            year: 2024,
            consumption_kwh: kwh,
            cost: Decimal::ZERO,
            created_at: Utc::now(),
        }
    }

    fn appliance(name: &str, efficiency: EfficiencyLabel) -> Appliance {
        Appliance {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            name: name.to_string(),
            quantity: 1,
            power_watts: 100.0,
            efficiency,
            hours_per_day: 1.0,
            days_per_month: 30,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn ids(items: &[AdviceItem]) -> Vec<&str> {
        items.iter().map(|item| item.id.as_str()).collect()
    }

    #[test]
    fn test_standby_advice_is_always_present() {
        let advice = RuleBasedAdvisor.generate(&[], &[]);
        assert_eq!(ids(&advice), vec!["desconectar-standby"]);
        assert!(!advice[0].urgent);
    }

    #[test]
    fn test_rising_and_high_consumption_are_urgent() {
        let invoices = vec![invoice(Month::Enero, 250.0), invoice(Month::Febrero, 320.0)];
        let advice = RuleBasedAdvisor.generate(&invoices, &[]);

        assert_eq!(
            ids(&advice),
            vec!["consumo-en-aumento", "consumo-elevado", "desconectar-standby"]
        );
        assert!(advice[0].urgent && advice[1].urgent);
    }

    #[test]
    fn test_falling_consumption_is_not_flagged() {
        let invoices = vec![invoice(Month::Enero, 250.0), invoice(Month::Febrero, 200.0)];
        let advice = RuleBasedAdvisor.generate(&invoices, &[]);
        assert!(!ids(&advice).contains(&"consumo-en-aumento"));
    }

    #[test]
    fn test_appliance_rules() {
        let inefficient = appliance("Heladera", EfficiencyLabel::D);
        let appliances = vec![
            appliance("Aire acondicionado", EfficiencyLabel::A),
            appliance("Lámpara incandescente", EfficiencyLabel::E),
            inefficient.clone(),
            appliance("Termotanque eléctrico", EfficiencyLabel::B),
        ];
        let advice = RuleBasedAdvisor.generate(&[], &appliances);
        let ids = ids(&advice);

        assert!(ids.contains(&"aire-acondicionado-24"));
        assert!(ids.contains(&"iluminacion-led"));
        assert!(ids.contains(&"termotanque-temperatura"));
        assert!(ids.contains(&format!("eficiencia-{}", inefficient.id).as_str()));
    }

    #[test]
    fn test_efficient_lighting_needs_no_led_advice() {
        let appliances = vec![appliance("Lámpara LED", EfficiencyLabel::APlus)];
        let advice = RuleBasedAdvisor.generate(&[], &appliances);
        assert!(!ids(&advice).contains(&"iluminacion-led"));
    }

    async fn setup() -> (AdviceServiceImpl, User) {
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

        let service = AdviceServiceImpl::new(
            store.clone(),
            store.clone(),
            store.clone(),
            store,
            Arc::new(RuleBasedAdvisor),
        );
        (service, user)
    }

    #[tokio::test]
    async fn test_completing_twice_awards_points_once() {
        let (service, user) = setup().await;
        let owner = user.id.to_string();

        let first = service
            .mark_completed(user.id, &owner, "desconectar-standby")
            .await
            .unwrap();
        assert_eq!(first.awarded, ADVICE_POINTS);
        assert_eq!(first.points, 10);

        let second = service
            .mark_completed(user.id, &owner, "desconectar-standby")
            .await
            .unwrap();
        assert_eq!(second.awarded, 0);
        assert_eq!(second.points, 10);

        let advice = service.list_advice(user.id, &owner).await.unwrap();
        assert!(advice.iter().all(|item| item.completed));
    }

    #[tokio::test]
    async fn test_unknown_advice_is_not_found() {
        let (service, user) = setup().await;
        let result = service
            .mark_completed(user.id, &user.id.to_string(), "no-existe")
            .await;
        assert!(matches!(result, Err(ServiceError::AdviceNotFound)));
    }

    #[tokio::test]
    async fn test_foreign_advice_is_forbidden() {
        let (service, user) = setup().await;
        let result = service
            .list_advice(Uuid::new_v4(), &user.id.to_string())
            .await;
        assert!(matches!(result, Err(ServiceError::Forbidden)));
    }
}
