use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::services::calculator::monthly_kwh;
use crate::validation::validate_not_blank;

/// Energy efficiency label; informational only
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub enum EfficiencyLabel {
    #[serde(rename = "A++")]
    APlusPlus,
    #[serde(rename = "A+")]
    APlus,
    #[default]
    #[serde(rename = "A")]
    A,
    #[serde(rename = "B")]
    B,
    #[serde(rename = "C")]
    C,
    #[serde(rename = "D")]
    D,
    #[serde(rename = "E")]
    E,
}

impl EfficiencyLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            EfficiencyLabel::APlusPlus => "A++",
            EfficiencyLabel::APlus => "A+",
            EfficiencyLabel::A => "A",
            EfficiencyLabel::B => "B",
            EfficiencyLabel::C => "C",
            EfficiencyLabel::D => "D",
            EfficiencyLabel::E => "E",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "A++" => Some(EfficiencyLabel::APlusPlus),
            "A+" => Some(EfficiencyLabel::APlus),
            "A" => Some(EfficiencyLabel::A),
            "B" => Some(EfficiencyLabel::B),
            "C" => Some(EfficiencyLabel::C),
            "D" => Some(EfficiencyLabel::D),
            "E" => Some(EfficiencyLabel::E),
            _ => None,
        }
    }

    /// Labels below A are worth replacing
    pub fn is_below_a(&self) -> bool {
        matches!(
            self,
            EfficiencyLabel::B | EfficiencyLabel::C | EfficiencyLabel::D | EfficiencyLabel::E
        )
    }

    pub fn is_inefficient(&self) -> bool {
        matches!(
            self,
            EfficiencyLabel::C | EfficiencyLabel::D | EfficiencyLabel::E
        )
    }
}

/// Appliance entry in a user's inventory.
///
/// Monthly consumption is not stored; see [`Appliance::monthly_kwh`].
#[derive(Debug, Clone, PartialEq)]
pub struct Appliance {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub quantity: u32,
    pub power_watts: f64,
    pub efficiency: EfficiencyLabel,
    pub hours_per_day: f64,
    pub days_per_month: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Appliance {
    pub fn monthly_kwh(&self) -> f64 {
        monthly_kwh(
            self.power_watts,
            self.hours_per_day,
            self.days_per_month,
            self.quantity,
        )
    }
}

/// Appliance as returned by the API, with its derived monthly consumption
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApplianceResponse {
    pub id: Uuid,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "cantidad")]
    pub quantity: u32,
    #[serde(rename = "potencia")]
    pub power_watts: f64,
    #[serde(rename = "eficiencia")]
    pub efficiency: EfficiencyLabel,
    #[serde(rename = "horas_dia")]
    pub hours_per_day: f64,
    #[serde(rename = "dias_mes")]
    pub days_per_month: u32,
    /// Derived on read: power × hours/day × days/month × quantity / 1000
    pub total_kwh: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Appliance> for ApplianceResponse {
    fn from(appliance: &Appliance) -> Self {
        Self {
            id: appliance.id,
            name: appliance.name.clone(),
            quantity: appliance.quantity,
            power_watts: appliance.power_watts,
            efficiency: appliance.efficiency,
            hours_per_day: appliance.hours_per_day,
            days_per_month: appliance.days_per_month,
            total_kwh: appliance.monthly_kwh(),
            created_at: appliance.created_at,
            updated_at: appliance.updated_at,
        }
    }
}

/// Request payload for adding an appliance to the inventory
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[schema(example = json!({
    "nombre": "Heladera",
    "cantidad": 1,
    "potencia": 150.0,
    "eficiencia": "A+",
    "horas_dia": 24.0,
    "dias_mes": 30
}))]
pub struct CreateApplianceRequest {
    #[serde(rename = "nombre", alias = "name")]
    #[validate(
        length(
            min = 1,
            max = 100,
            message = "Name must be between 1 and 100 characters"
        ),
        custom(function = "validate_not_blank")
    )]
    pub name: String,

    #[serde(rename = "cantidad", alias = "quantity")]
    #[validate(range(min = 1, max = 1000, message = "Quantity must be between 1 and 1000"))]
    pub quantity: u32,

    #[serde(rename = "potencia", alias = "power_watts")]
    #[validate(range(
        exclusive_min = 0.0,
        max = 100000.0,
        message = "Power must be greater than 0 and at most 100000 W"
    ))]
    pub power_watts: f64,

    #[serde(rename = "eficiencia", alias = "efficiency", default)]
    pub efficiency: Option<EfficiencyLabel>,

    #[serde(rename = "horas_dia", alias = "hours_per_day")]
    #[validate(range(
        exclusive_min = 0.0,
        max = 24.0,
        message = "Hours per day must be greater than 0 and at most 24"
    ))]
    pub hours_per_day: f64,

    #[serde(rename = "dias_mes", alias = "days_per_month")]
    #[validate(range(min = 1, max = 31, message = "Days per month must be between 1 and 31"))]
    pub days_per_month: u32,
}

/// Request payload for updating an appliance; omitted fields keep their stored value
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[schema(example = json!({
    "horas_dia": 6.0,
    "dias_mes": 20
}))]
pub struct UpdateApplianceRequest {
    #[serde(rename = "nombre", alias = "name", default)]
    #[validate(
        length(
            min = 1,
            max = 100,
            message = "Name must be between 1 and 100 characters"
        ),
        custom(function = "validate_not_blank")
    )]
    pub name: Option<String>,

    #[serde(rename = "cantidad", alias = "quantity", default)]
    #[validate(range(min = 1, max = 1000, message = "Quantity must be between 1 and 1000"))]
    pub quantity: Option<u32>,

    #[serde(rename = "potencia", alias = "power_watts", default)]
    #[validate(range(
        exclusive_min = 0.0,
        max = 100000.0,
        message = "Power must be greater than 0 and at most 100000 W"
    ))]
    pub power_watts: Option<f64>,

    #[serde(rename = "eficiencia", alias = "efficiency", default)]
    pub efficiency: Option<EfficiencyLabel>,

    #[serde(rename = "horas_dia", alias = "hours_per_day", default)]
    #[validate(range(
        exclusive_min = 0.0,
        max = 24.0,
        message = "Hours per day must be greater than 0 and at most 24"
    ))]
    pub hours_per_day: Option<f64>,

    #[serde(rename = "dias_mes", alias = "days_per_month", default)]
    #[validate(range(min = 1, max = 31, message = "Days per month must be between 1 and 31"))]
    pub days_per_month: Option<u32>,
}

impl UpdateApplianceRequest {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.quantity.is_none()
            && self.power_watts.is_none()
            && self.efficiency.is_none()
            && self.hours_per_day.is_none()
            && self.days_per_month.is_none()
    }

    /// Merge the provided fields over an existing appliance
    pub fn apply_to(self, existing: &Appliance) -> Appliance {
        Appliance {
            id: existing.id,
            user_id: existing.user_id,
            name: self
                .name
                .map(|name| name.trim().to_string())
                .unwrap_or_else(|| existing.name.clone()),
            quantity: self.quantity.unwrap_or(existing.quantity),
            power_watts: self.power_watts.unwrap_or(existing.power_watts),
            efficiency: self.efficiency.unwrap_or(existing.efficiency),
            hours_per_day: self.hours_per_day.unwrap_or(existing.hours_per_day),
            days_per_month: self.days_per_month.unwrap_or(existing.days_per_month),
            created_at: existing.created_at,
            updated_at: Utc::now(),
        }
    }
}
