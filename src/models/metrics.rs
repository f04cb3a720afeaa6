use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::advice::AdviceItem;
use crate::models::user::SubsidyTier;

/// Whether a rollup had anything to aggregate
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DataStatus {
    /// No invoices and no appliances registered
    SinDatos,
    Disponible,
}

/// Invoice-reported ("real") totals next to appliance-derived ("estimated") totals
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct ActivitySummary {
    #[serde(rename = "facturas_consumo")]
    pub invoice_kwh: f64,
    #[serde(rename = "facturas_costo")]
    pub invoice_cost: Decimal,
    #[serde(rename = "estimado_consumo")]
    pub estimated_kwh: f64,
    #[serde(rename = "estimado_costo")]
    pub estimated_cost: Decimal,
    #[serde(rename = "facturas_registradas")]
    pub invoice_count: usize,
    #[serde(rename = "electrodomesticos_registrados")]
    pub appliance_count: usize,
}

/// Monthly consumption of a single appliance
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct ApplianceBreakdown {
    pub id: Uuid,
    #[serde(rename = "nombre")]
    pub name: String,
    pub total_kwh: f64,
}

/// Dashboard summary for one user
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct MetricsSummary {
    #[serde(rename = "estado")]
    pub status: DataStatus,
    /// Sum of invoice consumption; null without invoices
    #[serde(rename = "consumo_total_kwh")]
    pub total_kwh: Option<f64>,
    /// Sum of invoice cost; null without invoices
    #[serde(rename = "costo_total")]
    pub total_cost: Option<Decimal>,
    /// Footprint of the invoiced consumption; null without invoices
    #[serde(rename = "huella_co2_total")]
    pub total_co2_kg: Option<f64>,
    #[serde(rename = "puntos_sostenibilidad")]
    pub points: u32,
    #[serde(rename = "resumen_actividad")]
    pub activity: ActivitySummary,
    #[serde(rename = "desglose_electrodomesticos")]
    pub appliance_breakdown: Vec<ApplianceBreakdown>,
    #[serde(rename = "consejo_dinamico")]
    pub featured_advice: Option<AdviceItem>,
    /// Change between the two most recent invoices, in percent
    #[serde(rename = "variacion_mensual_pct")]
    pub monthly_change_pct: Option<f64>,
    #[serde(rename = "moneda")]
    pub currency: String,
}

/// Profile page metrics for one user
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct ProfileMetrics {
    pub id: Uuid,
    #[serde(rename = "username")]
    pub email: String,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "ubicacion")]
    pub location: String,
    #[serde(rename = "nivel_subsidio")]
    pub subsidy_tier: SubsidyTier,
    #[serde(rename = "puntos_sostenibilidad")]
    pub points: u32,
    #[serde(rename = "resumen_actividad")]
    pub activity: ActivitySummary,
    #[serde(rename = "consumo_mensual_promedio_kwh")]
    pub average_monthly_kwh: Option<f64>,
    #[serde(rename = "huella_mensual_promedio_kg_co2")]
    pub average_monthly_co2_kg: Option<f64>,
    #[serde(rename = "arboles_equivalentes")]
    pub trees_equivalent: Option<f64>,
}

/// Request payload for the calculator endpoints
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({ "kwh": 200.0, "nivel_subsidio": "medio" }))]
pub struct ConsumptionRequest {
    pub kwh: f64,
    #[serde(rename = "nivel_subsidio", alias = "subsidy_tier")]
    pub subsidy_tier: SubsidyTier,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct CostEstimate {
    #[serde(rename = "costo_estimado")]
    pub estimated_cost: Decimal,
    #[serde(rename = "moneda")]
    pub currency: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct FootprintEstimate {
    #[serde(rename = "huella_carbono_kg_co2")]
    pub co2_kg: f64,
    #[serde(rename = "arboles_equivalentes")]
    pub trees_equivalent: f64,
}
