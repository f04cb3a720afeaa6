use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::validation::validate_invoice_amount;

/// Billing month, named the way invoices print it
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Month {
    Enero,
    Febrero,
    Marzo,
    Abril,
    Mayo,
    Junio,
    Julio,
    Agosto,
    Septiembre,
    Octubre,
    Noviembre,
    Diciembre,
}

impl Month {
    pub const ALL: [Month; 12] = [
        Month::Enero,
        Month::Febrero,
        Month::Marzo,
        Month::Abril,
        Month::Mayo,
        Month::Junio,
        Month::Julio,
        Month::Agosto,
        Month::Septiembre,
        Month::Octubre,
        Month::Noviembre,
        Month::Diciembre,
    ];

    /// 1-based month number
    pub fn number(&self) -> u8 {
        match self {
            Month::Enero => 1,
            Month::Febrero => 2,
            Month::Marzo => 3,
            Month::Abril => 4,
            Month::Mayo => 5,
            Month::Junio => 6,
            Month::Julio => 7,
            Month::Agosto => 8,
            Month::Septiembre => 9,
            Month::Octubre => 10,
            Month::Noviembre => 11,
            Month::Diciembre => 12,
        }
    }

    pub fn from_number(number: u8) -> Option<Self> {
        Month::ALL.get(usize::from(number).checked_sub(1)?).copied()
    }
}

/// Invoice entity: consumption and cost as reported by the utility
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct Invoice {
    pub id: Uuid,
    #[serde(skip)]
    pub user_id: Uuid,
    #[serde(rename = "mes")]
    pub month: Month,
    #[serde(rename = "anio")]
    pub year: i32,
    #[serde(rename = "consumo_kwh")]
    pub consumption_kwh: f64,
    #[serde(rename = "costo")]
    pub cost: Decimal,
    pub created_at: DateTime<Utc>,
}

impl Invoice {
    /// Chronological sort key
    pub fn period(&self) -> (i32, u8) {
        (self.year, self.month.number())
    }
}

/// Request payload for registering an invoice
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[schema(example = json!({
    "mes": "Enero",
    "anio": 2024,
    "consumo_kwh": 200.0,
    "costo": 15000.0
}))]
pub struct CreateInvoiceRequest {
    #[serde(rename = "mes", alias = "month")]
    pub month: Month,

    #[serde(rename = "anio", alias = "year")]
    #[validate(range(min = 2020, message = "Year must be 2020 or later"))]
    pub year: i32,

    #[serde(rename = "consumo_kwh", alias = "consumption_kwh")]
    #[validate(range(
        min = 0.0,
        max = 10_000_000.0,
        message = "Consumption must be between 0 and 10000000 kWh"
    ))]
    pub consumption_kwh: f64,

    #[serde(rename = "costo", alias = "cost")]
    #[validate(custom(function = "validate_invoice_amount"))]
    #[schema(minimum = 0, example = 15000.0)]
    pub cost: Decimal,
}
