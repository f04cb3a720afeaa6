use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Appliance archetype with nominal power and usage
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Archetype {
    pub name: &'static str,
    pub base_watts: f64,
    pub standard_hours_per_day: f64,
    pub standard_days_per_month: u32,
}

const fn archetype(
    name: &'static str,
    base_watts: f64,
    standard_hours_per_day: f64,
    standard_days_per_month: u32,
) -> Archetype {
    Archetype {
        name,
        base_watts,
        standard_hours_per_day,
        standard_days_per_month,
    }
}

/// Reference catalog shared by every user
pub const APPLIANCE_CATALOG: &[Archetype] = &[
    archetype("Heladera", 150.0, 24.0, 30),
    archetype("Freezer", 200.0, 24.0, 30),
    archetype("Lavarropas", 500.0, 1.0, 12),
    archetype("Aire acondicionado", 1350.0, 6.0, 20),
    archetype("Ventilador", 60.0, 8.0, 20),
    archetype("Televisor", 100.0, 5.0, 30),
    archetype("Computadora", 200.0, 4.0, 22),
    archetype("Microondas", 1200.0, 0.25, 30),
    archetype("Pava eléctrica", 2000.0, 0.2, 30),
    archetype("Termotanque eléctrico", 1500.0, 3.0, 30),
    archetype("Plancha", 1000.0, 1.0, 8),
    archetype("Lámpara LED", 10.0, 6.0, 30),
    archetype("Lámpara incandescente", 60.0, 6.0, 30),
    archetype("Secador de pelo", 1200.0, 0.2, 15),
];

/// Catalog entry as exposed over the API
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct CatalogEntry {
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "potencia_base")]
    pub base_watts: f64,
    #[serde(rename = "horas_dia_estandar")]
    pub standard_hours_per_day: f64,
    #[serde(rename = "dias_mes_estandar")]
    pub standard_days_per_month: u32,
}

impl From<&Archetype> for CatalogEntry {
    fn from(archetype: &Archetype) -> Self {
        Self {
            name: archetype.name.to_string(),
            base_watts: archetype.base_watts,
            standard_hours_per_day: archetype.standard_hours_per_day,
            standard_days_per_month: archetype.standard_days_per_month,
        }
    }
}

pub fn catalog() -> Vec<CatalogEntry> {
    APPLIANCE_CATALOG.iter().map(CatalogEntry::from).collect()
}

/// Case-insensitive lookup by archetype name
pub fn find_archetype(name: &str) -> Option<&'static Archetype> {
    let needle = name.trim().to_lowercase();
    APPLIANCE_CATALOG
        .iter()
        .find(|archetype| archetype.name.to_lowercase() == needle)
}
