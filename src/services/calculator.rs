//! Consumption, cost and carbon footprint arithmetic.
//!
//! Everything here is synchronous and free of I/O. Services load the data and
//! hand it to these functions.

use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use std::cmp::Ordering;

use crate::config::TariffSettings;
use crate::models::advice::AdviceItem;
use crate::models::appliance::Appliance;
use crate::models::invoice::Invoice;
use crate::models::metrics::{
    ActivitySummary, ApplianceBreakdown, DataStatus, MetricsSummary, ProfileMetrics,
};
use crate::models::user::{SubsidyTier, User};

/// CO2 absorbed by one tree in a year
pub const TREE_ABSORPTION_KG_CO2_PER_YEAR: f64 = 21.0;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum CalculationError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Price per kWh for each subsidy tier plus the grid emission factor
#[derive(Debug, Clone, PartialEq)]
pub struct Tariff {
    rate_high: Decimal,
    rate_medium: Decimal,
    rate_low: Decimal,
    emission_factor_kg_per_kwh: f64,
    currency: String,
}

impl Tariff {
    pub fn from_settings(settings: &TariffSettings) -> Result<Self, CalculationError> {
        Ok(Self {
            rate_high: rate_from_f64("rate_high", settings.rate_high)?,
            rate_medium: rate_from_f64("rate_medium", settings.rate_medium)?,
            rate_low: rate_from_f64("rate_low", settings.rate_low)?,
            emission_factor_kg_per_kwh: settings.emission_factor_kg_per_kwh,
            currency: settings.currency.clone(),
        })
    }

    pub fn rate(&self, tier: SubsidyTier) -> Decimal {
        match tier {
            SubsidyTier::High => self.rate_high,
            SubsidyTier::Medium => self.rate_medium,
            SubsidyTier::Low => self.rate_low,
        }
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    /// Cost of `kwh` at the tier's rate, rounded to cents
    pub fn estimate_cost(&self, kwh: f64, tier: SubsidyTier) -> Result<Decimal, CalculationError> {
        check_consumption(kwh)?;
        if kwh == 0.0 {
            return Ok(Decimal::ZERO);
        }

        let kwh = Decimal::from_f64(kwh).ok_or_else(|| {
            CalculationError::InvalidInput("Consumption is out of range".to_string())
        })?;

        kwh.checked_mul(self.rate(tier))
            .map(|cost| cost.round_dp(2))
            .ok_or_else(|| CalculationError::InvalidInput("Consumption is out of range".to_string()))
    }

    /// Footprint in kg CO2. A single grid factor applies to every tier.
    pub fn estimate_carbon_footprint(
        &self,
        kwh: f64,
        _tier: SubsidyTier,
    ) -> Result<f64, CalculationError> {
        check_consumption(kwh)?;
        Ok(round2(kwh * self.emission_factor_kg_per_kwh))
    }
}

fn rate_from_f64(key: &str, value: f64) -> Result<Decimal, CalculationError> {
    Decimal::from_f64(value)
        .filter(|rate| !rate.is_sign_negative() || rate.is_zero())
        .ok_or_else(|| CalculationError::InvalidInput(format!("{} is not a valid rate", key)))
}

fn check_consumption(kwh: f64) -> Result<(), CalculationError> {
    if !kwh.is_finite() || kwh < 0.0 {
        return Err(CalculationError::InvalidInput(
            "Consumption must be a non-negative number of kWh".to_string(),
        ));
    }
    Ok(())
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Trees needed for a year to absorb `co2_kg`
pub fn trees_equivalent(co2_kg: f64) -> f64 {
    round2(co2_kg / TREE_ABSORPTION_KG_CO2_PER_YEAR)
}

/// Monthly kWh of an appliance: power × hours/day × days/month × quantity / 1000
pub fn monthly_kwh(power_watts: f64, hours_per_day: f64, days_per_month: u32, quantity: u32) -> f64 {
    round2(power_watts * hours_per_day * f64::from(days_per_month) * f64::from(quantity) / 1000.0)
}

/// Invoices ordered by billing period, newest first
pub fn newest_first(invoices: &[Invoice]) -> Vec<&Invoice> {
    let mut sorted: Vec<&Invoice> = invoices.iter().collect();
    sorted.sort_by(|a, b| match b.period().cmp(&a.period()) {
        Ordering::Equal => b.created_at.cmp(&a.created_at),
        other => other,
    });
    sorted
}

/// Percent change between the two most recent invoices
pub fn monthly_change_pct(invoices: &[Invoice]) -> Option<f64> {
    let sorted = newest_first(invoices);
    let [latest, previous, ..] = sorted.as_slice() else {
        return None;
    };

    if previous.consumption_kwh <= 0.0 {
        return None;
    }

    Some(round2(
        (latest.consumption_kwh - previous.consumption_kwh) / previous.consumption_kwh * 100.0,
    ))
}

/// First pending urgent item, else the first pending one
pub fn featured_advice(advice: &[AdviceItem]) -> Option<AdviceItem> {
    advice
        .iter()
        .find(|item| item.urgent && !item.completed)
        .or_else(|| advice.iter().find(|item| !item.completed))
        .cloned()
}

pub fn activity_summary(
    tariff: &Tariff,
    tier: SubsidyTier,
    invoices: &[Invoice],
    appliances: &[Appliance],
) -> Result<ActivitySummary, CalculationError> {
    let invoice_kwh = round2(invoices.iter().map(|i| i.consumption_kwh).sum());
    let invoice_cost = invoices
        .iter()
        .try_fold(Decimal::ZERO, |total, i| total.checked_add(i.cost))
        .ok_or_else(|| {
            CalculationError::InvalidInput("Invoice cost total is out of range".to_string())
        })?;
    let estimated_kwh = round2(appliances.iter().map(Appliance::monthly_kwh).sum());
    let estimated_cost = tariff.estimate_cost(estimated_kwh, tier)?;

    Ok(ActivitySummary {
        invoice_kwh,
        invoice_cost,
        estimated_kwh,
        estimated_cost,
        invoice_count: invoices.len(),
        appliance_count: appliances.len(),
    })
}

/// Dashboard rollup. Invoice totals are never backfilled from appliance estimates.
pub fn aggregate_summary(
    tariff: &Tariff,
    user: &User,
    invoices: &[Invoice],
    appliances: &[Appliance],
    advice: &[AdviceItem],
) -> Result<MetricsSummary, CalculationError> {
    let activity = activity_summary(tariff, user.subsidy_tier, invoices, appliances)?;

    let status = if invoices.is_empty() && appliances.is_empty() {
        DataStatus::SinDatos
    } else {
        DataStatus::Disponible
    };

    let (total_kwh, total_cost, total_co2_kg) = if invoices.is_empty() {
        (None, None, None)
    } else {
        let co2 = tariff.estimate_carbon_footprint(activity.invoice_kwh, user.subsidy_tier)?;
        (
            Some(activity.invoice_kwh),
            Some(activity.invoice_cost),
            Some(co2),
        )
    };

    let appliance_breakdown = appliances
        .iter()
        .map(|appliance| ApplianceBreakdown {
            id: appliance.id,
            name: appliance.name.clone(),
            total_kwh: appliance.monthly_kwh(),
        })
        .collect();

    Ok(MetricsSummary {
        status,
        total_kwh,
        total_cost,
        total_co2_kg,
        points: user.points,
        activity,
        appliance_breakdown,
        featured_advice: featured_advice(advice),
        monthly_change_pct: monthly_change_pct(invoices),
        currency: tariff.currency().to_string(),
    })
}

/// Profile rollup with monthly averages over the registered invoices
pub fn aggregate_profile(
    tariff: &Tariff,
    user: &User,
    invoices: &[Invoice],
    appliances: &[Appliance],
) -> Result<ProfileMetrics, CalculationError> {
    let activity = activity_summary(tariff, user.subsidy_tier, invoices, appliances)?;

    let average_monthly_kwh = if invoices.is_empty() {
        None
    } else {
        Some(round2(activity.invoice_kwh / invoices.len() as f64))
    };
    let average_monthly_co2_kg = average_monthly_kwh
        .map(|kwh| tariff.estimate_carbon_footprint(kwh, user.subsidy_tier))
        .transpose()?;

    Ok(ProfileMetrics {
        id: user.id,
        email: user.email.clone(),
        name: user.name.clone(),
        location: user.location.clone(),
        subsidy_tier: user.subsidy_tier,
        points: user.points,
        activity,
        average_monthly_kwh,
        average_monthly_co2_kg,
        trees_equivalent: average_monthly_co2_kg.map(trees_equivalent),
    })
}
