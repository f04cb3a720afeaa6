use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::RepositoryError;
use crate::models::appliance::{Appliance, EfficiencyLabel};

/// Trait defining appliance inventory operations, scoped per user
#[async_trait]
pub trait ApplianceRepository: Send + Sync {
    async fn create(&self, appliance: Appliance) -> Result<Appliance, RepositoryError>;

    /// All appliances of a user in insertion order
    async fn find_by_user(&self, user_id: Uuid) -> Result<Vec<Appliance>, RepositoryError>;

    async fn find_by_id(
        &self,
        user_id: Uuid,
        id: Uuid,
    ) -> Result<Option<Appliance>, RepositoryError>;

    /// Replace a stored appliance; `NotFound` when it does not exist
    async fn update(&self, appliance: Appliance) -> Result<Appliance, RepositoryError>;

    /// Delete an appliance; `NotFound` when it does not exist
    async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<(), RepositoryError>;
}

#[derive(sqlx::FromRow)]
struct ApplianceRow {
    id: Uuid,
    user_id: Uuid,
    name: String,
    quantity: i32,
    power_watts: f64,
    efficiency: String,
    hours_per_day: f64,
    days_per_month: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ApplianceRow> for Appliance {
    type Error = RepositoryError;

    fn try_from(row: ApplianceRow) -> Result<Self, Self::Error> {
        let quantity = u32::try_from(row.quantity).map_err(|_| {
            RepositoryError::DatabaseError(format!("Invalid appliance quantity {}", row.quantity))
        })?;
        let days_per_month = u32::try_from(row.days_per_month).map_err(|_| {
            RepositoryError::DatabaseError(format!(
                "Invalid appliance days per month {}",
                row.days_per_month
            ))
        })?;
        let efficiency = EfficiencyLabel::parse(&row.efficiency).ok_or_else(|| {
            RepositoryError::DatabaseError(format!(
                "Invalid efficiency label {:?}",
                row.efficiency
            ))
        })?;

        Ok(Appliance {
            id: row.id,
            user_id: row.user_id,
            name: row.name,
            quantity,
            power_watts: row.power_watts,
            efficiency,
            hours_per_day: row.hours_per_day,
            days_per_month,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn to_db_int(value: u32) -> Result<i32, RepositoryError> {
    i32::try_from(value)
        .map_err(|_| RepositoryError::ConstraintViolation(format!("{} is out of range", value)))
}

const APPLIANCE_COLUMNS: &str = "id, user_id, name, quantity, power_watts, efficiency, \
     hours_per_day, days_per_month, created_at, updated_at";

/// PostgreSQL implementation of ApplianceRepository
pub struct PostgresApplianceRepository {
    pool: PgPool,
}

impl PostgresApplianceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ApplianceRepository for PostgresApplianceRepository {
    async fn create(&self, appliance: Appliance) -> Result<Appliance, RepositoryError> {
        let query = format!(
            r#"
            INSERT INTO appliances (
                id, user_id, name, quantity, power_watts, efficiency,
                hours_per_day, days_per_month, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {}
            "#,
            APPLIANCE_COLUMNS
        );

        let row = sqlx::query_as::<_, ApplianceRow>(&query)
            .bind(appliance.id)
            .bind(appliance.user_id)
            .bind(&appliance.name)
            .bind(to_db_int(appliance.quantity)?)
            .bind(appliance.power_watts)
            .bind(appliance.efficiency.as_str())
            .bind(appliance.hours_per_day)
            .bind(to_db_int(appliance.days_per_month)?)
            .bind(appliance.created_at)
            .bind(appliance.updated_at)
            .fetch_one(&self.pool)
            .await?;

        Appliance::try_from(row)
    }

    async fn find_by_user(&self, user_id: Uuid) -> Result<Vec<Appliance>, RepositoryError> {
        let query = format!(
            "SELECT {} FROM appliances WHERE user_id = $1 ORDER BY created_at, id",
            APPLIANCE_COLUMNS
        );

        let rows = sqlx::query_as::<_, ApplianceRow>(&query)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(Appliance::try_from).collect()
    }

    async fn find_by_id(
        &self,
        user_id: Uuid,
        id: Uuid,
    ) -> Result<Option<Appliance>, RepositoryError> {
        let query = format!(
            "SELECT {} FROM appliances WHERE user_id = $1 AND id = $2",
            APPLIANCE_COLUMNS
        );

        let row = sqlx::query_as::<_, ApplianceRow>(&query)
            .bind(user_id)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Appliance::try_from).transpose()
    }

    async fn update(&self, appliance: Appliance) -> Result<Appliance, RepositoryError> {
        let query = format!(
            r#"
            UPDATE appliances
            SET name = $3,
                quantity = $4,
                power_watts = $5,
                efficiency = $6,
                hours_per_day = $7,
                days_per_month = $8,
                updated_at = $9
            WHERE user_id = $1 AND id = $2
            RETURNING {}
            "#,
            APPLIANCE_COLUMNS
        );

        let row = sqlx::query_as::<_, ApplianceRow>(&query)
            .bind(appliance.user_id)
            .bind(appliance.id)
            .bind(&appliance.name)
            .bind(to_db_int(appliance.quantity)?)
            .bind(appliance.power_watts)
            .bind(appliance.efficiency.as_str())
            .bind(appliance.hours_per_day)
            .bind(to_db_int(appliance.days_per_month)?)
            .bind(appliance.updated_at)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)?;

        Appliance::try_from(row)
    }

    async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM appliances WHERE user_id = $1 AND id = $2")
            .bind(user_id)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> ApplianceRow {
        ApplianceRow {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            name: "Heladera".to_string(),
            quantity: 1,
            power_watts: 150.0,
            efficiency: "A+".to_string(),
            hours_per_day: 24.0,
            days_per_month: 30,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_row_converts_to_appliance() {
        let appliance = Appliance::try_from(row()).unwrap();
        assert_eq!(appliance.quantity, 1);
        assert_eq!(appliance.efficiency, EfficiencyLabel::APlus);
    }

    #[test]
    fn test_row_with_negative_quantity_is_rejected() {
        let mut bad = row();
        bad.quantity = -1;
        assert!(matches!(
            Appliance::try_from(bad),
            Err(RepositoryError::DatabaseError(_))
        ));
    }

    #[test]
    fn test_row_with_negative_days_is_rejected() {
        let mut bad = row();
        bad.days_per_month = -30;
        assert!(matches!(
            Appliance::try_from(bad),
            Err(RepositoryError::DatabaseError(_))
        ));
    }

    #[test]
    fn test_row_with_unknown_efficiency_is_rejected() {
        let mut bad = row();
        bad.efficiency = "Z".to_string();
        assert!(matches!(
            Appliance::try_from(bad),
            Err(RepositoryError::DatabaseError(_))
        ));
    }
}
