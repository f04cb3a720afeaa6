use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use super::RepositoryError;
use crate::models::invoice::{Invoice, Month};

/// Trait defining invoice storage operations, scoped per user
#[async_trait]
pub trait InvoiceRepository: Send + Sync {
    async fn create(&self, invoice: Invoice) -> Result<Invoice, RepositoryError>;

    /// All invoices of a user, newest billing period first
    async fn find_by_user(&self, user_id: Uuid) -> Result<Vec<Invoice>, RepositoryError>;

    /// Delete an invoice; `NotFound` when it does not exist
    async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<(), RepositoryError>;
}

#[derive(sqlx::FromRow)]
struct InvoiceRow {
    id: Uuid,
    user_id: Uuid,
    month: i16,
    year: i32,
    consumption_kwh: f64,
    cost: Decimal,
    created_at: DateTime<Utc>,
}

impl TryFrom<InvoiceRow> for Invoice {
    type Error = RepositoryError;

    fn try_from(row: InvoiceRow) -> Result<Self, Self::Error> {
        let month = u8::try_from(row.month)
            .ok()
            .and_then(Month::from_number)
            .ok_or_else(|| {
                RepositoryError::DatabaseError(format!("Invalid invoice month {}", row.month))
            })?;

        Ok(Invoice {
            id: row.id,
            user_id: row.user_id,
            month,
            year: row.year,
            consumption_kwh: row.consumption_kwh,
            cost: row.cost,
            created_at: row.created_at,
        })
    }
}

const INVOICE_COLUMNS: &str = "id, user_id, month, year, consumption_kwh, cost, created_at";

/// PostgreSQL implementation of InvoiceRepository
pub struct PostgresInvoiceRepository {
    pool: PgPool,
}

impl PostgresInvoiceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl InvoiceRepository for PostgresInvoiceRepository {
    async fn create(&self, invoice: Invoice) -> Result<Invoice, RepositoryError> {
        let query = format!(
            r#"
            INSERT INTO invoices (id, user_id, month, year, consumption_kwh, cost, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {}
            "#,
            INVOICE_COLUMNS
        );

        sqlx::query_as::<_, InvoiceRow>(&query)
            .bind(invoice.id)
            .bind(invoice.user_id)
            .bind(i16::from(invoice.month.number()))
            .bind(invoice.year)
            .bind(invoice.consumption_kwh)
            .bind(invoice.cost)
            .bind(invoice.created_at)
            .fetch_one(&self.pool)
            .await?
            .try_into()
    }

    async fn find_by_user(&self, user_id: Uuid) -> Result<Vec<Invoice>, RepositoryError> {
        let query = format!(
            r#"
            SELECT {}
            FROM invoices
            WHERE user_id = $1
            ORDER BY year DESC, month DESC, created_at DESC
            "#,
            INVOICE_COLUMNS
        );

        sqlx::query_as::<_, InvoiceRow>(&query)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(Invoice::try_from)
            .collect()
    }

    async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM invoices WHERE user_id = $1 AND id = $2")
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
