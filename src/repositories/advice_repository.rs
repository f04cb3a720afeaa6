use async_trait::async_trait;
use sqlx::PgPool;
use std::collections::HashSet;
use uuid::Uuid;

use super::RepositoryError;

/// Trait defining storage of completed advice items
#[async_trait]
pub trait AdviceRepository: Send + Sync {
    /// Ids of the advice items the user has completed
    async fn find_completed(&self, user_id: Uuid) -> Result<HashSet<String>, RepositoryError>;

    /// Record a completion and add `points` to the user in one step.
    ///
    /// Returns `false` without awarding anything when the item was already
    /// completed.
    async fn complete(
        &self,
        user_id: Uuid,
        advice_id: &str,
        points: u32,
    ) -> Result<bool, RepositoryError>;
}

/// PostgreSQL implementation of AdviceRepository
pub struct PostgresAdviceRepository {
    pool: PgPool,
}

impl PostgresAdviceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AdviceRepository for PostgresAdviceRepository {
    async fn find_completed(&self, user_id: Uuid) -> Result<HashSet<String>, RepositoryError> {
        let rows = sqlx::query_as::<_, (String,)>(
            "SELECT advice_id FROM completed_advice WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|(advice_id,)| advice_id).collect())
    }

    async fn complete(
        &self,
        user_id: Uuid,
        advice_id: &str,
        points: u32,
    ) -> Result<bool, RepositoryError> {
        let points = i32::try_from(points)
            .map_err(|_| RepositoryError::ConstraintViolation("points out of range".to_string()))?;

        let mut tx = self.pool.begin().await?;

        let inserted = sqlx::query(
            r#"
            INSERT INTO completed_advice (user_id, advice_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id, advice_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(advice_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if inserted == 0 {
            tx.rollback().await?;
            return Ok(false);
        }

        let updated = sqlx::query("UPDATE users SET points = points + $2 WHERE id = $1")
            .bind(user_id)
            .bind(points)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        if updated == 0 {
            tx.rollback().await?;
            return Err(RepositoryError::NotFound);
        }

        tx.commit().await?;
        Ok(true)
    }
}
