use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::RepositoryError;
use crate::models::user::{CreateUserRequest, SubsidyTier, User, UserChanges};

/// Trait defining user repository operations
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Create a new user
    async fn create(
        &self,
        user: CreateUserRequest,
        password_hash: String,
    ) -> Result<User, RepositoryError>;

    /// Find a user by email
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError>;

    /// Find a user by ID
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepositoryError>;

    /// Apply profile changes; fields left as `None` are kept
    async fn update(&self, id: Uuid, changes: UserChanges) -> Result<User, RepositoryError>;
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    email: String,
    password_hash: String,
    name: String,
    location: String,
    subsidy_tier: String,
    points: i32,
    created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let subsidy_tier = SubsidyTier::parse(&row.subsidy_tier).ok_or_else(|| {
            RepositoryError::DatabaseError(format!("Unknown subsidy tier '{}'", row.subsidy_tier))
        })?;

        Ok(User {
            id: row.id,
            email: row.email,
            password_hash: row.password_hash,
            name: row.name,
            location: row.location,
            subsidy_tier,
            points: u32::try_from(row.points).unwrap_or_default(),
            created_at: row.created_at,
        })
    }
}

const USER_COLUMNS: &str =
    "id, email, password_hash, name, location, subsidy_tier, points, created_at";

/// PostgreSQL implementation of UserRepository
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn create(
        &self,
        user: CreateUserRequest,
        password_hash: String,
    ) -> Result<User, RepositoryError> {
        let query = format!(
            r#"
            INSERT INTO users (id, email, password_hash, name, location, subsidy_tier)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            USER_COLUMNS
        );

        let result = sqlx::query_as::<_, UserRow>(&query)
            .bind(Uuid::new_v4())
            .bind(&user.email)
            .bind(password_hash)
            .bind(&user.name)
            .bind(&user.location)
            .bind(user.subsidy_tier.as_str())
            .fetch_one(&self.pool)
            .await;

        match result {
            Ok(row) => row.try_into(),
            Err(sqlx::Error::Database(db_err)) => {
                // Unique constraint on email
                if db_err.is_unique_violation() {
                    Err(RepositoryError::ConstraintViolation(
                        "Email already exists".to_string(),
                    ))
                } else {
                    Err(RepositoryError::DatabaseError(db_err.to_string()))
                }
            }
            Err(e) => Err(RepositoryError::DatabaseError(e.to_string())),
        }
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        let query = format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS);

        sqlx::query_as::<_, UserRow>(&query)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?
            .map(User::try_from)
            .transpose()
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepositoryError> {
        let query = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);

        sqlx::query_as::<_, UserRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(User::try_from)
            .transpose()
    }

    async fn update(&self, id: Uuid, changes: UserChanges) -> Result<User, RepositoryError> {
        let query = format!(
            r#"
            UPDATE users
            SET name = COALESCE($2, name),
                location = COALESCE($3, location),
                subsidy_tier = COALESCE($4, subsidy_tier),
                password_hash = COALESCE($5, password_hash)
            WHERE id = $1
            RETURNING {}
            "#,
            USER_COLUMNS
        );

        sqlx::query_as::<_, UserRow>(&query)
            .bind(id)
            .bind(changes.name)
            .bind(changes.location)
            .bind(changes.subsidy_tier.map(|tier| tier.as_str()))
            .bind(changes.password_hash)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)?
            .try_into()
    }
}
