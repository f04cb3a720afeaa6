pub mod advice_repository;
pub mod appliance_repository;
pub mod invoice_repository;
pub mod memory;
pub mod user_repository;

pub use advice_repository::{AdviceRepository, PostgresAdviceRepository};
pub use appliance_repository::{ApplianceRepository, PostgresApplianceRepository};
pub use invoice_repository::{InvoiceRepository, PostgresInvoiceRepository};
pub use memory::InMemoryStore;
pub use user_repository::{PostgresUserRepository, UserRepository};

/// Repository errors for storage operations
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("Resource not found")]
    NotFound,

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),
}

impl From<sqlx::Error> for RepositoryError {
    fn from(error: sqlx::Error) -> Self {
        match error {
            sqlx::Error::RowNotFound => RepositoryError::NotFound,
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                RepositoryError::ConstraintViolation(db_err.to_string())
            }
            e => RepositoryError::DatabaseError(e.to_string()),
        }
    }
}
