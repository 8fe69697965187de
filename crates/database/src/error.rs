use core_types::CoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Failed to configure the database connection: {0}")]
    ConnectionConfigError(String),

    #[error("Database error: {0}")]
    QueryError(#[from] sqlx::Error),

    #[error("Database migration failed: {0}")]
    MigrationError(#[from] sqlx::migrate::MigrateError),

    #[error(transparent)]
    Validation(#[from] CoreError),

    #[error("No available copy found for title '{0}'.")]
    NoAvailableCopy(String),

    #[error("No active loan found for copy {0}.")]
    NoOpenLoan(i32),

    #[error("Copy {0} is not in the state its loan records require; nothing was changed.")]
    InconsistentCopy(i32),

    #[error("The requested {0} was not found in the database.")]
    NotFound(String),
}

impl DbError {
    /// True for the outcomes that mean "nothing matched", as opposed to a
    /// failing database.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            DbError::NoAvailableCopy(_) | DbError::NoOpenLoan(_) | DbError::NotFound(_)
        )
    }
}
