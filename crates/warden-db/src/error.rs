//! Database errors

use thiserror::Error;

/// Database errors
#[derive(Error, Debug)]
pub enum DbError {
    /// SQLx error (connection, I/O, protocol)
    #[error("database error: {0}")]
    Sqlx(sqlx::Error),

    /// Migration failed
    #[error("migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    /// Record not found
    #[error("record not found")]
    NotFound,

    /// Unique, foreign-key or check constraint rejected the write
    #[error("constraint violated: {0}")]
    ConstraintViolated(String),

    /// Stored value could not be mapped onto a domain type
    #[error("invalid stored value: {0}")]
    Decode(String),
}

impl DbError {
    /// Whether the error is a unique constraint on the given `table.column`
    pub fn is_unique_violation_on(&self, column: &str) -> bool {
        matches!(self, Self::ConstraintViolated(msg) if msg.contains("UNIQUE") && msg.contains(column))
    }
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(ref db_err) = err {
            if db_err.is_unique_violation()
                || db_err.is_foreign_key_violation()
                || db_err.is_check_violation()
            {
                return Self::ConstraintViolated(db_err.message().to_string());
            }
        }
        Self::Sqlx(err)
    }
}

/// Result alias for database operations
pub type DbResult<T> = Result<T, DbError>;
