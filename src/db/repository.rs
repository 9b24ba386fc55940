//! Repository pattern abstractions for DevEvent
//!
//! This module defines the base repository trait and the error type shared
//! by every storage backend, including classification of constraint
//! violations so the query layer can translate them into domain errors.

use async_trait::async_trait;
use thiserror::Error;

/// Result type for repository operations
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Repository error types
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// Database connection error
    #[error("Database connection error: {0}")]
    Connection(String),

    /// Query execution error
    #[error("Query execution error: {0}")]
    QueryExecution(String),

    /// Entity not found
    #[error("Entity not found: {0}")]
    NotFound(String),

    /// Unique constraint violation, carrying the constraint name
    #[error("Conflict on constraint {0}")]
    Conflict(String),

    /// Foreign key violation, carrying the constraint name
    #[error("Missing referenced row for constraint {0}")]
    MissingReference(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl RepositoryError {
    /// Classify a driver error, turning constraint violations into
    /// [`RepositoryError::Conflict`] and [`RepositoryError::MissingReference`]
    pub fn from_sqlx(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            let constraint = db_err.constraint().unwrap_or("unknown").to_string();
            if db_err.is_unique_violation() {
                return RepositoryError::Conflict(constraint);
            }
            if db_err.is_foreign_key_violation() {
                return RepositoryError::MissingReference(constraint);
            }
        }
        RepositoryError::Database(err)
    }

    /// Check if this is a unique violation of the named constraint
    pub fn is_conflict_on(&self, constraint: &str) -> bool {
        matches!(self, RepositoryError::Conflict(name) if name == constraint)
    }

    /// Check if this is a foreign key violation of the named constraint
    pub fn is_missing_reference_on(&self, constraint: &str) -> bool {
        matches!(self, RepositoryError::MissingReference(name) if name == constraint)
    }

    /// Check if this is a not found error
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            RepositoryError::NotFound(_) | RepositoryError::Database(sqlx::Error::RowNotFound)
        )
    }
}

/// Convert repository errors to application errors
impl From<RepositoryError> for crate::error::Error {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound(msg) => crate::error::Error::NotFound(msg),
            _ => crate::error::Error::database(err.to_string()),
        }
    }
}

/// Base repository trait
#[async_trait]
pub trait Repository: Send + Sync {
    /// Health check for the repository
    async fn health_check(&self) -> RepositoryResult<()>;
}
