//! Repository error types.

use sea_orm::DbErr;
use spendflow_core::workflow::WorkflowError;
use spendflow_shared::AppError;
use thiserror::Error;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Row not found.
    #[error("{entity} {id} not found")]
    NotFound {
        /// Kind of row.
        entity: &'static str,
        /// Requested id.
        id: String,
    },

    /// A stored row could not be mapped to its domain type.
    #[error("Corrupt {entity} row: {reason}")]
    CorruptRow {
        /// Kind of row.
        entity: &'static str,
        /// What failed to map.
        reason: String,
    },

    /// Domain validation failure.
    #[error(transparent)]
    Workflow(#[from] WorkflowError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl RepositoryError {
    pub(crate) fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub(crate) fn corrupt(entity: &'static str, reason: impl ToString) -> Self {
        Self::CorruptRow {
            entity,
            reason: reason.to_string(),
        }
    }
}

impl From<RepositoryError> for WorkflowError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Workflow(inner) => inner,
            other => Self::Storage(other.to_string()),
        }
    }
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { .. } => Self::NotFound(err.to_string()),
            RepositoryError::Workflow(inner) => inner.into(),
            RepositoryError::CorruptRow { .. } | RepositoryError::Database(_) => {
                Self::Storage(err.to_string())
            }
        }
    }
}
