// ==========================================
// Sponsorship MIS - API error types
// ==========================================
// Converts importer/repository errors into operator-facing
// messages. Row-level detail travels in the attached report.
// ==========================================

use crate::domain::access::AccessDenied;
use crate::domain::report::ImportReport;
use crate::importer::error::{ImportError, ImportFailure};
use crate::repository::error::RepositoryError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    // ===== Permissions =====
    #[error("access denied: {0}")]
    AccessDenied(#[from] AccessDenied),

    // ===== Input =====
    #[error("invalid input: {0}")]
    InvalidInput(String),

    // ===== Import =====
    /// Fatal import error; `report` holds the rows handled before it
    #[error("import failed ({kind}): {message}")]
    ImportFailed {
        kind: &'static str,
        message: String,
        report: Option<Box<ImportReport>>,
    },

    // ===== Data access =====
    #[error("database error: {0}")]
    DatabaseError(String),

    #[error("internal error: {0}")]
    InternalError(String),
}

impl ApiError {
    /// Partial report of a failed import, if any
    pub fn report(&self) -> Option<&ImportReport> {
        match self {
            ApiError::ImportFailed { report, .. } => report.as_deref(),
            _ => None,
        }
    }
}

impl From<ImportFailure> for ApiError {
    fn from(failure: ImportFailure) -> Self {
        ApiError::ImportFailed {
            kind: failure.error.kind(),
            message: failure.error.to_string(),
            report: Some(Box::new(failure.report)),
        }
    }
}

impl From<ImportError> for ApiError {
    fn from(err: ImportError) -> Self {
        match err {
            ImportError::Infrastructure(msg) => ApiError::DatabaseError(msg),
            other => ApiError::ImportFailed {
                kind: other.kind(),
                message: other.to_string(),
                report: None,
            },
        }
    }
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => {
                ApiError::InvalidInput(format!("{}(id={}) does not exist", entity, id))
            }
            RepositoryError::LockError(msg) => {
                ApiError::InternalError(format!("connection lock: {}", msg))
            }
            other => ApiError::DatabaseError(other.to_string()),
        }
    }
}

/// Result alias
pub type ApiResult<T> = Result<T, ApiError>;
