// ==========================================
// Sponsorship MIS - importer error types
// ==========================================
// Run-level (fatal) errors only. Row-scoped failures are
// `RowError` values recorded in the report.
// ==========================================

use crate::domain::report::ImportReport;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// Fatal import errors
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== Source file =====
    #[error("file not found: {0}")]
    FileNotFound(String),

    #[error("unsupported file format: {0} (expected .xlsx/.xls/.xlsm/.ods/.csv)")]
    UnsupportedFormat(String),

    #[error("could not read file: {0}")]
    FileReadError(String),

    #[error("not a readable spreadsheet: {0}")]
    MalformedSource(String),

    #[error("missing required columns: {}", .missing.join(", "))]
    SchemaMismatch { missing: Vec<String> },

    // ===== Store =====
    #[error("database unavailable, import aborted: {0}")]
    Infrastructure(String),

    // ===== Configuration =====
    #[error("invalid config value (key: {key}, value: {value}): {message}")]
    ConfigValueError {
        key: String,
        value: String,
        message: String,
    },

    // ===== Control =====
    #[error("import cancelled")]
    Cancelled,
}

impl ImportError {
    pub fn kind(&self) -> &'static str {
        match self {
            ImportError::FileNotFound(_) => "FileNotFound",
            ImportError::UnsupportedFormat(_) => "UnsupportedFormat",
            ImportError::FileReadError(_) => "FileReadError",
            ImportError::MalformedSource(_) => "MalformedSourceError",
            ImportError::SchemaMismatch { .. } => "SchemaMismatchError",
            ImportError::Infrastructure(_) => "InfrastructureError",
            ImportError::ConfigValueError { .. } => "ConfigValueError",
            ImportError::Cancelled => "Cancelled",
        }
    }
}

impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => ImportError::FileNotFound(err.to_string()),
            _ => ImportError::FileReadError(err.to_string()),
        }
    }
}

impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        ImportError::MalformedSource(err.to_string())
    }
}

impl From<calamine::Error> for ImportError {
    fn from(err: calamine::Error) -> Self {
        ImportError::MalformedSource(err.to_string())
    }
}

// Outside the row step every store error is infrastructure
impl From<RepositoryError> for ImportError {
    fn from(err: RepositoryError) -> Self {
        ImportError::Infrastructure(err.to_string())
    }
}

/// Result alias
pub type ImportResult<T> = Result<T, ImportError>;

/// Fatal error plus whatever the run managed to record before it
#[derive(Debug, Error)]
#[error("{error}")]
pub struct ImportFailure {
    pub error: ImportError,
    pub report: ImportReport,
}

impl ImportFailure {
    pub fn new(error: ImportError, report: ImportReport) -> Self {
        Self { error, report }
    }
}
