// ==========================================
// Sponsorship MIS - bulk import library
// ==========================================
// Spreadsheet import and reconciliation for the sponsorship
// management tables (children, sponsors, clients, accounts).
// Storage: SQLite
// ==========================================

// Domain - entities, schemas, report
pub mod domain;

// Repository - data access
pub mod repository;

// Importer - parse, map, validate, reconcile, commit
pub mod importer;

// Configuration
pub mod config;

// Database setup (connection PRAGMAs, schema)
pub mod db;

// Logging
pub mod logging;

// API - entry points for the CLI
pub mod api;

// ==========================================
// Re-exports
// ==========================================

pub use api::{ApiError, ImportApi, ImportApiResponse};
pub use domain::{
    ChartOfAccount, Child, Client, EntityKind, ImportReport, Operator, Role, RowAction, Sponsor,
};
pub use importer::{BulkImporter, CancelFlag, ImportError, ImportFailure, SpreadsheetImporter};

// ==========================================
// Constants
// ==========================================

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub const APP_NAME: &str = "Sponsorship MIS";
