// ==========================================
// Sponsorship MIS - API layer
// ==========================================
// Business entry points for the CLI
// ==========================================

pub mod error;
pub mod import_api;

pub use error::{ApiError, ApiResult};
pub use import_api::{
    ContactNormalizationResponse, ImportApi, ImportApiResponse, TableNormalization,
};
