// ==========================================
// Sponsorship MIS - repository layer
// ==========================================
// Data access only; no business rules.
// ==========================================

pub mod error;
pub mod import_repo;
pub mod import_repo_impl;

pub use error::{RepositoryError, RepositoryResult};
pub use import_repo::{ContactRecord, ImportRepository, PendingWrite, WriteMode};
pub use import_repo_impl::ImportRepositoryImpl;
