// ==========================================
// Sponsorship MIS - domain layer
// ==========================================
// Entities, value types and business rules.
// No database access and no pipeline logic here.
// ==========================================

pub mod access;
pub mod account;
pub mod child;
pub mod client;
pub mod entity;
pub mod import;
pub mod report;
pub mod sponsor;
pub mod types;

// Re-export core types
pub use access::{AccessDenied, Operator, Permission, Role};
pub use account::ChartOfAccount;
pub use child::Child;
pub use client::Client;
pub use entity::{DateMin, FieldKind, FieldSpec, ImportEntity, ReferenceTarget};
pub use import::{
    CellValue, ColumnValue, FieldError, FieldValue, ImportRow, KeyMatch, KeyPart, NaturalKey,
    RowError, ValidatedRecord, ValidationResult,
};
pub use report::{ImportCounts, ImportReport, RowAction, RowOutcome};
pub use sponsor::{Sponsor, SPONSOR_BY_EMAIL};
pub use types::{
    AccountType, Choice, EntityKind, Gender, Religion, SponsorshipType, UnknownChoice, YesNo,
};
