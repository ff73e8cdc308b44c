// ==========================================
// Sponsorship MIS - import repository trait
// ==========================================
// Data access only: natural-key lookups, chunked writes,
// reference values and contact maintenance. No business rules.
// ==========================================

use crate::domain::entity::ReferenceTarget;
use crate::domain::import::{ColumnValue, NaturalKey};
use crate::repository::error::{RepositoryError, RepositoryResult};
use async_trait::async_trait;

/// Insert a new row or update an existing one by id
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    Insert,
    Update(i64),
}

/// One row write staged for a chunk commit
#[derive(Debug, Clone, PartialEq)]
pub struct PendingWrite {
    pub ordinal: usize,
    pub mode: WriteMode,
    pub columns: Vec<(&'static str, ColumnValue)>,
}

/// Stored contact columns of one record (None = NULL)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactRecord {
    pub id: i64,
    pub values: Vec<(String, Option<String>)>,
}

// ==========================================
// ImportRepository Trait
// ==========================================
// Implementor: ImportRepositoryImpl (rusqlite)
#[async_trait]
pub trait ImportRepository: Send + Sync {
    /// Ids of stored rows matching a natural key
    ///
    /// # Returns
    /// - empty: no match; one id: match; several: ambiguous key
    async fn find_ids_by_natural_key(
        &self,
        table: &str,
        key: &NaturalKey,
    ) -> RepositoryResult<Vec<i64>>;

    /// (id, value) pairs of a reference target
    async fn load_reference_values(
        &self,
        target: &ReferenceTarget,
    ) -> RepositoryResult<Vec<(i64, String)>>;

    /// Apply a chunk in one transaction, one savepoint per write
    ///
    /// # Returns
    /// - Ok(results): one entry per write, in order; row-scoped
    ///   failures are rolled back individually
    /// - Err: infrastructure failure, the whole chunk is rolled back
    async fn commit_chunk(
        &self,
        table: &str,
        writes: &[PendingWrite],
    ) -> RepositoryResult<Vec<Result<i64, RepositoryError>>>;

    async fn list_contacts(
        &self,
        table: &str,
        columns: &[&str],
    ) -> RepositoryResult<Vec<ContactRecord>>;

    /// Rewrite contact columns in one transaction; returns rows touched
    async fn update_contacts(
        &self,
        table: &str,
        updates: &[ContactRecord],
    ) -> RepositoryResult<usize>;

    async fn count_rows(&self, table: &str) -> RepositoryResult<usize>;
}
