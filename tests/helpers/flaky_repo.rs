// ==========================================
// Repository wrapper that breaks on demand
// ==========================================
// Delegates to the real SQLite repository; chunk commits past
// `fail_after` fail with a locked database. Optionally raises
// a cancel flag once a chunk has been committed.
// ==========================================

use async_trait::async_trait;
use sponsorship_import::domain::{NaturalKey, ReferenceTarget};
use sponsorship_import::importer::CancelFlag;
use sponsorship_import::repository::{
    ContactRecord, ImportRepository, ImportRepositoryImpl, PendingWrite, RepositoryError,
    RepositoryResult,
};
use std::sync::atomic::{AtomicUsize, Ordering};

pub struct FlakyRepo {
    inner: ImportRepositoryImpl,
    fail_after: Option<usize>,
    cancel_after_commit: Option<CancelFlag>,
    commits: AtomicUsize,
}

impl FlakyRepo {
    /// Commits 1..=n succeed, every later one fails
    pub fn failing_after(inner: ImportRepositoryImpl, n: usize) -> Self {
        Self {
            inner,
            fail_after: Some(n),
            cancel_after_commit: None,
            commits: AtomicUsize::new(0),
        }
    }

    /// Raises `flag` after the first successful commit
    pub fn cancelling(inner: ImportRepositoryImpl, flag: CancelFlag) -> Self {
        Self {
            inner,
            fail_after: None,
            cancel_after_commit: Some(flag),
            commits: AtomicUsize::new(0),
        }
    }

    pub fn commit_calls(&self) -> usize {
        self.commits.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ImportRepository for FlakyRepo {
    async fn find_ids_by_natural_key(
        &self,
        table: &str,
        key: &NaturalKey,
    ) -> RepositoryResult<Vec<i64>> {
        self.inner.find_ids_by_natural_key(table, key).await
    }

    async fn load_reference_values(
        &self,
        target: &ReferenceTarget,
    ) -> RepositoryResult<Vec<(i64, String)>> {
        self.inner.load_reference_values(target).await
    }

    async fn commit_chunk(
        &self,
        table: &str,
        writes: &[PendingWrite],
    ) -> RepositoryResult<Vec<Result<i64, RepositoryError>>> {
        let call = self.commits.fetch_add(1, Ordering::SeqCst) + 1;
        if matches!(self.fail_after, Some(n) if call > n) {
            return Err(RepositoryError::DatabaseLocked(
                "database is locked".to_string(),
            ));
        }

        let results = self.inner.commit_chunk(table, writes).await?;
        if let Some(flag) = &self.cancel_after_commit {
            flag.cancel();
        }
        Ok(results)
    }

    async fn list_contacts(
        &self,
        table: &str,
        columns: &[&str],
    ) -> RepositoryResult<Vec<ContactRecord>> {
        self.inner.list_contacts(table, columns).await
    }

    async fn update_contacts(
        &self,
        table: &str,
        updates: &[ContactRecord],
    ) -> RepositoryResult<usize> {
        self.inner.update_contacts(table, updates).await
    }

    async fn count_rows(&self, table: &str) -> RepositoryResult<usize> {
        self.inner.count_rows(table).await
    }
}
