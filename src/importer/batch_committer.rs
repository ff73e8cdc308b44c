// ==========================================
// Sponsorship MIS - batch committer
// ==========================================
// One transaction per chunk, one savepoint per row.
// A constraint failure costs only its own row; an
// infrastructure failure ends the run.
// ==========================================

use crate::domain::import::RowError;
use crate::domain::report::RowOutcome;
use crate::repository::error::RepositoryError;
use crate::repository::import_repo::{ImportRepository, PendingWrite, WriteMode};
use tracing::{debug, error};

/// A reconciled row waiting for its chunk commit
#[derive(Debug, Clone)]
pub struct StagedWrite {
    pub sheet_row: usize,
    pub key: String,
    pub write: PendingWrite,
}

/// One row of a chunk: already terminal, or to be written
#[derive(Debug, Clone)]
pub enum ChunkEntry {
    Resolved(RowOutcome),
    Write(StagedWrite),
}

impl ChunkEntry {
    pub fn ordinal(&self) -> usize {
        match self {
            ChunkEntry::Resolved(outcome) => outcome.ordinal,
            ChunkEntry::Write(staged) => staged.write.ordinal,
        }
    }
}

#[derive(Debug)]
pub struct ChunkResult {
    pub outcomes: Vec<RowOutcome>, // same order as the chunk entries
    pub fatal: Option<RepositoryError>,
}

enum Slot {
    Done(RowOutcome),
    Pending {
        ordinal: usize,
        sheet_row: usize,
        key: String,
        mode: WriteMode,
    },
}

pub struct BatchCommitter;

impl BatchCommitter {
    pub async fn commit_chunk<R: ImportRepository + ?Sized>(
        &self,
        repo: &R,
        table: &str,
        entries: Vec<ChunkEntry>,
    ) -> ChunkResult {
        let mut slots = Vec::with_capacity(entries.len());
        let mut writes = Vec::new();
        for entry in entries {
            match entry {
                ChunkEntry::Resolved(outcome) => slots.push(Slot::Done(outcome)),
                ChunkEntry::Write(staged) => {
                    slots.push(Slot::Pending {
                        ordinal: staged.write.ordinal,
                        sheet_row: staged.sheet_row,
                        key: staged.key,
                        mode: staged.write.mode,
                    });
                    writes.push(staged.write);
                }
            }
        }

        if writes.is_empty() {
            let outcomes = slots
                .into_iter()
                .filter_map(|slot| match slot {
                    Slot::Done(outcome) => Some(outcome),
                    Slot::Pending { .. } => None,
                })
                .collect();
            return ChunkResult {
                outcomes,
                fatal: None,
            };
        }

        match repo.commit_chunk(table, &writes).await {
            Ok(results) => {
                let mut results = results.into_iter();
                let outcomes = finish_slots(slots, |ordinal, sheet_row, key, mode| {
                    let result = results.next().unwrap_or_else(|| {
                        Err(RepositoryError::DatabaseTransactionError(
                            "missing write result".to_string(),
                        ))
                    });
                    match (result, mode) {
                        (Ok(id), WriteMode::Insert) => RowOutcome::created(ordinal, sheet_row, id, key),
                        (Ok(id), WriteMode::Update(_)) => {
                            RowOutcome::updated(ordinal, sheet_row, id, key)
                        }
                        (Err(e), _) => {
                            debug!(ordinal, error = %e, "row not persisted");
                            RowOutcome::failed(
                                ordinal,
                                sheet_row,
                                Some(key),
                                RowError::Persistence {
                                    message: e.to_string(),
                                },
                            )
                        }
                    }
                });
                ChunkResult {
                    outcomes,
                    fatal: None,
                }
            }
            Err(e) => {
                error!(table, error = %e, "chunk commit failed");
                let message = e.to_string();
                ChunkResult {
                    outcomes: finish_slots(slots, |ordinal, sheet_row, key, _| {
                        infrastructure_failure(ordinal, sheet_row, Some(key), &message)
                    }),
                    fatal: Some(e),
                }
            }
        }
    }

    /// Terminal outcomes for a chunk that will never be committed
    pub fn abandon(&self, entries: Vec<ChunkEntry>, reason: &str) -> Vec<RowOutcome> {
        entries
            .into_iter()
            .map(|entry| match entry {
                ChunkEntry::Resolved(outcome) => outcome,
                ChunkEntry::Write(staged) => infrastructure_failure(
                    staged.write.ordinal,
                    staged.sheet_row,
                    Some(staged.key),
                    reason,
                ),
            })
            .collect()
    }
}

pub fn infrastructure_failure(
    ordinal: usize,
    sheet_row: usize,
    key: Option<String>,
    reason: &str,
) -> RowOutcome {
    RowOutcome::failed(
        ordinal,
        sheet_row,
        key,
        RowError::Infrastructure {
            message: reason.to_string(),
        },
    )
}

fn finish_slots<F>(slots: Vec<Slot>, mut pending: F) -> Vec<RowOutcome>
where
    F: FnMut(usize, usize, String, WriteMode) -> RowOutcome,
{
    slots
        .into_iter()
        .map(|slot| match slot {
            Slot::Done(outcome) => outcome,
            Slot::Pending {
                ordinal,
                sheet_row,
                key,
                mode,
            } => pending(ordinal, sheet_row, key, mode),
        })
        .collect()
}
