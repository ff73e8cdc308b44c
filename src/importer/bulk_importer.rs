// ==========================================
// Sponsorship MIS - bulk importer
// ==========================================
// Flow: parse -> map -> validate -> reconcile -> commit (per chunk)
// Every data row ends with exactly one outcome in the report,
// including rows never reached after a fatal error.
// ==========================================

use crate::config::ImportConfigReader;
use crate::domain::entity::ImportEntity;
use crate::domain::import::{ImportRow, RowError};
use crate::domain::report::{ImportReport, RowOutcome};
use crate::importer::batch_committer::{
    infrastructure_failure, BatchCommitter, ChunkEntry, StagedWrite,
};
use crate::importer::cancel::CancelFlag;
use crate::importer::error::{ImportError, ImportFailure, ImportResult};
use crate::importer::field_mapper::FieldMapper;
use crate::importer::file_parser::{RowStream, SheetSource, UniversalFileParser};
use crate::importer::importer_trait::{FileParser, RowValidator, SpreadsheetImporter};
use crate::importer::reconciler::{ClaimedKeys, Reconciler, Reconciliation};
use crate::importer::row_validator::{ReferenceIndex, SchemaValidator, ValidationContext};
use crate::repository::error::RepositoryError;
use crate::repository::import_repo::{ImportRepository, PendingWrite, WriteMode};
use chrono::Local;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, error, info, instrument, warn};

// ==========================================
// BulkImporter
// ==========================================
pub struct BulkImporter<R, C>
where
    R: ImportRepository,
    C: ImportConfigReader,
{
    // data access
    repo: R,

    // settings
    config: C,

    // pipeline stages
    file_parser: Box<dyn FileParser>,
    field_mapper: FieldMapper,
    row_validator: Box<dyn RowValidator>,
    reconciler: Reconciler,
    committer: BatchCommitter,
}

impl<R, C> BulkImporter<R, C>
where
    R: ImportRepository,
    C: ImportConfigReader,
{
    pub fn new(
        repo: R,
        config: C,
        file_parser: Box<dyn FileParser>,
        row_validator: Box<dyn RowValidator>,
    ) -> Self {
        Self {
            repo,
            config,
            file_parser,
            field_mapper: FieldMapper,
            row_validator,
            reconciler: Reconciler,
            committer: BatchCommitter,
        }
    }

    /// Format sniffing parser + schema validator
    pub fn with_defaults(repo: R, config: C) -> Self {
        Self::new(
            repo,
            config,
            Box::new(UniversalFileParser),
            Box::new(SchemaValidator::new()),
        )
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    async fn run<E: ImportEntity>(
        &self,
        source: SheetSource,
        cancel: &CancelFlag,
        report: &mut ImportReport,
    ) -> ImportResult<()> {
        // === Settings ===
        let config = self
            .config
            .load_import_config(Local::now().date_naive())
            .await?;
        let chunk_size = config.chunk_size.max(1);
        debug!(?config, "import settings resolved");

        // === Parse + map headers ===
        let sheet = self.file_parser.open(source, config.header_row)?;
        let mapping = match &sheet.headers {
            Some(headers) => self.field_mapper.map_headers(headers, E::schema())?,
            None => self.field_mapper.map_positional(E::schema()),
        };
        debug!(columns = mapping.len(), "columns mapped");

        // === Reference lookups ===
        let references = self.load_references::<E>().await?;
        let ctx = ValidationContext {
            config: &config,
            references: &references,
        };

        let mut rows = sheet.rows;
        let mut claimed = ClaimedKeys::new();
        let mut rows_read = 0usize;
        let mut chunk = 0usize;
        let mut limit_reached = false;

        while !limit_reached {
            if cancel.is_cancelled() {
                warn!(chunk, rows_read, "import cancelled");
                return Err(ImportError::Cancelled);
            }

            // === Stage one chunk ===
            let mut entries = Vec::with_capacity(chunk_size);
            while entries.len() < chunk_size {
                let raw = match rows.next() {
                    None => break,
                    Some(Ok(raw)) => raw,
                    Some(Err(e)) => {
                        error!(error = %e, "source unreadable mid-stream");
                        report.extend(self.committer.abandon(entries, &e.to_string()));
                        return Err(e);
                    }
                };

                rows_read += 1;
                if rows_read > config.max_rows {
                    // one outcome for the first row past the limit; the rest is never read
                    warn!(limit = config.max_rows, ordinal = raw.ordinal, "row limit reached");
                    entries.push(ChunkEntry::Resolved(RowOutcome::failed(
                        raw.ordinal,
                        raw.sheet_row,
                        None,
                        RowError::RowLimitExceeded {
                            limit: config.max_rows,
                        },
                    )));
                    limit_reached = true;
                    break;
                }

                let row = self.field_mapper.map_row(raw, &mapping);
                match self.stage_row::<E>(&row, &ctx, &mut claimed).await {
                    Ok(entry) => entries.push(entry),
                    Err(e) => {
                        error!(ordinal = row.ordinal, error = %e, "lookup failed, aborting");
                        let reason = e.to_string();
                        report.extend(self.committer.abandon(entries, &reason));
                        report.record(infrastructure_failure(
                            row.ordinal,
                            row.sheet_row,
                            None,
                            &reason,
                        ));
                        drain_remaining(rows, &reason, report);
                        return Err(e.into());
                    }
                }
            }

            if entries.is_empty() {
                break;
            }

            // === Commit ===
            chunk += 1;
            let staged = entries.len();
            let result = self
                .committer
                .commit_chunk(&self.repo, E::TABLE, entries)
                .await;
            report.extend(result.outcomes);

            if let Some(fatal) = result.fatal {
                if !limit_reached {
                    drain_remaining(rows, &fatal.to_string(), report);
                }
                return Err(fatal.into());
            }
            debug!(chunk, rows = staged, "chunk committed");
        }

        Ok(())
    }

    /// Validate and reconcile one row
    ///
    /// Row-scoped problems become a resolved entry; only an
    /// infrastructure failure during the key lookup is returned as Err.
    async fn stage_row<E: ImportEntity>(
        &self,
        row: &ImportRow,
        ctx: &ValidationContext<'_>,
        claimed: &mut ClaimedKeys,
    ) -> Result<ChunkEntry, RepositoryError> {
        let (ordinal, sheet_row) = (row.ordinal, row.sheet_row);

        let record = match self.row_validator.validate(row, E::schema(), ctx) {
            Ok(record) => record,
            Err(errors) => {
                debug!(ordinal, errors = errors.len(), "row failed validation");
                return Ok(ChunkEntry::Resolved(RowOutcome::failed(
                    ordinal,
                    sheet_row,
                    None,
                    RowError::validation(errors),
                )));
            }
        };

        let entity = match E::from_record(&record) {
            Ok(entity) => entity,
            Err(err) => {
                return Ok(ChunkEntry::Resolved(RowOutcome::failed(
                    ordinal,
                    sheet_row,
                    None,
                    RowError::validation(vec![err]),
                )))
            }
        };

        let key = entity.natural_key();
        let rendered = key.to_string();
        let decision = match self
            .reconciler
            .reconcile(&self.repo, E::TABLE, &key, ordinal, claimed)
            .await
        {
            Ok(decision) => decision,
            Err(e) if e.is_row_scoped() => {
                return Ok(ChunkEntry::Resolved(RowOutcome::failed(
                    ordinal,
                    sheet_row,
                    Some(rendered),
                    RowError::Persistence {
                        message: e.to_string(),
                    },
                )))
            }
            Err(e) => return Err(e),
        };

        let mode = match decision {
            Reconciliation::Create => WriteMode::Insert,
            Reconciliation::Update { entity_id } => WriteMode::Update(entity_id),
            Reconciliation::Skip(err) => {
                debug!(ordinal, key = %rendered, "duplicate in this import");
                return Ok(ChunkEntry::Resolved(RowOutcome::skipped(
                    ordinal, sheet_row, rendered, err,
                )));
            }
            Reconciliation::Reject(err) => {
                warn!(ordinal, key = %rendered, "ambiguous natural key");
                return Ok(ChunkEntry::Resolved(RowOutcome::failed(
                    ordinal,
                    sheet_row,
                    Some(rendered),
                    err,
                )));
            }
        };

        Ok(ChunkEntry::Write(StagedWrite {
            sheet_row,
            key: rendered,
            write: PendingWrite {
                ordinal,
                mode,
                columns: entity.column_values(),
            },
        }))
    }

    async fn load_references<E: ImportEntity>(&self) -> ImportResult<ReferenceIndex> {
        let mut index = ReferenceIndex::new();
        for target in E::references() {
            let values = self.repo.load_reference_values(&target).await?;
            debug!(table = target.table, values = values.len(), "reference values loaded");
            index.load(target, values);
        }
        Ok(index)
    }
}

/// Mark every row not yet read as FAILED (run aborted)
fn drain_remaining(rows: RowStream, reason: &str, report: &mut ImportReport) {
    for raw in rows {
        match raw {
            Ok(raw) => report.record(infrastructure_failure(
                raw.ordinal,
                raw.sheet_row,
                None,
                reason,
            )),
            Err(_) => break,
        }
    }
}

#[async_trait::async_trait]
impl<R, C> SpreadsheetImporter for BulkImporter<R, C>
where
    R: ImportRepository,
    C: ImportConfigReader,
{
    #[instrument(skip(self, source, cancel), fields(entity = %E::KIND, file = %source.file_name, run_id))]
    async fn import_source<E: ImportEntity>(
        &self,
        source: SheetSource,
        cancel: &CancelFlag,
    ) -> Result<ImportReport, ImportFailure> {
        let started = Instant::now();
        let mut report = ImportReport::new(E::KIND, source.file_name.clone());
        tracing::Span::current().record("run_id", tracing::field::display(report.run_id));
        info!(bytes = source.bytes.len(), "import started");

        match self.run::<E>(source, cancel, &mut report).await {
            Ok(()) => {
                report.finish();
                let counts = report.counts();
                info!(
                    total = counts.total,
                    created = counts.created,
                    updated = counts.updated,
                    skipped = counts.skipped,
                    failed = counts.failed,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "import finished"
                );
                Ok(report)
            }
            Err(ImportError::Cancelled) => {
                report.mark_cancelled();
                warn!(rows = report.outcomes.len(), "import stopped by cancellation");
                Err(ImportFailure::new(ImportError::Cancelled, report))
            }
            Err(e) => {
                report.mark_aborted();
                error!(kind = e.kind(), error = %e, rows = report.outcomes.len(), "import aborted");
                Err(ImportFailure::new(e, report))
            }
        }
    }

    async fn import_file<E: ImportEntity, P: AsRef<Path> + Send>(
        &self,
        path: P,
        cancel: &CancelFlag,
    ) -> Result<ImportReport, ImportFailure> {
        let path = path.as_ref();
        match SheetSource::from_path(path) {
            Ok(source) => self.import_source::<E>(source, cancel).await,
            Err(e) => {
                let mut report = ImportReport::new(E::KIND, path.display().to_string());
                report.mark_aborted();
                error!(path = %path.display(), error = %e, "could not open source");
                Err(ImportFailure::new(e, report))
            }
        }
    }
}
