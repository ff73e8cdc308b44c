// ==========================================
// Sponsorship MIS - import API
// ==========================================
// Facade used by the CLI: permission check, entity dispatch,
// response shaping and contact maintenance.
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::config::ConfigManager;
use crate::db::open_sqlite_connection;
use crate::domain::access::{Operator, Permission};
use crate::domain::entity::ImportEntity;
use crate::domain::report::{ImportCounts, ImportReport};
use crate::domain::types::EntityKind;
use crate::domain::{ChartOfAccount, Child, Client, Sponsor};
use crate::importer::{BulkImporter, CancelFlag, DataCleaner, SheetSource, SpreadsheetImporter};
use crate::repository::{ContactRecord, ImportRepository, ImportRepositoryImpl};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::{info, instrument};
use uuid::Uuid;

/// Import response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportApiResponse {
    pub run_id: Uuid,
    pub entity: EntityKind,
    pub counts: ImportCounts,
    /// `Row N: ...` lines, in row order
    pub errors: Vec<String>,
    pub report: ImportReport,
}

impl From<ImportReport> for ImportApiResponse {
    fn from(report: ImportReport) -> Self {
        Self {
            run_id: report.run_id,
            entity: report.entity,
            counts: report.counts(),
            errors: report.error_lines(),
            report,
        }
    }
}

/// Records rewritten in one table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableNormalization {
    pub entity: EntityKind,
    pub table: String,
    pub records_updated: usize,
}

/// Contact normalization response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactNormalizationResponse {
    pub tables: Vec<TableNormalization>,
}

impl ContactNormalizationResponse {
    pub fn total_updated(&self) -> usize {
        self.tables.iter().map(|t| t.records_updated).sum()
    }
}

type Importer = BulkImporter<ImportRepositoryImpl, ConfigManager>;

/// Import API
pub struct ImportApi {
    db_path: String,
}

impl ImportApi {
    pub fn new(db_path: impl Into<String>) -> Self {
        Self {
            db_path: db_path.into(),
        }
    }

    /// Import an uploaded spreadsheet
    ///
    /// # Returns
    /// - Ok(ImportApiResponse): run finished; row failures are in the report
    /// - Err(ApiError::ImportFailed): fatal error, partial report attached
    #[instrument(skip(self, bytes, cancel), fields(user = %operator.username))]
    pub async fn import_spreadsheet(
        &self,
        operator: &Operator,
        entity: EntityKind,
        file_name: &str,
        bytes: Vec<u8>,
        cancel: &CancelFlag,
    ) -> ApiResult<ImportApiResponse> {
        operator.require(Permission::BulkImport)?;
        let source = SheetSource::from_bytes(file_name, bytes)?;
        self.run_import(entity, source, cancel).await
    }

    /// Import a spreadsheet from disk
    #[instrument(skip(self, cancel), fields(user = %operator.username))]
    pub async fn import_file(
        &self,
        operator: &Operator,
        entity: EntityKind,
        path: &Path,
        cancel: &CancelFlag,
    ) -> ApiResult<ImportApiResponse> {
        operator.require(Permission::BulkImport)?;
        let source = SheetSource::from_path(path)?;
        self.run_import(entity, source, cancel).await
    }

    /// Prefix `+` to stored phone numbers lacking it; idempotent
    #[instrument(skip(self), fields(user = %operator.username))]
    pub async fn normalize_contacts(
        &self,
        operator: &Operator,
    ) -> ApiResult<ContactNormalizationResponse> {
        operator.require(Permission::ContactMaintenance)?;
        let repo = ImportRepositoryImpl::from_connection(self.open()?);

        let targets = [
            (Child::KIND, Child::TABLE, Child::contact_columns()),
            (Sponsor::KIND, Sponsor::TABLE, Sponsor::contact_columns()),
            (Client::KIND, Client::TABLE, Client::contact_columns()),
            (
                ChartOfAccount::KIND,
                ChartOfAccount::TABLE,
                ChartOfAccount::contact_columns(),
            ),
        ];

        let mut tables = Vec::new();
        for (entity, table, columns) in targets {
            if columns.is_empty() {
                continue;
            }
            let records_updated = normalize_table(&repo, table, &columns).await?;
            info!(table, records_updated, "contacts normalized");
            tables.push(TableNormalization {
                entity,
                table: table.to_string(),
                records_updated,
            });
        }

        Ok(ContactNormalizationResponse { tables })
    }

    async fn run_import(
        &self,
        entity: EntityKind,
        source: SheetSource,
        cancel: &CancelFlag,
    ) -> ApiResult<ImportApiResponse> {
        let importer = self.create_importer()?;
        let report = match entity {
            EntityKind::Child => importer.import_source::<Child>(source, cancel).await?,
            EntityKind::Sponsor => importer.import_source::<Sponsor>(source, cancel).await?,
            EntityKind::Client => importer.import_source::<Client>(source, cancel).await?,
            EntityKind::ChartOfAccount => {
                importer
                    .import_source::<ChartOfAccount>(source, cancel)
                    .await?
            }
        };
        Ok(ImportApiResponse::from(report))
    }

    fn create_importer(&self) -> ApiResult<Importer> {
        let conn = self.open()?;
        let config = ConfigManager::from_connection(conn.clone())?;
        let repo = ImportRepositoryImpl::from_connection(conn);
        Ok(BulkImporter::with_defaults(repo, config))
    }

    fn open(&self) -> ApiResult<Arc<Mutex<Connection>>> {
        let conn = open_sqlite_connection(&self.db_path)
            .map_err(|e| ApiError::DatabaseError(format!("{}: {}", self.db_path, e)))?;
        Ok(Arc::new(Mutex::new(conn)))
    }
}

/// Rewrite the phone columns of one table; returns records touched
async fn normalize_table<R: ImportRepository>(
    repo: &R,
    table: &str,
    columns: &[&'static str],
) -> ApiResult<usize> {
    let cleaner = DataCleaner;
    let records = repo.list_contacts(table, columns).await?;

    let updates: Vec<ContactRecord> = records
        .into_iter()
        .filter_map(|record| {
            let values: Vec<(String, Option<String>)> = record
                .values
                .into_iter()
                .filter_map(|(column, value)| {
                    let rewritten = cleaner.ensure_plus_prefix(value.as_deref()?)?;
                    Some((column, Some(rewritten)))
                })
                .collect();
            (!values.is_empty()).then_some(ContactRecord {
                id: record.id,
                values,
            })
        })
        .collect();

    if updates.is_empty() {
        return Ok(0);
    }
    Ok(repo.update_contacts(table, &updates).await?)
}
