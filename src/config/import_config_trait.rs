// ==========================================
// Sponsorship MIS - import config reader
// ==========================================
// Read-only view of the settings the importer needs.
// Writing and validation of stored values live elsewhere.
// ==========================================

use crate::config::import_config::ImportConfig;
use crate::importer::error::ImportResult;
use async_trait::async_trait;
use chrono::NaiveDate;

// ==========================================
// ImportConfigReader Trait
// ==========================================
// Implementors: ConfigManager (config_kv table), MockConfig (tests)
#[async_trait]
pub trait ImportConfigReader: Send + Sync {
    /// 0-based header row, `None` for positional sheets
    ///
    /// # Default
    /// - Some(0)
    async fn get_header_row(&self) -> ImportResult<Option<usize>>;

    /// Rows per commit transaction
    ///
    /// # Default
    /// - 50
    async fn get_chunk_size(&self) -> ImportResult<usize>;

    /// Earliest accepted date for fields bounded by configuration
    ///
    /// # Default
    /// - 1900-01-01
    async fn get_min_date(&self) -> ImportResult<NaiveDate>;

    /// Upper bound on data rows per run
    ///
    /// # Default
    /// - 10 000
    async fn get_max_rows(&self) -> ImportResult<usize>;

    /// Resolve every setting for one run
    async fn load_import_config(&self, run_date: NaiveDate) -> ImportResult<ImportConfig> {
        Ok(ImportConfig {
            header_row: self.get_header_row().await?,
            chunk_size: self.get_chunk_size().await?,
            min_date: self.get_min_date().await?,
            run_date,
            max_rows: self.get_max_rows().await?,
        })
    }
}
