// ==========================================
// Mock config reader for integration tests
// ==========================================

use async_trait::async_trait;
use chrono::NaiveDate;
use sponsorship_import::config::import_config::{
    default_min_date, DEFAULT_CHUNK_SIZE, DEFAULT_HEADER_ROW, DEFAULT_MAX_ROWS,
};
use sponsorship_import::config::ImportConfigReader;
use sponsorship_import::importer::ImportResult;

#[derive(Debug, Clone)]
pub struct MockConfig {
    pub header_row: Option<usize>,
    pub chunk_size: usize,
    pub min_date: NaiveDate,
    pub max_rows: usize,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            header_row: DEFAULT_HEADER_ROW,
            chunk_size: DEFAULT_CHUNK_SIZE,
            min_date: default_min_date(),
            max_rows: DEFAULT_MAX_ROWS,
        }
    }
}

impl MockConfig {
    pub fn with_chunk_size(chunk_size: usize) -> Self {
        Self {
            chunk_size,
            ..Self::default()
        }
    }

    /// Sheets without a header row
    pub fn positional() -> Self {
        Self {
            header_row: None,
            ..Self::default()
        }
    }

    pub fn with_max_rows(max_rows: usize) -> Self {
        Self {
            max_rows,
            ..Self::default()
        }
    }
}

#[async_trait]
impl ImportConfigReader for MockConfig {
    async fn get_header_row(&self) -> ImportResult<Option<usize>> {
        Ok(self.header_row)
    }

    async fn get_chunk_size(&self) -> ImportResult<usize> {
        Ok(self.chunk_size)
    }

    async fn get_min_date(&self) -> ImportResult<NaiveDate> {
        Ok(self.min_date)
    }

    async fn get_max_rows(&self) -> ImportResult<usize> {
        Ok(self.max_rows)
    }
}
