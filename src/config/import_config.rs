// ==========================================
// Sponsorship MIS - import run settings
// ==========================================
// Resolved once at the start of a run; immutable afterwards.
// ==========================================

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const DEFAULT_HEADER_ROW: Option<usize> = Some(0);
pub const DEFAULT_CHUNK_SIZE: usize = 50;
pub const DEFAULT_MAX_ROWS: usize = 10_000;
/// Largest accepted 0-based header row index
pub const MAX_HEADER_ROW: usize = 1_000_000;

pub fn default_min_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(1900, 1, 1).unwrap_or(NaiveDate::MIN)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportConfig {
    pub header_row: Option<usize>, // 0-based header row; None = positional
    pub chunk_size: usize,         // rows per transaction
    pub min_date: NaiveDate,       // earliest accepted date (birth dates)
    pub run_date: NaiveDate,       // latest accepted date / current year
    pub max_rows: usize,           // data rows accepted per run
}

impl ImportConfig {
    pub fn with_run_date(run_date: NaiveDate) -> Self {
        Self {
            header_row: DEFAULT_HEADER_ROW,
            chunk_size: DEFAULT_CHUNK_SIZE,
            min_date: default_min_date(),
            run_date,
            max_rows: DEFAULT_MAX_ROWS,
        }
    }
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self::with_run_date(chrono::Local::now().date_naive())
    }
}
