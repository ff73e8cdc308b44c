// ==========================================
// Sponsorship MIS - import layer
// ==========================================
// Spreadsheet (xlsx/xls/ods/csv) -> validated, reconciled rows
// -> chunked commits -> ImportReport
// ==========================================

pub mod batch_committer;
pub mod bulk_importer;
pub mod cancel;
pub mod data_cleaner;
pub mod error;
pub mod field_mapper;
pub mod file_parser;
pub mod importer_trait;
pub mod reconciler;
pub mod row_validator;

pub use batch_committer::{BatchCommitter, ChunkEntry, ChunkResult, StagedWrite};
pub use bulk_importer::BulkImporter;
pub use cancel::CancelFlag;
pub use data_cleaner::DataCleaner;
pub use error::{ImportError, ImportFailure, ImportResult};
pub use field_mapper::{ColumnMapping, FieldMapper};
pub use file_parser::{CsvParser, ExcelParser, SheetSource, SourceFormat, UniversalFileParser};
pub use reconciler::{ClaimedKeys, Reconciler, Reconciliation};
pub use row_validator::{ReferenceIndex, ReferenceLookup, SchemaValidator, ValidationContext};

pub use importer_trait::{FileParser, RowValidator, SpreadsheetImporter};
