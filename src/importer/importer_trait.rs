// ==========================================
// Sponsorship MIS - importer interfaces
// ==========================================
// Pipeline: FileParser -> FieldMapper -> RowValidator
// -> Reconciler -> BatchCommitter -> ImportReport
// ==========================================

use crate::domain::entity::{FieldSpec, ImportEntity};
use crate::domain::import::{ImportRow, ValidationResult};
use crate::domain::report::ImportReport;
use crate::importer::cancel::CancelFlag;
use crate::importer::error::{ImportFailure, ImportResult};
use crate::importer::file_parser::{ParsedSheet, SheetSource};
use crate::importer::row_validator::ValidationContext;
use async_trait::async_trait;
use std::path::Path;

// ==========================================
// SpreadsheetImporter Trait
// ==========================================
// Implementor: BulkImporter
#[async_trait]
pub trait SpreadsheetImporter: Send + Sync {
    /// Import an uploaded spreadsheet into the table of `E`
    ///
    /// # Returns
    /// - Ok(ImportReport): every data row has exactly one outcome
    /// - Err(ImportFailure): fatal error plus the partial report
    async fn import_source<E: ImportEntity>(
        &self,
        source: SheetSource,
        cancel: &CancelFlag,
    ) -> Result<ImportReport, ImportFailure>;

    /// Read a spreadsheet from disk and import it
    async fn import_file<E: ImportEntity, P: AsRef<Path> + Send>(
        &self,
        path: P,
        cancel: &CancelFlag,
    ) -> Result<ImportReport, ImportFailure>;
}

// ==========================================
// FileParser Trait
// ==========================================
// Implementors: ExcelParser, CsvParser, UniversalFileParser
pub trait FileParser: Send + Sync {
    /// Open a source for one forward pass
    ///
    /// `header_row` is the 0-based sheet row holding column labels;
    /// `None` means the sheet has no header and data starts on row 0.
    fn open(&self, source: SheetSource, header_row: Option<usize>) -> ImportResult<ParsedSheet>;
}

// ==========================================
// RowValidator Trait
// ==========================================
// Implementor: SchemaValidator
pub trait RowValidator: Send + Sync {
    /// Coerce and check every declared field, collecting all field errors
    fn validate(
        &self,
        row: &ImportRow,
        schema: &[FieldSpec],
        ctx: &ValidationContext<'_>,
    ) -> ValidationResult;
}
