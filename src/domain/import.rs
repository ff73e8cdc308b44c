// ==========================================
// Sponsorship MIS - import pipeline values
// ==========================================
// Lifecycle: ImportRow (mapper) -> ValidationResult (validator)
// -> NaturalKey (reconciler) -> ColumnValue (committer)
// None of these outlive a single import run.
// ==========================================

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use thiserror::Error;

// ==========================================
// CellValue - raw spreadsheet cell
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CellValue {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    Date(NaiveDate),
}

impl CellValue {
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Cell rendered as trimmed text; `None` for blank cells
    pub fn as_text(&self) -> Option<String> {
        match self {
            CellValue::Empty => None,
            CellValue::Text(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(trimmed.to_string())
                }
            }
            CellValue::Number(n) => Some(format_number(*n)),
            CellValue::Bool(b) => Some(b.to_string()),
            CellValue::Date(d) => Some(d.format("%Y-%m-%d").to_string()),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.as_text() {
            Some(text) => write!(f, "{}", text),
            None => Ok(()),
        }
    }
}

/// Integral floats print without a fraction (phone numbers, years)
pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

static EMPTY_CELL: CellValue = CellValue::Empty;

// ==========================================
// ImportRow - one mapped data row
// ==========================================
#[derive(Debug, Clone)]
pub struct ImportRow {
    pub ordinal: usize,   // 1-based data row position, stable for the run
    pub sheet_row: usize, // 1-based row number as shown by the spreadsheet
    pub cells: HashMap<&'static str, CellValue>,
}

impl ImportRow {
    pub fn cell(&self, field: &str) -> &CellValue {
        self.cells.get(field).unwrap_or(&EMPTY_CELL)
    }

    pub fn is_blank(&self) -> bool {
        self.cells.values().all(CellValue::is_blank)
    }
}

// ==========================================
// FieldValue / ValidatedRecord - normalized row
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldValue {
    Null,
    Text(String),
    Integer(i64),
    Decimal(f64),
    Bool(bool),
    Date(NaiveDate),
    Reference(i64),
}

static NULL_FIELD: FieldValue = FieldValue::Null;

#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedRecord {
    pub ordinal: usize,
    pub sheet_row: usize,
    values: BTreeMap<&'static str, FieldValue>,
}

impl ValidatedRecord {
    pub fn new(ordinal: usize, sheet_row: usize) -> Self {
        Self {
            ordinal,
            sheet_row,
            values: BTreeMap::new(),
        }
    }

    pub fn insert(&mut self, field: &'static str, value: FieldValue) {
        self.values.insert(field, value);
    }

    pub fn get(&self, field: &str) -> &FieldValue {
        self.values.get(field).unwrap_or(&NULL_FIELD)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn text(&self, field: &str) -> Option<String> {
        match self.get(field) {
            FieldValue::Text(s) => Some(s.clone()),
            _ => None,
        }
    }

    pub fn integer(&self, field: &str) -> Option<i64> {
        match self.get(field) {
            FieldValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn decimal(&self, field: &str) -> Option<f64> {
        match self.get(field) {
            FieldValue::Decimal(d) => Some(*d),
            FieldValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn flag(&self, field: &str) -> Option<bool> {
        match self.get(field) {
            FieldValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn date(&self, field: &str) -> Option<NaiveDate> {
        match self.get(field) {
            FieldValue::Date(d) => Some(*d),
            _ => None,
        }
    }

    pub fn reference(&self, field: &str) -> Option<i64> {
        match self.get(field) {
            FieldValue::Reference(id) => Some(*id),
            _ => None,
        }
    }

    pub fn require_text(&self, field: &str) -> Result<String, FieldError> {
        self.text(field)
            .ok_or_else(|| FieldError::new(field, "is required"))
    }

    pub fn require_integer(&self, field: &str) -> Result<i64, FieldError> {
        self.integer(field)
            .ok_or_else(|| FieldError::new(field, "is required"))
    }
}

// ==========================================
// Row-scoped errors
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("{field}: {reason}")]
pub struct FieldError {
    pub field: String,
    pub reason: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Outcome of validating one row
pub type ValidationResult = Result<ValidatedRecord, Vec<FieldError>>;

fn join_field_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Errors that stay inside a single row's processing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RowError {
    #[error("{}", join_field_errors(.errors))]
    Validation { errors: Vec<FieldError> },

    #[error("duplicate in this import: {key} was already used by row {first_ordinal}")]
    DuplicateInBatch { key: String, first_ordinal: usize },

    #[error("ambiguous match: {count} existing records share {key}")]
    AmbiguousMatch { key: String, count: usize },

    #[error("could not be saved: {message}")]
    Persistence { message: String },

    #[error("not saved, import aborted: {message}")]
    Infrastructure { message: String },

    #[error("row limit of {limit} rows per import exceeded, this and later rows were not read")]
    RowLimitExceeded { limit: usize },
}

impl RowError {
    pub fn validation(errors: Vec<FieldError>) -> Self {
        RowError::Validation { errors }
    }

    /// Stable error category name for reports and logs
    pub fn kind(&self) -> &'static str {
        match self {
            RowError::Validation { .. } => "FieldValidationError",
            RowError::DuplicateInBatch { .. } => "DuplicateInBatchError",
            RowError::AmbiguousMatch { .. } => "AmbiguousMatchError",
            RowError::Persistence { .. } => "PersistenceError",
            RowError::Infrastructure { .. } => "InfrastructureError",
            RowError::RowLimitExceeded { .. } => "RowLimitExceededError",
        }
    }
}

// ==========================================
// NaturalKey - business identity of a row
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum KeyMatch {
    CaseInsensitive,
    Exact,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct KeyPart {
    pub column: &'static str,
    pub value: Option<String>, // already folded for CaseInsensitive parts
    pub matching: KeyMatch,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct NaturalKey {
    parts: Vec<KeyPart>,
}

impl NaturalKey {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn case_insensitive(mut self, column: &'static str, value: Option<&str>) -> Self {
        self.parts.push(KeyPart {
            column,
            value: value.map(fold_case),
            matching: KeyMatch::CaseInsensitive,
        });
        self
    }

    pub fn exact(mut self, column: &'static str, value: Option<String>) -> Self {
        self.parts.push(KeyPart {
            column,
            value: value.map(|v| v.trim().to_string()),
            matching: KeyMatch::Exact,
        });
        self
    }

    pub fn exact_date(self, column: &'static str, value: Option<NaiveDate>) -> Self {
        self.exact(column, value.map(|d| d.format("%Y-%m-%d").to_string()))
    }

    pub fn parts(&self) -> &[KeyPart] {
        &self.parts
    }
}

impl fmt::Display for NaturalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, part) in self.parts.iter().enumerate() {
            if idx > 0 {
                write!(f, ", ")?;
            }
            match &part.value {
                Some(v) => write!(f, "{}='{}'", part.column, v)?,
                None => write!(f, "{}=<empty>", part.column)?,
            }
        }
        Ok(())
    }
}

/// Case-insensitive key folding: trim, collapse inner whitespace, lowercase
pub fn fold_case(value: &str) -> String {
    value
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

// ==========================================
// ColumnValue - persisted column value
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnValue {
    Null,
    Text(String),
    Integer(i64),
    Real(f64),
    Date(NaiveDate),
    Bool(bool),
}

impl From<Option<String>> for ColumnValue {
    fn from(value: Option<String>) -> Self {
        value.map(ColumnValue::Text).unwrap_or(ColumnValue::Null)
    }
}

impl From<String> for ColumnValue {
    fn from(value: String) -> Self {
        ColumnValue::Text(value)
    }
}

impl From<Option<NaiveDate>> for ColumnValue {
    fn from(value: Option<NaiveDate>) -> Self {
        value.map(ColumnValue::Date).unwrap_or(ColumnValue::Null)
    }
}

impl From<Option<i64>> for ColumnValue {
    fn from(value: Option<i64>) -> Self {
        value.map(ColumnValue::Integer).unwrap_or(ColumnValue::Null)
    }
}

impl From<i64> for ColumnValue {
    fn from(value: i64) -> Self {
        ColumnValue::Integer(value)
    }
}

impl From<Option<f64>> for ColumnValue {
    fn from(value: Option<f64>) -> Self {
        value.map(ColumnValue::Real).unwrap_or(ColumnValue::Null)
    }
}

impl From<bool> for ColumnValue {
    fn from(value: bool) -> Self {
        ColumnValue::Bool(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_as_text_integral_number() {
        assert_eq!(
            CellValue::Number(256772000111.0).as_text(),
            Some("256772000111".to_string())
        );
        assert_eq!(CellValue::Number(12.5).as_text(), Some("12.5".to_string()));
        assert_eq!(CellValue::Text("   ".to_string()).as_text(), None);
    }

    #[test]
    fn test_natural_key_folds_case_and_whitespace() {
        let a = NaturalKey::new()
            .case_insensitive("full_name", Some("  Alice   NAKATO "))
            .exact_date("date_of_birth", NaiveDate::from_ymd_opt(2012, 3, 4));
        let b = NaturalKey::new()
            .case_insensitive("full_name", Some("alice nakato"))
            .exact_date("date_of_birth", NaiveDate::from_ymd_opt(2012, 3, 4));

        assert_eq!(a, b);
        assert_eq!(
            a.to_string(),
            "full_name='alice nakato', date_of_birth='2012-03-04'"
        );
    }

    #[test]
    fn test_natural_key_exact_part_keeps_case() {
        let a = NaturalKey::new().exact("reg_number", Some("G01-001".to_string()));
        let b = NaturalKey::new().exact("reg_number", Some("g01-001".to_string()));
        assert_ne!(a, b);
    }

    #[test]
    fn test_row_error_display_joins_field_errors() {
        let err = RowError::validation(vec![
            FieldError::new("gender", "is required"),
            FieldError::new("date_of_birth", "must be on or after 1900-01-01"),
        ]);
        assert_eq!(
            err.to_string(),
            "gender: is required; date_of_birth: must be on or after 1900-01-01"
        );
        assert_eq!(err.kind(), "FieldValidationError");
    }
}
