// ==========================================
// Sponsorship MIS - row validator
// ==========================================
// Type coercion + field rules per FieldSpec.
// Every failing field is reported; a bad row never stops the run.
// ==========================================

use crate::config::import_config::ImportConfig;
use crate::domain::entity::{FieldKind, FieldSpec, ReferenceTarget};
use crate::domain::import::{
    fold_case, CellValue, FieldError, FieldValue, ImportRow, ValidatedRecord,
    ValidationResult,
};
use crate::domain::types::match_choice;
use crate::importer::data_cleaner::DataCleaner;
use crate::importer::file_parser::excel_serial_to_date;
use crate::importer::importer_trait::RowValidator;
use chrono::{Datelike, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

static PERSON_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z]+(?: [A-Za-z]+)*$").expect("person name pattern"));

static EMAIL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9\-]+(?:\.[A-Za-z0-9\-]+)*\.[A-Za-z]{2,}$")
        .expect("email pattern")
});

const EMAIL_MAX_LEN: usize = 254;

// ==========================================
// ReferenceIndex - lookup values loaded once per run
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct ReferenceIndex {
    targets: HashMap<ReferenceTarget, HashMap<String, Vec<i64>>>,
}

/// Outcome of resolving one reference value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReferenceLookup {
    Found(i64),
    Missing,
    Ambiguous(usize),
}

impl ReferenceIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the (id, value) pairs of one target
    pub fn load(&mut self, target: ReferenceTarget, rows: Vec<(i64, String)>) {
        let entry = self.targets.entry(target).or_default();
        for (id, value) in rows {
            entry.entry(fold_case(&value)).or_default().push(id);
        }
    }

    pub fn resolve(&self, target: &ReferenceTarget, value: &str) -> ReferenceLookup {
        let ids = self
            .targets
            .get(target)
            .and_then(|values| values.get(&fold_case(value)));

        match ids.map(Vec::as_slice) {
            Some([id]) => ReferenceLookup::Found(*id),
            Some(ids) if ids.len() > 1 => ReferenceLookup::Ambiguous(ids.len()),
            _ => ReferenceLookup::Missing,
        }
    }
}

/// Per-run inputs the validator needs besides the row
pub struct ValidationContext<'a> {
    pub config: &'a ImportConfig,
    pub references: &'a ReferenceIndex,
}

// ==========================================
// SchemaValidator
// ==========================================
pub struct SchemaValidator {
    cleaner: DataCleaner,
}

impl SchemaValidator {
    pub fn new() -> Self {
        Self {
            cleaner: DataCleaner,
        }
    }

    fn coerce(
        &self,
        spec: &FieldSpec,
        cell: &CellValue,
        ctx: &ValidationContext<'_>,
    ) -> Result<FieldValue, String> {
        match spec.kind {
            FieldKind::Text { max_len } => {
                let value = cell_text(cell);
                check_length(&value, max_len)?;
                Ok(FieldValue::Text(value))
            }
            FieldKind::PersonName { max_len } => {
                let value = self.cleaner.collapse_whitespace(&cell_text(cell));
                if !PERSON_NAME.is_match(&value) {
                    return Err("only letters and spaces are allowed".to_string());
                }
                check_length(&value, Some(max_len))?;
                Ok(FieldValue::Text(value))
            }
            FieldKind::Integer { min, max } => {
                let value = parse_integer(cell)?;
                if value < min || value > max {
                    return Err(format!("must be between {} and {}", min, max));
                }
                Ok(FieldValue::Integer(value))
            }
            FieldKind::Year { min } => {
                let value = parse_integer(cell)?;
                let max = i64::from(ctx.config.run_date.year());
                if value < i64::from(min) || value > max {
                    return Err(format!("must be between {} and {}", min, max));
                }
                Ok(FieldValue::Integer(value))
            }
            FieldKind::Decimal { min, max } => {
                let value = parse_decimal(cell)?;
                if value < min || value > max {
                    return Err(format!("must be between {} and {}", min, max));
                }
                Ok(FieldValue::Decimal(value))
            }
            FieldKind::Date { min } => {
                let value = self.parse_date(cell)?;
                let lower = min.resolve(ctx.config.min_date);
                if value < lower {
                    return Err(format!("must be on or after {}", lower));
                }
                if value > ctx.config.run_date {
                    return Err(format!("must be on or before {}", ctx.config.run_date));
                }
                Ok(FieldValue::Date(value))
            }
            FieldKind::Bool => {
                let value = match cell {
                    CellValue::Bool(b) => Some(*b),
                    other => self.cleaner.parse_bool(&cell_text(other)),
                };
                value
                    .map(FieldValue::Bool)
                    .ok_or_else(|| "must be yes or no".to_string())
            }
            FieldKind::Phone => self
                .cleaner
                .normalize_phone(&cell_text(cell))
                .map(FieldValue::Text),
            FieldKind::Email => {
                let value = cell_text(cell);
                if value.len() > EMAIL_MAX_LEN || !EMAIL.is_match(&value) {
                    return Err("is not a valid e-mail address".to_string());
                }
                Ok(FieldValue::Text(value))
            }
            FieldKind::Digits { max_len } => {
                let value = cell_text(cell);
                if !value.chars().all(|c| c.is_ascii_digit()) {
                    return Err("must contain digits only".to_string());
                }
                check_length(&value, Some(max_len))?;
                Ok(FieldValue::Text(value))
            }
            FieldKind::Choice(choices) => {
                let value = cell_text(cell);
                match_choice(choices, &value)
                    .map(|canonical| FieldValue::Text(canonical.to_string()))
                    .ok_or_else(|| {
                        let allowed: Vec<&str> = choices.iter().map(|c| c.label).collect();
                        format!("'{}' is not one of: {}", value, allowed.join(", "))
                    })
            }
            FieldKind::Reference(target) => {
                let value = cell_text(cell);
                match ctx.references.resolve(&target, &value) {
                    ReferenceLookup::Found(id) => Ok(FieldValue::Reference(id)),
                    ReferenceLookup::Missing => {
                        Err(format!("no {} found for '{}'", target.label, value))
                    }
                    ReferenceLookup::Ambiguous(count) => Err(format!(
                        "'{}' matches {} {} records",
                        value, count, target.label
                    )),
                }
            }
        }
    }

    fn parse_date(&self, cell: &CellValue) -> Result<NaiveDate, String> {
        let parsed = match cell {
            CellValue::Date(d) => Some(*d),
            CellValue::Number(n) => excel_serial_to_date(*n),
            other => self.cleaner.parse_date(&cell_text(other)),
        };
        parsed.ok_or_else(|| format!("'{}' is not a valid date", cell))
    }
}

impl Default for SchemaValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl RowValidator for SchemaValidator {
    fn validate(
        &self,
        row: &ImportRow,
        schema: &[FieldSpec],
        ctx: &ValidationContext<'_>,
    ) -> ValidationResult {
        let mut record = ValidatedRecord::new(row.ordinal, row.sheet_row);
        let mut errors = Vec::new();

        for spec in schema {
            let cell = row.cell(spec.name);
            if cell.is_blank() {
                if spec.required {
                    errors.push(FieldError::new(spec.name, "is required"));
                } else {
                    record.insert(spec.name, FieldValue::Null);
                }
                continue;
            }

            match self.coerce(spec, cell, ctx) {
                Ok(value) => record.insert(spec.name, value),
                Err(reason) => errors.push(FieldError::new(spec.name, reason)),
            }
        }

        if errors.is_empty() {
            Ok(record)
        } else {
            Err(errors)
        }
    }
}

fn cell_text(cell: &CellValue) -> String {
    cell.as_text().unwrap_or_default()
}

fn check_length(value: &str, max_len: Option<usize>) -> Result<(), String> {
    match max_len {
        Some(max) if value.chars().count() > max => {
            Err(format!("must be at most {} characters", max))
        }
        _ => Ok(()),
    }
}

fn parse_integer(cell: &CellValue) -> Result<i64, String> {
    let invalid = || format!("'{}' is not a whole number", cell);
    match cell {
        CellValue::Number(n) if n.fract() == 0.0 => Ok(*n as i64),
        CellValue::Text(s) => {
            let trimmed = s.trim();
            trimmed
                .parse::<i64>()
                .ok()
                .or_else(|| {
                    trimmed
                        .parse::<f64>()
                        .ok()
                        .filter(|f| f.is_finite() && f.fract() == 0.0)
                        .map(|f| f as i64)
                })
                .ok_or_else(invalid)
        }
        _ => Err(invalid()),
    }
}

fn parse_decimal(cell: &CellValue) -> Result<f64, String> {
    let invalid = || format!("'{}' is not a number", cell);
    match cell {
        CellValue::Number(n) => Ok(*n),
        CellValue::Text(s) => s
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|f| f.is_finite())
            .ok_or_else(invalid),
        _ => Err(invalid()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::child::Child;
    use crate::domain::entity::ImportEntity;
    use crate::domain::sponsor::SPONSOR_BY_EMAIL;

    fn config() -> ImportConfig {
        ImportConfig::with_run_date(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap())
    }

    fn child_row(cells: &[(&'static str, &str)]) -> ImportRow {
        ImportRow {
            ordinal: 1,
            sheet_row: 2,
            cells: cells
                .iter()
                .map(|(k, v)| (*k, CellValue::Text(v.to_string())))
                .collect(),
        }
    }

    fn validate(row: &ImportRow, references: &ReferenceIndex) -> ValidationResult {
        let config = config();
        let ctx = ValidationContext {
            config: &config,
            references,
        };
        SchemaValidator::new().validate(row, Child::schema(), &ctx)
    }

    #[test]
    fn test_valid_child_row() {
        let row = child_row(&[
            ("full_name", " Alice   Nakato "),
            ("gender", "female"),
            ("date_of_birth", "2012-03-04"),
            ("year_enrolled", "2019"),
            ("guardian_contact", "0772 000 111"),
            ("is_child_in_school", "Yes"),
            ("religion", "catholic"),
        ]);

        let record = validate(&row, &ReferenceIndex::new()).unwrap();
        assert_eq!(record.text("full_name"), Some("Alice Nakato".to_string()));
        assert_eq!(record.text("gender"), Some("Female".to_string()));
        assert_eq!(record.text("guardian_contact"), Some("+0772000111".to_string()));
        assert_eq!(record.flag("is_child_in_school"), Some(true));
        assert_eq!(record.text("religion"), Some("Catholic".to_string()));
        assert_eq!(record.get("height"), &FieldValue::Null);
    }

    #[test]
    fn test_birth_date_before_min_is_range_error() {
        let row = child_row(&[
            ("full_name", "Alice Nakato"),
            ("gender", "Female"),
            ("date_of_birth", "1850-01-01"),
            ("year_enrolled", "2019"),
        ]);

        let errors = validate(&row, &ReferenceIndex::new()).unwrap_err();
        assert_eq!(
            errors,
            vec![FieldError::new(
                "date_of_birth",
                "must be on or after 1900-01-01"
            )]
        );
    }

    #[test]
    fn test_all_field_errors_are_collected() {
        let row = child_row(&[
            ("full_name", "Alice 2"),
            ("date_of_birth", "not a date"),
            ("height", "300"),
            ("year_enrolled", "2030"),
        ]);

        let errors = validate(&row, &ReferenceIndex::new()).unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(
            fields,
            vec!["full_name", "gender", "date_of_birth", "height", "year_enrolled"]
        );
    }

    #[test]
    fn test_sponsor_reference_lookup() {
        let mut references = ReferenceIndex::new();
        references.load(
            SPONSOR_BY_EMAIL,
            vec![
                (7, "jane@example.org".to_string()),
                (8, "dup@example.org".to_string()),
                (9, "DUP@example.org".to_string()),
            ],
        );

        let found = child_row(&[
            ("full_name", "Alice Nakato"),
            ("gender", "Female"),
            ("year_enrolled", "2019"),
            ("sponsor_id", "Jane@Example.org"),
        ]);
        let record = validate(&found, &references).unwrap();
        assert_eq!(record.reference("sponsor_id"), Some(7));

        let ambiguous = child_row(&[
            ("full_name", "Alice Nakato"),
            ("gender", "Female"),
            ("year_enrolled", "2019"),
            ("sponsor_id", "dup@example.org"),
        ]);
        let errors = validate(&ambiguous, &references).unwrap_err();
        assert_eq!(errors[0].reason, "'dup@example.org' matches 2 sponsor records");

        let missing = child_row(&[
            ("full_name", "Alice Nakato"),
            ("gender", "Female"),
            ("year_enrolled", "2019"),
            ("sponsor_id", "nobody@example.org"),
        ]);
        let errors = validate(&missing, &references).unwrap_err();
        assert_eq!(errors[0].reason, "no sponsor found for 'nobody@example.org'");
    }

    #[test]
    fn test_excel_number_cells_coerce() {
        let mut row = child_row(&[("full_name", "Alice Nakato"), ("gender", "Male")]);
        row.cells.insert("year_enrolled", CellValue::Number(2020.0));
        row.cells.insert("weight", CellValue::Number(32.5));
        row.cells
            .insert("date_of_birth", CellValue::Date(NaiveDate::from_ymd_opt(2015, 1, 9).unwrap()));

        let record = validate(&row, &ReferenceIndex::new()).unwrap();
        assert_eq!(record.integer("year_enrolled"), Some(2020));
        assert_eq!(record.decimal("weight"), Some(32.5));
        assert_eq!(record.date("date_of_birth"), NaiveDate::from_ymd_opt(2015, 1, 9));
    }
}
