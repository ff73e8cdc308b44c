// ==========================================
// Sponsorship MIS - header to field mapping
// ==========================================
// Source column -> schema field. Extra columns are ignored;
// missing required columns fail the whole run.
// ==========================================

use crate::domain::entity::FieldSpec;
use crate::domain::import::{CellValue, ImportRow};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::file_parser::RawRow;
use std::collections::HashMap;

/// Schema field name -> 0-based column index
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnMapping {
    columns: Vec<(&'static str, usize)>,
}

impl ColumnMapping {
    pub fn column_of(&self, field: &str) -> Option<usize> {
        self.columns
            .iter()
            .find(|(name, _)| *name == field)
            .map(|(_, idx)| *idx)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Header comparison form: trimmed, BOM-free, lowercase, `_` as space, single spaces
pub fn normalize_header(raw: &str) -> String {
    raw.trim_start_matches('\u{feff}')
        .replace('_', " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

pub struct FieldMapper;

impl FieldMapper {
    /// Bind schema fields to header columns
    ///
    /// # Errors
    /// - `SchemaMismatch` listing every missing required header
    pub fn map_headers(&self, headers: &[String], schema: &[FieldSpec]) -> ImportResult<ColumnMapping> {
        // First occurrence of a duplicated header wins
        let mut index: HashMap<String, usize> = HashMap::new();
        for (idx, header) in headers.iter().enumerate() {
            let key = normalize_header(header);
            if key.is_empty() {
                continue;
            }
            index.entry(key).or_insert(idx);
        }

        let mut mapping = ColumnMapping::default();
        let mut missing = Vec::new();

        for spec in schema {
            let found = spec
                .labels()
                .chain(std::iter::once(spec.name))
                .find_map(|label| index.get(&normalize_header(label)).copied());

            match found {
                Some(idx) => mapping.columns.push((spec.name, idx)),
                None if spec.required => missing.push(spec.header.to_string()),
                None => {}
            }
        }

        if !missing.is_empty() {
            return Err(ImportError::SchemaMismatch { missing });
        }
        Ok(mapping)
    }

    /// Bind schema fields by position (sheets without a header row)
    pub fn map_positional(&self, schema: &[FieldSpec]) -> ColumnMapping {
        ColumnMapping {
            columns: schema
                .iter()
                .enumerate()
                .map(|(idx, spec)| (spec.name, idx))
                .collect(),
        }
    }

    pub fn map_row(&self, raw: RawRow, mapping: &ColumnMapping) -> ImportRow {
        let mut cells = raw.cells;
        let mapped = mapping
            .columns
            .iter()
            .map(|(field, idx)| {
                let value = cells
                    .get_mut(*idx)
                    .map(|cell| std::mem::replace(cell, CellValue::Empty))
                    .unwrap_or(CellValue::Empty);
                (*field, value)
            })
            .collect();

        ImportRow {
            ordinal: raw.ordinal,
            sheet_row: raw.sheet_row,
            cells: mapped,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::{text, FieldKind};

    const SCHEMA: &[FieldSpec] = &[
        FieldSpec::required("full_name", "Full Name", FieldKind::PersonName { max_len: 50 }),
        FieldSpec::required("reg_number", "Registration ID", text(10))
            .with_aliases(&["Reg Number"]),
        FieldSpec::optional("mobile_telephone", "Mobile Telephone", FieldKind::Phone),
    ];

    fn headers(labels: &[&str]) -> Vec<String> {
        labels.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_headers_match_case_and_whitespace_insensitively() {
        let mapping = FieldMapper
            .map_headers(
                &headers(&["  FULL   name ", "notes", "reg_number", "Mobile Telephone"]),
                SCHEMA,
            )
            .unwrap();

        assert_eq!(mapping.column_of("full_name"), Some(0));
        assert_eq!(mapping.column_of("reg_number"), Some(2));
        assert_eq!(mapping.column_of("mobile_telephone"), Some(3));
    }

    #[test]
    fn test_missing_required_headers_are_all_listed() {
        let err = FieldMapper
            .map_headers(&headers(&["Mobile Telephone"]), SCHEMA)
            .unwrap_err();

        match err {
            ImportError::SchemaMismatch { missing } => {
                assert_eq!(missing, vec!["Full Name", "Registration ID"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_duplicate_header_binds_first_occurrence() {
        let mapping = FieldMapper
            .map_headers(&headers(&["Full Name", "Reg Number", "Full Name"]), SCHEMA)
            .unwrap();
        assert_eq!(mapping.column_of("full_name"), Some(0));
        assert_eq!(mapping.column_of("mobile_telephone"), None);
    }

    #[test]
    fn test_map_row_fills_short_rows_with_empty() {
        let mapping = FieldMapper.map_positional(SCHEMA);
        let row = FieldMapper.map_row(
            RawRow {
                ordinal: 4,
                sheet_row: 5,
                cells: vec![CellValue::Text("John Okello".to_string())],
            },
            &mapping,
        );

        assert_eq!(row.ordinal, 4);
        assert_eq!(row.cell("full_name"), &CellValue::Text("John Okello".to_string()));
        assert_eq!(row.cell("reg_number"), &CellValue::Empty);
    }
}
