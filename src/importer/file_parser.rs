// ==========================================
// Sponsorship MIS - spreadsheet row parser
// ==========================================
// Excel / ODS via calamine, CSV via csv.
// Rows are produced lazily for a single forward pass.
// ==========================================

use crate::domain::import::CellValue;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::importer_trait::FileParser;
use calamine::{open_workbook_auto_from_rs, Data, Range, Reader};
use chrono::{Days, NaiveDate};
use csv::{ReaderBuilder, StringRecordsIntoIter};
use std::io::Cursor;
use std::path::Path;

// ==========================================
// SourceFormat / SheetSource
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Excel,
    Csv,
}

impl SourceFormat {
    pub fn from_path<P: AsRef<Path>>(path: P) -> ImportResult<Self> {
        let ext = path
            .as_ref()
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        match ext.as_str() {
            "xlsx" | "xlsm" | "xls" | "xlsb" | "ods" => Ok(SourceFormat::Excel),
            "csv" => Ok(SourceFormat::Csv),
            "" => Err(ImportError::UnsupportedFormat(
                path.as_ref().display().to_string(),
            )),
            _ => Err(ImportError::UnsupportedFormat(ext)),
        }
    }
}

/// Uploaded spreadsheet: file name, detected format, raw bytes
#[derive(Debug, Clone)]
pub struct SheetSource {
    pub file_name: String,
    pub format: SourceFormat,
    pub bytes: Vec<u8>,
}

impl SheetSource {
    pub fn from_bytes(file_name: impl Into<String>, bytes: Vec<u8>) -> ImportResult<Self> {
        let file_name = file_name.into();
        let format = SourceFormat::from_path(&file_name)?;
        Ok(Self {
            file_name,
            format,
            bytes,
        })
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> ImportResult<Self> {
        let path = path.as_ref();
        let format = SourceFormat::from_path(path)?;
        if !path.exists() {
            return Err(ImportError::FileNotFound(path.display().to_string()));
        }
        let bytes = std::fs::read(path)?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self {
            file_name,
            format,
            bytes,
        })
    }
}

// ==========================================
// RawRow / ParsedSheet
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub struct RawRow {
    pub ordinal: usize,
    pub sheet_row: usize,
    pub cells: Vec<CellValue>,
}

pub type RowStream = Box<dyn Iterator<Item = ImportResult<RawRow>> + Send>;

pub struct ParsedSheet {
    /// Header labels; `None` for positional sheets
    pub headers: Option<Vec<String>>,
    pub rows: RowStream,
}

impl std::fmt::Debug for ParsedSheet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParsedSheet")
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}

/// Ordinal of a data row: position after the header (or from the top)
fn ordinal_for(abs_row: usize, header_row: Option<usize>) -> usize {
    match header_row {
        Some(h) => abs_row.saturating_sub(h),
        None => abs_row + 1,
    }
}

fn first_data_row(header_row: Option<usize>) -> usize {
    match header_row {
        Some(h) => h.saturating_add(1),
        None => 0,
    }
}

// ==========================================
// Excel Parser
// ==========================================
pub struct ExcelParser;

impl FileParser for ExcelParser {
    fn open(&self, source: SheetSource, header_row: Option<usize>) -> ImportResult<ParsedSheet> {
        let mut workbook = open_workbook_auto_from_rs(Cursor::new(source.bytes))?;

        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| ImportError::MalformedSource("workbook has no worksheet".to_string()))??;

        let (row0, col0) = range
            .start()
            .map(|(r, c)| (r as usize, c as usize))
            .unwrap_or((0, 0));
        let end_row = if range.is_empty() {
            0
        } else {
            row0 + range.height()
        };
        let end_col = if range.is_empty() {
            0
        } else {
            col0 + range.width()
        };

        let rows = ExcelRows {
            range,
            row0,
            col0,
            end_col,
            next_row: first_data_row(header_row),
            end_row,
            header_row,
        };

        let headers = header_row.map(|h| {
            rows.read_row(h)
                .iter()
                .map(|cell| cell.as_text().unwrap_or_default())
                .collect()
        });

        Ok(ParsedSheet {
            headers,
            rows: Box::new(rows),
        })
    }
}

/// Lazy row iterator over an owned worksheet range (absolute coordinates)
struct ExcelRows {
    range: Range<Data>,
    row0: usize,
    col0: usize,
    end_col: usize,
    next_row: usize,
    end_row: usize,
    header_row: Option<usize>,
}

impl ExcelRows {
    fn read_row(&self, abs_row: usize) -> Vec<CellValue> {
        (0..self.end_col)
            .map(|abs_col| {
                if abs_row < self.row0 || abs_col < self.col0 {
                    return CellValue::Empty;
                }
                self.range
                    .get((abs_row - self.row0, abs_col - self.col0))
                    .map(cell_value)
                    .unwrap_or(CellValue::Empty)
            })
            .collect()
    }
}

impl Iterator for ExcelRows {
    type Item = ImportResult<RawRow>;

    fn next(&mut self) -> Option<Self::Item> {
        while self.next_row < self.end_row {
            let abs_row = self.next_row;
            self.next_row += 1;

            let cells = self.read_row(abs_row);
            if cells.iter().all(CellValue::is_blank) {
                continue;
            }
            return Some(Ok(RawRow {
                ordinal: ordinal_for(abs_row, self.header_row),
                sheet_row: abs_row + 1,
                cells,
            }));
        }
        None
    }
}

fn cell_value(data: &Data) -> CellValue {
    match data {
        Data::Empty => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) => CellValue::Number(*f),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => excel_serial_to_date(dt.as_f64())
            .map(CellValue::Date)
            .unwrap_or(CellValue::Number(dt.as_f64())),
        Data::DateTimeIso(s) => s
            .get(..10)
            .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
            .map(CellValue::Date)
            .unwrap_or_else(|| CellValue::Text(s.clone())),
        Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(e) => CellValue::Text(e.to_string()),
    }
}

/// Excel serial day number (1900 system) to a calendar date
pub fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !(0.0..2_958_466.0).contains(&serial) {
        return None;
    }
    NaiveDate::from_ymd_opt(1899, 12, 30)?.checked_add_days(Days::new(serial.floor() as u64))
}

// ==========================================
// CSV Parser
// ==========================================
pub struct CsvParser;

impl FileParser for CsvParser {
    fn open(&self, source: SheetSource, header_row: Option<usize>) -> ImportResult<ParsedSheet> {
        let reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(Cursor::new(source.bytes));

        let mut rows = CsvRows {
            records: reader.into_records(),
            next_row: 0,
            header_row,
        };

        let headers = match header_row {
            Some(h) => {
                let mut labels = Vec::new();
                while rows.next_row <= h {
                    match rows.records.next() {
                        Some(record) => {
                            let record = record?;
                            if rows.next_row == h {
                                labels = record.iter().map(|s| s.trim().to_string()).collect();
                            }
                            rows.next_row += 1;
                        }
                        None => break,
                    }
                }
                Some(labels)
            }
            None => None,
        };

        Ok(ParsedSheet {
            headers,
            rows: Box::new(rows),
        })
    }
}

struct CsvRows {
    records: StringRecordsIntoIter<Cursor<Vec<u8>>>,
    next_row: usize,
    header_row: Option<usize>,
}

impl Iterator for CsvRows {
    type Item = ImportResult<RawRow>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let record = match self.records.next()? {
                Ok(record) => record,
                Err(e) => return Some(Err(e.into())),
            };
            let abs_row = self.next_row;
            self.next_row += 1;

            let cells: Vec<CellValue> = record
                .iter()
                .map(|value| {
                    if value.trim().is_empty() {
                        CellValue::Empty
                    } else {
                        CellValue::Text(value.to_string())
                    }
                })
                .collect();

            // Skip fully blank rows
            if cells.iter().all(CellValue::is_blank) {
                continue;
            }

            return Some(Ok(RawRow {
                ordinal: ordinal_for(abs_row, self.header_row),
                sheet_row: abs_row + 1,
                cells,
            }));
        }
    }
}

// ==========================================
// Universal parser (dispatch on source format)
// ==========================================
pub struct UniversalFileParser;

impl FileParser for UniversalFileParser {
    fn open(&self, source: SheetSource, header_row: Option<usize>) -> ImportResult<ParsedSheet> {
        match source.format {
            SourceFormat::Csv => CsvParser.open(source, header_row),
            SourceFormat::Excel => ExcelParser.open(source, header_row),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn csv_source(body: &str) -> SheetSource {
        SheetSource::from_bytes("clients.csv", body.as_bytes().to_vec()).unwrap()
    }

    #[test]
    fn test_csv_headers_and_rows() {
        let sheet = CsvParser
            .open(csv_source("Full Name,Registration ID\nJohn Okello,G01-001\n"), Some(0))
            .unwrap();

        assert_eq!(
            sheet.headers,
            Some(vec!["Full Name".to_string(), "Registration ID".to_string()])
        );
        let rows: Vec<RawRow> = sheet.rows.map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].ordinal, 1);
        assert_eq!(rows[0].sheet_row, 2);
        assert_eq!(rows[0].cells[1], CellValue::Text("G01-001".to_string()));
    }

    #[test]
    fn test_csv_blank_rows_consume_ordinal() {
        let sheet = CsvParser
            .open(csv_source("A,B\nx,1\n,\ny,2\n"), Some(0))
            .unwrap();

        let ordinals: Vec<usize> = sheet.rows.map(|r| r.unwrap().ordinal).collect();
        assert_eq!(ordinals, vec![1, 3]);
    }

    #[test]
    fn test_csv_positional_has_no_headers() {
        let sheet = CsvParser
            .open(csv_source("John Okello,G01-001\n"), None)
            .unwrap();

        assert!(sheet.headers.is_none());
        let rows: Vec<RawRow> = sheet.rows.map(|r| r.unwrap()).collect();
        assert_eq!(rows[0].ordinal, 1);
        assert_eq!(rows[0].sheet_row, 1);
    }

    #[test]
    fn test_csv_header_below_title_row() {
        let sheet = CsvParser
            .open(csv_source("Client list 2024\nFull Name\nJohn\n"), Some(1))
            .unwrap();

        assert_eq!(sheet.headers, Some(vec!["Full Name".to_string()]));
        let rows: Vec<RawRow> = sheet.rows.map(|r| r.unwrap()).collect();
        assert_eq!(rows[0].ordinal, 1);
        assert_eq!(rows[0].sheet_row, 3);
    }

    const KIDS_XLSX: &[u8] = include_bytes!("../../tests/fixtures/kids.xlsx");

    fn kids_workbook() -> SheetSource {
        SheetSource::from_bytes("kids.xlsx", KIDS_XLSX.to_vec()).unwrap()
    }

    #[test]
    fn test_excel_headers_dates_and_numbers() {
        let sheet = ExcelParser.open(kids_workbook(), Some(0)).unwrap();

        assert_eq!(
            sheet.headers,
            Some(vec![
                "Full Name".to_string(),
                "Gender".to_string(),
                "Date of Birth".to_string(),
                "Year Enrolled".to_string(),
                "Guardian Contact".to_string(),
            ])
        );

        let rows: Vec<RawRow> = sheet.rows.map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 2);
        // row 3 of the sheet is empty
        assert_eq!(rows.iter().map(|r| r.ordinal).collect::<Vec<_>>(), vec![1, 3]);
        assert_eq!(rows.iter().map(|r| r.sheet_row).collect::<Vec<_>>(), vec![2, 4]);

        assert_eq!(
            rows[0].cells[2],
            CellValue::Date(NaiveDate::from_ymd_opt(2012, 4, 1).unwrap())
        );
        assert_eq!(rows[0].cells[3], CellValue::Number(2020.0));
        assert_eq!(rows[0].cells[4], CellValue::Number(772000111.0));
        assert_eq!(rows[1].cells[2], CellValue::Text("2011-05-20".to_string()));
    }

    #[test]
    fn test_header_row_past_the_end_yields_no_rows() {
        let sheet = ExcelParser.open(kids_workbook(), Some(usize::MAX)).unwrap();
        assert_eq!(sheet.rows.count(), 0);

        let sheet = CsvParser
            .open(csv_source("A,B\nx,1\n"), Some(usize::MAX))
            .unwrap();
        assert_eq!(sheet.headers, Some(Vec::new()));
        assert_eq!(sheet.rows.count(), 0);
    }

    #[test]
    fn test_excel_garbage_is_malformed_source() {
        let source = SheetSource::from_bytes("kids.xlsx", b"not a workbook".to_vec()).unwrap();
        let err = ExcelParser.open(source, Some(0)).unwrap_err();
        assert!(matches!(err, ImportError::MalformedSource(_)));
    }

    #[test]
    fn test_source_format_from_path() {
        assert_eq!(SourceFormat::from_path("a.XLSX").unwrap(), SourceFormat::Excel);
        assert_eq!(SourceFormat::from_path("a.ods").unwrap(), SourceFormat::Excel);
        assert_eq!(SourceFormat::from_path("a.csv").unwrap(), SourceFormat::Csv);
        assert!(matches!(
            SourceFormat::from_path("a.pdf"),
            Err(ImportError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_excel_serial_to_date() {
        assert_eq!(
            excel_serial_to_date(45000.0),
            NaiveDate::from_ymd_opt(2023, 3, 15)
        );
        assert_eq!(excel_serial_to_date(-1.0), None);
    }
}
