// ==========================================
// Test helpers
// ==========================================
// Temporary databases and in-memory CSV sheets
// ==========================================

#![allow(dead_code)]

use rusqlite::{params, Connection};
use sponsorship_import::db::{init_schema, open_sqlite_connection};
use sponsorship_import::importer::SheetSource;
use std::error::Error;
use tempfile::NamedTempFile;

/// Temporary database with every table created
///
/// # Returns
/// - NamedTempFile: keep it alive for the duration of the test
/// - String: database path
pub fn create_test_db() -> Result<(NamedTempFile, String), Box<dyn Error>> {
    let temp_file = NamedTempFile::new()?;
    let db_path = temp_file
        .path()
        .to_str()
        .ok_or("temp path is not UTF-8")?
        .to_string();

    let conn = open_sqlite_connection(&db_path)?;
    init_schema(&conn)?;

    Ok((temp_file, db_path))
}

pub fn open_test_connection(db_path: &str) -> Result<Connection, Box<dyn Error>> {
    Ok(open_sqlite_connection(db_path)?)
}

/// CSV bytes with a header row
pub fn csv_bytes(headers: &[&str], rows: &[Vec<String>]) -> Vec<u8> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    if !headers.is_empty() {
        writer.write_record(headers).unwrap();
    }
    for row in rows {
        writer.write_record(row).unwrap();
    }
    writer.into_inner().unwrap()
}

pub fn csv_source(file_name: &str, headers: &[&str], rows: &[Vec<String>]) -> SheetSource {
    SheetSource::from_bytes(file_name, csv_bytes(headers, rows)).unwrap()
}

pub fn row(cells: &[&str]) -> Vec<String> {
    cells.iter().map(|c| c.to_string()).collect()
}

// ==========================================
// Entity sheets
// ==========================================

pub const CLIENT_HEADERS: &[&str] = &["Full Name", "Registration ID", "Mobile Telephone"];

pub const CHILD_HEADERS: &[&str] = &[
    "Full Name",
    "Gender",
    "Date of Birth",
    "Year Enrolled",
    "Guardian Contact",
    "Sponsor Email",
];

pub const SPONSOR_HEADERS: &[&str] = &["First Name", "Last Name", "Gender", "Email"];

/// `n` clients with distinct registration ids and phone numbers
pub fn client_rows(n: usize) -> Vec<Vec<String>> {
    (1..=n)
        .map(|i| {
            vec![
                "Test Client".to_string(),
                format!("REG{:04}", i),
                format!("077200{:04}", i),
            ]
        })
        .collect()
}

pub fn child_row(name: &str, dob: &str, sponsor_email: &str) -> Vec<String> {
    row(&[name, "Female", dob, "2020", "0772 000 111", sponsor_email])
}

// ==========================================
// Direct inserts (bypass the importer)
// ==========================================

pub fn insert_client(conn: &Connection, name: &str, reg: &str) -> Result<i64, Box<dyn Error>> {
    conn.execute(
        "INSERT INTO client_info (full_name, reg_number) VALUES (?1, ?2)",
        params![name, reg],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn insert_contacts(
    conn: &Connection,
    business: Option<&str>,
    mobile: Option<&str>,
) -> Result<i64, Box<dyn Error>> {
    conn.execute(
        r#"
        INSERT INTO sponsor_info (first_name, last_name, gender, email, business_telephone, mobile_telephone)
        VALUES ('Ann', 'Lee', 'Female', 'ann@example.org', ?1, ?2)
        "#,
        params![business, mobile],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn count(conn: &Connection, table: &str) -> i64 {
    conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
        row.get(0)
    })
    .unwrap()
}
