// ==========================================
// Sponsorship MIS - SQLite connection setup
// ==========================================
// Every Connection::open goes through here so foreign keys
// and busy_timeout are set the same way on every connection.
// ==========================================

use rusqlite::Connection;
use rusqlite::OptionalExtension;
use std::path::PathBuf;
use std::time::Duration;

/// Default busy_timeout (milliseconds)
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// schema_version written by `init_schema`
pub const CURRENT_SCHEMA_VERSION: i64 = 1;

/// Overrides the default database location
pub const DB_PATH_ENV: &str = "SPONSORSHIP_MIS_DB_PATH";

/// Per-connection PRAGMAs (foreign_keys and busy_timeout are not persistent)
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// `$SPONSORSHIP_MIS_DB_PATH`, else `<data dir>/sponsorship-mis/sponsorship.db`
pub fn default_db_path() -> PathBuf {
    if let Ok(path) = std::env::var(DB_PATH_ENV) {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }
    dirs::data_dir()
        .map(|dir| dir.join("sponsorship-mis").join("sponsorship.db"))
        .unwrap_or_else(|| PathBuf::from("sponsorship.db"))
}

const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER PRIMARY KEY,
    applied_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS config_kv (
    scope_id TEXT NOT NULL,
    key TEXT NOT NULL,
    value TEXT NOT NULL,
    updated_at TEXT NOT NULL DEFAULT (datetime('now')),
    PRIMARY KEY (scope_id, key)
);

CREATE TABLE IF NOT EXISTS sponsor_info (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    first_name TEXT NOT NULL,
    last_name TEXT NOT NULL,
    gender TEXT NOT NULL,
    email TEXT NOT NULL,
    sponsorship_type_at_signup TEXT,
    job_title TEXT,
    region TEXT,
    town TEXT,
    origin TEXT,
    business_telephone TEXT,
    mobile_telephone TEXT,
    city TEXT,
    start_date TEXT,
    first_street_address TEXT,
    second_street_address TEXT,
    zip_code TEXT,
    is_departed TEXT NOT NULL DEFAULT 'No',
    comment TEXT,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);
CREATE INDEX IF NOT EXISTS idx_sponsor_email ON sponsor_info (lower(trim(email)));

CREATE TABLE IF NOT EXISTS child_info (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    full_name TEXT NOT NULL,
    preferred_name TEXT,
    residence TEXT,
    district TEXT,
    tribe TEXT,
    gender TEXT NOT NULL,
    date_of_birth TEXT,
    weight REAL,
    height INTEGER,
    aspiration TEXT,
    c_interest TEXT,
    is_child_in_school INTEGER NOT NULL DEFAULT 0,
    is_sponsored INTEGER NOT NULL DEFAULT 0,
    father_name TEXT,
    is_father_alive TEXT,
    father_description TEXT,
    mother_name TEXT,
    is_mother_alive TEXT,
    mother_description TEXT,
    guardian TEXT,
    guardian_contact TEXT,
    relationship_with_guardian TEXT,
    siblings TEXT,
    background_info TEXT,
    health_status TEXT,
    responsibility TEXT,
    relationship_with_christ TEXT,
    religion TEXT,
    prayer_request TEXT,
    year_enrolled INTEGER NOT NULL,
    is_departed INTEGER NOT NULL DEFAULT 0,
    staff_comment TEXT,
    compiled_by TEXT,
    sponsor_id INTEGER REFERENCES sponsor_info (id) ON DELETE SET NULL,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);
CREATE INDEX IF NOT EXISTS idx_child_name_dob ON child_info (lower(trim(full_name)), date_of_birth);

CREATE TABLE IF NOT EXISTS client_info (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    full_name TEXT NOT NULL,
    reg_number TEXT,
    mobile_telephone TEXT,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);
CREATE INDEX IF NOT EXISTS idx_client_reg_number ON client_info (reg_number);

CREATE TABLE IF NOT EXISTS chart_of_accounts (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    account_name TEXT NOT NULL,
    account_type TEXT NOT NULL
        CHECK (account_type IN ('asset', 'liability', 'equity', 'revenue', 'expense')),
    account_number TEXT NOT NULL UNIQUE,
    description TEXT,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);
"#;

/// Create every table (idempotent) and record the schema version
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA_SQL)?;
    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
        [CURRENT_SCHEMA_VERSION],
    )?;
    Ok(())
}

/// schema_version, or None when the table does not exist
pub fn read_schema_version(conn: &Connection) -> rusqlite::Result<Option<i64>> {
    let has_table: bool = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version' LIMIT 1",
            [],
            |_row| Ok(true),
        )
        .optional()?
        .unwrap_or(false);

    if !has_table {
        return Ok(None);
    }

    let v: Option<i64> =
        conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;
    Ok(v)
}
