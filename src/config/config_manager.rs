// ==========================================
// Sponsorship MIS - configuration manager
// ==========================================
// Storage: config_kv table (scope_id + key -> value)
// Only the 'global' scope is read by the importer.
// ==========================================

use crate::config::import_config::{
    default_min_date, DEFAULT_CHUNK_SIZE, DEFAULT_HEADER_ROW, DEFAULT_MAX_ROWS, MAX_HEADER_ROW,
};
use crate::config::import_config_trait::ImportConfigReader;
use crate::db::open_sqlite_connection;
use crate::importer::error::{ImportError, ImportResult};
use async_trait::async_trait;
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex};

pub const GLOBAL_SCOPE: &str = "global";

// ==========================================
// ConfigManager
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    pub fn new(db_path: &str) -> ImportResult<Self> {
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| ImportError::Infrastructure(e.to_string()))?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Share an existing connection (PRAGMAs are re-applied, idempotent)
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> ImportResult<Self> {
        {
            let guard = conn
                .lock()
                .map_err(|e| ImportError::Infrastructure(format!("lock poisoned: {}", e)))?;
            crate::db::configure_sqlite_connection(&guard)
                .map_err(|e| ImportError::Infrastructure(e.to_string()))?;
        }

        Ok(Self { conn })
    }

    /// Global-scope value, `None` when unset
    pub fn get_config_value(&self, key: &str) -> ImportResult<Option<String>> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| ImportError::Infrastructure(format!("lock poisoned: {}", e)))?;

        conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = ?1 AND key = ?2",
            params![GLOBAL_SCOPE, key],
            |row| row.get::<_, String>(0),
        )
        .optional()
        .map_err(|e| ImportError::Infrastructure(e.to_string()))
    }

    pub fn set_config_value(&self, key: &str, value: &str) -> ImportResult<()> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| ImportError::Infrastructure(format!("lock poisoned: {}", e)))?;

        conn.execute(
            r#"
            INSERT INTO config_kv (scope_id, key, value, updated_at)
            VALUES (?1, ?2, ?3, datetime('now'))
            ON CONFLICT(scope_id, key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
            params![GLOBAL_SCOPE, key, value],
        )
        .map_err(|e| ImportError::Infrastructure(e.to_string()))?;
        Ok(())
    }

    fn get_positive(&self, key: &str, default: usize) -> ImportResult<usize> {
        match self.get_config_value(key)? {
            Some(raw) => parse_positive(key, &raw),
            None => Ok(default),
        }
    }
}

fn value_error(key: &str, value: &str, message: &str) -> ImportError {
    ImportError::ConfigValueError {
        key: key.to_string(),
        value: value.to_string(),
        message: message.to_string(),
    }
}

fn parse_positive(key: &str, raw: &str) -> ImportResult<usize> {
    match raw.trim().parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(value_error(key, raw, "expected a positive integer")),
    }
}

/// `none`/`positional` or a 0-based row index
pub fn parse_header_row(raw: &str) -> ImportResult<Option<usize>> {
    let trimmed = raw.trim();
    if trimmed.eq_ignore_ascii_case("none") || trimmed.eq_ignore_ascii_case("positional") {
        return Ok(None);
    }
    match trimmed.parse::<usize>() {
        Ok(row) if row <= MAX_HEADER_ROW => Ok(Some(row)),
        Ok(_) => Err(value_error(
            config_keys::IMPORT_HEADER_ROW,
            raw,
            &format!("row index must not exceed {}", MAX_HEADER_ROW),
        )),
        Err(_) => Err(value_error(
            config_keys::IMPORT_HEADER_ROW,
            raw,
            "expected a row index or 'none'",
        )),
    }
}

#[async_trait]
impl ImportConfigReader for ConfigManager {
    async fn get_header_row(&self) -> ImportResult<Option<usize>> {
        match self.get_config_value(config_keys::IMPORT_HEADER_ROW)? {
            Some(raw) => parse_header_row(&raw),
            None => Ok(DEFAULT_HEADER_ROW),
        }
    }

    async fn get_chunk_size(&self) -> ImportResult<usize> {
        self.get_positive(config_keys::IMPORT_CHUNK_SIZE, DEFAULT_CHUNK_SIZE)
    }

    async fn get_min_date(&self) -> ImportResult<NaiveDate> {
        match self.get_config_value(config_keys::IMPORT_MIN_DATE)? {
            Some(raw) => NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| {
                value_error(config_keys::IMPORT_MIN_DATE, &raw, "expected YYYY-MM-DD")
            }),
            None => Ok(default_min_date()),
        }
    }

    async fn get_max_rows(&self) -> ImportResult<usize> {
        self.get_positive(config_keys::IMPORT_MAX_ROWS, DEFAULT_MAX_ROWS)
    }
}

// ==========================================
// Config keys
// ==========================================
pub mod config_keys {
    pub const IMPORT_HEADER_ROW: &str = "import.header_row";
    pub const IMPORT_CHUNK_SIZE: &str = "import.chunk_size";
    pub const IMPORT_MIN_DATE: &str = "import.min_date";
    pub const IMPORT_MAX_ROWS: &str = "import.max_rows";
}
