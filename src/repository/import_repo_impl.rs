// ==========================================
// Sponsorship MIS - import repository (rusqlite)
// ==========================================
// Chunk = transaction, row = savepoint.
// Table and column names come from static entity schemas
// and are always quoted.
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::entity::ReferenceTarget;
use crate::domain::import::{ColumnValue, KeyMatch, NaturalKey};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::import_repo::{ContactRecord, ImportRepository, PendingWrite, WriteMode};
use async_trait::async_trait;
use rusqlite::types::{ToSqlOutput, Value, ValueRef};
use rusqlite::{params, params_from_iter, Connection, DropBehavior, ToSql};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, warn};

impl ToSql for ColumnValue {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            ColumnValue::Null => ToSqlOutput::Owned(Value::Null),
            ColumnValue::Text(s) => ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes())),
            ColumnValue::Integer(i) => ToSqlOutput::Owned(Value::Integer(*i)),
            ColumnValue::Real(f) => ToSqlOutput::Owned(Value::Real(*f)),
            ColumnValue::Date(d) => ToSqlOutput::Owned(Value::Text(d.format("%Y-%m-%d").to_string())),
            ColumnValue::Bool(b) => ToSqlOutput::Owned(Value::Integer(i64::from(*b))),
        })
    }
}

pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn tx_error(err: rusqlite::Error) -> RepositoryError {
    RepositoryError::DatabaseTransactionError(err.to_string())
}

fn value_as_text(value: ValueRef<'_>) -> Option<String> {
    match value {
        ValueRef::Null => None,
        ValueRef::Integer(i) => Some(i.to_string()),
        ValueRef::Real(f) => Some(f.to_string()),
        ValueRef::Text(t) | ValueRef::Blob(t) => Some(String::from_utf8_lossy(t).to_string()),
    }
}

// ==========================================
// ImportRepositoryImpl
// ==========================================
pub struct ImportRepositoryImpl {
    conn: Arc<Mutex<Connection>>,
}

impl ImportRepositoryImpl {
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// Shared handle (e.g. for a ConfigManager on the same database)
    pub fn connection(&self) -> Arc<Mutex<Connection>> {
        Arc::clone(&self.conn)
    }

    fn lock(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// Insert or update one row; runs inside the caller's savepoint
    fn apply_write(conn: &Connection, table: &str, write: &PendingWrite) -> RepositoryResult<i64> {
        let values: Vec<&ColumnValue> = write.columns.iter().map(|(_, v)| v).collect();

        match write.mode {
            WriteMode::Insert => {
                let names: Vec<String> = write.columns.iter().map(|(c, _)| quote_ident(c)).collect();
                let placeholders: Vec<String> =
                    (1..=values.len()).map(|i| format!("?{}", i)).collect();
                let sql = format!(
                    "INSERT INTO {} ({}, created_at, updated_at) VALUES ({}, datetime('now'), datetime('now'))",
                    quote_ident(table),
                    names.join(", "),
                    placeholders.join(", ")
                );
                conn.prepare_cached(&sql)?
                    .execute(params_from_iter(values.iter()))?;
                Ok(conn.last_insert_rowid())
            }
            WriteMode::Update(id) => {
                let assignments: Vec<String> = write
                    .columns
                    .iter()
                    .enumerate()
                    .map(|(i, (c, _))| format!("{} = ?{}", quote_ident(c), i + 1))
                    .collect();
                let sql = format!(
                    "UPDATE {} SET {}, updated_at = datetime('now') WHERE id = ?{}",
                    quote_ident(table),
                    assignments.join(", "),
                    values.len() + 1
                );

                let mut bound: Vec<&dyn ToSql> = values.iter().map(|v| *v as &dyn ToSql).collect();
                bound.push(&id);
                let changed = conn.prepare_cached(&sql)?.execute(bound.as_slice())?;
                if changed == 0 {
                    return Err(RepositoryError::NotFound {
                        entity: table.to_string(),
                        id: id.to_string(),
                    });
                }
                Ok(id)
            }
        }
    }
}

#[async_trait]
impl ImportRepository for ImportRepositoryImpl {
    async fn find_ids_by_natural_key(
        &self,
        table: &str,
        key: &NaturalKey,
    ) -> RepositoryResult<Vec<i64>> {
        let conn = self.lock()?;

        let conditions: Vec<String> = key
            .parts()
            .iter()
            .enumerate()
            .map(|(i, part)| match part.matching {
                KeyMatch::CaseInsensitive => {
                    format!("lower(trim({})) IS ?{}", quote_ident(part.column), i + 1)
                }
                KeyMatch::Exact => format!("{} IS ?{}", quote_ident(part.column), i + 1),
            })
            .collect();
        let sql = format!(
            "SELECT id FROM {} WHERE {} ORDER BY id",
            quote_ident(table),
            conditions.join(" AND ")
        );

        let mut stmt = conn.prepare_cached(&sql)?;
        let ids = stmt
            .query_map(
                params_from_iter(key.parts().iter().map(|p| p.value.as_deref())),
                |row| row.get::<_, i64>(0),
            )?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ids)
    }

    async fn load_reference_values(
        &self,
        target: &ReferenceTarget,
    ) -> RepositoryResult<Vec<(i64, String)>> {
        let conn = self.lock()?;
        let column = quote_ident(target.column);
        let sql = format!(
            "SELECT id, {col} FROM {table} WHERE {col} IS NOT NULL ORDER BY id",
            col = column,
            table = quote_ident(target.table)
        );

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map([], |row| Ok((row.get::<_, i64>(0)?, value_as_text(row.get_ref(1)?))))?
            .filter_map(|r| match r {
                Ok((id, Some(value))) => Some(Ok((id, value))),
                Ok((_, None)) => None,
                Err(e) => Some(Err(e)),
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    async fn commit_chunk(
        &self,
        table: &str,
        writes: &[PendingWrite],
    ) -> RepositoryResult<Vec<Result<i64, RepositoryError>>> {
        let mut conn = self.lock()?;
        let mut tx = conn.transaction().map_err(tx_error)?;
        let mut results = Vec::with_capacity(writes.len());

        for write in writes {
            let mut sp = tx.savepoint().map_err(tx_error)?;
            match Self::apply_write(&sp, table, write) {
                Ok(id) => {
                    sp.commit().map_err(tx_error)?;
                    results.push(Ok(id));
                }
                Err(e) if e.is_row_scoped() => {
                    debug!(ordinal = write.ordinal, error = %e, "row write rolled back");
                    sp.set_drop_behavior(DropBehavior::Rollback);
                    sp.finish().map_err(tx_error)?;
                    results.push(Err(e));
                }
                Err(e) => {
                    // Dropping the savepoint and transaction rolls the chunk back
                    warn!(ordinal = write.ordinal, error = %e, "chunk aborted");
                    return Err(e);
                }
            }
        }

        tx.commit().map_err(tx_error)?;
        Ok(results)
    }

    async fn list_contacts(
        &self,
        table: &str,
        columns: &[&str],
    ) -> RepositoryResult<Vec<ContactRecord>> {
        let conn = self.lock()?;
        let quoted: Vec<String> = columns.iter().map(|c| quote_ident(c)).collect();
        let sql = format!(
            "SELECT id, {} FROM {} ORDER BY id",
            quoted.join(", "),
            quote_ident(table)
        );

        let mut stmt = conn.prepare(&sql)?;
        let records = stmt
            .query_map([], |row| {
                let id: i64 = row.get(0)?;
                let mut values = Vec::with_capacity(columns.len());
                for (i, column) in columns.iter().enumerate() {
                    values.push((column.to_string(), value_as_text(row.get_ref(i + 1)?)));
                }
                Ok(ContactRecord { id, values })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }

    async fn update_contacts(
        &self,
        table: &str,
        updates: &[ContactRecord],
    ) -> RepositoryResult<usize> {
        let mut conn = self.lock()?;
        let tx = conn.transaction().map_err(tx_error)?;
        let mut touched = 0;

        for record in updates {
            let mut changed = 0;
            for (column, value) in &record.values {
                let sql = format!(
                    "UPDATE {} SET {} = ?1, updated_at = datetime('now') WHERE id = ?2",
                    quote_ident(table),
                    quote_ident(column)
                );
                changed += tx.prepare_cached(&sql)?.execute(params![value, record.id])?;
            }
            if changed > 0 {
                touched += 1;
            }
        }

        tx.commit().map_err(tx_error)?;
        Ok(touched)
    }

    async fn count_rows(&self, table: &str) -> RepositoryResult<usize> {
        let conn = self.lock()?;
        let sql = format!("SELECT COUNT(*) FROM {}", quote_ident(table));
        let count: i64 = conn.query_row(&sql, [], |row| row.get(0))?;
        Ok(count as usize)
    }
}
