// ==========================================
// Asset Back Office - Import Audit Log Repository
// ==========================================
// One `imports_log` row per sheet per run, preview runs included.
// The whole batch is written in a single transaction.
// ==========================================

use std::sync::{Arc, Mutex};

use rusqlite::{params, Connection};
use serde_json::Value;
use tracing::debug;

use crate::domain::report::ImportLogEntry;
use crate::repository::error::{RepositoryError, RepositoryResult};

/// One audit row read back from storage.
#[derive(Debug, Clone)]
pub struct ImportLogRecord {
    pub batch_id: String,
    pub sheet_name: String,
    pub file_name: String,
    pub template_version: String,
    pub preview: bool,
    pub status: String,
    pub totals: Value,
    pub duration_ms: u64,
    pub requested_by: String,
}

#[derive(Clone)]
pub struct ImportLogRepository {
    db: Arc<Mutex<Connection>>,
}

impl ImportLogRepository {
    pub fn new(db: Arc<Mutex<Connection>>) -> Self {
        ImportLogRepository { db }
    }

    pub fn insert_batch(&self, entries: &[ImportLogEntry]) -> RepositoryResult<()> {
        if entries.is_empty() {
            return Ok(());
        }
        let mut conn = self
            .db
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))?;
        let tx = conn
            .transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        for entry in entries {
            tx.execute(
                "INSERT INTO imports_log (
                    batch_id, sheet_name, file_name, template_version, preview,
                    status, totals, warnings, errors, duplicates, metadata,
                    duration_ms, requested_by
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
                params![
                    entry.batch_id,
                    entry.sheet_name,
                    entry.file_name,
                    entry.template_version,
                    entry.preview,
                    entry.status,
                    entry.totals.to_string(),
                    entry.warnings.to_string(),
                    entry.errors.to_string(),
                    entry.duplicates.to_string(),
                    entry.metadata.to_string(),
                    entry.duration_ms as i64,
                    entry.requested_by,
                ],
            )?;
        }

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        debug!(rows = entries.len(), "audit batch written");
        Ok(())
    }

    /// Audit rows of one batch, sheet insertion order preserved.
    pub fn entries_for_batch(&self, batch_id: &str) -> RepositoryResult<Vec<ImportLogRecord>> {
        let conn = self
            .db
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))?;
        let mut stmt = conn.prepare(
            "SELECT batch_id, sheet_name, file_name, template_version, preview,
                    status, totals, duration_ms, requested_by
             FROM imports_log WHERE batch_id = ?1 ORDER BY id",
        )?;
        let rows = stmt.query_map([batch_id], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, bool>(4)?,
                row.get::<_, String>(5)?,
                row.get::<_, String>(6)?,
                row.get::<_, i64>(7)?,
                row.get::<_, String>(8)?,
            ))
        })?;

        let mut records = Vec::new();
        for row in rows {
            let (
                batch_id,
                sheet_name,
                file_name,
                template_version,
                preview,
                status,
                totals_json,
                duration_ms,
                requested_by,
            ) = row?;
            let totals = serde_json::from_str(&totals_json)
                .map_err(|e| RepositoryError::InternalError(e.to_string()))?;
            records.push(ImportLogRecord {
                batch_id,
                sheet_name,
                file_name,
                template_version,
                preview,
                status,
                totals,
                duration_ms: duration_ms.max(0) as u64,
                requested_by,
            });
        }
        Ok(records)
    }
}
