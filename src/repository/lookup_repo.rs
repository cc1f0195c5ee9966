// ==========================================
// Asset Back Office - Lookup Repository
// ==========================================
// Pre-loads the natural-key maps for every governed table in one
// pass so validation never touches storage per row. Keys follow
// the same normalization the validators apply: codes and tags
// upper-cased, responsible/provider names lower-cased.
// ==========================================

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::Connection;
use tracing::debug;

use crate::domain::types::EntityKind;
use crate::importer::registry::PersistedLookup;
use crate::repository::error::{RepositoryError, RepositoryResult};

/// Seam between the orchestrator and storage for pre-loaded lookups.
#[async_trait]
pub trait LookupLoader: Send + Sync {
    async fn load_all(
        &self,
    ) -> RepositoryResult<HashMap<EntityKind, HashMap<String, PersistedLookup>>>;
}

pub struct LookupRepository {
    db: Arc<Mutex<Connection>>,
}

impl LookupRepository {
    pub fn new(db: Arc<Mutex<Connection>>) -> Self {
        LookupRepository { db }
    }
}

#[async_trait]
impl LookupLoader for LookupRepository {
    async fn load_all(
        &self,
    ) -> RepositoryResult<HashMap<EntityKind, HashMap<String, PersistedLookup>>> {
        let conn = self
            .db
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))?;

        let mut all = HashMap::with_capacity(EntityKind::ALL.len());
        for kind in EntityKind::ALL {
            let bucket = load_kind(&conn, kind)?;
            debug!(kind = ?kind, records = bucket.len(), "loaded lookup bucket");
            all.insert(kind, bucket);
        }
        Ok(all)
    }
}

fn load_kind(
    conn: &Connection,
    kind: EntityKind,
) -> RepositoryResult<HashMap<String, PersistedLookup>> {
    match kind {
        // categories carry their default method id for later reads
        EntityKind::AssetCategories => {
            let mut stmt = conn.prepare(
                "SELECT id, code, default_depreciation_method_id FROM asset_categories",
            )?;
            let rows = stmt.query_map([], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, Option<i64>>(2)?,
                ))
            })?;
            let mut bucket = HashMap::new();
            for row in rows {
                let (id, code, method_id) = row?;
                let key = code.trim().to_uppercase();
                if key.is_empty() {
                    continue;
                }
                bucket.insert(
                    key,
                    PersistedLookup {
                        id,
                        default_depreciation_method_id: method_id,
                    },
                );
            }
            Ok(bucket)
        }
        EntityKind::Responsibles => load_keyed(conn, "SELECT id, name FROM responsibles", KeyCase::Lower),
        EntityKind::Providers => load_keyed(conn, "SELECT id, name FROM providers", KeyCase::Lower),
        EntityKind::Assets => load_keyed(conn, "SELECT id, asset_tag FROM assets", KeyCase::Upper),
        other => {
            let sql = format!("SELECT id, code FROM {}", other.table_name());
            load_keyed(conn, &sql, KeyCase::Upper)
        }
    }
}

enum KeyCase {
    Upper,
    Lower,
}

fn load_keyed(
    conn: &Connection,
    sql: &str,
    case: KeyCase,
) -> RepositoryResult<HashMap<String, PersistedLookup>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map([], |row| {
        Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?))
    })?;
    let mut bucket = HashMap::new();
    for row in rows {
        let (id, raw_key) = row?;
        let key = match case {
            KeyCase::Upper => raw_key.trim().to_uppercase(),
            KeyCase::Lower => raw_key.trim().to_lowercase(),
        };
        if key.is_empty() {
            continue;
        }
        bucket.insert(key, PersistedLookup::new(id));
    }
    Ok(bucket)
}
