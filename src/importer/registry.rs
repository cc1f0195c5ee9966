// ==========================================
// Asset Back Office - Natural-Key Lookup Registry
// ==========================================
// Two tiers per entity kind, consulted in order:
//   pending   - rows accepted earlier in this run, not yet persisted
//   persisted - records pre-loaded from storage (plus records the
//               committer inserts, so later sheets can resolve ids)
// Keys are the natural keys from SheetRowData::natural_key.
// ==========================================

use std::collections::HashMap;

use crate::domain::rows::SheetRowData;
use crate::domain::types::EntityKind;

/// Minimal persisted record view: the storage id plus the one
/// cross-field the importer reads back (category default method).
#[derive(Debug, Clone, Copy)]
pub struct PersistedLookup {
    pub id: i64,
    pub default_depreciation_method_id: Option<i64>,
}

impl PersistedLookup {
    pub fn new(id: i64) -> Self {
        PersistedLookup {
            id,
            default_depreciation_method_id: None,
        }
    }
}

/// Which tier answered a lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupSource {
    Pending,
    Database,
}

#[derive(Debug, Default)]
pub struct LookupRegistry {
    persisted: HashMap<EntityKind, HashMap<String, PersistedLookup>>,
    pending: HashMap<EntityKind, HashMap<String, SheetRowData>>,
}

impl LookupRegistry {
    pub fn new() -> Self {
        LookupRegistry::default()
    }

    pub fn from_persisted(persisted: HashMap<EntityKind, HashMap<String, PersistedLookup>>) -> Self {
        LookupRegistry {
            persisted,
            pending: HashMap::new(),
        }
    }

    /// Reference resolution during validation: rows pending in this
    /// run satisfy a reference just like persisted records do.
    pub fn find(&self, kind: EntityKind, key: &str) -> Option<LookupSource> {
        if key.is_empty() {
            return None;
        }
        if self
            .pending
            .get(&kind)
            .is_some_and(|bucket| bucket.contains_key(key))
        {
            return Some(LookupSource::Pending);
        }
        if self
            .persisted
            .get(&kind)
            .is_some_and(|bucket| bucket.contains_key(key))
        {
            return Some(LookupSource::Database);
        }
        None
    }

    /// Whether the key is already persisted (duplicate detection).
    pub fn contains_persisted(&self, kind: EntityKind, key: &str) -> bool {
        !key.is_empty()
            && self
                .persisted
                .get(&kind)
                .is_some_and(|bucket| bucket.contains_key(key))
    }

    /// Storage id for a key. Only persisted records have ids; a key
    /// still pending resolves to None until the committer inserts it.
    pub fn resolve_id(&self, kind: EntityKind, key: &str) -> Option<i64> {
        self.persisted
            .get(&kind)
            .and_then(|bucket| bucket.get(key))
            .map(|record| record.id)
    }

    pub fn register_pending(&mut self, kind: EntityKind, key: String, data: SheetRowData) {
        if key.is_empty() {
            return;
        }
        self.pending.entry(kind).or_default().insert(key, data);
    }

    /// Record a freshly inserted row so later sheets resolve its id.
    pub fn register_persisted(&mut self, kind: EntityKind, key: String, record: PersistedLookup) {
        if key.is_empty() {
            return;
        }
        self.persisted.entry(kind).or_default().insert(key, record);
    }

    /// Drop the persisted tier for one kind. Used when the matching
    /// table is cleared before a commit run inserts.
    pub fn clear_persisted(&mut self, kind: EntityKind) {
        if let Some(bucket) = self.persisted.get_mut(&kind) {
            bucket.clear();
        }
    }
}
