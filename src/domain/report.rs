// ==========================================
// Asset Back Office - Import Run Report Model
// ==========================================
// Per-row outcomes, per-sheet aggregates, run totals and the
// audit-log entry shape. The report is the single artifact a
// caller inspects after a run, identical in shape for preview
// and commit.
// ==========================================

use crate::domain::rows::SheetRowData;
use crate::domain::types::{DuplicateSource, EntityKind, ImportMode, RowStatus, SheetStatus};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

// ==========================================
// RowOutcome - One Accepted Worksheet Row
// ==========================================
// Only rows that passed validation materialize an outcome; rows
// with errors are reported through `SheetOutcome::errors` instead.
#[derive(Debug, Clone, Serialize)]
pub struct RowOutcome {
    pub row_number: u32,
    pub key: String,
    pub status: RowStatus,
    pub data: SheetRowData,
    pub warnings: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record_id: Option<i64>,
}

/// Validation errors for a single rejected row.
#[derive(Debug, Clone, Serialize)]
pub struct RowError {
    pub row: u32,
    pub messages: Vec<String>,
}

/// A natural-key collision, with the source that already held the key.
#[derive(Debug, Clone, Serialize)]
pub struct DuplicateRecord {
    pub row: u32,
    pub key: String,
    pub source: DuplicateSource,
}

/// Run-level warning attributed to a sheet (e.g. absent optional sheet).
#[derive(Debug, Clone, Serialize)]
pub struct RunWarning {
    pub sheet: &'static str,
    pub message: String,
}

// ==========================================
// SheetOutcome - Aggregate Per Worksheet
// ==========================================
#[derive(Debug, Clone, Serialize)]
pub struct SheetOutcome {
    pub sheet: &'static str,
    pub present: bool,
    pub status: SheetStatus,
    pub processed: u32,
    pub inserted: u32,
    pub updated: u32,
    pub skipped: u32,
    pub failed: u32,
    pub warnings: Vec<String>,
    pub errors: Vec<RowError>,
    pub duplicates: Vec<DuplicateRecord>,
    pub rows: Vec<RowOutcome>,
    pub cleared: bool,
}

impl SheetOutcome {
    pub fn new(kind: EntityKind, present: bool) -> Self {
        Self {
            sheet: kind.sheet_name(),
            present,
            status: if present {
                SheetStatus::Pending
            } else {
                SheetStatus::Skipped
            },
            processed: 0,
            inserted: 0,
            updated: 0,
            skipped: 0,
            failed: 0,
            warnings: Vec::new(),
            errors: Vec::new(),
            duplicates: Vec::new(),
            rows: Vec::new(),
            cleared: false,
        }
    }

    /// Sheet status right after validation, before any persistence.
    pub fn resolve_validation_status(&mut self) {
        self.status = if self.failed > 0 {
            SheetStatus::Invalid
        } else if self.processed > 0 {
            if self.skipped > 0 {
                SheetStatus::ValidatedWithSkips
            } else {
                SheetStatus::Validated
            }
        } else if self.skipped > 0 {
            SheetStatus::Skipped
        } else {
            SheetStatus::Empty
        };
    }

    /// Sheet status after the commit pass touched it.
    pub fn resolve_commit_status(&mut self) {
        if self.inserted > 0 {
            self.status = if self.skipped > 0 {
                SheetStatus::CommittedWithSkips
            } else {
                SheetStatus::Committed
            };
        } else if self.processed == 0 && self.skipped > 0 {
            self.status = SheetStatus::Skipped;
        }
    }
}

// ==========================================
// ImportTotals - Run-Level Counters
// ==========================================
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct ImportTotals {
    pub processed: u32,
    pub inserted: u32,
    pub updated: u32,
    pub skipped: u32,
    pub failed: u32,
    pub duplicates: u32,
}

// ==========================================
// ImportReport - Final Run Artifact
// ==========================================
#[derive(Debug, Clone, Serialize)]
pub struct ImportReport {
    pub batch_id: String,
    pub template_version: &'static str,
    pub preview: bool,
    pub mode: ImportMode,
    pub clear_tables: bool,
    pub cleared_tables: Vec<&'static str>,
    pub file_name: String,
    pub totals: ImportTotals,
    pub warnings: Vec<RunWarning>,
    pub sheets: Vec<SheetOutcome>,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub duration_ms: u64,
}

impl ImportReport {
    pub fn sheet(&self, kind: EntityKind) -> Option<&SheetOutcome> {
        self.sheets.iter().find(|s| s.sheet == kind.sheet_name())
    }

    /// Recompute run totals from the per-sheet aggregates.
    pub fn recompute_totals(&mut self) {
        let mut totals = ImportTotals::default();
        for sheet in &self.sheets {
            totals.processed += sheet.processed;
            totals.inserted += sheet.inserted;
            totals.updated += sheet.updated;
            totals.skipped += sheet.skipped;
            totals.failed += sheet.failed;
            totals.duplicates += sheet.duplicates.len() as u32;
        }
        self.totals = totals;
    }
}

// ==========================================
// ImportLogEntry - Audit Trail Row
// ==========================================
// One row per sheet per run in `imports_log`. JSON columns keep
// the full warning/error/duplicate detail for later inspection.
#[derive(Debug, Clone, Serialize)]
pub struct ImportLogEntry {
    pub batch_id: String,
    pub sheet_name: &'static str,
    pub file_name: String,
    pub template_version: &'static str,
    pub preview: bool,
    pub status: &'static str,
    pub totals: Value,
    pub warnings: Value,
    pub errors: Value,
    pub duplicates: Value,
    pub metadata: Value,
    pub duration_ms: u64,
    pub requested_by: String,
}
