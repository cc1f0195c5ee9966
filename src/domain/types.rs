// ==========================================
// Asset Back Office - Core Domain Types
// ==========================================
// Alignment: one variant per governed entity kind; sheet
// dispatch is enum-based, never string-keyed function maps.
// ==========================================

use serde::{Deserialize, Serialize};

// ==========================================
// EntityKind - Governed Entity Kinds
// ==========================================
// `ALL` lists the kinds in dependency order: every foreign key
// points at a kind that appears earlier in the sequence.
// Insertion follows `ALL`; table clearing follows it reversed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    DepreciationMethods,
    AssetCategories,
    AssetStatuses,
    DocumentTypes,
    Departments,
    CostCenters,
    Locations,
    Responsibles,
    Providers,
    Assets,
}

impl EntityKind {
    /// Dependency order for validation and insertion.
    pub const ALL: [EntityKind; 10] = [
        EntityKind::DepreciationMethods,
        EntityKind::AssetCategories,
        EntityKind::AssetStatuses,
        EntityKind::DocumentTypes,
        EntityKind::Departments,
        EntityKind::CostCenters,
        EntityKind::Locations,
        EntityKind::Responsibles,
        EntityKind::Providers,
        EntityKind::Assets,
    ];

    /// Worksheet name, identical to the database table name.
    pub fn sheet_name(&self) -> &'static str {
        match self {
            EntityKind::DepreciationMethods => "depreciation_methods",
            EntityKind::AssetCategories => "asset_categories",
            EntityKind::AssetStatuses => "asset_statuses",
            EntityKind::DocumentTypes => "document_types",
            EntityKind::Departments => "departments",
            EntityKind::CostCenters => "cost_centers",
            EntityKind::Locations => "locations",
            EntityKind::Responsibles => "responsibles",
            EntityKind::Providers => "providers",
            EntityKind::Assets => "assets",
        }
    }

    /// Table name in storage (same identifier as the sheet).
    pub fn table_name(&self) -> &'static str {
        self.sheet_name()
    }
}

// ==========================================
// ImportMode - Preview / Commit
// ==========================================
// Preview never mutates storage; commit runs in one transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportMode {
    Preview,
    Commit,
}

impl ImportMode {
    pub fn is_preview(&self) -> bool {
        matches!(self, ImportMode::Preview)
    }
}

// ==========================================
// RowStatus - Per-Row Lifecycle
// ==========================================
// pending -> validated (preview) | inserted | duplicate (commit).
// Rows with validation errors never materialize a RowOutcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RowStatus {
    Pending,
    Validated,
    Inserted,
    Duplicate,
}

// ==========================================
// SheetStatus - Per-Sheet Outcome
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SheetStatus {
    Pending,
    Skipped,
    Empty,
    Invalid,
    Validated,
    ValidatedWithSkips,
    Committed,
    CommittedWithSkips,
}

impl SheetStatus {
    /// Stable string used in the audit log `status` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            SheetStatus::Pending => "pending",
            SheetStatus::Skipped => "skipped",
            SheetStatus::Empty => "empty",
            SheetStatus::Invalid => "invalid",
            SheetStatus::Validated => "validated",
            SheetStatus::ValidatedWithSkips => "validated_with_skips",
            SheetStatus::Committed => "committed",
            SheetStatus::CommittedWithSkips => "committed_with_skips",
        }
    }
}

// ==========================================
// DuplicateSource - Where a Key Collision Was Seen
// ==========================================
// worksheet: an earlier row of the same sheet already used the key.
// database: the key is already persisted (pre-loaded lookup or a
// unique-constraint race at insert time).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicateSource {
    Worksheet,
    Database,
}
