// ==========================================
// Asset Back Office - Core Library
// ==========================================
// Bulk import engine for the asset registry: workbook parsing,
// per-sheet validation, preview/commit runs and the audit trail.
// Stack: Rust + SQLite
// ==========================================

// ==========================================
// Module Declarations
// ==========================================

// Domain layer - entity kinds, row data, run reports
pub mod domain;

// Repository layer - storage access
pub mod repository;

// Import layer - the engine itself
pub mod importer;

// Authorization seam
pub mod authorization;

// Database infrastructure (connection setup / uniform PRAGMAs)
pub mod db;

// Logging
pub mod logging;

// ==========================================
// Core Re-exports
// ==========================================

pub use authorization::{ActorAllowList, AllowAll, CapabilityCheck, CAPABILITY_ASSET_IMPORT};
pub use domain::report::{ImportReport, ImportTotals, SheetOutcome};
pub use domain::types::{DuplicateSource, EntityKind, ImportMode, RowStatus, SheetStatus};
pub use importer::{
    AssetImporter, ImportError, ImportRequest, ImportResult, ASSET_IMPORT_TEMPLATE_VERSION,
    MAX_ASSET_ROWS, MAX_IMPORT_FILE_SIZE_BYTES,
};
pub use repository::{ImportLogRepository, LookupLoader, LookupRepository, RepositoryError};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
