// ==========================================
// Asset Back Office - Domain Layer
// ==========================================
// Entity kinds, normalized row data and the import run report
// model. No storage access here.
// ==========================================

pub mod report;
pub mod rows;
pub mod types;

pub use report::{
    DuplicateRecord, ImportLogEntry, ImportReport, ImportTotals, RowError, RowOutcome,
    RunWarning, SheetOutcome,
};
pub use rows::{
    AssetCategoryRow, AssetRow, AssetStatusRow, CostCenterRow, DepartmentRow,
    DepreciationMethodRow, DocumentTypeRow, LocationRow, ProviderRow, ResponsibleRow,
    SheetRowData,
};
pub use types::{DuplicateSource, EntityKind, ImportMode, RowStatus, SheetStatus};
