// ==========================================
// Asset Back Office - Import Engine
// ==========================================
// Pipeline: workbook -> sanitize -> validators -> registry ->
// committer, driven by the orchestrator. schema holds the
// versioned template definitions.
// ==========================================

pub mod committer;
pub mod error;
pub mod orchestrator;
pub mod registry;
pub mod sanitize;
pub mod schema;
pub mod validators;
pub mod workbook;

pub use error::{ImportError, ImportResult};
pub use orchestrator::{AssetImporter, ImportRequest};
pub use registry::{LookupRegistry, LookupSource, PersistedLookup};
pub use schema::{
    definition, new_batch_id, SheetDefinition, ASSET_IMPORT_TEMPLATE_VERSION, MAX_ASSET_ROWS,
    MAX_IMPORT_FILE_SIZE_BYTES,
};
