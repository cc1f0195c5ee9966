// ==========================================
// Asset Back Office - Repository Layer
// ==========================================
// Storage access over a shared SQLite connection: pre-loaded
// natural-key lookups and the import audit trail.
// ==========================================

pub mod error;
pub mod import_log_repo;
pub mod lookup_repo;

pub use error::{RepositoryError, RepositoryResult};
pub use import_log_repo::{ImportLogRecord, ImportLogRepository};
pub use lookup_repo::{LookupLoader, LookupRepository};
