// ==========================================
// Asset Back Office - SQLite Connection Setup
// ==========================================
// Every Connection::open goes through here so PRAGMA behavior is
// uniform: foreign_keys on, shared busy_timeout. ensure_schema
// creates the governed tables plus the imports_log audit trail.
// ==========================================

use rusqlite::Connection;
use std::time::Duration;

/// Default busy_timeout (milliseconds)
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// Uniform PRAGMA configuration.
///
/// foreign_keys and busy_timeout are per-connection settings and
/// must be applied to every connection separately.
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// Open a SQLite connection with the uniform configuration applied.
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// Create the governed tables and the audit trail when absent.
///
/// Natural keys carry UNIQUE constraints: codes and asset tags as
/// written, responsible and provider names case-insensitively.
pub fn ensure_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS depreciation_methods (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            code TEXT NOT NULL UNIQUE,
            name TEXT NOT NULL,
            description TEXT,
            formula_notes TEXT,
            default_period TEXT
        );

        CREATE TABLE IF NOT EXISTS asset_categories (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            code TEXT NOT NULL UNIQUE,
            name TEXT NOT NULL,
            description TEXT,
            default_depreciation_method_id INTEGER REFERENCES depreciation_methods(id),
            default_lifespan_months INTEGER
        );

        CREATE TABLE IF NOT EXISTS asset_statuses (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            code TEXT NOT NULL UNIQUE,
            name TEXT NOT NULL,
            is_active INTEGER NOT NULL DEFAULT 1
        );

        CREATE TABLE IF NOT EXISTS document_types (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            code TEXT NOT NULL UNIQUE,
            name TEXT NOT NULL,
            description TEXT
        );

        CREATE TABLE IF NOT EXISTS departments (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            code TEXT NOT NULL UNIQUE,
            name TEXT NOT NULL,
            parent_id INTEGER REFERENCES departments(id)
        );

        CREATE TABLE IF NOT EXISTS cost_centers (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            code TEXT NOT NULL UNIQUE,
            name TEXT NOT NULL,
            department_id INTEGER REFERENCES departments(id)
        );

        CREATE TABLE IF NOT EXISTS locations (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            code TEXT NOT NULL UNIQUE,
            name TEXT NOT NULL,
            parent_id INTEGER REFERENCES locations(id),
            address_line TEXT,
            city TEXT,
            region TEXT,
            country TEXT,
            postal_code TEXT,
            latitude REAL,
            longitude REAL
        );

        CREATE TABLE IF NOT EXISTS responsibles (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE COLLATE NOCASE,
            email TEXT,
            phone TEXT,
            department_id INTEGER REFERENCES departments(id)
        );

        CREATE TABLE IF NOT EXISTS providers (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE COLLATE NOCASE,
            contact_email TEXT,
            contact_phone TEXT,
            tax_id TEXT,
            address_line TEXT,
            city TEXT,
            region TEXT,
            country TEXT,
            postal_code TEXT
        );

        CREATE TABLE IF NOT EXISTS assets (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            asset_tag TEXT NOT NULL UNIQUE,
            name TEXT NOT NULL,
            description TEXT,
            alternative_number TEXT,
            parent_asset_id INTEGER REFERENCES assets(id),
            asset_category_id INTEGER NOT NULL REFERENCES asset_categories(id),
            asset_status_id INTEGER NOT NULL REFERENCES asset_statuses(id),
            depreciation_method_id INTEGER REFERENCES depreciation_methods(id),
            lifespan_months INTEGER,
            depreciation_period TEXT,
            initial_cost REAL,
            actual_cost REAL,
            residual_value REAL,
            actual_book_value REAL,
            cumulative_depreciation_value REAL,
            purchase_order_number TEXT,
            transaction_number TEXT,
            provider_id INTEGER REFERENCES providers(id),
            department_id INTEGER REFERENCES departments(id),
            cost_center_id INTEGER REFERENCES cost_centers(id),
            location_id INTEGER REFERENCES locations(id),
            responsible_id INTEGER REFERENCES responsibles(id),
            created_by TEXT,
            updated_by TEXT,
            additional_attributes TEXT
        );

        CREATE TABLE IF NOT EXISTS imports_log (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            batch_id TEXT NOT NULL,
            sheet_name TEXT NOT NULL,
            file_name TEXT NOT NULL,
            template_version TEXT NOT NULL,
            preview INTEGER NOT NULL,
            status TEXT NOT NULL,
            totals TEXT NOT NULL,
            warnings TEXT NOT NULL,
            errors TEXT NOT NULL,
            duplicates TEXT NOT NULL,
            metadata TEXT NOT NULL,
            duration_ms INTEGER NOT NULL,
            requested_by TEXT NOT NULL,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_imports_log_batch ON imports_log(batch_id);
        ",
    )
}
