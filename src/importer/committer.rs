// ==========================================
// Asset Back Office - Commit Pass
// ==========================================
// Persists every validated row inside one transaction:
//   1. requested clears, dependency order reversed
//   2. inserts, dependency order forward
// A UNIQUE violation downgrades the row to a database duplicate
// and the pass continues; any other storage failure, or a hard
// reference that never materialized, aborts the transaction.
// ==========================================

use rusqlite::{params, Connection, Transaction};
use tracing::{debug, info};

use crate::domain::report::{DuplicateRecord, SheetOutcome};
use crate::domain::rows::SheetRowData;
use crate::domain::types::{DuplicateSource, EntityKind, RowStatus};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::registry::{LookupRegistry, PersistedLookup};
use crate::repository::error::RepositoryError;

/// Runs the clears and inserts for a commit-mode run. `sheets` is
/// indexed in `EntityKind::ALL` order. Returns the cleared table
/// names in dependency order.
pub fn persist(
    conn: &mut Connection,
    registry: &mut LookupRegistry,
    sheets: &mut [SheetOutcome],
    sheets_to_clear: &[EntityKind],
    actor: &str,
) -> ImportResult<Vec<&'static str>> {
    let tx = conn
        .transaction()
        .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

    let mut cleared = Vec::new();
    for kind in EntityKind::ALL.into_iter().rev() {
        if !sheets_to_clear.contains(&kind) {
            continue;
        }
        let table = kind.table_name();
        tx.execute(&format!("DELETE FROM {table}"), [])?;
        registry.clear_persisted(kind);
        if let Some(sheet) = sheets.iter_mut().find(|s| s.sheet == table) {
            sheet.cleared = true;
        }
        debug!(table, "cleared table before import");
        cleared.push(table);
    }
    // report clears in dependency order
    cleared.reverse();

    for (index, kind) in EntityKind::ALL.into_iter().enumerate() {
        let sheet = &mut sheets[index];
        if !sheet.present {
            continue;
        }

        for outcome in sheet.rows.iter_mut() {
            if outcome.status != RowStatus::Pending {
                continue;
            }
            match insert_row(&tx, registry, &outcome.data, actor) {
                Ok(record) => {
                    sheet.inserted += 1;
                    outcome.status = RowStatus::Inserted;
                    outcome.record_id = Some(record.id);
                    registry.register_persisted(kind, outcome.key.clone(), record);
                }
                Err(ImportError::Repository(err)) if err.is_unique_violation() => {
                    sheet.skipped += 1;
                    outcome.status = RowStatus::Duplicate;
                    sheet.duplicates.push(DuplicateRecord {
                        row: outcome.row_number,
                        key: outcome.key.clone(),
                        source: DuplicateSource::Database,
                    });
                }
                Err(err) => {
                    // unresolved hard references take this path too,
                    // so the failure names the sheet and row
                    return Err(ImportError::Persistence {
                        sheet: sheet.sheet,
                        row: outcome.row_number,
                        message: err.to_string(),
                    });
                }
            }
        }

        sheet.resolve_commit_status();
    }

    tx.commit()
        .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

    info!(cleared = cleared.len(), "commit pass finished");
    Ok(cleared)
}

/// Resolve a hard reference to its storage id or abort the run.
fn ensure_reference_id(
    registry: &LookupRegistry,
    kind: EntityKind,
    key: Option<&str>,
    message: impl FnOnce() -> String,
) -> ImportResult<Option<i64>> {
    let Some(key) = key else {
        return Ok(None);
    };
    match registry.resolve_id(kind, key) {
        Some(id) => Ok(Some(id)),
        None => Err(ImportError::UnresolvedReference { message: message() }),
    }
}

fn insert_row(
    tx: &Transaction<'_>,
    registry: &LookupRegistry,
    data: &SheetRowData,
    actor: &str,
) -> ImportResult<PersistedLookup> {
    match data {
        SheetRowData::DepreciationMethod(row) => {
            tx.execute(
                "INSERT INTO depreciation_methods (code, name, description, formula_notes, default_period)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![row.code, row.name, row.description, row.formula_notes, row.default_period],
            )?;
            Ok(PersistedLookup::new(tx.last_insert_rowid()))
        }
        SheetRowData::AssetCategory(row) => {
            let method_id = ensure_reference_id(
                registry,
                EntityKind::DepreciationMethods,
                row.default_depreciation_method_code.as_deref(),
                || {
                    format!(
                        "El método de depreciación {} no existe.",
                        row.default_depreciation_method_code.as_deref().unwrap_or_default()
                    )
                },
            )?;
            tx.execute(
                "INSERT INTO asset_categories (code, name, description, default_depreciation_method_id, default_lifespan_months)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![row.code, row.name, row.description, method_id, row.default_lifespan_months],
            )?;
            Ok(PersistedLookup {
                id: tx.last_insert_rowid(),
                default_depreciation_method_id: method_id,
            })
        }
        SheetRowData::AssetStatus(row) => {
            tx.execute(
                "INSERT INTO asset_statuses (code, name, is_active) VALUES (?1, ?2, ?3)",
                params![row.code, row.name, row.is_active],
            )?;
            Ok(PersistedLookup::new(tx.last_insert_rowid()))
        }
        SheetRowData::DocumentType(row) => {
            tx.execute(
                "INSERT INTO document_types (code, name, description) VALUES (?1, ?2, ?3)",
                params![row.code, row.name, row.description],
            )?;
            Ok(PersistedLookup::new(tx.last_insert_rowid()))
        }
        SheetRowData::Department(row) => {
            // soft reference: an absent parent persists as NULL
            let parent_id = row
                .parent_code
                .as_deref()
                .and_then(|code| registry.resolve_id(EntityKind::Departments, code));
            tx.execute(
                "INSERT INTO departments (code, name, parent_id) VALUES (?1, ?2, ?3)",
                params![row.code, row.name, parent_id],
            )?;
            Ok(PersistedLookup::new(tx.last_insert_rowid()))
        }
        SheetRowData::CostCenter(row) => {
            let department_id = ensure_reference_id(
                registry,
                EntityKind::Departments,
                row.department_code.as_deref(),
                || {
                    format!(
                        "El departamento {} no existe para el centro de costo {}.",
                        row.department_code.as_deref().unwrap_or_default(),
                        row.code
                    )
                },
            )?;
            tx.execute(
                "INSERT INTO cost_centers (code, name, department_id) VALUES (?1, ?2, ?3)",
                params![row.code, row.name, department_id],
            )?;
            Ok(PersistedLookup::new(tx.last_insert_rowid()))
        }
        SheetRowData::Location(row) => {
            let parent_id = row
                .parent_code
                .as_deref()
                .and_then(|code| registry.resolve_id(EntityKind::Locations, code));
            tx.execute(
                "INSERT INTO locations (code, name, parent_id, address_line, city, region, country, postal_code, latitude, longitude)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                params![
                    row.code,
                    row.name,
                    parent_id,
                    row.address_line,
                    row.city,
                    row.region,
                    row.country,
                    row.postal_code,
                    row.latitude,
                    row.longitude
                ],
            )?;
            Ok(PersistedLookup::new(tx.last_insert_rowid()))
        }
        SheetRowData::Responsible(row) => {
            let department_id = ensure_reference_id(
                registry,
                EntityKind::Departments,
                row.department_code.as_deref(),
                || {
                    format!(
                        "El departamento {} no existe para el responsable {}.",
                        row.department_code.as_deref().unwrap_or_default(),
                        row.name
                    )
                },
            )?;
            tx.execute(
                "INSERT INTO responsibles (name, email, phone, department_id) VALUES (?1, ?2, ?3, ?4)",
                params![row.name, row.email, row.phone, department_id],
            )?;
            Ok(PersistedLookup::new(tx.last_insert_rowid()))
        }
        SheetRowData::Provider(row) => {
            tx.execute(
                "INSERT INTO providers (name, contact_email, contact_phone, tax_id, address_line, city, region, country, postal_code)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    row.name,
                    row.contact_email,
                    row.contact_phone,
                    row.tax_id,
                    row.address_line,
                    row.city,
                    row.region,
                    row.country,
                    row.postal_code
                ],
            )?;
            Ok(PersistedLookup::new(tx.last_insert_rowid()))
        }
        SheetRowData::Asset(row) => insert_asset(tx, registry, row, actor),
    }
}

fn insert_asset(
    tx: &Transaction<'_>,
    registry: &LookupRegistry,
    row: &crate::domain::rows::AssetRow,
    actor: &str,
) -> ImportResult<PersistedLookup> {
    let category_id = ensure_reference_id(
        registry,
        EntityKind::AssetCategories,
        Some(&row.asset_category_code),
        || format!("La categoría {} no existe.", row.asset_category_code),
    )?;
    let status_id = ensure_reference_id(
        registry,
        EntityKind::AssetStatuses,
        Some(&row.asset_status_code),
        || format!("El estado {} no existe.", row.asset_status_code),
    )?;

    // soft references resolve to NULL when still absent
    let method_id = row
        .depreciation_method_code
        .as_deref()
        .and_then(|code| registry.resolve_id(EntityKind::DepreciationMethods, code));
    let parent_id = row
        .parent_asset_tag
        .as_deref()
        .and_then(|tag| registry.resolve_id(EntityKind::Assets, tag));
    let provider_id = row
        .provider_name
        .as_deref()
        .and_then(|name| registry.resolve_id(EntityKind::Providers, &name.to_lowercase()));
    let department_id = row
        .department_code
        .as_deref()
        .and_then(|code| registry.resolve_id(EntityKind::Departments, code));
    let cost_center_id = row
        .cost_center_code
        .as_deref()
        .and_then(|code| registry.resolve_id(EntityKind::CostCenters, code));
    let location_id = row
        .location_code
        .as_deref()
        .and_then(|code| registry.resolve_id(EntityKind::Locations, code));
    let responsible_id = row
        .responsible_name
        .as_deref()
        .and_then(|name| registry.resolve_id(EntityKind::Responsibles, &name.to_lowercase()));

    let additional_attributes = row
        .additional_attributes
        .as_ref()
        .map(|map| serde_json::Value::Object(map.clone()).to_string());

    tx.execute(
        "INSERT INTO assets (
            asset_tag, name, description, alternative_number, parent_asset_id,
            asset_category_id, asset_status_id, depreciation_method_id,
            lifespan_months, depreciation_period,
            initial_cost, actual_cost, residual_value, actual_book_value,
            cumulative_depreciation_value,
            purchase_order_number, transaction_number,
            provider_id, department_id, cost_center_id, location_id, responsible_id,
            created_by, updated_by, additional_attributes
        ) VALUES (
            ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15,
            ?16, ?17, ?18, ?19, ?20, ?21, ?22, ?23, ?24, ?25
        )",
        params![
            row.asset_tag,
            row.name,
            row.description,
            row.alternative_number,
            parent_id,
            category_id,
            status_id,
            method_id,
            row.lifespan_months,
            row.depreciation_period,
            row.initial_cost,
            row.actual_cost,
            row.residual_value,
            row.actual_book_value,
            row.cumulative_depreciation_value,
            row.purchase_order_number,
            row.transaction_number,
            provider_id,
            department_id,
            cost_center_id,
            location_id,
            responsible_id,
            actor,
            actor,
            additional_attributes
        ],
    )?;

    Ok(PersistedLookup::new(tx.last_insert_rowid()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use crate::domain::report::RowOutcome;
    use crate::domain::rows::AssetCategoryRow;

    fn sheets_with_pending_category(method_code: &str) -> Vec<SheetOutcome> {
        let mut sheets: Vec<SheetOutcome> = EntityKind::ALL
            .into_iter()
            .map(|kind| SheetOutcome::new(kind, false))
            .collect();
        let categories = sheets
            .iter_mut()
            .find(|s| s.sheet == "asset_categories")
            .expect("categories outcome");
        categories.present = true;
        categories.processed = 1;
        categories.rows.push(RowOutcome {
            row_number: 2,
            key: "CAT_X".to_string(),
            status: RowStatus::Pending,
            data: SheetRowData::AssetCategory(AssetCategoryRow {
                code: "CAT_X".to_string(),
                name: "Computación".to_string(),
                description: None,
                default_depreciation_method_code: Some(method_code.to_string()),
                default_lifespan_months: None,
            }),
            warnings: Vec::new(),
            record_id: None,
        });
        sheets
    }

    // a hard reference that never materialized surfaces with the
    // failing sheet and row, like any other storage failure
    #[test]
    fn unresolved_reference_identifies_sheet_and_row() {
        let mut conn = Connection::open_in_memory().expect("in-memory db");
        db::ensure_schema(&conn).expect("schema");
        let mut registry = LookupRegistry::new();
        let mut sheets = sheets_with_pending_category("GHOST");

        let err = persist(&mut conn, &mut registry, &mut sheets, &[], "tester")
            .expect_err("missing method");
        match err {
            ImportError::Persistence { sheet, row, message } => {
                assert_eq!(sheet, "asset_categories");
                assert_eq!(row, 2);
                assert_eq!(message, "El método de depreciación GHOST no existe.");
            }
            other => panic!("unexpected error: {other}"),
        }

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM asset_categories", [], |r| r.get(0))
            .expect("count");
        assert_eq!(count, 0);
    }
}
