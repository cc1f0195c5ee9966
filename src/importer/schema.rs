// ==========================================
// Asset Back Office - Import Template Schema
// ==========================================
// Versioned sheet definitions: labels, required flag and the
// mandatory/optional column sets per entity kind. Adding a
// column requires bumping ASSET_IMPORT_TEMPLATE_VERSION.
// ==========================================

use crate::domain::types::EntityKind;
use uuid::Uuid;

/// Template version stamped on every run and audit log entry.
pub const ASSET_IMPORT_TEMPLATE_VERSION: &str = "1.0";

/// Maximum accepted workbook payload. 5 MiB.
pub const MAX_IMPORT_FILE_SIZE_BYTES: usize = 5 * 1024 * 1024;

/// Maximum accepted rows on the assets sheet, checked after
/// validation and before any persistence.
pub const MAX_ASSET_ROWS: usize = 500;

/// Batch identifiers are plain v4 UUIDs.
pub fn new_batch_id() -> String {
    Uuid::new_v4().to_string()
}

// ==========================================
// SheetDefinition
// ==========================================
pub struct SheetDefinition {
    pub label: &'static str,
    pub required: bool,
    pub mandatory_columns: &'static [&'static str],
    pub optional_columns: &'static [&'static str],
}

/// Template definition for one entity kind's worksheet.
pub fn definition(kind: EntityKind) -> &'static SheetDefinition {
    match kind {
        EntityKind::DepreciationMethods => &SheetDefinition {
            label: "Métodos de depreciación",
            required: false,
            mandatory_columns: &["code", "name"],
            optional_columns: &["description", "formula_notes", "default_period"],
        },
        EntityKind::AssetCategories => &SheetDefinition {
            label: "Categorías de activo",
            required: false,
            mandatory_columns: &["code", "name"],
            optional_columns: &[
                "description",
                "default_depreciation_method_code",
                "default_lifespan_months",
            ],
        },
        EntityKind::AssetStatuses => &SheetDefinition {
            label: "Estados de activo",
            required: false,
            mandatory_columns: &["code", "name"],
            optional_columns: &["is_active"],
        },
        EntityKind::DocumentTypes => &SheetDefinition {
            label: "Tipos de documento",
            required: false,
            mandatory_columns: &["code", "name"],
            optional_columns: &["description"],
        },
        EntityKind::Departments => &SheetDefinition {
            label: "Departamentos",
            required: false,
            mandatory_columns: &["code", "name"],
            optional_columns: &["parent_code"],
        },
        EntityKind::CostCenters => &SheetDefinition {
            label: "Centros de costo",
            required: false,
            mandatory_columns: &["code", "name"],
            optional_columns: &["department_code"],
        },
        EntityKind::Locations => &SheetDefinition {
            label: "Ubicaciones",
            required: false,
            mandatory_columns: &["code", "name"],
            optional_columns: &[
                "parent_code",
                "address_line",
                "city",
                "region",
                "country",
                "postal_code",
                "latitude",
                "longitude",
            ],
        },
        EntityKind::Responsibles => &SheetDefinition {
            label: "Responsables",
            required: false,
            mandatory_columns: &["name"],
            optional_columns: &["email", "phone", "department_code"],
        },
        EntityKind::Providers => &SheetDefinition {
            label: "Proveedores",
            required: false,
            mandatory_columns: &["name"],
            optional_columns: &[
                "contact_email",
                "contact_phone",
                "tax_id",
                "address_line",
                "city",
                "region",
                "country",
                "postal_code",
            ],
        },
        EntityKind::Assets => &SheetDefinition {
            label: "Activos",
            required: true,
            mandatory_columns: &["asset_tag", "name", "asset_category_code", "asset_status_code"],
            optional_columns: &[
                "description",
                "alternative_number",
                "parent_asset_tag",
                "depreciation_method_code",
                "lifespan_months",
                "depreciation_period",
                "initial_cost",
                "actual_cost",
                "residual_value",
                "actual_book_value",
                "cumulative_depreciation_value",
                "purchase_order_number",
                "transaction_number",
                "provider_name",
                "department_code",
                "cost_center_code",
                "location_code",
                "responsible_name",
                "responsible_email",
                "additional_attributes",
            ],
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assets_is_the_only_required_sheet() {
        for kind in EntityKind::ALL {
            let def = definition(kind);
            assert_eq!(def.required, kind == EntityKind::Assets, "{:?}", kind);
        }
    }

    #[test]
    fn batch_ids_are_unique_uuids() {
        let a = new_batch_id();
        let b = new_batch_id();
        assert_ne!(a, b);
        assert_eq!(a.len(), 36);
    }

    #[test]
    fn mandatory_columns_match_template() {
        let assets = definition(EntityKind::Assets);
        assert_eq!(
            assets.mandatory_columns,
            &["asset_tag", "name", "asset_category_code", "asset_status_code"][..]
        );
        assert_eq!(assets.optional_columns.len(), 20);
    }
}
