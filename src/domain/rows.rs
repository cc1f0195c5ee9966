// ==========================================
// Asset Back Office - Normalized Row Data
// ==========================================
// One typed struct per governed entity kind, plus the tagged
// union the validators emit. Fields mirror the import template
// columns after normalization; foreign keys stay as natural-key
// references until the committer resolves them to storage ids.
// ==========================================

use crate::domain::types::EntityKind;
use serde::Serialize;
use serde_json::{Map, Value};

#[derive(Debug, Clone, Serialize)]
pub struct DepreciationMethodRow {
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub formula_notes: Option<String>,
    pub default_period: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AssetCategoryRow {
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub default_depreciation_method_code: Option<String>,
    pub default_lifespan_months: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AssetStatusRow {
    pub code: String,
    pub name: String,
    pub is_active: bool, // defaults true when the column is blank
}

#[derive(Debug, Clone, Serialize)]
pub struct DocumentTypeRow {
    pub code: String,
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DepartmentRow {
    pub code: String,
    pub name: String,
    pub parent_code: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CostCenterRow {
    pub code: String,
    pub name: String,
    pub department_code: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LocationRow {
    pub code: String,
    pub name: String,
    pub parent_code: Option<String>,
    pub address_line: Option<String>,
    pub city: Option<String>,
    pub region: Option<String>,
    pub country: Option<String>,
    pub postal_code: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResponsibleRow {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub department_code: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProviderRow {
    pub name: String,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub tax_id: Option<String>,
    pub address_line: Option<String>,
    pub city: Option<String>,
    pub region: Option<String>,
    pub country: Option<String>,
    pub postal_code: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AssetRow {
    pub asset_tag: String,
    pub name: String,
    pub description: Option<String>,
    pub alternative_number: Option<String>,
    pub parent_asset_tag: Option<String>,
    pub asset_category_code: String,
    pub asset_status_code: String,
    pub depreciation_method_code: Option<String>,
    pub lifespan_months: Option<i64>,
    pub depreciation_period: Option<String>,
    pub initial_cost: Option<f64>,
    pub actual_cost: Option<f64>,
    pub residual_value: Option<f64>,
    pub actual_book_value: Option<f64>,
    pub cumulative_depreciation_value: Option<f64>,
    pub purchase_order_number: Option<String>,
    pub transaction_number: Option<String>,
    pub provider_name: Option<String>,
    pub department_code: Option<String>,
    pub cost_center_code: Option<String>,
    pub location_code: Option<String>,
    pub responsible_name: Option<String>,
    pub responsible_email: Option<String>,
    pub additional_attributes: Option<Map<String, Value>>,
}

// ==========================================
// SheetRowData - Tagged Union Over All Kinds
// ==========================================
// Serialized untagged so reports and audit logs carry the plain
// normalized object, the same shape a caller sees in the sheet.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum SheetRowData {
    DepreciationMethod(DepreciationMethodRow),
    AssetCategory(AssetCategoryRow),
    AssetStatus(AssetStatusRow),
    DocumentType(DocumentTypeRow),
    Department(DepartmentRow),
    CostCenter(CostCenterRow),
    Location(LocationRow),
    Responsible(ResponsibleRow),
    Provider(ProviderRow),
    Asset(AssetRow),
}

impl SheetRowData {
    pub fn kind(&self) -> EntityKind {
        match self {
            SheetRowData::DepreciationMethod(_) => EntityKind::DepreciationMethods,
            SheetRowData::AssetCategory(_) => EntityKind::AssetCategories,
            SheetRowData::AssetStatus(_) => EntityKind::AssetStatuses,
            SheetRowData::DocumentType(_) => EntityKind::DocumentTypes,
            SheetRowData::Department(_) => EntityKind::Departments,
            SheetRowData::CostCenter(_) => EntityKind::CostCenters,
            SheetRowData::Location(_) => EntityKind::Locations,
            SheetRowData::Responsible(_) => EntityKind::Responsibles,
            SheetRowData::Provider(_) => EntityKind::Providers,
            SheetRowData::Asset(_) => EntityKind::Assets,
        }
    }

    /// Natural key of the normalized data: upper-cased code, lower-cased
    /// name for name-keyed kinds, upper-cased tag for assets.
    pub fn natural_key(&self) -> String {
        match self {
            SheetRowData::DepreciationMethod(row) => row.code.clone(),
            SheetRowData::AssetCategory(row) => row.code.clone(),
            SheetRowData::AssetStatus(row) => row.code.clone(),
            SheetRowData::DocumentType(row) => row.code.clone(),
            SheetRowData::Department(row) => row.code.clone(),
            SheetRowData::CostCenter(row) => row.code.clone(),
            SheetRowData::Location(row) => row.code.clone(),
            SheetRowData::Responsible(row) => row.name.to_lowercase(),
            SheetRowData::Provider(row) => row.name.to_lowercase(),
            SheetRowData::Asset(row) => row.asset_tag.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn natural_key_lowercases_name_keyed_kinds() {
        let row = SheetRowData::Provider(ProviderRow {
            name: "Proveedor Uno".to_string(),
            contact_email: None,
            contact_phone: None,
            tax_id: None,
            address_line: None,
            city: None,
            region: None,
            country: None,
            postal_code: None,
        });
        assert_eq!(row.natural_key(), "proveedor uno");
        assert_eq!(row.kind(), EntityKind::Providers);
    }

    #[test]
    fn untagged_serialization_emits_plain_object() {
        let row = SheetRowData::AssetStatus(AssetStatusRow {
            code: "STS_X".to_string(),
            name: "Estado X".to_string(),
            is_active: true,
        });
        let value = serde_json::to_value(&row).unwrap();
        assert_eq!(value["code"], "STS_X");
        assert_eq!(value["is_active"], true);
        assert!(value.get("AssetStatus").is_none());
    }
}
