// ==========================================
// Asset Back Office - Row Validators
// ==========================================
// One validator per entity kind. Reference rules differ by field:
// hard references (category, status, cost-center department) fail
// the row; soft references (parents, asset side links) only warn
// and the committer resolves them to NULL when still absent.
// All messages are the product's user-facing Spanish strings.
// ==========================================

use crate::domain::rows::{
    AssetCategoryRow, AssetRow, AssetStatusRow, CostCenterRow, DepartmentRow,
    DepreciationMethodRow, DocumentTypeRow, LocationRow, ProviderRow, ResponsibleRow,
    SheetRowData,
};
use crate::domain::types::EntityKind;
use crate::importer::registry::LookupRegistry;
use crate::importer::sanitize::{
    is_blank, normalize_asset_tag, normalize_boolean, normalize_code, normalize_decimal,
    normalize_email, normalize_integer, normalize_json_object, normalize_name,
};
use crate::importer::workbook::RawRow;

/// Outcome of validating one raw row. `data` is present only when
/// the row has no errors; `key` is computed regardless so duplicate
/// detection still sees rows that failed other fields.
#[derive(Debug)]
pub struct RowValidation {
    pub key: Option<String>,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub data: Option<SheetRowData>,
}

pub fn validate_row(kind: EntityKind, row: &RawRow, registry: &LookupRegistry) -> RowValidation {
    match kind {
        EntityKind::DepreciationMethods => validate_depreciation_method(row),
        EntityKind::AssetCategories => validate_asset_category(row, registry),
        EntityKind::AssetStatuses => validate_asset_status(row),
        EntityKind::DocumentTypes => validate_document_type(row),
        EntityKind::Departments => validate_department(row, registry),
        EntityKind::CostCenters => validate_cost_center(row, registry),
        EntityKind::Locations => validate_location(row, registry),
        EntityKind::Responsibles => validate_responsible(row, registry),
        EntityKind::Providers => validate_provider(row),
        EntityKind::Assets => validate_asset(row, registry),
    }
}

// ==========================================
// Field Helpers
// ==========================================

fn required_code(row: &RawRow, field: &str, errors: &mut Vec<String>) -> Option<String> {
    let code = normalize_code(row.cell(field));
    if code.is_none() {
        errors.push(format!("El campo {field} es obligatorio."));
    }
    code
}

fn required_name(row: &RawRow, field: &str, errors: &mut Vec<String>) -> Option<String> {
    let name = normalize_name(row.cell(field));
    if name.is_none() {
        errors.push(format!("El campo {field} es obligatorio."));
    }
    name
}

fn optional_text(row: &RawRow, field: &str) -> Option<String> {
    normalize_name(row.cell(field))
}

/// Optional code field. Distinguishes blank (None, no message) from
/// present-but-unreadable (None plus an "inválido" error).
fn optional_code(row: &RawRow, field: &str, errors: &mut Vec<String>) -> Option<String> {
    let cell = row.cell(field);
    if is_blank(cell) {
        return None;
    }
    match normalize_code(cell) {
        Some(code) => Some(code),
        None => {
            errors.push(format!("El campo {field} es inválido."));
            None
        }
    }
}

fn optional_decimal(row: &RawRow, field: &str, errors: &mut Vec<String>) -> Option<f64> {
    let cell = row.cell(field);
    if is_blank(cell) {
        return None;
    }
    match normalize_decimal(cell) {
        Ok(value) => value,
        Err(_) => {
            errors.push(format!("El campo {field} es inválido."));
            None
        }
    }
}

fn optional_positive_integer(row: &RawRow, field: &str, errors: &mut Vec<String>) -> Option<i64> {
    let cell = row.cell(field);
    if is_blank(cell) {
        return None;
    }
    match normalize_integer(cell) {
        Ok(Some(value)) if value > 0 => Some(value),
        _ => {
            errors.push(format!("El campo {field} debe ser un entero positivo."));
            None
        }
    }
}

fn optional_email(row: &RawRow, field: &str, errors: &mut Vec<String>) -> Option<String> {
    match normalize_email(row.cell(field)) {
        Ok(value) => value,
        Err(_) => {
            errors.push("Correo electrónico inválido".to_string());
            None
        }
    }
}

// ==========================================
// Per-Kind Validators
// ==========================================

fn validate_depreciation_method(row: &RawRow) -> RowValidation {
    let mut errors = Vec::new();
    let code = required_code(row, "code", &mut errors);
    let name = required_name(row, "name", &mut errors);

    let data = match (&code, &name, errors.is_empty()) {
        (Some(code), Some(name), true) => {
            Some(SheetRowData::DepreciationMethod(DepreciationMethodRow {
                code: code.clone(),
                name: name.clone(),
                description: optional_text(row, "description"),
                formula_notes: optional_text(row, "formula_notes"),
                default_period: optional_text(row, "default_period"),
            }))
        }
        _ => None,
    };

    RowValidation {
        key: code,
        errors,
        warnings: Vec::new(),
        data,
    }
}

fn validate_asset_category(row: &RawRow, registry: &LookupRegistry) -> RowValidation {
    let mut errors = Vec::new();
    let code = required_code(row, "code", &mut errors);
    let name = required_name(row, "name", &mut errors);

    let method_code = optional_code(row, "default_depreciation_method_code", &mut errors);
    if let Some(method) = &method_code {
        if registry.find(EntityKind::DepreciationMethods, method).is_none() {
            errors.push(format!("El método de depreciación {method} no existe."));
        }
    }

    let lifespan = optional_positive_integer(row, "default_lifespan_months", &mut errors);

    let data = match (&code, &name, errors.is_empty()) {
        (Some(code), Some(name), true) => Some(SheetRowData::AssetCategory(AssetCategoryRow {
            code: code.clone(),
            name: name.clone(),
            description: optional_text(row, "description"),
            default_depreciation_method_code: method_code,
            default_lifespan_months: lifespan,
        })),
        _ => None,
    };

    RowValidation {
        key: code,
        errors,
        warnings: Vec::new(),
        data,
    }
}

fn validate_asset_status(row: &RawRow) -> RowValidation {
    let mut errors = Vec::new();
    let code = required_code(row, "code", &mut errors);
    let name = required_name(row, "name", &mut errors);

    // blank means active
    let mut is_active = true;
    let cell = row.cell("is_active");
    if !is_blank(cell) {
        match normalize_boolean(cell) {
            Ok(Some(value)) => is_active = value,
            _ => errors.push("El campo is_active es inválido.".to_string()),
        }
    }

    let data = match (&code, &name, errors.is_empty()) {
        (Some(code), Some(name), true) => Some(SheetRowData::AssetStatus(AssetStatusRow {
            code: code.clone(),
            name: name.clone(),
            is_active,
        })),
        _ => None,
    };

    RowValidation {
        key: code,
        errors,
        warnings: Vec::new(),
        data,
    }
}

fn validate_document_type(row: &RawRow) -> RowValidation {
    let mut errors = Vec::new();
    let code = required_code(row, "code", &mut errors);
    let name = required_name(row, "name", &mut errors);

    let data = match (&code, &name, errors.is_empty()) {
        (Some(code), Some(name), true) => Some(SheetRowData::DocumentType(DocumentTypeRow {
            code: code.clone(),
            name: name.clone(),
            description: optional_text(row, "description"),
        })),
        _ => None,
    };

    RowValidation {
        key: code,
        errors,
        warnings: Vec::new(),
        data,
    }
}

fn validate_department(row: &RawRow, registry: &LookupRegistry) -> RowValidation {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();
    let code = required_code(row, "code", &mut errors);
    let name = required_name(row, "name", &mut errors);

    let parent_code = optional_code(row, "parent_code", &mut errors);
    if let Some(parent) = &parent_code {
        if registry.find(EntityKind::Departments, parent).is_none() {
            warnings.push(format!("El departamento padre {parent} no existe."));
        }
    }

    let data = match (&code, &name, errors.is_empty()) {
        (Some(code), Some(name), true) => Some(SheetRowData::Department(DepartmentRow {
            code: code.clone(),
            name: name.clone(),
            parent_code,
        })),
        _ => None,
    };

    RowValidation {
        key: code,
        errors,
        warnings,
        data,
    }
}

fn validate_cost_center(row: &RawRow, registry: &LookupRegistry) -> RowValidation {
    let mut errors = Vec::new();
    let code = required_code(row, "code", &mut errors);
    let name = required_name(row, "name", &mut errors);

    let department_code = optional_code(row, "department_code", &mut errors);
    if let Some(department) = &department_code {
        if registry.find(EntityKind::Departments, department).is_none() {
            errors.push(format!("El departamento {department} no existe."));
        }
    }

    let data = match (&code, &name, errors.is_empty()) {
        (Some(code), Some(name), true) => Some(SheetRowData::CostCenter(CostCenterRow {
            code: code.clone(),
            name: name.clone(),
            department_code,
        })),
        _ => None,
    };

    RowValidation {
        key: code,
        errors,
        warnings: Vec::new(),
        data,
    }
}

fn validate_location(row: &RawRow, registry: &LookupRegistry) -> RowValidation {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();
    let code = required_code(row, "code", &mut errors);
    let name = required_name(row, "name", &mut errors);

    let parent_code = optional_code(row, "parent_code", &mut errors);
    if let Some(parent) = &parent_code {
        if registry.find(EntityKind::Locations, parent).is_none() {
            warnings.push(format!("La ubicación padre {parent} no existe."));
        }
    }

    let latitude = optional_decimal(row, "latitude", &mut errors);
    let longitude = optional_decimal(row, "longitude", &mut errors);

    let data = match (&code, &name, errors.is_empty()) {
        (Some(code), Some(name), true) => Some(SheetRowData::Location(LocationRow {
            code: code.clone(),
            name: name.clone(),
            parent_code,
            address_line: optional_text(row, "address_line"),
            city: optional_text(row, "city"),
            region: optional_text(row, "region"),
            country: optional_text(row, "country"),
            postal_code: optional_text(row, "postal_code"),
            latitude,
            longitude,
        })),
        _ => None,
    };

    RowValidation {
        key: code,
        errors,
        warnings,
        data,
    }
}

fn validate_responsible(row: &RawRow, registry: &LookupRegistry) -> RowValidation {
    let mut errors = Vec::new();
    let name = required_name(row, "name", &mut errors);
    let key = name.as_ref().map(|n| n.to_lowercase());

    let email = optional_email(row, "email", &mut errors);

    let department_code = optional_code(row, "department_code", &mut errors);
    if let Some(department) = &department_code {
        if registry.find(EntityKind::Departments, department).is_none() {
            errors.push(format!("El departamento {department} no existe."));
        }
    }

    let data = match (&name, errors.is_empty()) {
        (Some(name), true) => Some(SheetRowData::Responsible(ResponsibleRow {
            name: name.clone(),
            email,
            phone: optional_text(row, "phone"),
            department_code,
        })),
        _ => None,
    };

    RowValidation {
        key,
        errors,
        warnings: Vec::new(),
        data,
    }
}

fn validate_provider(row: &RawRow) -> RowValidation {
    let mut errors = Vec::new();
    let name = required_name(row, "name", &mut errors);
    let key = name.as_ref().map(|n| n.to_lowercase());

    let contact_email = optional_email(row, "contact_email", &mut errors);

    let data = match (&name, errors.is_empty()) {
        (Some(name), true) => Some(SheetRowData::Provider(ProviderRow {
            name: name.clone(),
            contact_email,
            contact_phone: optional_text(row, "contact_phone"),
            tax_id: optional_text(row, "tax_id"),
            address_line: optional_text(row, "address_line"),
            city: optional_text(row, "city"),
            region: optional_text(row, "region"),
            country: optional_text(row, "country"),
            postal_code: optional_text(row, "postal_code"),
        })),
        _ => None,
    };

    RowValidation {
        key,
        errors,
        warnings: Vec::new(),
        data,
    }
}

fn validate_asset(row: &RawRow, registry: &LookupRegistry) -> RowValidation {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    let asset_tag = match normalize_asset_tag(row.cell("asset_tag")) {
        Some(tag) => Some(tag),
        None => {
            errors.push("El campo asset_tag es obligatorio.".to_string());
            None
        }
    };
    let name = required_name(row, "name", &mut errors);

    let mut parent_asset_tag = None;
    let parent_cell = row.cell("parent_asset_tag");
    if !is_blank(parent_cell) {
        match normalize_asset_tag(parent_cell) {
            Some(parent) => {
                if registry.find(EntityKind::Assets, &parent).is_none() {
                    warnings.push(format!("El activo padre {parent} no existe todavía."));
                }
                parent_asset_tag = Some(parent);
            }
            None => errors.push("El campo parent_asset_tag es inválido.".to_string()),
        }
    }

    let category_code = normalize_code(row.cell("asset_category_code"));
    match &category_code {
        None => errors.push("El campo asset_category_code es obligatorio.".to_string()),
        Some(category) => {
            if registry.find(EntityKind::AssetCategories, category).is_none() {
                errors.push(format!("La categoría {category} no existe."));
            }
        }
    }

    let status_code = normalize_code(row.cell("asset_status_code"));
    match &status_code {
        None => errors.push("El campo asset_status_code es obligatorio.".to_string()),
        Some(status) => {
            if registry.find(EntityKind::AssetStatuses, status).is_none() {
                errors.push(format!("El estado {status} no existe."));
            }
        }
    }

    let depreciation_method_code =
        optional_code(row, "depreciation_method_code", &mut errors);
    if let Some(method) = &depreciation_method_code {
        if registry.find(EntityKind::DepreciationMethods, method).is_none() {
            errors.push(format!("El método de depreciación {method} no existe."));
        }
    }

    let lifespan_months = optional_positive_integer(row, "lifespan_months", &mut errors);

    let initial_cost = optional_decimal(row, "initial_cost", &mut errors);
    let actual_cost = optional_decimal(row, "actual_cost", &mut errors);
    let residual_value = optional_decimal(row, "residual_value", &mut errors);
    let actual_book_value = optional_decimal(row, "actual_book_value", &mut errors);
    let cumulative_depreciation_value =
        optional_decimal(row, "cumulative_depreciation_value", &mut errors);

    let provider_name = normalize_name(row.cell("provider_name"));
    if let Some(provider) = &provider_name {
        if registry
            .find(EntityKind::Providers, &provider.to_lowercase())
            .is_none()
        {
            warnings.push(format!("El proveedor {provider} no existe."));
        }
    }

    let department_code = normalize_code(row.cell("department_code"));
    if let Some(department) = &department_code {
        if registry.find(EntityKind::Departments, department).is_none() {
            warnings.push(format!("El departamento {department} no existe."));
        }
    }

    let cost_center_code = normalize_code(row.cell("cost_center_code"));
    if let Some(cost_center) = &cost_center_code {
        if registry.find(EntityKind::CostCenters, cost_center).is_none() {
            warnings.push(format!("El centro de costo {cost_center} no existe."));
        }
    }

    let location_code = normalize_code(row.cell("location_code"));
    if let Some(location) = &location_code {
        if registry.find(EntityKind::Locations, location).is_none() {
            warnings.push(format!("La ubicación {location} no existe."));
        }
    }

    let responsible_name = normalize_name(row.cell("responsible_name"));
    if let Some(responsible) = &responsible_name {
        if registry
            .find(EntityKind::Responsibles, &responsible.to_lowercase())
            .is_none()
        {
            warnings.push(format!("El responsable {responsible} no existe."));
        }
    }

    let responsible_email = optional_email(row, "responsible_email", &mut errors);

    let mut additional_attributes = None;
    let attrs_cell = row.cell("additional_attributes");
    if !is_blank(attrs_cell) {
        match normalize_json_object(attrs_cell) {
            Ok(value) => additional_attributes = value,
            Err(_) => errors.push("Formato JSON inválido".to_string()),
        }
    }

    let data = match (&asset_tag, &name, &category_code, &status_code, errors.is_empty()) {
        (Some(asset_tag), Some(name), Some(category), Some(status), true) => {
            Some(SheetRowData::Asset(AssetRow {
                asset_tag: asset_tag.clone(),
                name: name.clone(),
                description: optional_text(row, "description"),
                alternative_number: optional_text(row, "alternative_number"),
                parent_asset_tag,
                asset_category_code: category.clone(),
                asset_status_code: status.clone(),
                depreciation_method_code,
                lifespan_months,
                depreciation_period: optional_text(row, "depreciation_period"),
                initial_cost,
                actual_cost,
                residual_value,
                actual_book_value,
                cumulative_depreciation_value,
                purchase_order_number: optional_text(row, "purchase_order_number"),
                transaction_number: optional_text(row, "transaction_number"),
                provider_name,
                department_code,
                cost_center_code,
                location_code,
                responsible_name,
                responsible_email,
                additional_attributes,
            }))
        }
        _ => None,
    };

    RowValidation {
        key: asset_tag,
        errors,
        warnings,
        data,
    }
}
