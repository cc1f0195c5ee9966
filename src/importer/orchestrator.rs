// ==========================================
// Asset Back Office - Import Orchestrator
// ==========================================
// Drives a whole run: authorization, payload checks, workbook
// parsing, per-sheet validation in dependency order, the asset
// ceiling, the commit pass (commit mode only) and the audit log.
// Preview and commit share every step up to persistence and
// produce reports of identical shape.
// ==========================================

use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use chrono::Utc;
use rusqlite::Connection;
use tracing::{info, instrument, warn};

use crate::authorization::{CapabilityCheck, CAPABILITY_ASSET_IMPORT};
use crate::domain::report::{
    DuplicateRecord, ImportLogEntry, ImportReport, ImportTotals, RowError, RowOutcome,
    RunWarning, SheetOutcome,
};
use crate::domain::types::{DuplicateSource, EntityKind, ImportMode, RowStatus};
use crate::importer::committer;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::registry::LookupRegistry;
use crate::importer::schema::{
    definition, new_batch_id, ASSET_IMPORT_TEMPLATE_VERSION, MAX_ASSET_ROWS,
    MAX_IMPORT_FILE_SIZE_BYTES,
};
use crate::importer::validators::validate_row;
use crate::importer::workbook::{read_workbook, SheetData};
use crate::repository::error::RepositoryError;
use crate::repository::import_log_repo::ImportLogRepository;
use crate::repository::lookup_repo::LookupLoader;

// ==========================================
// ImportRequest
// ==========================================
/// One upload as received from the caller.
#[derive(Debug, Clone)]
pub struct ImportRequest {
    pub payload: Vec<u8>,
    pub file_name: String,
    pub mode: ImportMode,
    pub clear_tables: bool,
    pub requested_by: String,
}

// Mutable state threaded through the per-sheet validation pass.
struct RunState {
    mode: ImportMode,
    clear_tables: bool,
    registry: LookupRegistry,
    sheets: Vec<SheetOutcome>,
    warnings: Vec<RunWarning>,
    sheets_to_clear: Vec<EntityKind>,
}

// ==========================================
// AssetImporter
// ==========================================
pub struct AssetImporter<A: CapabilityCheck> {
    db: Arc<Mutex<Connection>>,
    lookups: Arc<dyn LookupLoader>,
    logs: ImportLogRepository,
    authorizer: A,
}

impl<A: CapabilityCheck> AssetImporter<A> {
    pub fn new(
        db: Arc<Mutex<Connection>>,
        lookups: Arc<dyn LookupLoader>,
        logs: ImportLogRepository,
        authorizer: A,
    ) -> Self {
        AssetImporter {
            db,
            lookups,
            logs,
            authorizer,
        }
    }

    /// Run one import. Structural failures abort before any storage
    /// mutation; row-level findings land in the returned report.
    #[instrument(skip(self, request), fields(file = %request.file_name, mode = ?request.mode))]
    pub async fn run(&self, request: ImportRequest) -> ImportResult<ImportReport> {
        if !self
            .authorizer
            .allows(&request.requested_by, CAPABILITY_ASSET_IMPORT)
        {
            warn!(actor = %request.requested_by, "import rejected: missing capability");
            return Err(ImportError::Forbidden {
                actor: request.requested_by.clone(),
            });
        }

        if request.payload.is_empty() {
            return Err(ImportError::InvalidPayload);
        }
        if request.payload.len() > MAX_IMPORT_FILE_SIZE_BYTES {
            return Err(ImportError::FileTooLarge {
                limit_bytes: MAX_IMPORT_FILE_SIZE_BYTES,
            });
        }

        let workbook = read_workbook(&request.payload)?;
        let persisted = self.lookups.load_all().await?;

        let started_at = Utc::now();
        let clock = Instant::now();
        let batch_id = new_batch_id();

        let mut state = RunState {
            mode: request.mode,
            clear_tables: request.clear_tables,
            registry: LookupRegistry::from_persisted(persisted),
            sheets: Vec::with_capacity(EntityKind::ALL.len()),
            warnings: Vec::new(),
            sheets_to_clear: Vec::new(),
        };

        for kind in EntityKind::ALL {
            let sheet = workbook.sheet(kind);
            check_worksheet(&mut state, kind, sheet)?;
        }

        let asset_rows = state
            .sheets
            .last()
            .map(|sheet| sheet.rows.len())
            .unwrap_or(0);
        if asset_rows > MAX_ASSET_ROWS {
            return Err(ImportError::AssetRowLimitExceeded {
                limit: MAX_ASSET_ROWS,
            });
        }

        let mut cleared_tables = Vec::new();
        if request.mode.is_preview() {
            // a preview announces the tables its matching commit
            // would clear, without touching storage
            cleared_tables = state
                .sheets_to_clear
                .iter()
                .map(|kind| kind.table_name())
                .collect();
            for sheet in &mut state.sheets {
                for row in &mut sheet.rows {
                    if row.status == RowStatus::Pending {
                        row.status = RowStatus::Validated;
                    }
                }
            }
        } else {
            let mut conn = self
                .db
                .lock()
                .map_err(|e| RepositoryError::LockError(e.to_string()))?;
            cleared_tables = committer::persist(
                &mut conn,
                &mut state.registry,
                &mut state.sheets,
                &state.sheets_to_clear,
                &request.requested_by,
            )?;
        }

        let duration_ms = clock.elapsed().as_millis() as u64;
        let mut report = ImportReport {
            batch_id,
            template_version: ASSET_IMPORT_TEMPLATE_VERSION,
            preview: request.mode.is_preview(),
            mode: request.mode,
            clear_tables: request.clear_tables,
            cleared_tables,
            file_name: request.file_name.clone(),
            totals: ImportTotals::default(),
            warnings: state.warnings,
            sheets: state.sheets,
            started_at,
            completed_at: Utc::now(),
            duration_ms,
        };
        report.recompute_totals();

        let entries = build_log_entries(&report, &request.requested_by);
        self.logs.insert_batch(&entries)?;

        info!(
            batch = %report.batch_id,
            processed = report.totals.processed,
            inserted = report.totals.inserted,
            failed = report.totals.failed,
            duplicates = report.totals.duplicates,
            "import run finished"
        );
        Ok(report)
    }
}

// ==========================================
// Per-Sheet Validation
// ==========================================
fn check_worksheet(
    state: &mut RunState,
    kind: EntityKind,
    sheet: Option<&SheetData>,
) -> ImportResult<()> {
    let def = definition(kind);
    let sheet_name = kind.sheet_name();

    let Some(sheet) = sheet else {
        if def.required {
            return Err(ImportError::MissingRequiredSheet { sheet: sheet_name });
        }
        let mut outcome = SheetOutcome::new(kind, false);
        let message = format!("La hoja \"{sheet_name}\" no está presente; se omite.");
        outcome.warnings.push(message.clone());
        state.warnings.push(RunWarning {
            sheet: sheet_name,
            message,
        });
        state.sheets.push(outcome);
        return Ok(());
    };

    let mut outcome = SheetOutcome::new(kind, true);

    if state.clear_tables {
        state.sheets_to_clear.push(kind);
        // commit runs forget persisted keys up front so neither the
        // duplicate check nor reference resolution sees doomed rows
        if !state.mode.is_preview() {
            state.registry.clear_persisted(kind);
        }
    }

    let missing = sheet.missing_columns(def.mandatory_columns);
    if !missing.is_empty() {
        return Err(ImportError::MissingMandatoryColumns {
            sheet: sheet_name,
            columns: missing.join(", "),
        });
    }
    let missing_optional = sheet.missing_columns(def.optional_columns);
    if !missing_optional.is_empty() {
        outcome.warnings.push(format!(
            "Columnas opcionales ausentes: {}",
            missing_optional.join(", ")
        ));
    }

    let mut seen_keys: HashSet<String> = HashSet::new();
    for raw in &sheet.rows {
        let mut validation = validate_row(kind, raw, &state.registry);

        if let Some(key) = &validation.key {
            if seen_keys.contains(key) {
                validation
                    .errors
                    .push(format!("Clave duplicada dentro de la hoja: {key}."));
                outcome.duplicates.push(DuplicateRecord {
                    row: raw.row_number,
                    key: key.clone(),
                    source: DuplicateSource::Worksheet,
                });
            }
            seen_keys.insert(key.clone());
        }

        if !validation.errors.is_empty() {
            outcome.failed += 1;
            outcome.errors.push(RowError {
                row: raw.row_number,
                messages: validation.errors,
            });
            continue;
        }

        let Some(data) = validation.data else {
            continue;
        };
        let key = validation.key.unwrap_or_default();

        // a clear-requested preview ignores persisted keys: the
        // matching commit would have cleared those tables first
        let skip_persisted_check = state.clear_tables && state.mode.is_preview();
        if !key.is_empty()
            && !skip_persisted_check
            && state.registry.contains_persisted(kind, &key)
        {
            outcome.skipped += 1;
            outcome.duplicates.push(DuplicateRecord {
                row: raw.row_number,
                key: key.clone(),
                source: DuplicateSource::Database,
            });
            outcome.rows.push(RowOutcome {
                row_number: raw.row_number,
                key,
                status: RowStatus::Duplicate,
                data,
                warnings: validation.warnings,
                record_id: None,
            });
            continue;
        }

        for message in &validation.warnings {
            outcome
                .warnings
                .push(format!("Fila {}: {message}", raw.row_number));
        }
        outcome.rows.push(RowOutcome {
            row_number: raw.row_number,
            key: key.clone(),
            status: RowStatus::Pending,
            data: data.clone(),
            warnings: validation.warnings,
            record_id: None,
        });
        outcome.processed += 1;
        state.registry.register_pending(kind, key, data);
    }

    outcome.resolve_validation_status();
    if state.clear_tables && state.sheets_to_clear.contains(&kind) {
        outcome.cleared = true;
    }
    state.sheets.push(outcome);
    Ok(())
}

// ==========================================
// Audit Trail
// ==========================================
fn build_log_entries(report: &ImportReport, requested_by: &str) -> Vec<ImportLogEntry> {
    report
        .sheets
        .iter()
        .map(|sheet| ImportLogEntry {
            batch_id: report.batch_id.clone(),
            sheet_name: sheet.sheet,
            file_name: report.file_name.clone(),
            template_version: report.template_version,
            preview: report.preview,
            status: sheet.status.as_str(),
            totals: serde_json::json!({
                "processed": sheet.processed,
                "inserted": sheet.inserted,
                "updated": sheet.updated,
                "failed": sheet.failed,
                "skipped": sheet.skipped,
                "duplicates": sheet.duplicates.len(),
                "warnings": sheet.warnings.len(),
            }),
            warnings: serde_json::json!(sheet.warnings),
            errors: serde_json::json!(sheet.errors),
            duplicates: serde_json::json!(sheet.duplicates),
            metadata: serde_json::json!({
                "preview": report.preview,
                "mode": report.mode,
                "clear_tables": report.clear_tables,
                "sheet_cleared": !report.preview && sheet.cleared,
                "sheet_clear_requested": report.clear_tables && sheet.cleared,
            }),
            duration_ms: report.duration_ms,
            requested_by: requested_by.to_string(),
        })
        .collect()
}
