// ==========================================
// Asset Back Office - Workbook Reader
// ==========================================
// Tooling: calamine
// Turns an xlsx payload into raw sheets keyed by entity kind.
// Header row is row 1; each data row becomes a column-key -> cell
// map. Rows whose cells are all blank are dropped here, before
// validation ever sees them.
// ==========================================

use std::collections::HashMap;
use std::io::Cursor;

use calamine::{Data, Reader, Xlsx};
use tracing::debug;

use crate::domain::types::EntityKind;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::sanitize::is_blank;

static EMPTY_CELL: Data = Data::Empty;

// ==========================================
// RawRow
// ==========================================
/// One worksheet data row, cells keyed by normalized header.
#[derive(Debug, Clone)]
pub struct RawRow {
    /// 1-based worksheet row number (header is row 1).
    pub row_number: u32,
    pub cells: HashMap<String, Data>,
}

impl RawRow {
    /// Cell for a template column key; missing columns read as empty.
    pub fn cell(&self, key: &str) -> &Data {
        self.cells.get(key).unwrap_or(&EMPTY_CELL)
    }
}

// ==========================================
// SheetData
// ==========================================
/// One worksheet's raw content.
#[derive(Debug, Clone)]
pub struct SheetData {
    pub kind: EntityKind,
    pub headers: Vec<String>,
    pub rows: Vec<RawRow>,
}

impl SheetData {
    /// Columns from the given set missing in the header row.
    pub fn missing_columns(&self, columns: &'static [&'static str]) -> Vec<&'static str> {
        columns
            .iter()
            .filter(|col| !self.headers.iter().any(|h| h == *col))
            .copied()
            .collect()
    }
}

// ==========================================
// ParsedWorkbook
// ==========================================
/// All recognized worksheets of one upload. Sheets whose name does
/// not match a template sheet are ignored.
#[derive(Debug, Default)]
pub struct ParsedWorkbook {
    sheets: HashMap<EntityKind, SheetData>,
}

impl ParsedWorkbook {
    pub fn sheet(&self, kind: EntityKind) -> Option<&SheetData> {
        self.sheets.get(&kind)
    }

    pub fn contains(&self, kind: EntityKind) -> bool {
        self.sheets.contains_key(&kind)
    }
}

/// Parse an xlsx payload into raw sheets.
pub fn read_workbook(payload: &[u8]) -> ImportResult<ParsedWorkbook> {
    if payload.is_empty() {
        return Err(ImportError::InvalidPayload);
    }

    let cursor = Cursor::new(payload.to_vec());
    let mut workbook: Xlsx<_> =
        Xlsx::new(cursor).map_err(|e| ImportError::WorkbookParse(e.to_string()))?;

    let sheet_names = workbook.sheet_names().to_vec();
    let mut parsed = ParsedWorkbook::default();

    for name in sheet_names {
        let Some(kind) = match_sheet_name(&name) else {
            debug!(sheet = %name, "ignoring unrecognized worksheet");
            continue;
        };

        let range = workbook
            .worksheet_range(&name)
            .map_err(|e| ImportError::WorkbookParse(e.to_string()))?;

        let mut rows_iter = range.rows();
        let headers: Vec<String> = match rows_iter.next() {
            Some(header_row) => header_row.iter().map(normalize_header_key).collect(),
            None => Vec::new(),
        };

        let mut rows = Vec::new();
        for (pos, raw) in rows_iter.enumerate() {
            if raw.iter().all(is_blank) {
                continue;
            }
            let mut cells = HashMap::new();
            for (col, cell) in raw.iter().enumerate() {
                let Some(key) = headers.get(col) else {
                    continue;
                };
                if key.is_empty() {
                    continue;
                }
                cells.insert(key.clone(), cell.clone());
            }
            rows.push(RawRow {
                // +2: one for the header row, one for 1-based numbering
                row_number: (pos + 2) as u32,
                cells,
            });
        }

        debug!(sheet = %name, kind = ?kind, rows = rows.len(), "parsed worksheet");
        parsed.sheets.insert(kind, SheetData { kind, headers, rows });
    }

    Ok(parsed)
}

/// Header cells map to template column keys: accents stripped,
/// non-alphanumeric runs collapsed to a single underscore, edges
/// trimmed, lower-cased.
pub fn normalize_header_key(cell: &Data) -> String {
    let text = match cell {
        Data::String(s) => s.clone(),
        Data::Empty => return String::new(),
        other => other.to_string(),
    };
    let mut key = String::with_capacity(text.len());
    let mut pending_sep = false;
    for c in text.trim().chars().map(strip_accent) {
        if c.is_ascii_alphanumeric() {
            if pending_sep && !key.is_empty() {
                key.push('_');
            }
            key.push(c.to_ascii_lowercase());
            pending_sep = false;
        } else {
            pending_sep = true;
        }
    }
    key
}

fn match_sheet_name(name: &str) -> Option<EntityKind> {
    let normalized = name.trim().to_lowercase().replace([' ', '-'], "_");
    EntityKind::ALL
        .into_iter()
        .find(|kind| kind.sheet_name() == normalized)
}

fn strip_accent(c: char) -> char {
    match c {
        'á' | 'à' | 'ä' | 'â' => 'a',
        'é' | 'è' | 'ë' | 'ê' => 'e',
        'í' | 'ì' | 'ï' | 'î' => 'i',
        'ó' | 'ò' | 'ö' | 'ô' => 'o',
        'ú' | 'ù' | 'ü' | 'û' => 'u',
        'ñ' => 'n',
        'Á' | 'À' | 'Ä' | 'Â' => 'A',
        'É' | 'È' | 'Ë' | 'Ê' => 'E',
        'Í' | 'Ì' | 'Ï' | 'Î' => 'I',
        'Ó' | 'Ò' | 'Ö' | 'Ô' => 'O',
        'Ú' | 'Ù' | 'Ü' | 'Û' => 'U',
        'Ñ' => 'N',
        other => other,
    }
}
