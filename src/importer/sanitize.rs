// ==========================================
// Asset Back Office - Field Normalizers
// ==========================================
// Pure functions from raw worksheet cells to canonical values.
// Contract: an absent/blank cell is never an error (Ok(None));
// only malformed *present* input reports InvalidCell. Callers
// attach the field-specific message.
// ==========================================

use calamine::Data;
use serde_json::{Map, Value};

/// A present cell whose value cannot be normalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidCell;

/// Normalizer outcome: Ok(None) = absent, Err = present but malformed.
pub type Sanitized<T> = Result<Option<T>, InvalidCell>;

/// Blank cells: empty, or whitespace-only text.
pub fn is_blank(value: &Data) -> bool {
    match value {
        Data::Empty => true,
        Data::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

/// Render a cell as trimmed text. Numeric cells keep their integer
/// shape when whole (Excel stores "123" as 123.0). Blank -> None.
pub fn cell_to_string(value: &Data) -> Option<String> {
    let text = match value {
        Data::Empty => return None,
        Data::String(s) => s.trim().to_string(),
        Data::Int(n) => n.to_string(),
        Data::Float(f) => {
            if f.fract() == 0.0 && f.is_finite() && f.abs() < 1e15 {
                format!("{}", *f as i64)
            } else {
                f.to_string()
            }
        }
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => dt.to_string(),
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.trim().to_string(),
        Data::Error(_) => return None,
    };
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Codes: trimmed + upper-cased. Blank -> None.
pub fn normalize_code(value: &Data) -> Option<String> {
    cell_to_string(value).map(|s| s.to_uppercase())
}

/// Names and free text: trimmed. Blank -> None.
pub fn normalize_name(value: &Data) -> Option<String> {
    cell_to_string(value)
}

/// Asset tags follow the code rule (trimmed + upper-cased).
pub fn normalize_asset_tag(value: &Data) -> Option<String> {
    normalize_code(value)
}

/// Booleans: real booleans, 0/1 numbers, or the usual string tokens.
pub fn normalize_boolean(value: &Data) -> Sanitized<bool> {
    if is_blank(value) {
        return Ok(None);
    }
    match value {
        Data::Bool(b) => Ok(Some(*b)),
        Data::Int(n) => match n {
            1 => Ok(Some(true)),
            0 => Ok(Some(false)),
            _ => Err(InvalidCell),
        },
        Data::Float(f) => {
            if *f == 1.0 {
                Ok(Some(true))
            } else if *f == 0.0 {
                Ok(Some(false))
            } else {
                Err(InvalidCell)
            }
        }
        Data::String(s) => match s.trim().to_lowercase().as_str() {
            "true" | "1" | "yes" | "y" => Ok(Some(true)),
            "false" | "0" | "no" | "n" => Ok(Some(false)),
            _ => Err(InvalidCell),
        },
        _ => Err(InvalidCell),
    }
}

/// Integers: integral numbers or numeric strings. Non-integral -> invalid.
pub fn normalize_integer(value: &Data) -> Sanitized<i64> {
    if is_blank(value) {
        return Ok(None);
    }
    match value {
        Data::Int(n) => Ok(Some(*n)),
        Data::Float(f) => {
            if f.fract() == 0.0 && f.is_finite() {
                Ok(Some(*f as i64))
            } else {
                Err(InvalidCell)
            }
        }
        Data::String(s) => {
            let trimmed = s.trim();
            if let Ok(n) = trimmed.parse::<i64>() {
                return Ok(Some(n));
            }
            match trimmed.parse::<f64>() {
                Ok(f) if f.fract() == 0.0 && f.is_finite() => Ok(Some(f as i64)),
                _ => Err(InvalidCell),
            }
        }
        _ => Err(InvalidCell),
    }
}

/// Decimals: numbers or numeric strings; comma decimal separator tolerated.
pub fn normalize_decimal(value: &Data) -> Sanitized<f64> {
    if is_blank(value) {
        return Ok(None);
    }
    match value {
        Data::Int(n) => Ok(Some(*n as f64)),
        Data::Float(f) => {
            if f.is_finite() {
                Ok(Some(*f))
            } else {
                Err(InvalidCell)
            }
        }
        Data::String(s) => {
            let normalized = s.trim().replace(',', ".");
            match normalized.parse::<f64>() {
                Ok(f) if f.is_finite() => Ok(Some(f)),
                _ => Err(InvalidCell),
            }
        }
        _ => Err(InvalidCell),
    }
}

/// Emails: trimmed + lower-cased, must be shaped local@domain.tld.
pub fn normalize_email(value: &Data) -> Sanitized<String> {
    let Some(text) = cell_to_string(value) else {
        return Ok(None);
    };
    if is_valid_email(&text) {
        Ok(Some(text.to_lowercase()))
    } else {
        Err(InvalidCell)
    }
}

fn is_valid_email(text: &str) -> bool {
    let mut parts = text.split('@');
    let (Some(local), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
        return false;
    };
    if local.is_empty() || local.chars().any(char::is_whitespace) {
        return false;
    }
    let mut labels = domain.split('.');
    let has_dot = domain.contains('.');
    has_dot
        && !domain.chars().any(char::is_whitespace)
        && labels.all(|label| !label.is_empty())
}

/// JSON extension objects: a string that parses to a JSON object.
/// Any other present value is invalid.
pub fn normalize_json_object(value: &Data) -> Sanitized<Map<String, Value>> {
    if is_blank(value) {
        return Ok(None);
    }
    let Data::String(s) = value else {
        return Err(InvalidCell);
    };
    match serde_json::from_str::<Value>(s.trim()) {
        Ok(Value::Object(map)) => Ok(Some(map)),
        _ => Err(InvalidCell),
    }
}
