// ==========================================
// Asset Back Office - Import Error Types
// ==========================================
// Tooling: thiserror derive macros
// Structural failures abort the whole run before any mutation;
// they carry the product's user-facing (Spanish) messages. Row
// level validation issues are NOT errors here - they live inside
// the report.
// ==========================================

use crate::repository::error::RepositoryError;
use thiserror::Error;

/// Import engine error type
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== entry contract =====
    #[error("El usuario {actor} no tiene permiso para importar activos.")]
    Forbidden { actor: String },

    #[error("Archivo inválido.")]
    InvalidPayload,

    #[error("El archivo supera el tamaño máximo permitido ({limit_bytes} bytes).")]
    FileTooLarge { limit_bytes: usize },

    // ===== workbook structure =====
    #[error("No fue posible leer el archivo: {0}")]
    WorkbookParse(String),

    #[error("La hoja \"{sheet}\" es obligatoria en la plantilla.")]
    MissingRequiredSheet { sheet: &'static str },

    #[error("La hoja \"{sheet}\" no incluye las columnas obligatorias: {columns}")]
    MissingMandatoryColumns { sheet: &'static str, columns: String },

    #[error("El archivo supera el límite de {limit} activos.")]
    AssetRowLimitExceeded { limit: usize },

    // ===== commit phase =====
    // message is built at the call site (the product wording names
    // the referencing record, not just the missing key)
    #[error("{message}")]
    UnresolvedReference { message: String },

    #[error("Error al guardar la hoja \"{sheet}\" en la fila {row}: {message}")]
    Persistence {
        sheet: &'static str,
        row: u32,
        message: String,
    },

    // ===== collaborators =====
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<rusqlite::Error> for ImportError {
    fn from(err: rusqlite::Error) -> Self {
        ImportError::Repository(RepositoryError::from(err))
    }
}

/// Result type alias
pub type ImportResult<T> = Result<T, ImportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn structural_failures_render_product_messages() {
        let err = ImportError::MissingRequiredSheet { sheet: "assets" };
        assert_eq!(
            err.to_string(),
            "La hoja \"assets\" es obligatoria en la plantilla."
        );

        let err = ImportError::AssetRowLimitExceeded { limit: 500 };
        assert_eq!(err.to_string(), "El archivo supera el límite de 500 activos.");
    }
}
