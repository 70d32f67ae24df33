// ==========================================
// Tecnova POS - import error type
// ==========================================
// Structural failures only: these abort a run before
// a summary exists. Per-row problems are RowError data.
// Tooling: thiserror derive
// ==========================================

use crate::i18n::{t, t_with_args};
use crate::repository::RepositoryError;
use thiserror::Error;

/// Import pipeline errors
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== Upload structure =====
    #[error("Archivo inválido: {detail}")]
    HeaderInvalid { detail: String },

    #[error("Archivo excede el límite de {limit} bytes")]
    FileTooLarge { limit: usize },

    #[error("CSV inválido: {0}")]
    MalformedCsv(String),

    #[error("No se adjuntó archivo CSV")]
    MissingFile,

    // ===== Transport =====
    #[error("fallo al leer la carga: {0}")]
    Upload(String),

    // ===== Storage =====
    #[error(transparent)]
    Storage(#[from] RepositoryError),
}

impl ImportError {
    /// Header validation failure for a header without `name`.
    pub fn missing_name_column() -> Self {
        ImportError::HeaderInvalid {
            detail: t("import.header_missing_name"),
        }
    }

    /// Localised top-level message for the response body.
    pub fn message(&self) -> String {
        match self {
            ImportError::HeaderInvalid { .. } => t("import.invalid_file"),
            ImportError::FileTooLarge { limit } => {
                t_with_args("import.file_too_large", &[("limit", &human_limit(*limit))])
            }
            ImportError::MalformedCsv(_) => t("import.invalid_csv"),
            ImportError::MissingFile => t("import.missing_file"),
            ImportError::Upload(_) => t("import.upload_failed"),
            ImportError::Storage(_) => t("http.internal"),
        }
    }

    /// Optional detail for the response body.
    pub fn detail(&self) -> Option<String> {
        match self {
            ImportError::HeaderInvalid { detail } => Some(detail.clone()),
            ImportError::MalformedCsv(detail) | ImportError::Upload(detail) => Some(detail.clone()),
            _ => None,
        }
    }

    /// Caller-side problems (bad upload) as opposed to server faults.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, ImportError::Storage(_))
    }
}

/// "5MB" for whole mebibytes, raw bytes otherwise.
fn human_limit(bytes: usize) -> String {
    const MIB: usize = 1024 * 1024;
    if bytes >= MIB && bytes % MIB == 0 {
        format!("{}MB", bytes / MIB)
    } else {
        format!("{} bytes", bytes)
    }
}

/// Result alias
pub type ImportResult<T> = Result<T, ImportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_human_limit() {
        assert_eq!(human_limit(5 * 1024 * 1024), "5MB");
        assert_eq!(human_limit(1000), "1000 bytes");
    }

    #[test]
    fn test_detail_and_client_classification() {
        let err = ImportError::MalformedCsv("quote".to_string());
        assert_eq!(err.detail().as_deref(), Some("quote"));
        assert!(err.is_client_error());

        let storage = ImportError::from(RepositoryError::LockError("poisoned".to_string()));
        assert!(!storage.is_client_error());
        assert!(storage.detail().is_none());
    }
}
