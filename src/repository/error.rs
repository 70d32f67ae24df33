// ==========================================
// Tecnova POS - repository error type
// ==========================================
// Tooling: thiserror derive
// ==========================================

use thiserror::Error;

/// Storage-layer errors
#[derive(Error, Debug)]
pub enum RepositoryError {
    // ===== Database =====
    #[error("registro no encontrado: {entity} con id={id}")]
    NotFound { entity: String, id: String },

    #[error("fallo al obtener el lock de la base de datos: {0}")]
    LockError(String),

    #[error("fallo en la transacción: {0}")]
    DatabaseTransactionError(String),

    #[error("fallo en la consulta: {0}")]
    DatabaseQueryError(String),

    #[error("violación de unicidad: {0}")]
    UniqueConstraintViolation(String),

    #[error("violación de clave foránea: {0}")]
    ForeignKeyViolation(String),

    // ===== Data =====
    #[error("valor inválido (campo={field}): {message}")]
    FieldValueError { field: String, message: String },
}

impl From<rusqlite::Error> for RepositoryError {
    /// Constraint failures are classified by SQLite's extended result code.
    fn from(err: rusqlite::Error) -> Self {
        use rusqlite::ffi;

        match &err {
            rusqlite::Error::SqliteFailure(failure, msg)
                if failure.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                let detail = msg.clone().unwrap_or_else(|| err.to_string());
                match failure.extended_code {
                    ffi::SQLITE_CONSTRAINT_UNIQUE | ffi::SQLITE_CONSTRAINT_PRIMARYKEY => {
                        RepositoryError::UniqueConstraintViolation(detail)
                    }
                    ffi::SQLITE_CONSTRAINT_FOREIGNKEY => RepositoryError::ForeignKeyViolation(detail),
                    _ => RepositoryError::DatabaseQueryError(detail),
                }
            }
            rusqlite::Error::QueryReturnedNoRows => RepositoryError::NotFound {
                entity: "registro".to_string(),
                id: "-".to_string(),
            },
            _ => RepositoryError::DatabaseQueryError(err.to_string()),
        }
    }
}

/// Result alias
pub type RepositoryResult<T> = Result<T, RepositoryError>;
