// ==========================================
// Tecnova POS - API error type
// ==========================================
// Responsibility: turn importer / repository failures into
//                 the `{message, detail?}` shape callers see
// ==========================================

use crate::i18n::t;
use crate::importer::ImportError;
use crate::repository::error::RepositoryError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// API boundary errors
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // Caller errors
    // ==========================================
    /// Structural upload failure (header, size, CSV, missing file)
    #[error("{message}")]
    InvalidUpload {
        message: String,
        detail: Option<String>,
    },

    #[error("no autenticado")]
    Unauthenticated,

    #[error("rate limit excedido")]
    RateLimited,

    // ==========================================
    // Server errors
    // ==========================================
    #[error("error de base de datos: {0}")]
    DatabaseError(String),

    #[error("error interno: {0}")]
    InternalError(String),
}

/// Storage failures inside the importer become server errors,
/// every other importer failure is the caller's upload.
impl From<ImportError> for ApiError {
    fn from(err: ImportError) -> Self {
        match err {
            ImportError::Storage(repo) => repo.into(),
            other => ApiError::InvalidUpload {
                message: other.message(),
                detail: other.detail(),
            },
        }
    }
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::LockError(msg) => {
                ApiError::InternalError(format!("lock de base de datos: {}", msg))
            }
            other => ApiError::DatabaseError(other.to_string()),
        }
    }
}

impl ApiError {
    /// HTTP status the transport layer should answer with.
    ///
    /// # Returns
    /// - 400: InvalidUpload
    /// - 401: Unauthenticated
    /// - 429: RateLimited
    /// - 500: DatabaseError / InternalError
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::InvalidUpload { .. } => 400,
            ApiError::Unauthenticated => 401,
            ApiError::RateLimited => 429,
            ApiError::DatabaseError(_) | ApiError::InternalError(_) => 500,
        }
    }

    /// Response body in the current locale.
    ///
    /// # Returns
    /// - ErrorBody: `detail` is set only for header failures;
    ///   database and internal messages are replaced by a generic text
    pub fn body(&self) -> ErrorBody {
        match self {
            ApiError::InvalidUpload { message, detail } => ErrorBody {
                message: message.clone(),
                detail: detail.clone(),
            },
            ApiError::Unauthenticated => ErrorBody::new(t("http.unauthenticated")),
            ApiError::RateLimited => ErrorBody::new(t("http.rate_limited")),
            ApiError::DatabaseError(_) | ApiError::InternalError(_) => {
                ErrorBody::new(t("http.internal"))
            }
        }
    }
}

/// Error response body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub detail: Option<String>,
}

impl ErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            detail: None,
        }
    }
}

/// Result alias
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_import_errors_are_bad_requests() {
        let cases = vec![
            ImportError::missing_name_column(),
            ImportError::FileTooLarge { limit: 5 * 1024 * 1024 },
            ImportError::MalformedCsv("unterminated quote".to_string()),
            ImportError::MissingFile,
        ];
        for err in cases {
            let api: ApiError = err.into();
            assert_eq!(api.status_code(), 400);
        }
    }

    #[test]
    fn test_header_error_body_has_detail() {
        let api: ApiError = ImportError::missing_name_column().into();
        let body = api.body();
        assert!(body.detail.is_some());

        let json = serde_json::to_value(ApiError::RateLimited.body()).unwrap();
        assert!(json.get("detail").is_none());
    }

    #[test]
    fn test_storage_errors_are_internal() {
        let api: ApiError =
            ImportError::Storage(RepositoryError::DatabaseQueryError("disk".to_string())).into();
        assert_eq!(api.status_code(), 500);
        assert!(!api.body().message.contains("disk"));

        assert_eq!(ApiError::Unauthenticated.status_code(), 401);
        assert_eq!(ApiError::RateLimited.status_code(), 429);
    }
}
