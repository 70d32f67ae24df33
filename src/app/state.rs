// ==========================================
// Tecnova POS - application state
// ==========================================
// Responsibility: shared API instances and resources handed
//                 to every request handler
// ==========================================

use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::api::ImportApi;
use crate::app::rate_limit::{RateLimiter, SlidingWindowRateLimiter};
use crate::db::{init_schema, open_sqlite_connection};

/// Environment variable that overrides the database location.
pub const DB_PATH_ENV: &str = "TECNOVA_DB_PATH";

/// Application state (cheap to clone, shared by handlers)
#[derive(Clone)]
pub struct AppState {
    /// Database path
    pub db_path: String,

    /// Inventory import API
    pub import_api: Arc<ImportApi>,

    /// Per-caller admission control for imports
    pub rate_limiter: Arc<dyn RateLimiter>,

    /// Upload cap in bytes
    pub max_upload_bytes: usize,
}

impl AppState {
    /// Opens the database, bootstraps the schema and builds the APIs.
    ///
    /// # Arguments
    /// - db_path: database file path
    ///
    /// # Returns
    /// - Err(String): initialisation failure
    pub async fn new(db_path: String) -> Result<Self, String> {
        crate::i18n::init_from_env();
        tracing::info!(
            db_path = %db_path,
            locale = %crate::i18n::current_locale(),
            "initialising AppState"
        );

        let conn = open_sqlite_connection(&db_path)
            .map_err(|e| format!("no se pudo abrir la base de datos: {}", e))?;
        init_schema(&conn).map_err(|e| format!("no se pudo crear el esquema: {}", e))?;
        let conn = Arc::new(Mutex::new(conn));

        let import_api = Arc::new(
            ImportApi::from_connection(conn)
                .map_err(|e| format!("no se pudo crear ImportApi: {}", e))?,
        );

        let limits = import_api
            .rate_limit_settings()
            .await
            .map_err(|e| format!("no se pudo leer la configuración: {}", e))?;
        let max_upload_bytes = import_api
            .max_file_bytes()
            .await
            .map_err(|e| format!("no se pudo leer la configuración: {}", e))?;

        let rate_limiter: Arc<dyn RateLimiter> = Arc::new(SlidingWindowRateLimiter::new(
            limits.max_requests,
            Duration::from_millis(limits.window_ms),
        ));

        tracing::info!(
            rate_limit_max = limits.max_requests,
            rate_limit_window_ms = limits.window_ms,
            max_upload_bytes,
            "AppState ready"
        );

        Ok(Self {
            db_path,
            import_api,
            rate_limiter,
            max_upload_bytes,
        })
    }

    /// Replaces the rate limiter.
    pub fn with_rate_limiter(mut self, rate_limiter: Arc<dyn RateLimiter>) -> Self {
        self.rate_limiter = rate_limiter;
        self
    }
}

/// Default database path.
///
/// `TECNOVA_DB_PATH` wins when set; otherwise a file under the user data
/// directory, falling back to the working directory.
pub fn get_default_db_path() -> String {
    use std::path::PathBuf;

    if let Ok(path) = std::env::var(DB_PATH_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./tecnova_pos.db");

    if let Some(data_dir) = dirs::data_dir() {
        #[cfg(debug_assertions)]
        let dir = data_dir.join("tecnova-pos-dev");

        #[cfg(not(debug_assertions))]
        let dir = data_dir.join("tecnova-pos");

        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join("tecnova_pos.db");
        }
    }

    path.to_string_lossy().to_string()
}
