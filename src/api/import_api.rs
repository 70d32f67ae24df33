// ==========================================
// Inventory import API
// ==========================================
// Responsibility: request parameters -> importer run -> summary
// Transport-agnostic: the axum handler and tests both call it
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::config::{ConfigManager, ImportConfigReader};
use crate::domain::import::ImportSummary;
use crate::importer::{ProductImporter, ProductImporterImpl};
use crate::repository::{ProductImportRepository, ProductImportRepositoryImpl};
use futures::Stream;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::sync::{Arc, Mutex};
use tracing::warn;

/// Raw import parameters as received (query string).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportRequest {
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default, rename = "dryRun")]
    pub dry_run: Option<String>,
    /// Caller id, filled from the authenticated request
    #[serde(skip)]
    pub requested_by: Option<String>,
}

/// Rate limit settings read from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitSettings {
    pub max_requests: usize,
    pub window_ms: u64,
}

/// Inventory import API
pub struct ImportApi {
    importer: ProductImporterImpl<ProductImportRepositoryImpl, ConfigManager>,
}

impl ImportApi {
    /// Opens its own connections to `db_path`.
    ///
    /// # Arguments
    /// - db_path: database file path (schema must already exist)
    ///
    /// # Returns
    /// - Ok(ImportApi): repository and config each on their own connection
    /// - Err(ApiError::DatabaseError): the database could not be opened
    pub fn new(db_path: &str) -> ApiResult<Self> {
        let repo = ProductImportRepositoryImpl::new(db_path)?;
        let config = ConfigManager::new(db_path)?;
        Ok(Self {
            importer: ProductImporterImpl::new(repo, config),
        })
    }

    /// Shares one connection between repository and configuration.
    ///
    /// # Arguments
    /// - conn: shared connection; PRAGMAs are re-applied
    ///
    /// # Returns
    /// - Err(ApiError): PRAGMA setup failed or the lock is poisoned
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> ApiResult<Self> {
        let repo = ProductImportRepositoryImpl::from_connection(conn.clone())?;
        let config = ConfigManager::from_connection(conn)?;
        Ok(Self {
            importer: ProductImporterImpl::new(repo, config),
        })
    }

    /// Imports a CSV upload.
    ///
    /// # Arguments
    /// - chunks: upload body in arrival order
    /// - request: `mode` / `dryRun` parameters and caller id
    ///
    /// # Returns
    /// - Ok(ImportSummary): completed run (may carry UPSERT_FAIL)
    /// - Err(ApiError): structural failure, no summary
    pub async fn import_inventory<S, B, E>(
        &self,
        chunks: S,
        request: ImportRequest,
    ) -> ApiResult<ImportSummary>
    where
        S: Stream<Item = Result<B, E>> + Send + Unpin,
        B: AsRef<[u8]> + Send,
        E: Display + Send,
    {
        let options = self
            .importer
            .resolve_options(
                request.mode.as_deref(),
                request.dry_run.as_deref(),
                request.requested_by,
            )
            .await?;

        self.importer
            .import_stream(chunks, options)
            .await
            .map_err(|e| {
                warn!(error = %e, "inventory import rejected");
                ApiError::from(e)
            })
    }

    /// Imports an in-memory CSV.
    ///
    /// # Arguments
    /// - data: whole file contents
    /// - request: `mode` / `dryRun` parameters and caller id
    ///
    /// # Returns
    /// - Same as `import_inventory`
    pub async fn import_inventory_bytes(
        &self,
        data: &[u8],
        request: ImportRequest,
    ) -> ApiResult<ImportSummary> {
        let options = self
            .importer
            .resolve_options(
                request.mode.as_deref(),
                request.dry_run.as_deref(),
                request.requested_by,
            )
            .await?;

        Ok(self.importer.import_bytes(data, options).await?)
    }

    /// Effective per-caller rate limit.
    ///
    /// # Returns
    /// - RateLimitSettings: configured values, or 30 per 60000 ms
    pub async fn rate_limit_settings(&self) -> ApiResult<RateLimitSettings> {
        let config = self.importer.config();
        Ok(RateLimitSettings {
            max_requests: config.get_rate_limit_max_requests().await?,
            window_ms: config.get_rate_limit_window_ms().await?,
        })
    }

    /// Upload cap, used to bound request bodies at the router.
    pub async fn max_file_bytes(&self) -> ApiResult<usize> {
        Ok(self.importer.config().get_max_file_bytes().await?)
    }

    /// Number of stored products.
    pub async fn product_count(&self) -> ApiResult<usize> {
        Ok(self.importer.repository().count_products().await?)
    }

    pub fn config(&self) -> &ConfigManager {
        self.importer.config()
    }
}
