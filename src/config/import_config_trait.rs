// ==========================================
// Tecnova POS - import config reader trait
// ==========================================
// Responsibility: configuration the import pipeline and the
//                 HTTP layer read (no writes, no business rules)
// ==========================================

use crate::domain::import::ImportMode;
use crate::repository::RepositoryResult;
use async_trait::async_trait;

// ==========================================
// ImportConfigReader Trait
// ==========================================
// Implementor: ConfigManager (config_kv table)
// Malformed stored values fall back to the default.
#[async_trait]
pub trait ImportConfigReader: Send + Sync {
    // ===== Pipeline =====

    /// Rows per reconciliation batch.
    ///
    /// # Default
    /// - 500 (values < 1 fall back, values above 5000 are clamped)
    async fn get_batch_size(&self) -> RepositoryResult<usize>;

    /// Upload size cap in bytes.
    ///
    /// # Returns
    /// - bytes; exceeding it aborts the run with FileTooLarge
    ///
    /// # Default
    /// - 5242880 (5 MiB)
    async fn get_max_file_bytes(&self) -> RepositoryResult<usize>;

    /// Mode used when the request does not name one.
    ///
    /// # Default
    /// - insert
    async fn get_default_mode(&self) -> RepositoryResult<ImportMode>;

    /// Dry-run flag used when the request does not name one.
    ///
    /// # Returns
    /// - true: runs validate and classify without writing
    ///
    /// # Default
    /// - true
    async fn get_default_dry_run(&self) -> RepositoryResult<bool>;

    // ===== Rate limiting =====

    /// Requests admitted per caller and window.
    ///
    /// # Default
    /// - 30
    async fn get_rate_limit_max_requests(&self) -> RepositoryResult<usize>;

    /// Sliding window length in milliseconds.
    ///
    /// # Default
    /// - 60000
    async fn get_rate_limit_window_ms(&self) -> RepositoryResult<u64>;
}
