// ==========================================
// Tecnova POS - product importer trait
// ==========================================
// Responsibility: import entry points (no implementation)
// ==========================================

use crate::domain::import::{ImportOptions, ImportSummary};
use crate::importer::error::ImportResult;
use async_trait::async_trait;
use futures::Stream;
use std::fmt::Display;

// ==========================================
// ProductImporter Trait
// ==========================================
// Implementor: ProductImporterImpl
#[async_trait]
pub trait ProductImporter: Send + Sync {
    /// Builds run options from optional request parameters.
    ///
    /// # Arguments
    /// - mode: raw `mode` parameter (only "upsert" selects upsert)
    /// - dry_run: raw `dryRun` parameter (absent uses the configured default)
    /// - requested_by: caller id for the audit line
    async fn resolve_options(
        &self,
        mode: Option<&str>,
        dry_run: Option<&str>,
        requested_by: Option<String>,
    ) -> ImportResult<ImportOptions>;

    /// Imports a CSV upload delivered as ordered byte chunks.
    ///
    /// # Returns
    /// - Ok(ImportSummary): run completed (per-row and batch-write
    ///   failures are inside the summary)
    /// - Err: structural failure, no summary
    ///
    /// # Pipeline
    /// 1. header resolution (first line)
    /// 2. row parsing, normalisation, in-file duplicate check
    /// 3. batch reconciliation every `batch_size` accepted rows
    /// 4. final partial batch on end of stream
    async fn import_stream<S, B, E>(
        &self,
        stream: S,
        options: ImportOptions,
    ) -> ImportResult<ImportSummary>
    where
        S: Stream<Item = Result<B, E>> + Send + Unpin,
        B: AsRef<[u8]> + Send,
        E: Display + Send;

    /// Imports an in-memory upload.
    async fn import_bytes(
        &self,
        data: &[u8],
        options: ImportOptions,
    ) -> ImportResult<ImportSummary>;
}
