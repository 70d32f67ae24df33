// ==========================================
// Tecnova POS - product importer implementation
// ==========================================
// Responsibility: drive one import run from upload chunks to
//                 the final summary
// Flow: stream -> coordinator -> normalizer -> duplicate tracker
//       -> batch reconciler (plan, commit) -> summary
// ==========================================

use crate::config::ImportConfigReader;
use crate::domain::import::{
    parse_dry_run, ImportMode, ImportOptions, ImportSummary, NumberedRow, RowError, RowErrorCode,
    MAX_BATCH_SIZE,
};
use crate::i18n::t;
use crate::importer::batch_reconciler::{BatchOutcome, BatchReconciler};
use crate::importer::duplicate_tracker::DuplicateTracker;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::product_importer_trait::ProductImporter;
use crate::importer::row_normalizer::normalize_row;
use crate::importer::stream_coordinator::{RawRow, StreamCoordinator};
use crate::repository::{ProductImportRepository, RepositoryError};
use async_trait::async_trait;
use futures::{stream, Stream, StreamExt};
use std::convert::Infallible;
use std::fmt::Display;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

/// Chunk size used when replaying an in-memory upload.
const REPLAY_CHUNK_BYTES: usize = 64 * 1024;

// ==========================================
// ImportRun - per-run mutable state
// ==========================================
struct ImportRun {
    summary: ImportSummary,
    tracker: DuplicateTracker,
    pending: Vec<NumberedRow>,
    batch_size: usize,
    dry_run: bool,
    batches: usize,
    // set once a batch write fails; no further rows are read
    halted: bool,
}

impl ImportRun {
    fn new(options: &ImportOptions) -> Self {
        Self {
            summary: ImportSummary::new(options.mode, options.dry_run),
            tracker: DuplicateTracker::new(),
            pending: Vec::with_capacity(options.batch_size.min(4096)),
            batch_size: options.batch_size.clamp(1, MAX_BATCH_SIZE),
            dry_run: options.dry_run,
            batches: 0,
            halted: false,
        }
    }

    /// Counts, validates and queues rows, flushing full batches.
    async fn absorb<R: ProductImportRepository>(
        &mut self,
        rows: Vec<RawRow>,
        reconciler: &BatchReconciler<'_, R>,
    ) {
        for raw in rows {
            if self.halted {
                return;
            }
            self.summary.total += 1;

            let candidate = match normalize_row(&raw) {
                Ok(candidate) => candidate,
                Err(errors) => {
                    self.summary.skip_with(errors);
                    continue;
                }
            };

            if let Some(dup) = self.tracker.check(raw.row, &candidate) {
                self.summary.skip_with([dup]);
                continue;
            }

            self.pending.push(NumberedRow {
                row: raw.row,
                data: candidate,
            });
            if self.pending.len() >= self.batch_size {
                self.flush(reconciler).await;
            }
        }
    }

    /// Reconciles the pending batch. Counts are merged only after commit.
    async fn flush<R: ProductImportRepository>(&mut self, reconciler: &BatchReconciler<'_, R>) {
        if self.pending.is_empty() || self.halted {
            return;
        }
        let rows = std::mem::take(&mut self.pending);
        self.batches += 1;
        debug!(batch = self.batches, rows = rows.len(), "flushing batch");

        let mut outcome = match reconciler.plan(&rows).await {
            Ok(outcome) => outcome,
            Err(e) => {
                self.summary.skipped += rows.len();
                self.fail_batch(e);
                return;
            }
        };

        if !self.dry_run {
            if let Err(e) = reconciler.commit(&outcome).await {
                outcome.demote_writes();
                self.merge(outcome);
                self.fail_batch(e);
                return;
            }
        }
        self.merge(outcome);
    }

    fn merge(&mut self, outcome: BatchOutcome) {
        self.summary.created += outcome.created;
        self.summary.updated += outcome.updated;
        self.summary.skipped += outcome.skipped;
        self.summary.errors.extend(outcome.errors);
    }

    fn fail_batch(&mut self, err: RepositoryError) {
        warn!(batch = self.batches, error = %err, "batch write failed, stopping run");
        self.summary.errors.push(RowError::new(
            0,
            RowErrorCode::UpsertFail,
            format!("{}: {}", t("import.batch_failed"), err),
        ));
        self.halted = true;
    }
}

// ==========================================
// ProductImporterImpl
// ==========================================
pub struct ProductImporterImpl<R, C>
where
    R: ProductImportRepository,
    C: ImportConfigReader,
{
    // data access
    repo: R,

    // defaults for options the request leaves open
    config: C,
}

impl<R, C> ProductImporterImpl<R, C>
where
    R: ProductImportRepository,
    C: ImportConfigReader,
{
    /// # Arguments
    /// - repo: product repository
    /// - config: config reader
    pub fn new(repo: R, config: C) -> Self {
        Self { repo, config }
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    pub fn config(&self) -> &C {
        &self.config
    }
}

#[async_trait]
impl<R, C> ProductImporter for ProductImporterImpl<R, C>
where
    R: ProductImportRepository + Send + Sync,
    C: ImportConfigReader + Send + Sync,
{
    async fn resolve_options(
        &self,
        mode: Option<&str>,
        dry_run: Option<&str>,
        requested_by: Option<String>,
    ) -> ImportResult<ImportOptions> {
        let mode = match mode {
            Some(raw) => ImportMode::from_query(Some(raw)),
            None => self.config.get_default_mode().await?,
        };
        let default_dry_run = self.config.get_default_dry_run().await?;

        Ok(ImportOptions {
            mode,
            dry_run: parse_dry_run(dry_run, default_dry_run),
            batch_size: self.config.get_batch_size().await?,
            max_file_bytes: self.config.get_max_file_bytes().await?,
            requested_by,
        })
    }

    #[instrument(
        skip(self, stream, options),
        fields(
            run_id,
            mode = options.mode.as_str(),
            dry_run = options.dry_run
        )
    )]
    async fn import_stream<S, B, E>(
        &self,
        mut stream: S,
        options: ImportOptions,
    ) -> ImportResult<ImportSummary>
    where
        S: Stream<Item = Result<B, E>> + Send + Unpin,
        B: AsRef<[u8]> + Send,
        E: Display + Send,
    {
        let started = Instant::now();
        let run_id = Uuid::new_v4().to_string();
        tracing::Span::current().record("run_id", run_id.as_str());

        info!(
            run_id = %run_id,
            requested_by = options.requested_by.as_deref().unwrap_or("-"),
            batch_size = options.batch_size,
            max_file_bytes = options.max_file_bytes,
            "import started"
        );

        let mut coordinator = StreamCoordinator::new(options.max_file_bytes);
        let reconciler = BatchReconciler::new(&self.repo, options.mode);
        let mut run = ImportRun::new(&options);

        // === reading ===
        while let Some(next) = stream.next().await {
            let rows = match next {
                Ok(chunk) => coordinator.feed(chunk.as_ref())?,
                Err(e) => {
                    warn!(run_id = %run_id, error = %e, "upload stream failed");
                    return Err(ImportError::Upload(e.to_string()));
                }
            };
            run.absorb(rows, &reconciler).await;
            if run.halted {
                break;
            }
        }

        // === end of stream ===
        if !run.halted {
            let rows = coordinator.finish()?;
            run.absorb(rows, &reconciler).await;
            run.flush(&reconciler).await;
        }

        let mut summary = run.summary;
        summary.duration_ms = started.elapsed().as_millis() as u64;

        // audit line
        info!(
            run_id = %run_id,
            requested_by = options.requested_by.as_deref().unwrap_or("-"),
            mode = summary.mode.as_str(),
            dry_run = summary.dry_run,
            total = summary.total,
            created = summary.created,
            updated = summary.updated,
            skipped = summary.skipped,
            errors = summary.errors.len(),
            batches = run.batches,
            duration_ms = summary.duration_ms,
            "import finished"
        );

        Ok(summary)
    }

    async fn import_bytes(
        &self,
        data: &[u8],
        options: ImportOptions,
    ) -> ImportResult<ImportSummary> {
        let chunks = stream::iter(data.chunks(REPLAY_CHUNK_BYTES).map(Ok::<_, Infallible>));
        self.import_stream(chunks, options).await
    }
}
