// ==========================================
// Tecnova POS - import layer
// ==========================================
// Responsibility: CSV upload -> validated products -> summary
// Components: header resolver, row normalizer, duplicate
//             tracker, batch reconciler, stream coordinator
// ==========================================

pub mod batch_reconciler;
pub mod duplicate_tracker;
pub mod error;
pub mod header_resolver;
pub mod product_importer_impl;
pub mod product_importer_trait;
pub mod row_normalizer;
pub mod stream_coordinator;

pub use batch_reconciler::{BatchOutcome, BatchReconciler};
pub use duplicate_tracker::DuplicateTracker;
pub use error::{ImportError, ImportResult};
pub use header_resolver::{detect_delimiter, resolve_header, ColumnMap, HeaderSpec, ImportField};
pub use product_importer_impl::ProductImporterImpl;
pub use product_importer_trait::ProductImporter;
pub use row_normalizer::normalize_row;
pub use stream_coordinator::{CoordinatorState, RawRow, StreamCoordinator};
