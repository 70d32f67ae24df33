// ==========================================
// Tecnova POS - domain layer
// ==========================================
// Responsibility: entities and value types
// Rule: no data access, no pipeline logic
// ==========================================

pub mod import;
pub mod product;

// Re-export core types
pub use import::{
    parse_dry_run, CandidateRow, ImportMode, ImportOptions, ImportSummary, NumberedRow,
    ProductStatus, RowError, RowErrorCode, DEFAULT_BATCH_SIZE, DEFAULT_MAX_FILE_BYTES,
    MAX_BATCH_SIZE,
};
pub use product::{
    to_decimal_string, ExistingProductKey, NewProduct, ProductFilter, ProductRecord,
    ProductUpdate, ProductWriteOp,
};
