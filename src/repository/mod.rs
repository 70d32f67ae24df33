// ==========================================
// Tecnova POS - repository layer
// ==========================================
// Rule: no business logic in repositories
// Responsibility: data access, hides SQLite details
// Constraint: parameterised queries only
// ==========================================

pub mod error;
pub mod product_import_repo;
pub mod product_import_repo_impl;

pub use error::{RepositoryError, RepositoryResult};
pub use product_import_repo::ProductImportRepository;
pub use product_import_repo_impl::ProductImportRepositoryImpl;
