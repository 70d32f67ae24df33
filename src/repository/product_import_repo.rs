// ==========================================
// Tecnova POS - product import repository trait
// ==========================================
// Responsibility: data access consumed by the import pipeline
// Rule: no business rules here, CRUD only
// ==========================================

use crate::domain::product::{
    NewProduct, ProductFilter, ProductRecord, ProductUpdate, ProductWriteOp,
};
use crate::repository::error::RepositoryResult;
use async_trait::async_trait;

// ==========================================
// ProductImportRepository Trait
// ==========================================
// Implementor: ProductImportRepositoryImpl (rusqlite)
#[async_trait]
pub trait ProductImportRepository: Send + Sync {
    // ===== Lookup =====

    /// Finds products by natural key.
    ///
    /// # Arguments
    /// - filter: `name IN names_in OR barcode IN barcodes_in`
    ///
    /// # Returns
    /// - Ok(Vec<ProductRecord>): matching rows (empty when the filter is empty)
    async fn find_products(&self, filter: ProductFilter) -> RepositoryResult<Vec<ProductRecord>>;

    /// Total number of products.
    async fn count_products(&self) -> RepositoryResult<usize>;

    // ===== Single writes =====

    async fn create_product(&self, data: NewProduct) -> RepositoryResult<ProductRecord>;

    /// Updates price/stock/active, and description only when provided.
    ///
    /// # Returns
    /// - Err(NotFound): no product with that id
    async fn update_product(
        &self,
        id: i64,
        changes: ProductUpdate,
    ) -> RepositoryResult<ProductRecord>;

    // ===== Batch writes (transactional) =====

    /// Executes every op in one transaction.
    ///
    /// # Returns
    /// - Ok(usize): number of ops applied
    /// - Err: the whole batch is rolled back
    async fn run_atomically(&self, ops: Vec<ProductWriteOp>) -> RepositoryResult<usize>;
}
