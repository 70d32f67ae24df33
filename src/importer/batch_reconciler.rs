// ==========================================
// Tecnova POS - batch reconciler
// ==========================================
// Responsibility: classify a batch of validated rows against
//                 persisted products (create / update / skip)
//                 and commit the resulting writes atomically
// Flow: plan (one lookup) -> commit (one transaction)
// ==========================================

use crate::domain::import::{ImportMode, NumberedRow, RowError, RowErrorCode};
use crate::domain::product::{
    to_decimal_string, ExistingProductKey, NewProduct, ProductFilter, ProductRecord, ProductUpdate,
    ProductWriteOp,
};
use crate::i18n::t;
use crate::repository::{ProductImportRepository, RepositoryResult};
use std::collections::{BTreeSet, HashMap};
use tracing::debug;

// ==========================================
// BatchOutcome - classification of one batch
// ==========================================
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchOutcome {
    pub created: usize,
    pub updated: usize,
    pub skipped: usize,
    pub errors: Vec<RowError>,
    pub ops: Vec<ProductWriteOp>,
}

impl BatchOutcome {
    pub fn rows(&self) -> usize {
        self.created + self.updated + self.skipped
    }

    /// Turns would-be writes into skips after a failed commit.
    pub fn demote_writes(&mut self) {
        self.skipped += self.created + self.updated;
        self.created = 0;
        self.updated = 0;
        self.ops.clear();
    }
}

/// Lookup filter over the batch's distinct names and barcodes.
pub fn batch_filter(rows: &[NumberedRow]) -> ProductFilter {
    let names: BTreeSet<&str> = rows.iter().map(|r| r.data.name.as_str()).collect();
    let barcodes: BTreeSet<&str> = rows
        .iter()
        .filter_map(|r| r.data.barcode.as_deref())
        .collect();

    ProductFilter {
        names_in: names.into_iter().map(str::to_string).collect(),
        barcodes_in: barcodes.into_iter().map(str::to_string).collect(),
    }
}

/// Classifies rows against the fetched products.
///
/// A barcode match wins over a name match when both exist.
pub fn classify(
    rows: &[NumberedRow],
    existing: &[ExistingProductKey],
    mode: ImportMode,
) -> BatchOutcome {
    let by_name: HashMap<&str, &ExistingProductKey> =
        existing.iter().map(|p| (p.name.as_str(), p)).collect();
    let by_barcode: HashMap<&str, &ExistingProductKey> = existing
        .iter()
        .filter_map(|p| p.barcode.as_deref().map(|b| (b, p)))
        .collect();

    let mut outcome = BatchOutcome::default();

    for item in rows {
        let d = &item.data;
        let match_by_barcode = d.barcode.as_deref().and_then(|b| by_barcode.get(b));
        let match_by_name = by_name.get(d.name.as_str());
        let existing_item = match_by_barcode.or(match_by_name);

        match (mode, existing_item) {
            (ImportMode::Insert, Some(_)) => {
                outcome.skipped += 1;
                outcome
                    .errors
                    .push(RowError::new(item.row, RowErrorCode::DupInDb, t("row.dup_in_db")));
            }
            (ImportMode::Upsert, Some(found)) => {
                outcome.updated += 1;
                outcome.ops.push(ProductWriteOp::Update {
                    id: found.id,
                    changes: ProductUpdate {
                        price: to_decimal_string(d.price),
                        stock: d.stock,
                        active: d.active(),
                        description: d.description.clone(),
                    },
                });
            }
            (_, None) => {
                outcome.created += 1;
                outcome.ops.push(ProductWriteOp::Create(NewProduct {
                    name: d.name.clone(),
                    description: d.description.clone(),
                    barcode: d.barcode.clone(),
                    price: to_decimal_string(d.price),
                    stock: d.stock,
                    active: d.active(),
                }));
            }
        }
    }

    outcome
}

// ==========================================
// BatchReconciler
// ==========================================
pub struct BatchReconciler<'a, R: ProductImportRepository> {
    repo: &'a R,
    mode: ImportMode,
}

impl<'a, R: ProductImportRepository> BatchReconciler<'a, R> {
    pub fn new(repo: &'a R, mode: ImportMode) -> Self {
        Self { repo, mode }
    }

    /// Looks up existing products and classifies the batch. No writes.
    pub async fn plan(&self, rows: &[NumberedRow]) -> RepositoryResult<BatchOutcome> {
        if rows.is_empty() {
            return Ok(BatchOutcome::default());
        }

        let existing: Vec<ExistingProductKey> = self
            .repo
            .find_products(batch_filter(rows))
            .await?
            .iter()
            .map(ProductRecord::key)
            .collect();
        let outcome = classify(rows, &existing, self.mode);

        debug!(
            rows = rows.len(),
            matched = existing.len(),
            created = outcome.created,
            updated = outcome.updated,
            skipped = outcome.skipped,
            "batch classified"
        );
        Ok(outcome)
    }

    /// Executes the planned writes as one transaction.
    pub async fn commit(&self, outcome: &BatchOutcome) -> RepositoryResult<usize> {
        if outcome.ops.is_empty() {
            return Ok(0);
        }
        let applied = self.repo.run_atomically(outcome.ops.clone()).await?;
        debug!(applied, "batch committed");
        Ok(applied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::import::{CandidateRow, ProductStatus};
    use rust_decimal::Decimal;

    fn numbered(row: usize, name: &str, barcode: Option<&str>) -> NumberedRow {
        NumberedRow {
            row,
            data: CandidateRow {
                name: name.to_string(),
                description: None,
                barcode: barcode.map(str::to_string),
                price: Decimal::new(1005, 3),
                stock: 2,
                status: ProductStatus::Inactivo,
            },
        }
    }

    fn record(id: i64, name: &str, barcode: Option<&str>) -> ExistingProductKey {
        ExistingProductKey {
            id,
            name: name.to_string(),
            barcode: barcode.map(str::to_string),
        }
    }

    #[test]
    fn test_filter_deduplicates_and_skips_missing_barcodes() {
        let rows = vec![
            numbered(1, "B", Some("2")),
            numbered(2, "A", None),
            numbered(3, "C", Some("1")),
        ];
        let filter = batch_filter(&rows);
        assert_eq!(filter.names_in, vec!["A", "B", "C"]);
        assert_eq!(filter.barcodes_in, vec!["1", "2"]);
    }

    #[test]
    fn test_insert_mode_skips_existing() {
        let rows = vec![numbered(1, "Mouse", None), numbered(2, "Nuevo", None)];
        let existing = vec![record(7, "Mouse", None)];

        let outcome = classify(&rows, &existing, ImportMode::Insert);
        assert_eq!((outcome.created, outcome.updated, outcome.skipped), (1, 0, 1));
        assert_eq!(outcome.errors[0].row, 1);
        assert_eq!(outcome.errors[0].code, RowErrorCode::DupInDb);
        assert_eq!(outcome.ops.len(), 1);
    }

    #[test]
    fn test_upsert_prefers_barcode_match() {
        let rows = vec![numbered(1, "Mouse", Some("999"))];
        let existing = vec![record(1, "Mouse", None), record(2, "Otro", Some("999"))];

        let outcome = classify(&rows, &existing, ImportMode::Upsert);
        assert_eq!(outcome.updated, 1);
        match &outcome.ops[0] {
            ProductWriteOp::Update { id, changes } => {
                assert_eq!(*id, 2);
                assert_eq!(changes.price, "1.01");
                assert!(!changes.active);
                assert!(changes.description.is_none());
            }
            other => panic!("unexpected op {:?}", other),
        }
    }

    #[test]
    fn test_demote_writes_keeps_rows_reconciled() {
        let rows = vec![numbered(1, "Mouse", None), numbered(2, "Nuevo", None)];
        let mut outcome = classify(&rows, &[record(7, "Mouse", None)], ImportMode::Insert);
        outcome.demote_writes();

        assert_eq!(outcome.rows(), 2);
        assert_eq!(outcome.skipped, 2);
        assert!(outcome.ops.is_empty());
        assert_eq!(outcome.errors.len(), 1);
    }
}
