// ==========================================
// Tecnova POS - product domain model
// ==========================================
// Purpose: persisted product rows and the write payloads
//          the import pipeline hands to the repository
// ==========================================

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

// ==========================================
// ProductRecord - persisted product
// ==========================================
// Aligned with: product table (db::init_schema)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRecord {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub barcode: Option<String>,
    pub price: String, // fixed two-decimal text, e.g. "12.50"
    pub stock: i64,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProductRecord {
    /// Natural-key projection used by the reconciler.
    pub fn key(&self) -> ExistingProductKey {
        ExistingProductKey {
            id: self.id,
            name: self.name.clone(),
            barcode: self.barcode.clone(),
        }
    }
}

// ==========================================
// ExistingProductKey - read-only snapshot
// ==========================================
// Owned by the storage layer; fetched per batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExistingProductKey {
    pub id: i64,
    pub name: String,
    pub barcode: Option<String>,
}

// ==========================================
// ProductFilter - lookup by natural keys
// ==========================================
/// Matches products whose `name` is in `names_in` OR whose `barcode`
/// is in `barcodes_in`. An empty set contributes no predicate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFilter {
    pub names_in: Vec<String>,
    pub barcodes_in: Vec<String>,
}

impl ProductFilter {
    pub fn is_empty(&self) -> bool {
        self.names_in.is_empty() && self.barcodes_in.is_empty()
    }
}

// ==========================================
// Write payloads
// ==========================================

/// Payload for inserting a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub description: Option<String>,
    pub barcode: Option<String>,
    pub price: String,
    pub stock: i64,
    pub active: bool,
}

/// Payload for updating an existing product.
///
/// `description: None` keeps the stored description; it never clears it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductUpdate {
    pub price: String,
    pub stock: i64,
    pub active: bool,
    pub description: Option<String>,
}

/// One write inside an atomic batch.
#[derive(Debug, Clone, PartialEq)]
pub enum ProductWriteOp {
    Create(NewProduct),
    Update { id: i64, changes: ProductUpdate },
}

/// Renders a price as fixed two-decimal text, rounding half away from zero at the cent.
pub fn to_decimal_string(price: Decimal) -> String {
    let mut rounded = price.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    if rounded.is_zero() {
        rounded.set_sign_positive(true);
    }
    format!("{:.2}", rounded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_decimal_string_pads() {
        assert_eq!(to_decimal_string(Decimal::new(125, 1)), "12.50");
        assert_eq!(to_decimal_string(Decimal::ZERO), "0.00");
        assert_eq!(to_decimal_string(Decimal::from_parts(0, 0, 0, true, 3)), "0.00");
        assert_eq!(to_decimal_string(Decimal::new(7, 0)), "7.00");
    }

    #[test]
    fn test_to_decimal_string_rounds_half_away_from_zero() {
        assert_eq!(to_decimal_string(Decimal::new(1005, 3)), "1.01");
        assert_eq!(to_decimal_string(Decimal::new(2344, 3)), "2.34");
        assert_eq!(to_decimal_string(Decimal::new(9995, 3)), "10.00");
        assert_eq!(to_decimal_string(Decimal::new(99_999_999, 2)), "999999.99");
    }

    #[test]
    fn test_filter_is_empty() {
        assert!(ProductFilter::default().is_empty());
        let filter = ProductFilter {
            names_in: vec!["Mouse".to_string()],
            barcodes_in: vec![],
        };
        assert!(!filter.is_empty());
    }
}
