// ==========================================
// Tecnova POS - product import repository (rusqlite)
// ==========================================
// Responsibility: lookup by natural key, single writes,
//                 all-or-nothing batch writes
// Rule: parameterised SQL only
// ==========================================

use crate::db::{configure_sqlite_connection, open_sqlite_connection};
use crate::domain::product::{
    NewProduct, ProductFilter, ProductRecord, ProductUpdate, ProductWriteOp,
};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::product_import_repo::ProductImportRepository;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, params_from_iter, Connection, Row};
use std::sync::{Arc, Mutex, MutexGuard};

const PRODUCT_COLUMNS: &str =
    "id, name, description, barcode, price, stock, active, created_at, updated_at";

fn parse_timestamp(raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

fn map_product_row(row: &Row<'_>) -> rusqlite::Result<ProductRecord> {
    Ok(ProductRecord {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        barcode: row.get(3)?,
        price: row.get(4)?,
        stock: row.get(5)?,
        active: row.get::<_, i64>(6)? != 0,
        created_at: parse_timestamp(&row.get::<_, String>(7)?),
        updated_at: parse_timestamp(&row.get::<_, String>(8)?),
    })
}

fn fetch_by_id(conn: &Connection, id: i64) -> RepositoryResult<ProductRecord> {
    let sql = format!("SELECT {} FROM product WHERE id = ?1", PRODUCT_COLUMNS);
    conn.query_row(&sql, params![id], map_product_row)
        .map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => RepositoryError::NotFound {
                entity: "product".to_string(),
                id: id.to_string(),
            },
            other => other.into(),
        })
}

fn insert_product(conn: &Connection, data: &NewProduct) -> RepositoryResult<i64> {
    let now = Utc::now().to_rfc3339();
    conn.execute(
        r#"
        INSERT INTO product (name, description, barcode, price, stock, active, created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)
        "#,
        params![
            data.name,
            data.description,
            data.barcode,
            data.price,
            data.stock,
            data.active as i32,
            now,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

fn apply_update(conn: &Connection, id: i64, changes: &ProductUpdate) -> RepositoryResult<()> {
    let affected = conn.execute(
        r#"
        UPDATE product
        SET price = ?1,
            stock = ?2,
            active = ?3,
            description = COALESCE(?4, description),
            updated_at = ?5
        WHERE id = ?6
        "#,
        params![
            changes.price,
            changes.stock,
            changes.active as i32,
            changes.description,
            Utc::now().to_rfc3339(),
            id,
        ],
    )?;

    if affected == 0 {
        return Err(RepositoryError::NotFound {
            entity: "product".to_string(),
            id: id.to_string(),
        });
    }
    Ok(())
}

// ==========================================
// ProductImportRepositoryImpl
// ==========================================
pub struct ProductImportRepositoryImpl {
    conn: Arc<Mutex<Connection>>,
}

impl ProductImportRepositoryImpl {
    /// Opens a dedicated connection.
    ///
    /// # Arguments
    /// - db_path: database file path
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Shares an existing connection (PRAGMAs re-applied, idempotent).
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> RepositoryResult<Self> {
        {
            let guard = conn
                .lock()
                .map_err(|e| RepositoryError::LockError(e.to_string()))?;
            configure_sqlite_connection(&guard)?;
        }

        Ok(Self { conn })
    }

    fn lock(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }
}

#[async_trait]
impl ProductImportRepository for ProductImportRepositoryImpl {
    async fn find_products(&self, filter: ProductFilter) -> RepositoryResult<Vec<ProductRecord>> {
        if filter.is_empty() {
            return Ok(Vec::new());
        }

        let mut predicates = Vec::new();
        let mut values: Vec<&str> = Vec::new();

        if !filter.names_in.is_empty() {
            let placeholders = vec!["?"; filter.names_in.len()].join(", ");
            predicates.push(format!("name IN ({})", placeholders));
            values.extend(filter.names_in.iter().map(String::as_str));
        }
        if !filter.barcodes_in.is_empty() {
            let placeholders = vec!["?"; filter.barcodes_in.len()].join(", ");
            predicates.push(format!("barcode IN ({})", placeholders));
            values.extend(filter.barcodes_in.iter().map(String::as_str));
        }

        let sql = format!(
            "SELECT {} FROM product WHERE {} ORDER BY id",
            PRODUCT_COLUMNS,
            predicates.join(" OR ")
        );

        let conn = self.lock()?;
        let mut stmt = conn.prepare(&sql)?;
        let products = stmt
            .query_map(params_from_iter(values), map_product_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(products)
    }

    async fn count_products(&self) -> RepositoryResult<usize> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM product", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    async fn create_product(&self, data: NewProduct) -> RepositoryResult<ProductRecord> {
        let conn = self.lock()?;
        let id = insert_product(&conn, &data)?;
        fetch_by_id(&conn, id)
    }

    async fn update_product(
        &self,
        id: i64,
        changes: ProductUpdate,
    ) -> RepositoryResult<ProductRecord> {
        let conn = self.lock()?;
        apply_update(&conn, id, &changes)?;
        fetch_by_id(&conn, id)
    }

    async fn run_atomically(&self, ops: Vec<ProductWriteOp>) -> RepositoryResult<usize> {
        if ops.is_empty() {
            return Ok(0);
        }

        let conn = self.lock()?;
        let tx = conn
            .unchecked_transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        for op in &ops {
            // any `?` here drops tx, which rolls back
            match op {
                ProductWriteOp::Create(data) => {
                    insert_product(&tx, data)?;
                }
                ProductWriteOp::Update { id, changes } => {
                    apply_update(&tx, *id, changes)?;
                }
            }
        }

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        Ok(ops.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_schema;

    fn memory_repo() -> ProductImportRepositoryImpl {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        ProductImportRepositoryImpl::from_connection(Arc::new(Mutex::new(conn))).unwrap()
    }

    fn new_product(name: &str, barcode: Option<&str>) -> NewProduct {
        NewProduct {
            name: name.to_string(),
            description: Some("desc".to_string()),
            barcode: barcode.map(str::to_string),
            price: "10.00".to_string(),
            stock: 3,
            active: true,
        }
    }

    #[tokio::test]
    async fn test_find_products_by_name_or_barcode() {
        let repo = memory_repo();
        repo.create_product(new_product("Mouse", Some("111"))).await.unwrap();
        repo.create_product(new_product("Teclado", Some("222"))).await.unwrap();
        repo.create_product(new_product("Monitor", None)).await.unwrap();

        let found = repo
            .find_products(ProductFilter {
                names_in: vec!["Mouse".to_string()],
                barcodes_in: vec!["222".to_string()],
            })
            .await
            .unwrap();

        let names: Vec<_> = found.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Mouse", "Teclado"]);
    }

    #[tokio::test]
    async fn test_find_products_empty_filter() {
        let repo = memory_repo();
        repo.create_product(new_product("Mouse", None)).await.unwrap();

        let found = repo.find_products(ProductFilter::default()).await.unwrap();
        assert!(found.is_empty());
    }

    #[tokio::test]
    async fn test_update_keeps_description_when_absent() {
        let repo = memory_repo();
        let created = repo.create_product(new_product("Mouse", None)).await.unwrap();

        let updated = repo
            .update_product(
                created.id,
                ProductUpdate {
                    price: "12.50".to_string(),
                    stock: 9,
                    active: false,
                    description: None,
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.description.as_deref(), Some("desc"));
        assert_eq!(updated.price, "12.50");
        assert_eq!(updated.stock, 9);
        assert!(!updated.active);
    }

    #[tokio::test]
    async fn test_update_missing_id_is_not_found() {
        let repo = memory_repo();
        let err = repo
            .update_product(
                42,
                ProductUpdate {
                    price: "1.00".to_string(),
                    stock: 1,
                    active: true,
                    description: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_run_atomically_rolls_back_whole_batch() {
        let repo = memory_repo();
        repo.create_product(new_product("Existente", Some("999"))).await.unwrap();

        let ops = vec![
            ProductWriteOp::Create(new_product("Nuevo", Some("123"))),
            // barcode collides with the existing row
            ProductWriteOp::Create(new_product("Otro", Some("999"))),
        ];
        let result = repo.run_atomically(ops).await;

        assert!(matches!(
            result,
            Err(RepositoryError::UniqueConstraintViolation(_))
        ));
        assert_eq!(repo.count_products().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_run_atomically_commits() {
        let repo = memory_repo();
        let existing = repo.create_product(new_product("Mouse", None)).await.unwrap();

        let applied = repo
            .run_atomically(vec![
                ProductWriteOp::Create(new_product("Teclado", None)),
                ProductWriteOp::Update {
                    id: existing.id,
                    changes: ProductUpdate {
                        price: "5.00".to_string(),
                        stock: 0,
                        active: true,
                        description: Some("nueva".to_string()),
                    },
                },
            ])
            .await
            .unwrap();

        assert_eq!(applied, 2);
        assert_eq!(repo.count_products().await.unwrap(), 2);
        let mouse = repo
            .find_products(ProductFilter {
                names_in: vec!["Mouse".to_string()],
                barcodes_in: vec![],
            })
            .await
            .unwrap();
        assert_eq!(mouse[0].description.as_deref(), Some("nueva"));
    }
}
