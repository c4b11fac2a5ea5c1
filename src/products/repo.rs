use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::repo_types::{NewProduct, Product, ProductPage};

/// Persistent store of products. Concurrency control is whatever the backing
/// store provides; concurrent updates to one id are last-writer-wins.
#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn create(&self, input: NewProduct) -> anyhow::Result<Product>;
    async fn get(&self, id: Uuid) -> anyhow::Result<Option<Product>>;
    /// `None` when no product has this id.
    async fn update(&self, id: Uuid, input: NewProduct) -> anyhow::Result<Option<Product>>;
    /// `false` when no product has this id.
    async fn delete(&self, id: Uuid) -> anyhow::Result<bool>;
    /// Newest first; `page` is 1-based. Pages past the end are empty.
    async fn list(&self, page: i64, page_size: i64) -> anyhow::Result<ProductPage>;
}

/// Row offset for a 1-based page.
pub fn page_offset(page: i64, page_size: i64) -> i64 {
    (page.max(1) - 1).saturating_mul(page_size)
}

const COLUMNS: &str = "id, product_name, ndc, supplier_name, quantity, store, total, \
     product_group, dispensed, storage, overage, returned, \
     starting_inv_date, ending_inv_date, created_at, updated_at";

#[derive(Clone)]
pub struct PgProductRepository {
    db: PgPool,
}

impl PgProductRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ProductRepository for PgProductRepository {
    async fn create(&self, p: NewProduct) -> anyhow::Result<Product> {
        let sql = format!(
            r#"
            INSERT INTO products (
                id, product_name, ndc, supplier_name, quantity, store, total,
                product_group, dispensed, storage, overage, returned,
                starting_inv_date, ending_inv_date
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            RETURNING {COLUMNS}
            "#
        );
        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(Uuid::new_v4())
            .bind(&p.product_name)
            .bind(&p.ndc)
            .bind(&p.supplier_name)
            .bind(p.quantity)
            .bind(&p.store)
            .bind(p.total)
            .bind(&p.product_group)
            .bind(p.dispensed)
            .bind(p.storage)
            .bind(p.overage)
            .bind(p.returned)
            .bind(p.starting_inv_date)
            .bind(p.ending_inv_date)
            .fetch_one(&self.db)
            .await
            .with_context(|| format!("insert product ndc={}", p.ndc))?;
        Ok(product)
    }

    async fn get(&self, id: Uuid) -> anyhow::Result<Option<Product>> {
        let sql = format!("SELECT {COLUMNS} FROM products WHERE id = $1");
        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .fetch_optional(&self.db)
            .await
            .context("select product by id")?;
        Ok(product)
    }

    async fn update(&self, id: Uuid, p: NewProduct) -> anyhow::Result<Option<Product>> {
        let sql = format!(
            r#"
            UPDATE products SET
                product_name = $2, ndc = $3, supplier_name = $4, quantity = $5,
                store = $6, total = $7, product_group = $8, dispensed = $9,
                storage = $10, overage = $11, returned = $12,
                starting_inv_date = $13, ending_inv_date = $14,
                updated_at = now()
            WHERE id = $1
            RETURNING {COLUMNS}
            "#
        );
        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .bind(&p.product_name)
            .bind(&p.ndc)
            .bind(&p.supplier_name)
            .bind(p.quantity)
            .bind(&p.store)
            .bind(p.total)
            .bind(&p.product_group)
            .bind(p.dispensed)
            .bind(p.storage)
            .bind(p.overage)
            .bind(p.returned)
            .bind(p.starting_inv_date)
            .bind(p.ending_inv_date)
            .fetch_optional(&self.db)
            .await
            .with_context(|| format!("update product {id}"))?;
        Ok(product)
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<bool> {
        let res = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await
            .with_context(|| format!("delete product {id}"))?;
        Ok(res.rows_affected() > 0)
    }

    async fn list(&self, page: i64, page_size: i64) -> anyhow::Result<ProductPage> {
        let sql = format!(
            r#"
            SELECT {COLUMNS}
            FROM products
            ORDER BY created_at DESC, id DESC
            LIMIT $1 OFFSET $2
            "#
        );
        let items = sqlx::query_as::<_, Product>(&sql)
            .bind(page_size)
            .bind(page_offset(page, page_size))
            .fetch_all(&self.db);
        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM products")
            .fetch_one(&self.db);

        let (items, total) = tokio::try_join!(items, total).context("list products")?;
        Ok(ProductPage { items, total })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offsets_are_one_based() {
        assert_eq!(page_offset(1, 10), 0);
        assert_eq!(page_offset(2, 10), 10);
        assert_eq!(page_offset(7, 10), 60);
        assert_eq!(page_offset(0, 10), 0);
        assert_eq!(page_offset(-3, 10), 0);
        assert_eq!(page_offset(i64::MAX, 10), i64::MAX);
    }
}
