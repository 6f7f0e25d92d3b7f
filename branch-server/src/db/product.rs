//! Product database operations

use shared::models::{Product, StockStatus};
use sqlx::PgPool;

use crate::error::ServiceResult;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProductRow {
    pub id: i64,
    pub name: String,
    pub branch: String,
    pub price: f64,
    pub stock: i32,
    pub min_stock: i32,
    pub status: String,
    pub created_at: i64,
    pub updated_at: i64,
}

impl From<ProductRow> for Product {
    fn from(r: ProductRow) -> Self {
        // Stored status is derived state; recompute when the text is stale
        let status = StockStatus::parse(&r.status)
            .unwrap_or_else(|| StockStatus::derive(r.stock, r.min_stock));
        Product {
            id: r.id,
            name: r.name,
            branch: r.branch,
            price: r.price,
            stock: r.stock,
            min_stock: r.min_stock,
            status,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

const PRODUCT_COLUMNS: &str =
    "id, name, branch, price, stock, min_stock, status, created_at, updated_at";

pub async fn list_products(pool: &PgPool, branch: Option<&str>) -> ServiceResult<Vec<Product>> {
    let rows: Vec<ProductRow> = match branch {
        Some(branch) => {
            sqlx::query_as(&format!(
                "SELECT {PRODUCT_COLUMNS} FROM products WHERE branch = $1 ORDER BY name"
            ))
            .bind(branch)
            .fetch_all(pool)
            .await?
        }
        None => {
            sqlx::query_as(&format!(
                "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY name"
            ))
            .fetch_all(pool)
            .await?
        }
    };
    Ok(rows.into_iter().map(Product::from).collect())
}

pub async fn get_product(pool: &PgPool, id: i64) -> ServiceResult<Option<Product>> {
    let row: Option<ProductRow> = sqlx::query_as(&format!(
        "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(Product::from))
}

pub async fn insert_product(pool: &PgPool, product: &Product) -> ServiceResult<()> {
    sqlx::query(
        r#"
        INSERT INTO products (id, name, branch, price, stock, min_stock, status, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        "#,
    )
    .bind(product.id)
    .bind(&product.name)
    .bind(&product.branch)
    .bind(product.price)
    .bind(product.stock)
    .bind(product.min_stock)
    .bind(product.status.as_str())
    .bind(product.created_at)
    .bind(product.updated_at)
    .execute(pool)
    .await?;
    Ok(())
}

/// Full-record write; the caller has already merged the partial update and
/// recomputed status. Concurrent manual edits are last-write-wins.
pub async fn update_product(pool: &PgPool, product: &Product) -> ServiceResult<bool> {
    let result = sqlx::query(
        r#"
        UPDATE products
        SET name = $1, branch = $2, price = $3, stock = $4, min_stock = $5,
            status = $6, updated_at = $7
        WHERE id = $8
        "#,
    )
    .bind(&product.name)
    .bind(&product.branch)
    .bind(product.price)
    .bind(product.stock)
    .bind(product.min_stock)
    .bind(product.status.as_str())
    .bind(product.updated_at)
    .bind(product.id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn delete_product(pool: &PgPool, id: i64) -> ServiceResult<bool> {
    let result = sqlx::query("DELETE FROM products WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Batch insert for CSV import and test-data seeding
pub async fn insert_products_bulk(pool: &PgPool, products: &[Product]) -> ServiceResult<usize> {
    if products.is_empty() {
        return Ok(0);
    }

    let ids: Vec<i64> = products.iter().map(|p| p.id).collect();
    let names: Vec<String> = products.iter().map(|p| p.name.clone()).collect();
    let branches: Vec<String> = products.iter().map(|p| p.branch.clone()).collect();
    let prices: Vec<f64> = products.iter().map(|p| p.price).collect();
    let stocks: Vec<i32> = products.iter().map(|p| p.stock).collect();
    let min_stocks: Vec<i32> = products.iter().map(|p| p.min_stock).collect();
    let statuses: Vec<String> = products
        .iter()
        .map(|p| p.status.as_str().to_string())
        .collect();
    let created_ats: Vec<i64> = products.iter().map(|p| p.created_at).collect();
    let updated_ats: Vec<i64> = products.iter().map(|p| p.updated_at).collect();

    sqlx::query(
        r#"
        INSERT INTO products (id, name, branch, price, stock, min_stock, status, created_at, updated_at)
        SELECT * FROM UNNEST($1::bigint[], $2::text[], $3::text[], $4::double precision[], $5::integer[], $6::integer[], $7::text[], $8::bigint[], $9::bigint[])
        "#,
    )
    .bind(&ids)
    .bind(&names)
    .bind(&branches)
    .bind(&prices)
    .bind(&stocks)
    .bind(&min_stocks)
    .bind(&statuses)
    .bind(&created_ats)
    .bind(&updated_ats)
    .execute(pool)
    .await?;

    Ok(products.len())
}
