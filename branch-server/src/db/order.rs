//! Order database operations
//!
//! `create_order` is the stock-consistency transaction: the order insert and
//! the per-product stock decrements commit as one unit or not at all. Events
//! are never emitted here; the caller assembles them from the returned
//! committed state.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use shared::error::{AppError, ErrorCode};
use shared::models::{Order, OrderCreate, Product, StockStatus};
use sqlx::PgPool;

use super::product::ProductRow;
use crate::catalog;
use crate::error::ServiceResult;

/// Post-commit product state for event assembly
#[derive(Debug, Clone)]
pub struct ProductChange {
    pub product: Product,
    pub prev_stock: i32,
}

/// Create an order, decrementing stock atomically.
///
/// Referenced rows are locked with `FOR UPDATE` so two concurrent orders
/// racing on the same product serialize; the loser re-reads the decremented
/// stock and fails the sufficiency check instead of overselling.
pub async fn create_order(
    pool: &PgPool,
    input: &OrderCreate,
) -> ServiceResult<(Order, Vec<ProductChange>)> {
    catalog::validate_order_input(input)?;

    // Net quantity per product; an order may repeat a product id
    let mut wanted: BTreeMap<i64, i32> = BTreeMap::new();
    for item in &input.items {
        *wanted.entry(item.product_id).or_insert(0) += item.quantity;
    }
    let ids: Vec<i64> = wanted.keys().copied().collect();

    let mut tx = pool.begin().await?;

    let rows: Vec<ProductRow> = sqlx::query_as(
        r#"
        SELECT id, name, branch, price, stock, min_stock, status, created_at, updated_at
        FROM products WHERE id = ANY($1)
        FOR UPDATE
        "#,
    )
    .bind(&ids)
    .fetch_all(&mut *tx)
    .await?;

    let products: HashMap<i64, Product> =
        rows.into_iter().map(|r| (r.id, Product::from(r))).collect();

    // Per-line validation and pricing against the locked rows
    let priced = catalog::price_order(&products, &input.items)?;

    // Combined check across repeated lines of the same product
    for (&product_id, &quantity) in &wanted {
        let product = products.get(&product_id).ok_or_else(|| {
            AppError::with_message(
                ErrorCode::UnknownProduct,
                format!("Unknown product {product_id}"),
            )
        })?;
        if product.stock < quantity {
            return Err(AppError::with_message(
                ErrorCode::InsufficientStock,
                format!(
                    "Insufficient stock for {}: requested {}, available {}",
                    product.name, quantity, product.stock
                ),
            )
            .into());
        }
    }

    let order = catalog::build_order(input, priced);

    sqlx::query(
        r#"
        INSERT INTO orders (id, order_code, customer, branch, subtotal, tax, discount, total,
                            payment_method, status, notes, created_by, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
        "#,
    )
    .bind(order.id)
    .bind(&order.order_code)
    .bind(&order.customer)
    .bind(&order.branch)
    .bind(order.subtotal)
    .bind(order.tax)
    .bind(order.discount)
    .bind(order.total)
    .bind(order.payment_method.as_str())
    .bind(order.status.as_str())
    .bind(&order.notes)
    .bind(&order.created_by)
    .bind(order.created_at)
    .execute(&mut *tx)
    .await?;

    let order_ids: Vec<i64> = order.items.iter().map(|_| order.id).collect();
    let product_ids: Vec<i64> = order.items.iter().map(|i| i.product_id).collect();
    let quantities: Vec<i32> = order.items.iter().map(|i| i.quantity).collect();
    let prices: Vec<f64> = order.items.iter().map(|i| i.price_at_purchase).collect();
    sqlx::query(
        r#"
        INSERT INTO order_items (order_id, product_id, quantity, price_at_purchase)
        SELECT * FROM UNNEST($1::bigint[], $2::bigint[], $3::integer[], $4::double precision[])
        "#,
    )
    .bind(&order_ids)
    .bind(&product_ids)
    .bind(&quantities)
    .bind(&prices)
    .execute(&mut *tx)
    .await?;

    // Decrement stock with status recomputed per resulting row
    let mut changes = Vec::with_capacity(wanted.len());
    for (&product_id, &quantity) in &wanted {
        let Some(current) = products.get(&product_id) else {
            continue; // presence proven above
        };
        let stock = current.stock - quantity;
        let status = StockStatus::derive(stock, current.min_stock);
        changes.push(ProductChange {
            prev_stock: current.stock,
            product: Product {
                stock,
                status,
                updated_at: order.created_at,
                ..current.clone()
            },
        });
    }

    let upd_ids: Vec<i64> = changes.iter().map(|c| c.product.id).collect();
    let upd_stocks: Vec<i32> = changes.iter().map(|c| c.product.stock).collect();
    let upd_statuses: Vec<String> = changes
        .iter()
        .map(|c| c.product.status.as_str().to_string())
        .collect();
    sqlx::query(
        r#"
        UPDATE products SET stock = u.stock, status = u.status, updated_at = $4
        FROM (SELECT * FROM UNNEST($1::bigint[], $2::integer[], $3::text[])) AS u(id, stock, status)
        WHERE products.id = u.id
        "#,
    )
    .bind(&upd_ids)
    .bind(&upd_stocks)
    .bind(&upd_statuses)
    .bind(order.created_at)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    Ok((order, changes))
}

// ── Completed-order listing (read model) ──

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletedOrderItem {
    pub product_id: i64,
    pub name: String,
    pub quantity: i32,
    pub price_at_purchase: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletedOrder {
    pub id: i64,
    pub order_code: String,
    pub customer: String,
    pub branch: String,
    pub items: Vec<CompletedOrderItem>,
    pub subtotal: f64,
    pub tax: f64,
    pub discount: f64,
    pub total: f64,
    pub payment_method: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    pub created_at: i64,
}

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: i64,
    order_code: String,
    customer: String,
    branch: String,
    subtotal: f64,
    tax: f64,
    discount: f64,
    total: f64,
    payment_method: String,
    status: String,
    notes: Option<String>,
    created_by: Option<String>,
    created_at: i64,
}

/// List completed orders with product names resolved.
///
/// Lines referencing a deleted product are dropped (the join is inner);
/// a dangling reference reads as "unknown product", not an error.
pub async fn list_completed_orders(
    pool: &PgPool,
    branch: Option<&str>,
) -> ServiceResult<Vec<CompletedOrder>> {
    let rows: Vec<OrderRow> = match branch {
        Some(branch) => {
            sqlx::query_as(
                r#"
                SELECT id, order_code, customer, branch, subtotal, tax, discount, total,
                       payment_method, status, notes, created_by, created_at
                FROM orders WHERE status = 'completed' AND branch = $1
                ORDER BY created_at DESC
                "#,
            )
            .bind(branch)
            .fetch_all(pool)
            .await?
        }
        None => {
            sqlx::query_as(
                r#"
                SELECT id, order_code, customer, branch, subtotal, tax, discount, total,
                       payment_method, status, notes, created_by, created_at
                FROM orders WHERE status = 'completed'
                ORDER BY created_at DESC
                "#,
            )
            .fetch_all(pool)
            .await?
        }
    };

    if rows.is_empty() {
        return Ok(vec![]);
    }

    let order_ids: Vec<i64> = rows.iter().map(|r| r.id).collect();
    let item_rows: Vec<(i64, i64, String, i32, f64)> = sqlx::query_as(
        r#"
        SELECT oi.order_id, oi.product_id, p.name, oi.quantity, oi.price_at_purchase
        FROM order_items oi
        JOIN products p ON p.id = oi.product_id
        WHERE oi.order_id = ANY($1)
        ORDER BY oi.id
        "#,
    )
    .bind(&order_ids)
    .fetch_all(pool)
    .await?;

    let mut item_map: HashMap<i64, Vec<CompletedOrderItem>> = HashMap::new();
    for (order_id, product_id, name, quantity, price_at_purchase) in item_rows {
        item_map.entry(order_id).or_default().push(CompletedOrderItem {
            product_id,
            name,
            quantity,
            price_at_purchase,
        });
    }

    Ok(rows
        .into_iter()
        .map(|r| CompletedOrder {
            items: item_map.remove(&r.id).unwrap_or_default(),
            id: r.id,
            order_code: r.order_code,
            customer: r.customer,
            branch: r.branch,
            subtotal: r.subtotal,
            tax: r.tax,
            discount: r.discount,
            total: r.total,
            payment_method: r.payment_method,
            status: r.status,
            notes: r.notes,
            created_by: r.created_by,
            created_at: r.created_at,
        })
        .collect())
}

// ── Chatbot aggregation reads ──

#[derive(Debug, Clone, Copy)]
pub struct OrderStats {
    pub count: i64,
    pub revenue: f64,
}

pub async fn completed_order_stats(
    pool: &PgPool,
    branch: Option<&str>,
    since: i64,
) -> ServiceResult<OrderStats> {
    let (count, revenue): (i64, f64) = sqlx::query_as(
        r#"
        SELECT COUNT(*), COALESCE(SUM(total), 0)
        FROM orders
        WHERE ($1::text IS NULL OR branch = $1) AND status = 'completed' AND created_at >= $2
        "#,
    )
    .bind(branch)
    .bind(since)
    .fetch_one(pool)
    .await?;
    Ok(OrderStats { count, revenue })
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct RecentOrder {
    pub order_code: String,
    pub customer: String,
    pub total: f64,
    pub created_at: i64,
}

pub async fn recent_completed_orders(
    pool: &PgPool,
    branch: Option<&str>,
    since: i64,
    limit: i64,
) -> ServiceResult<Vec<RecentOrder>> {
    let rows: Vec<RecentOrder> = sqlx::query_as(
        r#"
        SELECT order_code, customer, total, created_at
        FROM orders
        WHERE ($1::text IS NULL OR branch = $1) AND status = 'completed' AND created_at >= $2
        ORDER BY created_at DESC LIMIT $3
        "#,
    )
    .bind(branch)
    .bind(since)
    .bind(limit)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Whether any order was ever recorded for the branch, regardless of
/// status or age. Distinguishes "no orders ever" from "none in window".
pub async fn has_any_orders(pool: &PgPool, branch: Option<&str>) -> ServiceResult<bool> {
    let (exists,): (bool,) = sqlx::query_as(
        "SELECT EXISTS(SELECT 1 FROM orders WHERE ($1::text IS NULL OR branch = $1))",
    )
    .bind(branch)
    .fetch_one(pool)
    .await?;
    Ok(exists)
}
