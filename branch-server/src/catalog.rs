//! Catalog write-path logic
//!
//! The write path is an explicit two-step: validate/derive here (pure,
//! no storage access), then persist in `db::*` which returns the committed
//! state the API layer turns into events. Status is never accepted from
//! callers; it is recomputed from `(stock, min_stock)` on every path that
//! touches either field.

use std::collections::HashMap;

use shared::error::{AppError, ErrorCode};
use shared::live::StockAlertType;
use shared::models::{
    Order, OrderCreate, OrderItem, OrderItemInput, Product, ProductCreate, ProductUpdate,
    StockStatus,
};
use shared::util;

/// Fixed tax rate applied to every order
pub const TAX_RATE: f64 = 0.10;

/// Build a new catalog record from creation input.
///
/// Rejects empty name, negative price/stock/min_stock, and
/// `min_stock > stock`. Status is derived from the validated fields.
pub fn build_product(input: ProductCreate) -> Result<Product, AppError> {
    if input.name.trim().is_empty() {
        return Err(AppError::with_message(
            ErrorCode::RequiredField,
            "Product name is required",
        ));
    }
    if input.branch.trim().is_empty() {
        return Err(AppError::with_message(
            ErrorCode::RequiredField,
            "Branch is required",
        ));
    }
    if !input.price.is_finite() || input.price < 0.0 {
        return Err(AppError::validation("Price must be a non-negative number"));
    }
    if input.stock < 0 || input.min_stock < 0 {
        return Err(AppError::validation(
            "Stock and minimum stock must be non-negative",
        ));
    }
    if input.min_stock > input.stock {
        return Err(AppError::new(ErrorCode::MinStockExceedsStock));
    }

    let now = util::now_millis();
    Ok(Product {
        id: util::snowflake_id(),
        name: input.name.trim().to_string(),
        branch: input.branch.trim().to_string(),
        price: input.price,
        stock: input.stock,
        min_stock: input.min_stock,
        status: StockStatus::derive(input.stock, input.min_stock),
        created_at: now,
        updated_at: now,
    })
}

/// Merge a partial update into an existing record.
///
/// Status is recomputed from the resulting record, not the delta. Unlike
/// creation, an update may drive stock below min_stock; the record simply
/// transitions status.
pub fn apply_update(current: &Product, update: ProductUpdate) -> Result<Product, AppError> {
    if let Some(ref name) = update.name
        && name.trim().is_empty()
    {
        return Err(AppError::with_message(
            ErrorCode::RequiredField,
            "Product name is required",
        ));
    }
    if let Some(price) = update.price
        && (!price.is_finite() || price < 0.0)
    {
        return Err(AppError::validation("Price must be a non-negative number"));
    }
    if update.stock.is_some_and(|s| s < 0) || update.min_stock.is_some_and(|m| m < 0) {
        return Err(AppError::validation(
            "Stock and minimum stock must be non-negative",
        ));
    }

    let stock = update.stock.unwrap_or(current.stock);
    let min_stock = update.min_stock.unwrap_or(current.min_stock);

    Ok(Product {
        id: current.id,
        name: update
            .name
            .map(|n| n.trim().to_string())
            .unwrap_or_else(|| current.name.clone()),
        branch: update
            .branch
            .map(|b| b.trim().to_string())
            .unwrap_or_else(|| current.branch.clone()),
        price: update.price.unwrap_or(current.price),
        stock,
        min_stock,
        status: StockStatus::derive(stock, min_stock),
        created_at: current.created_at,
        updated_at: util::now_millis(),
    })
}

/// Alert zone for a `(stock, min_stock)` pair, if any
pub fn alert_zone(stock: i32, min_stock: i32) -> Option<StockAlertType> {
    if stock == 0 {
        Some(StockAlertType::OutOfStock)
    } else if stock <= min_stock {
        Some(StockAlertType::LowStock)
    } else {
        None
    }
}

/// Edge-triggered alert decision.
///
/// Fires only when the write crosses into an alert zone the previous state
/// was not already in. Low → Out counts as a crossing (and vice versa);
/// Low → Low stays silent.
pub fn alert_crossing(
    prev_stock: i32,
    prev_min_stock: i32,
    stock: i32,
    min_stock: i32,
) -> Option<StockAlertType> {
    let prev = alert_zone(prev_stock, prev_min_stock);
    let next = alert_zone(stock, min_stock)?;
    if prev == Some(next) { None } else { Some(next) }
}

/// Priced line items plus the order totals
#[derive(Debug, Clone, PartialEq)]
pub struct PricedOrder {
    pub items: Vec<OrderItem>,
    pub subtotal: f64,
    pub tax: f64,
    pub total: f64,
}

/// Boundary validation for order creation, before any storage access
pub fn validate_order_input(input: &OrderCreate) -> Result<(), AppError> {
    if input.customer.trim().is_empty() {
        return Err(AppError::with_message(
            ErrorCode::RequiredField,
            "Customer name is required",
        ));
    }
    if input.branch.trim().is_empty() {
        return Err(AppError::with_message(
            ErrorCode::RequiredField,
            "Branch is required",
        ));
    }
    if input.items.is_empty() {
        return Err(AppError::new(ErrorCode::EmptyOrder));
    }
    for item in &input.items {
        if item.quantity < 1 {
            return Err(AppError::validation(format!(
                "Invalid quantity {} for product {}",
                item.quantity, item.product_id
            )));
        }
    }
    Ok(())
}

/// Pure pricing step for order creation.
///
/// Captures `price_at_purchase` from the current catalog rows, checks stock
/// sufficiency, and computes subtotal / 10% tax / total. Called with the
/// rows already locked inside the order transaction.
pub fn price_order(
    products: &HashMap<i64, Product>,
    items: &[OrderItemInput],
) -> Result<PricedOrder, AppError> {
    let mut priced = Vec::with_capacity(items.len());
    let mut subtotal = 0.0;

    for item in items {
        let product = products.get(&item.product_id).ok_or_else(|| {
            AppError::with_message(
                ErrorCode::UnknownProduct,
                format!("Unknown product {}", item.product_id),
            )
            .with_detail("productId", serde_json::json!(item.product_id))
        })?;

        if product.stock < item.quantity {
            return Err(AppError::with_message(
                ErrorCode::InsufficientStock,
                format!(
                    "Insufficient stock for {}: requested {}, available {}",
                    product.name, item.quantity, product.stock
                ),
            )
            .with_detail("productId", serde_json::json!(product.id))
            .with_detail("available", serde_json::json!(product.stock)));
        }

        subtotal += product.price * item.quantity as f64;
        priced.push(OrderItem {
            product_id: item.product_id,
            quantity: item.quantity,
            price_at_purchase: product.price,
        });
    }

    let tax = subtotal * TAX_RATE;
    Ok(PricedOrder {
        items: priced,
        subtotal,
        tax,
        total: subtotal + tax,
    })
}

/// Assemble the final order record from validated input and pricing
pub fn build_order(input: &OrderCreate, priced: PricedOrder) -> Order {
    Order {
        id: util::snowflake_id(),
        order_code: util::order_code(),
        customer: input.customer.trim().to_string(),
        branch: input.branch.trim().to_string(),
        items: priced.items,
        subtotal: priced.subtotal,
        tax: priced.tax,
        discount: 0.0,
        total: priced.total,
        payment_method: input.payment_method,
        status: shared::models::OrderStatus::Completed,
        notes: input.notes.clone(),
        created_by: input.created_by.clone(),
        created_at: util::now_millis(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::PaymentMethod;

    const EPS: f64 = 1e-9;

    fn widget(stock: i32) -> Product {
        Product {
            id: 1,
            name: "Widget".into(),
            branch: "B1".into(),
            price: 5.0,
            stock,
            min_stock: 2,
            status: StockStatus::derive(stock, 2),
            created_at: 0,
            updated_at: 0,
        }
    }

    fn catalog(products: Vec<Product>) -> HashMap<i64, Product> {
        products.into_iter().map(|p| (p.id, p)).collect()
    }

    #[test]
    fn create_derives_status() {
        let p = build_product(ProductCreate {
            name: "Widget".into(),
            branch: "B1".into(),
            price: 5.0,
            stock: 10,
            min_stock: 2,
        })
        .unwrap();
        assert_eq!(p.status, StockStatus::InStock);
        assert_eq!(p.stock, 10);
    }

    #[test]
    fn create_rejects_min_stock_above_stock() {
        let err = build_product(ProductCreate {
            name: "Widget".into(),
            branch: "B1".into(),
            price: 5.0,
            stock: 3,
            min_stock: 5,
        })
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::MinStockExceedsStock);
    }

    #[test]
    fn create_rejects_empty_name_and_negative_price() {
        assert!(
            build_product(ProductCreate {
                name: "  ".into(),
                branch: "B1".into(),
                price: 1.0,
                stock: 1,
                min_stock: 0,
            })
            .is_err()
        );
        assert!(
            build_product(ProductCreate {
                name: "X".into(),
                branch: "B1".into(),
                price: -1.0,
                stock: 1,
                min_stock: 0,
            })
            .is_err()
        );
    }

    #[test]
    fn update_recomputes_status_from_result() {
        let current = widget(10);
        let updated = apply_update(
            &current,
            ProductUpdate {
                stock: Some(3),
                min_stock: Some(5),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(updated.status, StockStatus::LowStock);
        // updates may drive stock below min_stock, no rejection
        assert_eq!(updated.stock, 3);
        assert_eq!(updated.min_stock, 5);
    }

    #[test]
    fn update_preserves_untouched_fields() {
        let current = widget(10);
        let updated = apply_update(
            &current,
            ProductUpdate {
                price: Some(7.5),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(updated.name, "Widget");
        assert_eq!(updated.stock, 10);
        assert!((updated.price - 7.5).abs() < EPS);
        assert_eq!(updated.status, StockStatus::InStock);
    }

    #[test]
    fn alert_fires_only_on_crossing() {
        // In (10) → Low (3, min 5)
        assert_eq!(alert_crossing(10, 5, 3, 5), Some(StockAlertType::LowStock));
        // Low → Low stays silent
        assert_eq!(alert_crossing(3, 5, 2, 5), None);
        // Low → Out fires again
        assert_eq!(alert_crossing(2, 5, 0, 5), Some(StockAlertType::OutOfStock));
        // Out → Out stays silent
        assert_eq!(alert_crossing(0, 5, 0, 5), None);
        // Out → Low fires
        assert_eq!(alert_crossing(0, 5, 2, 5), Some(StockAlertType::LowStock));
        // recovery never fires
        assert_eq!(alert_crossing(3, 5, 10, 5), None);
        // crossing caused by raising min_stock alone
        assert_eq!(alert_crossing(5, 2, 5, 8), Some(StockAlertType::LowStock));
    }

    #[test]
    fn pricing_happy_path() {
        let products = catalog(vec![widget(10)]);
        let priced = price_order(
            &products,
            &[OrderItemInput {
                product_id: 1,
                quantity: 3,
            }],
        )
        .unwrap();
        assert!((priced.subtotal - 15.0).abs() < EPS);
        assert!((priced.tax - 1.5).abs() < EPS);
        assert!((priced.total - 16.5).abs() < EPS);
        assert!((priced.items[0].price_at_purchase - 5.0).abs() < EPS);
    }

    #[test]
    fn pricing_rejects_insufficient_stock() {
        let products = catalog(vec![widget(2)]);
        let err = price_order(
            &products,
            &[OrderItemInput {
                product_id: 1,
                quantity: 5,
            }],
        )
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::InsufficientStock);
        assert!(err.message.contains("available 2"));
    }

    #[test]
    fn pricing_rejects_unknown_product() {
        let products = catalog(vec![widget(10)]);
        let err = price_order(
            &products,
            &[OrderItemInput {
                product_id: 999,
                quantity: 1,
            }],
        )
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::UnknownProduct);
        assert!(err.message.contains("999"));
    }

    #[test]
    fn order_arithmetic_invariant() {
        let products = catalog(vec![
            widget(10),
            Product {
                id: 2,
                price: 3.25,
                ..widget(4)
            },
        ]);
        let items = [
            OrderItemInput {
                product_id: 1,
                quantity: 2,
            },
            OrderItemInput {
                product_id: 2,
                quantity: 3,
            },
        ];
        let priced = price_order(&products, &items).unwrap();
        let line_sum: f64 = priced
            .items
            .iter()
            .map(|l| l.price_at_purchase * l.quantity as f64)
            .sum();
        assert!((priced.subtotal - line_sum).abs() < EPS);
        assert!((priced.total - (priced.subtotal + priced.tax)).abs() < EPS);
    }

    #[test]
    fn order_input_validation() {
        let base = OrderCreate {
            customer: "Alice".into(),
            branch: "B1".into(),
            items: vec![OrderItemInput {
                product_id: 1,
                quantity: 1,
            }],
            payment_method: PaymentMethod::Cash,
            notes: None,
            created_by: None,
        };
        assert!(validate_order_input(&base).is_ok());

        let empty_items = OrderCreate {
            items: vec![],
            ..base.clone()
        };
        assert_eq!(
            validate_order_input(&empty_items).unwrap_err().code,
            ErrorCode::EmptyOrder
        );

        let no_customer = OrderCreate {
            customer: "".into(),
            ..base.clone()
        };
        assert!(validate_order_input(&no_customer).is_err());

        let zero_qty = OrderCreate {
            items: vec![OrderItemInput {
                product_id: 1,
                quantity: 0,
            }],
            ..base
        };
        assert!(validate_order_input(&zero_qty).is_err());
    }
}
