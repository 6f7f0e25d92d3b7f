//! API routes for branch-server

pub mod chatbot;
pub mod health;
pub mod import;
pub mod notifications;
pub mod order;
pub mod product;
pub mod sales;
pub mod ws;

use axum::Router;
use axum::routing::{get, post, put};
use shared::live::{LiveEvent, StockAlertType, product_room};
use shared::models::{Notification, Product, Severity};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Create the combined router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route(
            "/products",
            get(product::list_products).post(product::create_product),
        )
        .route("/products/import", post(import::import_products))
        .route("/products/test-data", post(import::load_test_data))
        .route(
            "/products/{id}",
            put(product::update_product).delete(product::delete_product),
        )
        .route("/orders", post(order::create_order))
        .route("/orders/completed", get(order::list_completed))
        .route("/sales", get(sales::sales_report))
        .route("/chatbot/query", post(chatbot::query))
        .route("/notifications", get(notifications::list))
        .route("/notifications/{id}/read", post(notifications::mark_read))
        .route("/ws", get(ws::handle_ws))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Record a threshold crossing: stock-alert to the product room plus a
/// notification through the center and a global new-notification event.
pub(crate) fn emit_stock_alert(state: &AppState, product: &Product, alert_type: StockAlertType) {
    let (title, severity) = match alert_type {
        StockAlertType::OutOfStock => ("Out of stock", Severity::Critical),
        StockAlertType::LowStock => ("Low stock", Severity::Warning),
    };
    let message = match alert_type {
        StockAlertType::OutOfStock => {
            format!("{} ({}) is out of stock", product.name, product.branch)
        }
        StockAlertType::LowStock => format!(
            "{} ({}) is low on stock: {} left (minimum {})",
            product.name, product.branch, product.stock, product.min_stock
        ),
    };

    let notification = Notification::new(title, message, severity, Some(product.id));
    state.notifications.push(notification.clone());

    state.hub.broadcast_to_room(
        product_room(product.id),
        LiveEvent::StockAlert {
            alert_type,
            product: product.clone(),
        },
    );
    state
        .hub
        .broadcast(LiveEvent::NewNotification { notification });
}
