//! Order endpoints

use axum::Json;
use axum::extract::{Query, State};
use http::StatusCode;
use serde::Serialize;
use shared::live::{LiveEvent, product_room};
use shared::models::{Order, OrderCreate};

use super::emit_stock_alert;
use super::product::BranchFilter;
use crate::db::order::CompletedOrder;
use crate::error::ServiceError;
use crate::state::AppState;
use crate::{catalog, db};

/// POST /orders
///
/// Runs the stock-consistency transaction, then emits the events assembled
/// from the committed state: order-created first, then the per-product
/// updates and any threshold alerts. Nothing is emitted on rollback.
pub async fn create_order(
    State(state): State<AppState>,
    Json(input): Json<OrderCreate>,
) -> Result<(StatusCode, Json<Order>), ServiceError> {
    let (order, changes) = db::order::create_order(&state.pool, &input).await?;

    tracing::info!(
        order_code = %order.order_code,
        branch = %order.branch,
        total = order.total,
        "Order created"
    );

    state.hub.broadcast(LiveEvent::OrderCreated(order.clone()));
    for change in changes {
        state.hub.broadcast_to_room(
            product_room(change.product.id),
            LiveEvent::ProductUpdated {
                product: change.product.clone(),
                prev_stock: change.prev_stock,
            },
        );
        if let Some(alert_type) = catalog::alert_crossing(
            change.prev_stock,
            change.product.min_stock,
            change.product.stock,
            change.product.min_stock,
        ) {
            emit_stock_alert(&state, &change.product, alert_type);
        }
    }

    Ok((StatusCode::CREATED, Json(order)))
}

#[derive(Serialize)]
pub struct CompletedOrdersResponse {
    pub success: bool,
    pub data: Vec<CompletedOrder>,
}

/// GET /orders/completed?branch=
pub async fn list_completed(
    State(state): State<AppState>,
    Query(filter): Query<BranchFilter>,
) -> Result<Json<CompletedOrdersResponse>, ServiceError> {
    let data = db::order::list_completed_orders(&state.pool, filter.branch.as_deref()).await?;
    Ok(Json(CompletedOrdersResponse {
        success: true,
        data,
    }))
}
