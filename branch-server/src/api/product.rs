//! Product CRUD endpoints

use axum::Json;
use axum::extract::{Path, Query, State};
use http::StatusCode;
use serde::Deserialize;
use shared::error::{ApiResponse, AppError};
use shared::live::{LiveEvent, product_room};
use shared::models::{Product, ProductCreate, ProductUpdate};

use super::emit_stock_alert;
use crate::error::ServiceError;
use crate::state::AppState;
use crate::{catalog, db};

#[derive(Deserialize)]
pub struct BranchFilter {
    pub branch: Option<String>,
}

/// GET /products?branch=
pub async fn list_products(
    State(state): State<AppState>,
    Query(filter): Query<BranchFilter>,
) -> Result<Json<Vec<Product>>, ServiceError> {
    let products = db::product::list_products(&state.pool, filter.branch.as_deref()).await?;
    Ok(Json(products))
}

/// POST /products
pub async fn create_product(
    State(state): State<AppState>,
    Json(input): Json<ProductCreate>,
) -> Result<(StatusCode, Json<Product>), ServiceError> {
    let product = catalog::build_product(input)?;
    db::product::insert_product(&state.pool, &product).await?;

    state.hub.broadcast_to_room(
        product_room(product.id),
        LiveEvent::ProductCreated {
            product: product.clone(),
        },
    );
    // a fresh record can start inside the alert zone (stock 0, min_stock 0)
    if let Some(alert_type) = catalog::alert_zone(product.stock, product.min_stock) {
        emit_stock_alert(&state, &product, alert_type);
    }

    Ok((StatusCode::CREATED, Json(product)))
}

/// PUT /products/:id
pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(input): Json<ProductUpdate>,
) -> Result<Json<Product>, ServiceError> {
    let current = db::product::get_product(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("Product"))?;

    let updated = catalog::apply_update(&current, input)?;
    if !db::product::update_product(&state.pool, &updated).await? {
        // deleted between the read and the write
        return Err(AppError::not_found("Product").into());
    }

    state.hub.broadcast_to_room(
        product_room(updated.id),
        LiveEvent::ProductUpdated {
            product: updated.clone(),
            prev_stock: current.stock,
        },
    );
    if let Some(alert_type) = catalog::alert_crossing(
        current.stock,
        current.min_stock,
        updated.stock,
        updated.min_stock,
    ) {
        emit_stock_alert(&state, &updated, alert_type);
    }

    Ok(Json(updated))
}

/// DELETE /products/:id
pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<()>>, ServiceError> {
    if !db::product::delete_product(&state.pool, id).await? {
        return Err(AppError::not_found("Product").into());
    }

    state
        .hub
        .broadcast_to_room(product_room(id), LiveEvent::ProductDeleted { product_id: id });

    Ok(Json(ApiResponse::ok()))
}
