//! Notification endpoints (in-process ring, not persisted)

use axum::Json;
use axum::extract::{Path, State};
use shared::error::{ApiResponse, AppError};
use shared::models::Notification;

use crate::state::AppState;

/// GET /notifications
pub async fn list(State(state): State<AppState>) -> Json<Vec<Notification>> {
    Json(state.notifications.list())
}

/// POST /notifications/:id/read
pub async fn mark_read(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    if !state.notifications.mark_read(&id) {
        return Err(AppError::not_found("Notification"));
    }
    Ok(Json(ApiResponse::ok()))
}
