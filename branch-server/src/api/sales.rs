//! Sales report endpoint

use axum::Json;
use axum::extract::{Query, State};
use serde::Deserialize;
use shared::error::AppError;
use shared::util;

use crate::db;
use crate::db::sale::WeekdaySales;
use crate::error::ServiceError;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct SalesParams {
    pub period: Option<String>,
    pub branch: Option<String>,
}

const WEEK_MILLIS: i64 = 7 * 86_400_000;

/// GET /sales?period=weekly
///
/// Weekday buckets over the trailing seven days. Only the weekly period is
/// implemented; the ledger is read-only so the buckets reflect whatever was
/// recorded out of band.
pub async fn sales_report(
    State(state): State<AppState>,
    Query(params): Query<SalesParams>,
) -> Result<Json<Vec<WeekdaySales>>, ServiceError> {
    let period = params.period.as_deref().unwrap_or("weekly");
    if period != "weekly" {
        return Err(AppError::invalid_request(format!("Unsupported period: {period}")).into());
    }

    let since = util::now_millis() - WEEK_MILLIS;
    let records =
        db::sale::fetch_sales_since(&state.pool, params.branch.as_deref(), since).await?;
    Ok(Json(db::sale::weekday_buckets(&records)))
}
