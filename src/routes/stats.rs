use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::Value;

use super::{error_response, AppService};
use crate::models::{CycleStatistics, PeriodStatistics};
use crate::routes::cycles::UserQuery;

pub fn routes(service: AppService) -> Router {
    Router::new()
        .route("/cycles/statistics", get(get_cycle_statistics))
        .route("/cycles/period-statistics", get(get_period_statistics))
        .with_state(service)
}

async fn get_cycle_statistics(
    State(service): State<AppService>,
    Query(params): Query<UserQuery>,
) -> Result<Json<CycleStatistics>, (StatusCode, Json<Value>)> {
    let stats = service
        .get_cycle_statistics(params.user_id)
        .await
        .map_err(error_response)?;
    Ok(Json(stats))
}

async fn get_period_statistics(
    State(service): State<AppService>,
    Query(params): Query<UserQuery>,
) -> Result<Json<PeriodStatistics>, (StatusCode, Json<Value>)> {
    let stats = service
        .get_period_statistics(params.user_id)
        .await
        .map_err(error_response)?;
    Ok(Json(stats))
}
