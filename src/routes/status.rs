use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::Value;

use super::{error_response, AppService};
use crate::models::TodayStatus;
use crate::routes::cycles::UserQuery;

pub fn routes(service: AppService) -> Router {
    Router::new()
        .route("/cycles/today", get(get_today_status))
        .with_state(service)
}

async fn get_today_status(
    State(service): State<AppService>,
    Query(params): Query<UserQuery>,
) -> Result<Json<TodayStatus>, (StatusCode, Json<Value>)> {
    let status = service
        .get_today_status(params.user_id)
        .await
        .map_err(error_response)?;
    Ok(Json(status))
}
