use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use super::{error_response, AppService};
use crate::models::{CycleRecord, PeriodDayDeletion, SubmitOutcome};

#[derive(Deserialize)]
pub struct UserQuery {
    pub user_id: Uuid,
}

#[derive(Deserialize)]
pub struct MonthQuery {
    pub user_id: Uuid,
    pub year: i32,
    pub month: u32,
}

#[derive(Deserialize)]
pub struct SubmitRequest {
    pub user_id: Uuid,
    pub period_days: Vec<String>,
}

pub fn routes(service: AppService) -> Router {
    Router::new()
        .route("/cycles/process", post(submit_period_days))
        .route("/cycles", get(get_cycles))
        .route("/cycles/month", get(get_cycles_for_month))
        .route("/cycles/:cycle_id", delete(delete_cycle))
        .route("/cycles/period-day/:date", delete(delete_period_day))
        .with_state(service)
}

async fn submit_period_days(
    State(service): State<AppService>,
    Json(body): Json<SubmitRequest>,
) -> Result<(StatusCode, Json<SubmitOutcome>), (StatusCode, Json<Value>)> {
    let outcome = service
        .submit_period_days(body.user_id, &body.period_days)
        .await
        .map_err(error_response)?;
    Ok((StatusCode::CREATED, Json(outcome)))
}

async fn get_cycles(
    State(service): State<AppService>,
    Query(params): Query<UserQuery>,
) -> Result<Json<Vec<CycleRecord>>, (StatusCode, Json<Value>)> {
    let cycles = service
        .get_cycles(params.user_id)
        .await
        .map_err(error_response)?;
    Ok(Json(cycles))
}

async fn get_cycles_for_month(
    State(service): State<AppService>,
    Query(params): Query<MonthQuery>,
) -> Result<Json<Vec<CycleRecord>>, (StatusCode, Json<Value>)> {
    let cycles = service
        .get_cycles_for_month(params.user_id, params.year, params.month)
        .await
        .map_err(error_response)?;
    Ok(Json(cycles))
}

async fn delete_period_day(
    State(service): State<AppService>,
    Path(date): Path<String>,
    Query(params): Query<UserQuery>,
) -> Result<Json<PeriodDayDeletion>, (StatusCode, Json<Value>)> {
    let deletion = service
        .delete_period_day(params.user_id, &date)
        .await
        .map_err(error_response)?;
    Ok(Json(deletion))
}

async fn delete_cycle(
    State(service): State<AppService>,
    Path(cycle_id): Path<Uuid>,
    Query(params): Query<UserQuery>,
) -> Result<StatusCode, (StatusCode, Json<Value>)> {
    service
        .delete_cycle(params.user_id, cycle_id)
        .await
        .map_err(error_response)?;
    Ok(StatusCode::NO_CONTENT)
}
