pub mod cycles;
pub mod stats;
pub mod status;

use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};

use crate::error::Error;
use crate::service::CycleService;
use crate::store::PgCycleStore;

/// Service type shared by all route handlers.
pub type AppService = CycleService<PgCycleStore>;

/// Map an engine error to an HTTP response.
///
/// Validation problems are the caller's fault, ownership violations are
/// forbidden, and store failures are logged here before turning into an
/// opaque 500.
pub fn error_response(err: Error) -> (StatusCode, Json<Value>) {
    let status = match &err {
        Error::InvalidDate(_) | Error::FutureDate(_) => StatusCode::BAD_REQUEST,
        Error::NoCycles(_) | Error::CycleNotFound(_) | Error::PeriodDayNotFound(_) => {
            StatusCode::NOT_FOUND
        }
        Error::Ownership { .. } => StatusCode::FORBIDDEN,
        Error::Store(e) => {
            tracing::error!("❌ store error: {e}");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    let message = match status {
        StatusCode::INTERNAL_SERVER_ERROR => "internal error".to_string(),
        _ => err.to_string(),
    };
    (status, Json(json!({ "success": false, "message": message })))
}
