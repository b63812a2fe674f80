use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;

use sensorwatch_application::commands::run_commands;
use sensorwatch_application::dtos::RunRequest;
use sensorwatch_application::queries::report_queries;
use sensorwatch_application::AppState;
use sensorwatch_domain::AnomalyReport;

use crate::error::HttpError;
use crate::middleware::authorize;

/// An empty body runs with no bounds.
pub async fn run_detection(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<AnomalyReport>, HttpError> {
    if !authorize(&state.config, &headers) {
        return Err(HttpError::Unauthorized);
    }
    let request = if body.iter().all(u8::is_ascii_whitespace) {
        RunRequest::default()
    } else {
        serde_json::from_slice::<RunRequest>(&body)
            .map_err(|err| HttpError::BadRequest(err.to_string()))?
    };
    let report = run_commands::run_detection(&state, request).await?;
    Ok(Json(report))
}

pub async fn last_report(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Option<AnomalyReport>>, HttpError> {
    if !authorize(&state.config, &headers) {
        return Err(HttpError::Unauthorized);
    }
    Ok(Json(report_queries::last_report(&state).await))
}
