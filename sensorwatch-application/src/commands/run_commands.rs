use chrono::{Duration, Utc};
use tracing::info;

use sensorwatch_domain::AnomalyReport;

use crate::dtos::RunRequest;
use crate::{AppError, AppState, DetectionRun};

pub async fn run_detection(
    state: &AppState,
    request: RunRequest,
) -> Result<AnomalyReport, AppError> {
    if let (Some(start), Some(end)) = (request.start, request.end) {
        if start > end {
            return Err(AppError::InvertedWindow { start, end });
        }
    }
    let run = execute(state, request).await;
    Ok(run.report)
}

/// Detection over the trailing `window_minutes`, ending now.
pub async fn run_scheduled_detection(state: &AppState) -> DetectionRun {
    let end = Utc::now();
    let start = end - Duration::minutes(state.config.window_minutes as i64);
    info!("scheduled detection for {} .. {}", start, end);
    execute(
        state,
        RunRequest {
            start: Some(start),
            end: Some(end),
        },
    )
    .await
}

async fn execute(state: &AppState, request: RunRequest) -> DetectionRun {
    let run = state.service.run(request.start, request.end).await;
    *state.last_report.write().await = Some(run.report.clone());
    run
}
