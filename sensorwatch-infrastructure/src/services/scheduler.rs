use std::time::Duration;

use tracing::{error, warn};

use sensorwatch_application::commands::run_scheduled_detection;
use sensorwatch_application::AppState;

/// Runs a detection over the trailing window every `interval_seconds`.
pub async fn schedule_detection(state: AppState) {
    let interval = Duration::from_secs(state.config.interval_seconds.max(1));
    loop {
        let run = run_scheduled_detection(&state).await;
        if !run.detector_failures.is_empty() {
            warn!("detectors failed this run: {}", run.detector_failures.join(", "));
        }
        let failed_sinks: Vec<&str> = run
            .sink_outcomes
            .iter()
            .filter(|outcome| outcome.is_failure())
            .map(|outcome| outcome.target.as_str())
            .collect();
        if !failed_sinks.is_empty() {
            error!("report delivery failed for: {}", failed_sinks.join(", "));
        }
        tokio::time::sleep(interval).await;
    }
}
