use sensorwatch_domain::AnomalyReport;

use crate::AppState;

pub async fn last_report(state: &AppState) -> Option<AnomalyReport> {
    state.last_report.read().await.clone()
}

pub fn render_metrics(state: &AppState) -> String {
    state.metrics.render_prometheus()
}
