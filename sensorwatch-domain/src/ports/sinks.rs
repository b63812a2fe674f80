use async_trait::async_trait;

use crate::entities::AnomalyReport;

#[async_trait]
pub trait ReportSink: Send + Sync {
    fn name(&self) -> &str;
    async fn send(&self, report: &AnomalyReport) -> anyhow::Result<()>;
}
