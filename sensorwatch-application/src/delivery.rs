use std::sync::Arc;

use futures_util::future::join_all;
use serde::Serialize;
use tracing::{debug, error, warn};

use sensorwatch_domain::{AnomalyReport, Capability, ReportSink, WindowRepository};

pub const PERSIST_TARGET: &str = "repository";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "error", rename_all = "snake_case")]
pub enum DeliveryStatus {
    Delivered,
    Failed(String),
    Unsupported,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeliveryOutcome {
    pub target: String,
    #[serde(flatten)]
    pub status: DeliveryStatus,
}

impl DeliveryOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self.status, DeliveryStatus::Failed(_))
    }
}

/// Sends the report to every sink concurrently. Failures are logged and
/// collected, never propagated; outcomes keep the sink order.
pub async fn deliver_all(
    report: &AnomalyReport,
    sinks: &[Arc<dyn ReportSink>],
) -> Vec<DeliveryOutcome> {
    let deliveries = sinks.iter().map(|sink| async move {
        let status = match sink.send(report).await {
            Ok(()) => DeliveryStatus::Delivered,
            Err(err) => {
                warn!("sink {} failed: {:#}", sink.name(), err);
                DeliveryStatus::Failed(format!("{:#}", err))
            }
        };
        DeliveryOutcome {
            target: sink.name().to_string(),
            status,
        }
    });
    join_all(deliveries).await
}

pub async fn persist_report(
    repository: &dyn WindowRepository,
    report: &AnomalyReport,
) -> DeliveryOutcome {
    let status = match repository.persist_report(report).await {
        Ok(Capability::Supported(())) => DeliveryStatus::Delivered,
        Ok(Capability::Unsupported) => {
            debug!("repository does not persist reports");
            DeliveryStatus::Unsupported
        }
        Err(err) => {
            error!("failed to persist report: {:#}", err);
            DeliveryStatus::Failed(format!("{:#}", err))
        }
    };
    DeliveryOutcome {
        target: PERSIST_TARGET.to_string(),
        status,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;

    struct OkSink;

    #[async_trait]
    impl ReportSink for OkSink {
        fn name(&self) -> &str {
            "ok"
        }

        async fn send(&self, _report: &AnomalyReport) -> anyhow::Result<()> {
            Ok(())
        }
    }

    struct BrokenSink;

    #[async_trait]
    impl ReportSink for BrokenSink {
        fn name(&self) -> &str {
            "broken"
        }

        async fn send(&self, _report: &AnomalyReport) -> anyhow::Result<()> {
            anyhow::bail!("connection refused")
        }
    }

    struct ReadOnlyRepository;

    #[async_trait]
    impl WindowRepository for ReadOnlyRepository {}

    struct FailingRepository;

    #[async_trait]
    impl WindowRepository for FailingRepository {
        async fn persist_report(&self, _report: &AnomalyReport) -> anyhow::Result<Capability<()>> {
            anyhow::bail!("disk full")
        }
    }

    #[tokio::test]
    async fn failed_sink_does_not_stop_the_others() {
        let report = AnomalyReport::empty(None, None);
        let sinks: Vec<Arc<dyn ReportSink>> =
            vec![Arc::new(BrokenSink), Arc::new(OkSink), Arc::new(BrokenSink)];
        let outcomes = deliver_all(&report, &sinks).await;
        assert_eq!(outcomes.len(), 3);
        assert_eq!(
            outcomes[0].status,
            DeliveryStatus::Failed("connection refused".to_string())
        );
        assert_eq!(outcomes[1].target, "ok");
        assert_eq!(outcomes[1].status, DeliveryStatus::Delivered);
        assert!(outcomes[2].is_failure());
    }

    #[tokio::test]
    async fn persist_reports_unsupported_and_failed() {
        let report = AnomalyReport::empty(None, None);
        let unsupported = persist_report(&ReadOnlyRepository, &report).await;
        assert_eq!(unsupported.status, DeliveryStatus::Unsupported);
        assert!(!unsupported.is_failure());

        let failed = persist_report(&FailingRepository, &report).await;
        assert_eq!(failed.target, PERSIST_TARGET);
        assert!(failed.is_failure());
    }

    #[test]
    fn outcome_serializes_flat() {
        let outcome = DeliveryOutcome {
            target: "webhook".to_string(),
            status: DeliveryStatus::Failed("timeout".to_string()),
        };
        assert_eq!(
            serde_json::to_value(&outcome).expect("encode"),
            json!({"target": "webhook", "status": "failed", "error": "timeout"})
        );
    }
}
