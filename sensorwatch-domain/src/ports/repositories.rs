use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::entities::{AnomalyReport, TimeWindow};

/// Outcome of an optional repository capability.
#[derive(Debug, Clone, PartialEq)]
pub enum Capability<T> {
    Supported(T),
    Unsupported,
}

/// Data-window source and report-persistence target.
///
/// Every capability is optional: implementations override the ones they have
/// and leave the rest reporting `Unsupported`. Callers try the read
/// capabilities in declaration order.
#[async_trait]
pub trait WindowRepository: Send + Sync {
    async fn read_window(
        &self,
        _start: Option<DateTime<Utc>>,
        _end: Option<DateTime<Utc>>,
    ) -> anyhow::Result<Capability<TimeWindow>> {
        Ok(Capability::Unsupported)
    }

    async fn read_latest_window(&self) -> anyhow::Result<Capability<TimeWindow>> {
        Ok(Capability::Unsupported)
    }

    async fn load_timeseries(&self) -> anyhow::Result<Capability<TimeWindow>> {
        Ok(Capability::Unsupported)
    }

    async fn persist_report(&self, _report: &AnomalyReport) -> anyhow::Result<Capability<()>> {
        Ok(Capability::Unsupported)
    }
}
