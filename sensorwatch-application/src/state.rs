use std::sync::Arc;

use sensorwatch_domain::{AnomalyReport, RuntimeConfig};
use tokio::sync::RwLock;

use crate::{DetectionService, Metrics};

#[derive(Clone)]
pub struct AppState {
    pub config: RuntimeConfig,
    pub service: Arc<DetectionService>,
    pub metrics: Arc<Metrics>,
    pub last_report: Arc<RwLock<Option<AnomalyReport>>>,
}

impl AppState {
    pub fn new(config: RuntimeConfig, service: DetectionService) -> Self {
        let metrics = service.metrics();
        Self {
            config,
            service: Arc::new(service),
            metrics,
            last_report: Arc::new(RwLock::new(None)),
        }
    }
}
