use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use sensorwatch_application::{AppState, DetectionService};
use sensorwatch_domain::WindowRepository;
use sensorwatch_infrastructure::{
    build_detectors, build_sinks, connect, AppConfig, ClickhouseWindowRepository,
    CsvWindowRepository, RepositoryKind,
};

pub struct AppContext {
    pub state: AppState,
}

impl AppContext {
    pub async fn new(config: &AppConfig) -> Result<Self> {
        let runtime_config = config.to_runtime_config();
        let repository = build_repository(config).await?;

        let detectors = build_detectors(&config.detectors)?;
        let sinks = build_sinks(&config.sinks, config.request_timeout_seconds)?;
        info!(
            "detection pipeline ready: {} detectors, {} sinks, {:?} repository",
            detectors.len(),
            sinks.len(),
            config.repository
        );

        let service = DetectionService::new(repository, detectors, sinks);
        Ok(Self {
            state: AppState::new(runtime_config, service),
        })
    }
}

async fn build_repository(config: &AppConfig) -> Result<Arc<dyn WindowRepository>> {
    match config.repository {
        RepositoryKind::Csv => Ok(Arc::new(CsvWindowRepository::new(
            &config.data_dir,
            &config.report_file,
        ))),
        RepositoryKind::Clickhouse => {
            let db_config = config.to_db_config();
            let repo = ClickhouseWindowRepository::new(
                connect(&db_config),
                &db_config,
                config.window_minutes,
            );
            repo.ping()
                .await
                .with_context(|| format!("clickhouse unreachable at {}", db_config.clickhouse_url))?;
            repo.ensure_schema().await?;
            Ok(Arc::new(repo))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sensorwatch_domain::{DetectorConfig, SinkConfig};

    #[tokio::test]
    async fn csv_context_wires_configured_pipeline() {
        let dir = std::env::temp_dir().join("sensorwatch-context-test");
        let config = AppConfig {
            data_dir: dir.to_string_lossy().to_string(),
            detectors: vec![
                DetectorConfig::new("zscore"),
                DetectorConfig::new("rolling").with_param("window", 5),
                DetectorConfig::new("unknown"),
            ],
            sinks: vec![SinkConfig::stdout()],
            ..AppConfig::default()
        };

        let context = AppContext::new(&config).await.expect("context");
        assert_eq!(context.state.service.detector_count(), 2);
        assert_eq!(context.state.service.sink_count(), 1);
        assert_eq!(context.state.config.window_minutes, 60);
    }

    #[tokio::test]
    async fn bad_detector_params_fail_startup() {
        let config = AppConfig {
            detectors: vec![DetectorConfig::new("lof").with_param("n_neighbors", 0)],
            ..AppConfig::default()
        };
        assert!(AppContext::new(&config).await.is_err());
    }
}
