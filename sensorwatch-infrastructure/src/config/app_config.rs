use std::env;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use tokio::fs;
use tracing::warn;

use sensorwatch_domain::{DetectorConfig, RuntimeConfig, SinkConfig};

use crate::config::validation::{validate_sink, STDERR_SINK, STDOUT_SINK};
use crate::repositories::config_files::load_detector_file;

pub const CONFIG_ENV: &str = "SENSORWATCH_CONFIG";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepositoryKind {
    Csv,
    Clickhouse,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DbConfig {
    pub clickhouse_url: String,
    pub clickhouse_database: String,
    pub clickhouse_user: Option<String>,
    pub clickhouse_password: Option<String>,
    pub clickhouse_table: String,
    pub clickhouse_report_table: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AppConfig {
    pub bind_addr: String,
    pub api_token: Option<String>,
    pub http_enabled: bool,
    pub repository: RepositoryKind,
    pub data_dir: String,
    pub report_file: String,
    pub clickhouse_url: String,
    pub clickhouse_database: String,
    pub clickhouse_user: Option<String>,
    pub clickhouse_password: Option<String>,
    pub clickhouse_table: String,
    pub clickhouse_report_table: String,
    pub window_minutes: u64,
    pub interval_seconds: u64,
    pub request_timeout_seconds: u64,
    pub detectors: Vec<DetectorConfig>,
    pub detectors_path: Option<String>,
    pub sinks: Vec<SinkConfig>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:3240".to_string(),
            api_token: None,
            http_enabled: false,
            repository: RepositoryKind::Csv,
            data_dir: "./data".to_string(),
            report_file: "anomaly_reports.jsonl".to_string(),
            clickhouse_url: "http://127.0.0.1:8123".to_string(),
            clickhouse_database: "sensorwatch".to_string(),
            clickhouse_user: None,
            clickhouse_password: None,
            clickhouse_table: "timeseries".to_string(),
            clickhouse_report_table: "anomaly_reports".to_string(),
            window_minutes: 60,
            interval_seconds: 300,
            request_timeout_seconds: 15,
            detectors: Vec::new(),
            detectors_path: None,
            sinks: vec![SinkConfig::stdout()],
        }
    }
}

impl AppConfig {
    /// Loads from `SENSORWATCH_CONFIG` (default `./config.toml`).
    pub async fn load() -> Result<Self> {
        let path = env::var(CONFIG_ENV).unwrap_or_else(|_| "./config.toml".to_string());
        Self::load_from(&path).await
    }

    pub async fn load_from(path: &str) -> Result<Self> {
        let file_path = Path::new(path);
        let base_dir = file_path.parent();
        let mut config = if file_path.exists() {
            let content = fs::read_to_string(file_path)
                .await
                .with_context(|| format!("read config {}", path))?;
            Self::from_toml(&content)?
        } else {
            warn!("{} not found, using defaults", path);
            AppConfig::default()
        };
        config.apply_env_overrides();
        config.resolve_paths(base_dir);
        config.normalize();
        config.load_detector_file().await;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).context("parse config toml")
    }

    pub fn normalize(&mut self) {
        self.api_token = non_blank(self.api_token.take());
        self.clickhouse_user = non_blank(self.clickhouse_user.take());
        self.clickhouse_password = non_blank(self.clickhouse_password.take());
        self.detectors_path = non_blank(self.detectors_path.take());
        for sink in &mut self.sinks {
            sink.url = non_blank(sink.url.take());
            sink.template = non_blank(sink.template.take());
            sink.path = non_blank(sink.path.take());
        }
    }

    fn resolve_paths(&mut self, base_dir: Option<&Path>) {
        let Some(base) = base_dir else {
            return;
        };
        self.data_dir = resolve_path(base, &self.data_dir);
        if let Some(path) = &self.detectors_path {
            self.detectors_path = Some(resolve_path(base, path));
        }
        for sink in &mut self.sinks {
            if let Some(path) = &sink.path {
                sink.path = Some(resolve_path(base, path));
            }
        }
    }

    /// A readable `detectors_path` replaces the inline list; a broken one is ignored.
    async fn load_detector_file(&mut self) {
        let Some(path) = self.detectors_path.clone() else {
            return;
        };
        match load_detector_file(&path).await {
            Ok(Some(detectors)) => self.detectors = detectors,
            Ok(None) => warn!("detector file {} has no detectors list", path),
            Err(err) => warn!("failed to load detector file {}: {:#}", path, err),
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.bind_addr
            .parse::<std::net::SocketAddr>()
            .map_err(|err| anyhow!("invalid bind_addr: {}", err))?;
        if self.window_minutes == 0 {
            return Err(anyhow!("window_minutes must be greater than 0"));
        }
        if self.interval_seconds == 0 {
            return Err(anyhow!("interval_seconds must be greater than 0"));
        }
        if self.data_dir.trim().is_empty() {
            return Err(anyhow!("data_dir must not be empty"));
        }
        if self.report_file.trim().is_empty() {
            return Err(anyhow!("report_file must not be empty"));
        }
        for (index, sink) in self.sinks.iter().enumerate() {
            validate_sink(sink).with_context(|| format!("sink #{}", index))?;
        }
        Ok(())
    }

    /// Copy for `--once` runs: stdout carries the report JSON, so console
    /// alert blocks move to stderr.
    pub fn one_shot(&self) -> AppConfig {
        let mut config = self.clone();
        for sink in &mut config.sinks {
            if sink.kind == STDOUT_SINK {
                sink.kind = STDERR_SINK.to_string();
            }
        }
        config
    }

    pub fn to_runtime_config(&self) -> RuntimeConfig {
        RuntimeConfig {
            bind_addr: self.bind_addr.clone(),
            api_token: self.api_token.clone(),
            http_enabled: self.http_enabled,
            window_minutes: self.window_minutes,
            interval_seconds: self.interval_seconds,
            request_timeout_seconds: self.request_timeout_seconds,
        }
    }

    pub fn to_db_config(&self) -> DbConfig {
        DbConfig {
            clickhouse_url: self.clickhouse_url.clone(),
            clickhouse_database: self.clickhouse_database.clone(),
            clickhouse_user: self.clickhouse_user.clone(),
            clickhouse_password: self.clickhouse_password.clone(),
            clickhouse_table: self.clickhouse_table.clone(),
            clickhouse_report_table: self.clickhouse_report_table.clone(),
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(value) = env::var("SENSORWATCH_BIND_ADDR") {
            self.bind_addr = value;
        }
        if let Ok(value) = env::var("SENSORWATCH_API_TOKEN") {
            self.api_token = Some(value);
        }
        if let Ok(value) = env::var("SENSORWATCH_HTTP_ENABLED") {
            self.http_enabled = value.parse().unwrap_or(self.http_enabled);
        }
        if let Ok(value) = env::var("SENSORWATCH_REPOSITORY") {
            match value.trim().to_ascii_lowercase().as_str() {
                "csv" => self.repository = RepositoryKind::Csv,
                "clickhouse" => self.repository = RepositoryKind::Clickhouse,
                other => warn!("ignoring unknown SENSORWATCH_REPOSITORY '{}'", other),
            }
        }
        if let Ok(value) = env::var("SENSORWATCH_DATA_DIR") {
            self.data_dir = value;
        }
        if let Ok(value) = env::var("SENSORWATCH_REPORT_FILE") {
            self.report_file = value;
        }
        if let Ok(value) = env::var("SENSORWATCH_CLICKHOUSE_URL") {
            self.clickhouse_url = value;
        }
        if let Ok(value) = env::var("SENSORWATCH_CLICKHOUSE_DATABASE") {
            self.clickhouse_database = value;
        }
        if let Ok(value) = env::var("SENSORWATCH_CLICKHOUSE_USER") {
            self.clickhouse_user = Some(value);
        }
        if let Ok(value) = env::var("SENSORWATCH_CLICKHOUSE_PASSWORD") {
            self.clickhouse_password = Some(value);
        }
        if let Ok(value) = env::var("SENSORWATCH_CLICKHOUSE_TABLE") {
            self.clickhouse_table = value;
        }
        if let Ok(value) = env::var("SENSORWATCH_CLICKHOUSE_REPORT_TABLE") {
            self.clickhouse_report_table = value;
        }
        if let Ok(value) = env::var("SENSORWATCH_WINDOW_MINUTES") {
            self.window_minutes = value.parse().unwrap_or(self.window_minutes);
        }
        if let Ok(value) = env::var("SENSORWATCH_INTERVAL_SECONDS") {
            self.interval_seconds = value.parse().unwrap_or(self.interval_seconds);
        }
        if let Ok(value) = env::var("SENSORWATCH_REQUEST_TIMEOUT_SECONDS") {
            self.request_timeout_seconds = value.parse().unwrap_or(self.request_timeout_seconds);
        }
        if let Ok(value) = env::var("SENSORWATCH_DETECTORS_PATH") {
            self.detectors_path = Some(value);
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|item| !item.trim().is_empty())
}

fn resolve_path(base: &Path, value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return trimmed.to_string();
    }
    let path = Path::new(trimmed);
    if path.is_absolute() {
        trimmed.to_string()
    } else {
        base.join(path).to_string_lossy().to_string()
    }
}
