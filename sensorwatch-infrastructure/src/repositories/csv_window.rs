use std::path::{Path, PathBuf};
use std::time::SystemTime;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::fs;
use tracing::debug;

use sensorwatch_domain::{
    parse_instant, AnomalyReport, Capability, Cell, Column, TimeWindow, WindowRepository,
    TIMESTAMP_COLUMN, TS_COLUMN,
};

use crate::sinks::append_summary_line;

/// Window source backed by the newest CSV file in a data directory.
pub struct CsvWindowRepository {
    data_dir: PathBuf,
    report_path: PathBuf,
}

impl CsvWindowRepository {
    pub fn new(data_dir: impl Into<PathBuf>, report_file: &str) -> Self {
        let data_dir = data_dir.into();
        let report_path = data_dir.join(report_file);
        Self {
            data_dir,
            report_path,
        }
    }

    pub fn report_path(&self) -> &Path {
        &self.report_path
    }

    async fn latest_csv(&self) -> Result<Option<PathBuf>> {
        if !self.data_dir.exists() {
            return Ok(None);
        }
        let mut entries = fs::read_dir(&self.data_dir)
            .await
            .with_context(|| format!("read dir {}", self.data_dir.display()))?;
        let mut latest: Option<(SystemTime, PathBuf)> = None;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("csv") {
                continue;
            }
            let modified = entry.metadata().await?.modified()?;
            if latest.as_ref().map_or(true, |(at, _)| modified > *at) {
                latest = Some((modified, path));
            }
        }
        Ok(latest.map(|(_, path)| path))
    }

    async fn read_latest_file(&self) -> Result<TimeWindow> {
        let Some(path) = self.latest_csv().await? else {
            debug!("no csv files in {}", self.data_dir.display());
            return Ok(TimeWindow::default());
        };
        let content = fs::read(&path)
            .await
            .with_context(|| format!("read {}", path.display()))?;
        parse_csv(&content).with_context(|| format!("parse {}", path.display()))
    }
}

/// Parses CSV text into a window. A `ts` header becomes `timestamp` unless
/// both exist; the timestamp column holds instants, other cells are numbers
/// when they parse and text otherwise.
pub fn parse_csv(content: &[u8]) -> Result<TimeWindow> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(content);
    let mut names: Vec<String> = reader.headers()?.iter().map(ToString::to_string).collect();
    if !names.iter().any(|name| name == TIMESTAMP_COLUMN) {
        if let Some(ts) = names.iter_mut().find(|name| name.as_str() == TS_COLUMN) {
            *ts = TIMESTAMP_COLUMN.to_string();
        }
    }
    let timestamp_idx = names.iter().position(|name| name == TIMESTAMP_COLUMN);

    let mut cells: Vec<Vec<Cell>> = vec![Vec::new(); names.len()];
    for record in reader.records() {
        let record = record?;
        for (idx, field) in record.iter().enumerate() {
            cells[idx].push(parse_cell(field, Some(idx) == timestamp_idx));
        }
    }

    let columns = names
        .into_iter()
        .zip(cells)
        .map(|(name, cells)| Column::new(name, cells))
        .collect();
    Ok(TimeWindow::from_columns(columns)?)
}

fn parse_cell(field: &str, is_timestamp: bool) -> Cell {
    if field.is_empty() {
        return Cell::Null;
    }
    if is_timestamp {
        return parse_instant(field)
            .map(Cell::Instant)
            .unwrap_or_else(|| Cell::Text(field.to_string()));
    }
    field
        .parse::<f64>()
        .map(Cell::Number)
        .unwrap_or_else(|_| Cell::Text(field.to_string()))
}

#[async_trait]
impl WindowRepository for CsvWindowRepository {
    /// The range is not applied: the newest file is the window.
    async fn read_window(
        &self,
        _start: Option<DateTime<Utc>>,
        _end: Option<DateTime<Utc>>,
    ) -> Result<Capability<TimeWindow>> {
        Ok(Capability::Supported(self.read_latest_file().await?))
    }

    async fn read_latest_window(&self) -> Result<Capability<TimeWindow>> {
        Ok(Capability::Supported(self.read_latest_file().await?))
    }

    async fn load_timeseries(&self) -> Result<Capability<TimeWindow>> {
        Ok(Capability::Supported(self.read_latest_file().await?))
    }

    async fn persist_report(&self, report: &AnomalyReport) -> Result<Capability<()>> {
        append_summary_line(&self.report_path, report).await?;
        Ok(Capability::Supported(()))
    }
}
