use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use clickhouse::{Client, Row};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use sensorwatch_domain::{AnomalyReport, Capability, TimeWindow, WindowRepository, WindowRow};

use crate::config::DbConfig;
use crate::utils::{clickhouse_millis_literal, offset_to_chrono};

#[derive(Debug, Clone, Deserialize, Row)]
struct ReadingRow {
    #[serde(with = "clickhouse::serde::time::datetime64::millis")]
    ts: OffsetDateTime,
    sensor_id: Option<i64>,
    value: Option<f64>,
}

/// Window bounds are `Nullable(DateTime64(3))`, written as epoch millis.
#[derive(Debug, Clone, Serialize, Row)]
struct ReportRow {
    #[serde(with = "clickhouse::serde::time::datetime64::millis")]
    created_at: OffsetDateTime,
    sensor_id: Option<i64>,
    window_start: Option<i64>,
    window_end: Option<i64>,
    severity: f64,
    severity_level: String,
    anomalies_count: u64,
    detector_stats_json: String,
}

pub fn connect(db_config: &DbConfig) -> Client {
    let mut client = Client::default()
        .with_url(&db_config.clickhouse_url)
        .with_database(&db_config.clickhouse_database);
    if let Some(user) = &db_config.clickhouse_user {
        client = client.with_user(user);
    }
    if let Some(password) = &db_config.clickhouse_password {
        client = client.with_password(password);
    }
    client
}

#[derive(Clone)]
pub struct ClickhouseWindowRepository {
    client: Client,
    database: String,
    table: String,
    report_table: String,
    window_minutes: u64,
}

impl ClickhouseWindowRepository {
    pub fn new(client: Client, db_config: &DbConfig, window_minutes: u64) -> Self {
        Self {
            client,
            database: db_config.clickhouse_database.clone(),
            table: db_config.clickhouse_table.clone(),
            report_table: db_config.clickhouse_report_table.clone(),
            window_minutes,
        }
    }

    pub async fn ensure_schema(&self) -> Result<()> {
        let create_db = format!("CREATE DATABASE IF NOT EXISTS {}", self.database);
        self.client.query(&create_db).execute().await?;

        let create_readings = format!(
            r#"
CREATE TABLE IF NOT EXISTS {} (
    ts DateTime64(3),
    sensor_id Nullable(Int64),
    value Nullable(Float64)
) ENGINE = MergeTree
PARTITION BY toDate(ts)
ORDER BY ts
"#,
            self.table
        );
        self.client.query(&create_readings).execute().await?;

        let create_reports = format!(
            r#"
CREATE TABLE IF NOT EXISTS {} (
    created_at DateTime64(3),
    sensor_id Nullable(Int64),
    window_start Nullable(DateTime64(3)),
    window_end Nullable(DateTime64(3)),
    severity Float64,
    severity_level String,
    anomalies_count UInt64,
    detector_stats_json String
) ENGINE = MergeTree
PARTITION BY toDate(created_at)
ORDER BY created_at
TTL toDateTime(created_at) + INTERVAL 90 DAY
"#,
            self.report_table
        );
        self.client.query(&create_reports).execute().await?;
        Ok(())
    }

    pub async fn ping(&self) -> Result<()> {
        let _: u8 = self.client.query("SELECT toUInt8(1)").fetch_one().await?;
        Ok(())
    }

    /// Expects the readings schema created by `ensure_schema`.
    fn select_prefix(&self) -> String {
        format!("SELECT ts, sensor_id, value FROM {}", self.table)
    }

    pub fn window_query(&self, start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> String {
        let mut conditions = Vec::new();
        if let Some(start) = start {
            conditions.push(format!("ts >= {}", clickhouse_millis_literal(start)));
        }
        if let Some(end) = end {
            conditions.push(format!("ts <= {}", clickhouse_millis_literal(end)));
        }
        let mut query = self.select_prefix();
        if !conditions.is_empty() {
            query.push_str(" WHERE ");
            query.push_str(&conditions.join(" AND "));
        }
        query.push_str(" ORDER BY ts");
        query
    }

    pub fn latest_query(&self) -> String {
        format!(
            "{} WHERE ts >= now64(3) - INTERVAL {} MINUTE ORDER BY ts",
            self.select_prefix(),
            self.window_minutes
        )
    }

    async fn fetch_window(&self, query: &str) -> Result<TimeWindow> {
        let rows = self.client.query(query).fetch_all::<ReadingRow>().await?;
        let rows: Vec<WindowRow> = rows
            .into_iter()
            .map(|row| WindowRow {
                timestamp: offset_to_chrono(row.ts),
                sensor_id: row.sensor_id,
                value: row.value,
            })
            .collect();
        Ok(TimeWindow::from_rows(&rows))
    }
}

fn report_row(report: &AnomalyReport) -> Result<ReportRow> {
    Ok(ReportRow {
        created_at: OffsetDateTime::now_utc(),
        sensor_id: report.sensor_id,
        window_start: report.window_start.map(|at| at.timestamp_millis()),
        window_end: report.window_end.map(|at| at.timestamp_millis()),
        severity: report.severity,
        severity_level: report.severity_level.as_str().to_string(),
        anomalies_count: report.anomalies_count() as u64,
        detector_stats_json: serde_json::to_string(&report.detector_stats)?,
    })
}

#[async_trait]
impl WindowRepository for ClickhouseWindowRepository {
    async fn read_window(
        &self,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Result<Capability<TimeWindow>> {
        let query = self.window_query(start, end);
        Ok(Capability::Supported(self.fetch_window(&query).await?))
    }

    async fn read_latest_window(&self) -> Result<Capability<TimeWindow>> {
        let query = self.latest_query();
        Ok(Capability::Supported(self.fetch_window(&query).await?))
    }

    async fn persist_report(&self, report: &AnomalyReport) -> Result<Capability<()>> {
        let mut insert = self.client.insert(&self.report_table)?;
        insert.write(&report_row(report)?).await?;
        insert.end().await?;
        Ok(Capability::Supported(()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use sensorwatch_domain::{DetectorStats, SeverityLevel};

    fn repository() -> ClickhouseWindowRepository {
        let db_config = DbConfig {
            clickhouse_url: "http://127.0.0.1:8123".to_string(),
            clickhouse_database: "sensorwatch".to_string(),
            clickhouse_user: None,
            clickhouse_password: None,
            clickhouse_table: "readings".to_string(),
            clickhouse_report_table: "reports".to_string(),
        };
        ClickhouseWindowRepository::new(connect(&db_config), &db_config, 45)
    }

    #[test]
    fn window_query_applies_present_bounds_only() {
        let repo = repository();
        let start = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();

        let open = repo.window_query(None, None);
        assert!(open.ends_with("FROM readings ORDER BY ts"));

        let bounded = repo.window_query(Some(start), None);
        assert!(bounded.contains(
            "WHERE ts >= fromUnixTimestamp64Milli(toInt64(1735689600000), 'UTC') ORDER BY ts"
        ));
        assert!(!bounded.contains("ts <="));
    }

    #[test]
    fn latest_query_uses_window_minutes() {
        assert!(repository()
            .latest_query()
            .contains("WHERE ts >= now64(3) - INTERVAL 45 MINUTE ORDER BY ts"));
    }

    #[test]
    fn report_row_flattens_report() {
        let start = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let mut report = AnomalyReport::empty(Some(start), None);
        report.severity = 150.0;
        report.severity_level = SeverityLevel::High;
        report
            .detector_stats
            .insert("lof".to_string(), DetectorStats { count: 2, severity: 150.0 });

        let row = report_row(&report).expect("row");
        assert_eq!(row.window_start, Some(1_735_689_600_000));
        assert_eq!(row.window_end, None);
        assert_eq!(row.severity_level, "high");
        assert_eq!(row.detector_stats_json, r#"{"lof":{"count":2,"severity":150.0}}"#);
    }
}
