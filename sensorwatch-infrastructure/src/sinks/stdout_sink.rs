use async_trait::async_trait;
use chrono::{DateTime, Utc};

use sensorwatch_domain::{AnomalyReport, ReportSink};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConsoleStream {
    #[default]
    Stdout,
    Stderr,
}

/// Plain-text alert block on a console stream.
#[derive(Default)]
pub struct StdoutSink {
    stream: ConsoleStream,
}

impl StdoutSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stderr() -> Self {
        Self {
            stream: ConsoleStream::Stderr,
        }
    }

    pub fn render(report: &AnomalyReport) -> anyhow::Result<String> {
        let summary = serde_json::to_string(&report.summary())?;
        Ok(format!(
            "--- ALERT ---\nwindow: {} -> {}\nseverity: {} ({})\nanomalies: {}\n{}\n",
            format_bound(report.window_start),
            format_bound(report.window_end),
            report.severity,
            report.severity_level,
            report.anomalies_count(),
            summary
        ))
    }
}

fn format_bound(bound: Option<DateTime<Utc>>) -> String {
    bound
        .map(|at| at.to_rfc3339())
        .unwrap_or_else(|| "null".to_string())
}

#[async_trait]
impl ReportSink for StdoutSink {
    fn name(&self) -> &str {
        match self.stream {
            ConsoleStream::Stdout => "stdout",
            ConsoleStream::Stderr => "stderr",
        }
    }

    async fn send(&self, report: &AnomalyReport) -> anyhow::Result<()> {
        let text = Self::render(report)?;
        match self.stream {
            ConsoleStream::Stdout => print!("{}", text),
            ConsoleStream::Stderr => eprint!("{}", text),
        }
        Ok(())
    }
}
