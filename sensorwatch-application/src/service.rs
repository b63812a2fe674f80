use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use sensorwatch_domain::{
    normalize_detection, AnomalyRecord, AnomalyReport, AnomalyTimestamp, Capability, Detector,
    DetectorInput, DetectorStats, ReportSink, SeverityLevel, TimeWindow, WindowRepository,
};

use crate::delivery::{deliver_all, persist_report, DeliveryOutcome};
use crate::Metrics;

/// Everything one run produced, including per-target delivery outcomes.
#[derive(Debug, Clone)]
pub struct DetectionRun {
    pub report: AnomalyReport,
    pub rows: usize,
    pub detector_failures: Vec<String>,
    pub sink_outcomes: Vec<DeliveryOutcome>,
    pub persist_outcome: DeliveryOutcome,
}

#[derive(Debug, Clone, Copy)]
enum ReadMethod {
    Windowed,
    Latest,
    Load,
}

impl ReadMethod {
    const ORDER: [ReadMethod; 3] = [ReadMethod::Windowed, ReadMethod::Latest, ReadMethod::Load];

    fn as_str(&self) -> &'static str {
        match self {
            ReadMethod::Windowed => "read_window",
            ReadMethod::Latest => "read_latest_window",
            ReadMethod::Load => "load_timeseries",
        }
    }
}

pub struct DetectionService {
    repository: Arc<dyn WindowRepository>,
    detectors: Vec<Box<dyn Detector>>,
    sinks: Vec<Arc<dyn ReportSink>>,
    metrics: Arc<Metrics>,
}

impl DetectionService {
    pub fn new(
        repository: Arc<dyn WindowRepository>,
        detectors: Vec<Box<dyn Detector>>,
        sinks: Vec<Arc<dyn ReportSink>>,
    ) -> Self {
        Self {
            repository,
            detectors,
            sinks,
            metrics: Arc::new(Metrics::default()),
        }
    }

    pub fn metrics(&self) -> Arc<Metrics> {
        self.metrics.clone()
    }

    pub fn detector_count(&self) -> usize {
        self.detectors.len()
    }

    pub fn sink_count(&self) -> usize {
        self.sinks.len()
    }

    /// Runs one detection pass and returns only the report.
    pub async fn run_once(
        &self,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> AnomalyReport {
        self.run(start, end).await.report
    }

    /// Runs one detection pass. Nothing past window retrieval can fail the
    /// run: detector, sink and persistence errors are logged and recorded.
    pub async fn run(
        &self,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> DetectionRun {
        let started = Instant::now();
        let window = self.fetch_window(start, end).await;

        let mut detector_failures = Vec::new();
        let report = if window.is_empty() {
            debug!("empty window, skipping detectors");
            AnomalyReport::empty(start, end)
        } else {
            self.detect(&window, start, end, &mut detector_failures)
        };

        let sink_outcomes = deliver_all(&report, &self.sinks).await;
        let sink_failures = sink_outcomes.iter().filter(|o| o.is_failure()).count();
        self.metrics.record_sink_failures(sink_failures);

        let persist_outcome = persist_report(self.repository.as_ref(), &report).await;
        if persist_outcome.is_failure() {
            self.metrics.record_persist_failure();
        }

        let rows = window.len();
        self.metrics.record_run(
            rows,
            report.anomalies_count(),
            started.elapsed().as_millis() as u64,
        );
        info!(
            "detection run finished: rows={} anomalies={} severity={:.3} level={}",
            rows,
            report.anomalies_count(),
            report.severity,
            report.severity_level
        );

        DetectionRun {
            report,
            rows,
            detector_failures,
            sink_outcomes,
            persist_outcome,
        }
    }

    /// First read capability that is supported and succeeds wins; an
    /// exhausted chain yields an empty window.
    async fn fetch_window(
        &self,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> TimeWindow {
        for method in ReadMethod::ORDER {
            let result = match method {
                ReadMethod::Windowed => self.repository.read_window(start, end).await,
                ReadMethod::Latest => self.repository.read_latest_window().await,
                ReadMethod::Load => self.repository.load_timeseries().await,
            };
            match result {
                Ok(Capability::Supported(window)) => {
                    debug!("{} returned {} rows", method.as_str(), window.len());
                    return window;
                }
                Ok(Capability::Unsupported) => {}
                Err(err) => warn!("repository {} failed: {:#}", method.as_str(), err),
            }
        }
        warn!("no repository read method produced a window");
        TimeWindow::default()
    }

    fn detect(
        &self,
        window: &TimeWindow,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
        failures: &mut Vec<String>,
    ) -> AnomalyReport {
        let mut anomalies = Vec::new();
        let mut detector_stats = BTreeMap::new();
        let mut severity = 0.0;

        for detector in &self.detectors {
            let raw = match detector.detect(DetectorInput::Window(window)) {
                Ok(raw) => Some(raw),
                Err(err) => {
                    warn!("detector {} failed: {}", detector.name(), err);
                    self.metrics.record_detector_failure();
                    failures.push(detector.name().to_string());
                    None
                }
            };
            let normalized = normalize_detection(detector.name(), raw);
            detector_stats.insert(
                detector.kind().to_string(),
                DetectorStats {
                    count: normalized.count,
                    severity: normalized.severity,
                },
            );
            severity += normalized.severity;
            anomalies.extend(
                normalized
                    .records
                    .into_iter()
                    .map(|record| resolve_timestamp(window, record)),
            );
        }

        AnomalyReport {
            sensor_id: window.single_sensor_id(),
            window_start: start,
            window_end: end,
            anomalies,
            severity,
            severity_level: SeverityLevel::classify(severity),
            detector_stats,
        }
    }
}

/// Positional timestamps become real instants when the window has them.
fn resolve_timestamp(window: &TimeWindow, mut record: AnomalyRecord) -> AnomalyRecord {
    if let Some(AnomalyTimestamp::Index(idx)) = record.timestamp {
        if let Some(at) = window.timestamp_at(idx) {
            record.timestamp = Some(AnomalyTimestamp::Instant(at));
        }
    }
    record
}
