use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct Metrics {
    runs: AtomicU64,
    rows_processed: AtomicU64,
    anomalies: AtomicU64,
    detector_failures: AtomicU64,
    sink_failures: AtomicU64,
    persist_failures: AtomicU64,
    last_run_duration_ms: AtomicU64,
    // f64 bits
    last_anomaly_rate: AtomicU64,
}

impl Metrics {
    pub fn record_run(&self, rows: usize, anomalies: usize, duration_ms: u64) {
        self.runs.fetch_add(1, Ordering::Relaxed);
        self.rows_processed.fetch_add(rows as u64, Ordering::Relaxed);
        self.anomalies.fetch_add(anomalies as u64, Ordering::Relaxed);
        self.last_run_duration_ms.store(duration_ms, Ordering::Relaxed);
        let rate = if rows == 0 {
            0.0
        } else {
            anomalies as f64 / rows as f64
        };
        self.last_anomaly_rate.store(rate.to_bits(), Ordering::Relaxed);
    }

    pub fn record_detector_failure(&self) {
        self.detector_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_sink_failures(&self, count: usize) {
        self.sink_failures.fetch_add(count as u64, Ordering::Relaxed);
    }

    pub fn record_persist_failure(&self) {
        self.persist_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn runs(&self) -> u64 {
        self.runs.load(Ordering::Relaxed)
    }

    pub fn render_prometheus(&self) -> String {
        let runs = self.runs.load(Ordering::Relaxed);
        let rows = self.rows_processed.load(Ordering::Relaxed);
        let anomalies = self.anomalies.load(Ordering::Relaxed);
        let detector_failures = self.detector_failures.load(Ordering::Relaxed);
        let sink_failures = self.sink_failures.load(Ordering::Relaxed);
        let persist_failures = self.persist_failures.load(Ordering::Relaxed);
        let duration = self.last_run_duration_ms.load(Ordering::Relaxed);
        let rate = f64::from_bits(self.last_anomaly_rate.load(Ordering::Relaxed));

        format!(
            "# TYPE sensorwatch_runs_total counter\n\
sensorwatch_runs_total {}\n\
# TYPE sensorwatch_rows_processed_total counter\n\
sensorwatch_rows_processed_total {}\n\
# TYPE sensorwatch_anomalies_total counter\n\
sensorwatch_anomalies_total {}\n\
# TYPE sensorwatch_detector_failures_total counter\n\
sensorwatch_detector_failures_total {}\n\
# TYPE sensorwatch_sink_failures_total counter\n\
sensorwatch_sink_failures_total {}\n\
# TYPE sensorwatch_persist_failures_total counter\n\
sensorwatch_persist_failures_total {}\n\
# TYPE sensorwatch_last_run_duration_ms gauge\n\
sensorwatch_last_run_duration_ms {}\n\
# TYPE sensorwatch_last_anomaly_rate gauge\n\
sensorwatch_last_anomaly_rate {}\n",
            runs,
            rows,
            anomalies,
            detector_failures,
            sink_failures,
            persist_failures,
            duration,
            rate
        )
    }
}
