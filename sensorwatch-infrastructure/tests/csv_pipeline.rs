use std::sync::Arc;

use sensorwatch_application::DetectionService;
use sensorwatch_domain::{
    AnomalyTimestamp, DetectorConfig, ReportSink, ReportSummary, SeverityLevel, SinkConfig,
};
use sensorwatch_infrastructure::{build_detectors, build_sinks, CsvWindowRepository};

fn spike_csv() -> String {
    let mut csv = String::from("ts,sensor_id,value\n");
    for minute in 0..10 {
        let value = if minute == 9 { "100.0" } else { "1.0" };
        csv.push_str(&format!("2025-01-01 00:{:02}:00,3,{}\n", minute, value));
    }
    csv
}

fn jsonl_sink(path: &std::path::Path) -> SinkConfig {
    SinkConfig {
        kind: "jsonl".to_string(),
        path: Some(path.to_string_lossy().to_string()),
        ..SinkConfig::stdout()
    }
}

#[tokio::test]
async fn csv_window_flows_to_report_sink_and_persistence() {
    let dir = tempfile::tempdir().expect("tempdir");
    let data_dir = dir.path().join("data");
    std::fs::create_dir_all(&data_dir).expect("data dir");
    std::fs::write(data_dir.join("readings.csv"), spike_csv()).expect("write csv");

    let detectors = build_detectors(&[
        DetectorConfig::new("zscore").with_param("threshold", 2.0),
        DetectorConfig::new("mad"),
        DetectorConfig::new("unknown"),
    ])
    .expect("detectors");
    let sink_path = dir.path().join("out").join("alerts.jsonl");
    let sinks: Vec<Arc<dyn ReportSink>> = build_sinks(&[jsonl_sink(&sink_path)], 5).expect("sinks");
    let repository = Arc::new(CsvWindowRepository::new(&data_dir, "anomaly_reports.jsonl"));

    let service = DetectionService::new(repository.clone(), detectors, sinks);
    let run = service.run(None, None).await;
    let report = &run.report;

    assert_eq!(run.rows, 10);
    assert_eq!(report.sensor_id, Some(3));
    assert!(report.severity > 0.0);
    assert_eq!(report.severity_level, SeverityLevel::classify(report.severity));
    let keys: Vec<&str> = report.detector_stats.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["mad", "zscore"]);
    assert_eq!(report.detector_stats["mad"].count, 1);

    let last_minute = chrono::DateTime::parse_from_rfc3339("2025-01-01T00:09:00Z")
        .expect("instant")
        .with_timezone(&chrono::Utc);
    assert!(report
        .anomalies
        .iter()
        .any(|record| record.detector == "zscore"
            && record.timestamp == Some(AnomalyTimestamp::Instant(last_minute))));

    let sink_lines = std::fs::read_to_string(&sink_path).expect("sink file");
    let persisted = std::fs::read_to_string(repository.report_path()).expect("report file");
    for content in [sink_lines, persisted] {
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 1);
        let summary: ReportSummary = serde_json::from_str(lines[0]).expect("summary");
        assert_eq!(summary, report.summary());
    }
}

#[tokio::test]
async fn empty_data_dir_still_delivers_a_low_report() {
    let dir = tempfile::tempdir().expect("tempdir");
    let sink_path = dir.path().join("alerts.jsonl");
    let sinks = build_sinks(&[jsonl_sink(&sink_path)], 5).expect("sinks");
    let detectors = build_detectors(&[DetectorConfig::new("lof")]).expect("detectors");
    let repository = Arc::new(CsvWindowRepository::new(
        dir.path().join("data"),
        "anomaly_reports.jsonl",
    ));

    let service = DetectionService::new(repository, detectors, sinks);
    let report = service.run_once(None, None).await;

    assert_eq!(report.severity, 0.0);
    assert_eq!(report.severity_level, SeverityLevel::Low);
    assert!(report.anomalies.is_empty());
    assert!(report.detector_stats.is_empty());
    let content = std::fs::read_to_string(&sink_path).expect("sink file");
    assert_eq!(content.lines().count(), 1);
}
