// Report entities
// The single artifact produced by one detection run

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::{AnomalyTimestamp, SeverityLevel};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyRecord {
    pub timestamp: Option<AnomalyTimestamp>,
    pub severity: f64,
    pub detector: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DetectorStats {
    pub count: usize,
    pub severity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyReport {
    pub sensor_id: Option<i64>,
    pub window_start: Option<DateTime<Utc>>,
    pub window_end: Option<DateTime<Utc>>,
    pub anomalies: Vec<AnomalyRecord>,
    pub severity: f64,
    pub severity_level: SeverityLevel,
    pub detector_stats: BTreeMap<String, DetectorStats>,
}

impl AnomalyReport {
    /// Zero-valued report for a run that had nothing to look at.
    pub fn empty(window_start: Option<DateTime<Utc>>, window_end: Option<DateTime<Utc>>) -> Self {
        Self {
            sensor_id: None,
            window_start,
            window_end,
            anomalies: Vec::new(),
            severity: 0.0,
            severity_level: SeverityLevel::Low,
            detector_stats: BTreeMap::new(),
        }
    }

    pub fn anomalies_count(&self) -> usize {
        self.anomalies.len()
    }

    pub fn summary(&self) -> ReportSummary {
        ReportSummary::from(self)
    }
}

/// Flat, one-line-per-report form used for persistence and notifications.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub window_start: Option<DateTime<Utc>>,
    pub window_end: Option<DateTime<Utc>>,
    pub severity: f64,
    pub severity_level: SeverityLevel,
    pub anomalies_count: usize,
    pub detector_stats: BTreeMap<String, DetectorStats>,
}

impl From<&AnomalyReport> for ReportSummary {
    fn from(report: &AnomalyReport) -> Self {
        Self {
            window_start: report.window_start,
            window_end: report.window_end,
            severity: report.severity,
            severity_level: report.severity_level,
            anomalies_count: report.anomalies_count(),
            detector_stats: report.detector_stats.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn empty_report_is_low_and_bare() {
        let report = AnomalyReport::empty(None, None);
        assert_eq!(report.severity, 0.0);
        assert_eq!(report.severity_level, SeverityLevel::Low);
        assert!(report.anomalies.is_empty());
        assert!(report.detector_stats.is_empty());
    }

    #[test]
    fn summary_serializes_persisted_record_shape() {
        let start = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let mut report = AnomalyReport::empty(Some(start), None);
        report.severity = 12.5;
        report.severity_level = SeverityLevel::Medium;
        report.anomalies.push(AnomalyRecord {
            timestamp: Some(AnomalyTimestamp::Index(2)),
            severity: 12.5,
            detector: "zscore".to_string(),
        });
        report.detector_stats.insert(
            "zscore".to_string(),
            DetectorStats {
                count: 1,
                severity: 12.5,
            },
        );

        let encoded = serde_json::to_value(report.summary()).expect("encode");
        assert_eq!(
            encoded,
            json!({
                "window_start": "2025-01-01T00:00:00Z",
                "window_end": null,
                "severity": 12.5,
                "severity_level": "medium",
                "anomalies_count": 1,
                "detector_stats": {"zscore": {"count": 1, "severity": 12.5}}
            })
        );
    }
}
