use crate::entities::{AnomalyRecord, RawDetection};
use crate::utils::{finite_or_zero, parse_numeric_or_zero};
use crate::value_objects::AnomalyTimestamp;

/// Canonical form of one detector's output.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedDetection {
    pub records: Vec<AnomalyRecord>,
    pub severity: f64,
    pub count: usize,
}

impl NormalizedDetection {
    fn from_records(records: Vec<AnomalyRecord>, severity: f64) -> Self {
        let count = records.len();
        Self {
            records,
            severity,
            count,
        }
    }
}

/// Converts any detector output shape into records, total severity and count.
///
/// `None` (a failed detection) normalizes to an empty result. Numeric fields
/// are coerced, so this never fails.
pub fn normalize_detection(detector_name: &str, raw: Option<RawDetection>) -> NormalizedDetection {
    let Some(raw) = raw else {
        return NormalizedDetection::default();
    };
    match raw {
        RawDetection::Scored(result) => {
            let records = positive_points(detector_name, result.anomalies.into_iter());
            let severity = result.severity.map(finite_or_zero).unwrap_or(0.0);
            NormalizedDetection::from_records(records, severity)
        }
        RawDetection::Series(values) => {
            let severity = values.iter().copied().map(finite_or_zero).sum();
            let records = positive_points(detector_name, values.into_iter());
            NormalizedDetection::from_records(records, severity)
        }
        RawDetection::Records(raw_records) => {
            let records: Vec<AnomalyRecord> = raw_records
                .into_iter()
                .map(|record| {
                    let severity = record
                        .severity
                        .as_ref()
                        .or(record.value.as_ref())
                        .map(parse_numeric_or_zero)
                        .unwrap_or(0.0);
                    AnomalyRecord {
                        timestamp: record.timestamp,
                        severity,
                        detector: record
                            .detector
                            .unwrap_or_else(|| detector_name.to_string()),
                    }
                })
                .collect();
            let severity = records.iter().map(|record| record.severity).sum();
            NormalizedDetection::from_records(records, severity)
        }
        RawDetection::Scalars(values) => {
            let records = positive_points(
                detector_name,
                values.iter().map(parse_numeric_or_zero),
            );
            let severity = records.iter().map(|record| record.severity).sum();
            NormalizedDetection::from_records(records, severity)
        }
    }
}

fn positive_points(detector_name: &str, values: impl Iterator<Item = f64>) -> Vec<AnomalyRecord> {
    values
        .enumerate()
        .filter(|(_, severity)| *severity > 0.0 && severity.is_finite())
        .map(|(idx, severity)| AnomalyRecord {
            timestamp: Some(AnomalyTimestamp::Index(idx)),
            severity,
            detector: detector_name.to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{DetectionResult, RawRecord};
    use serde_json::json;

    const SEVERITIES: [f64; 4] = [0.0, 2.0, 0.0, 3.0];

    #[test]
    fn missing_result_is_empty() {
        let normalized = normalize_detection("zscore", None);
        assert!(normalized.records.is_empty());
        assert_eq!(normalized.severity, 0.0);
        assert_eq!(normalized.count, 0);
    }

    #[test]
    fn scored_result_keeps_positive_points_and_own_total() {
        let raw = RawDetection::Scored(DetectionResult {
            anomalies: SEVERITIES.to_vec(),
            severity: Some(42.0),
        });
        let normalized = normalize_detection("zscore", Some(raw));
        assert_eq!(normalized.count, 2);
        assert_eq!(normalized.severity, 42.0);
        assert_eq!(
            normalized.records[0],
            AnomalyRecord {
                timestamp: Some(AnomalyTimestamp::Index(1)),
                severity: 2.0,
                detector: "zscore".to_string(),
            }
        );
        assert_eq!(normalized.records[1].timestamp, Some(AnomalyTimestamp::Index(3)));
    }

    #[test]
    fn scored_result_without_total_falls_back_to_zero() {
        let raw = RawDetection::Scored(DetectionResult {
            anomalies: vec![f64::NAN, 1.0],
            severity: None,
        });
        let normalized = normalize_detection("mad", Some(raw));
        assert_eq!(normalized.severity, 0.0);
        assert_eq!(normalized.count, 1);
        assert_eq!(normalized.records[0].timestamp, Some(AnomalyTimestamp::Index(1)));
    }

    #[test]
    fn bare_series_sums_entries() {
        let normalized = normalize_detection("lof", Some(RawDetection::Series(SEVERITIES.to_vec())));
        assert_eq!(normalized.severity, 5.0);
        assert_eq!(normalized.count, 2);
        assert!(normalized.records.iter().all(|record| record.detector == "lof"));

        let empty = normalize_detection("lof", Some(RawDetection::Series(Vec::new())));
        assert_eq!(empty.severity, 0.0);
        assert_eq!(empty.count, 0);
    }

    #[test]
    fn records_pass_through_without_filter() {
        let raw = RawDetection::Records(
            SEVERITIES
                .iter()
                .enumerate()
                .map(|(idx, severity)| RawRecord {
                    timestamp: Some(AnomalyTimestamp::Index(idx)),
                    severity: Some(json!(severity)),
                    ..RawRecord::default()
                })
                .collect(),
        );
        let normalized = normalize_detection("custom", Some(raw));
        assert_eq!(normalized.count, 4);
        assert_eq!(normalized.severity, 5.0);
        assert_eq!(normalized.records[0].severity, 0.0);
        assert!(normalized.records.iter().all(|record| record.detector == "custom"));
    }

    #[test]
    fn records_fall_back_to_value_and_keep_own_detector() {
        let raw = RawDetection::Records(vec![
            RawRecord {
                value: Some(json!("1.5")),
                detector: Some("upstream".to_string()),
                ..RawRecord::default()
            },
            RawRecord {
                severity: Some(json!("garbage")),
                value: Some(json!(9.0)),
                ..RawRecord::default()
            },
            RawRecord::default(),
        ]);
        let normalized = normalize_detection("custom", Some(raw));
        assert_eq!(normalized.count, 3);
        assert_eq!(normalized.records[0].severity, 1.5);
        assert_eq!(normalized.records[0].detector, "upstream");
        assert_eq!(normalized.records[0].timestamp, None);
        // an explicit but unparsable severity wins over value
        assert_eq!(normalized.records[1].severity, 0.0);
        assert_eq!(normalized.records[2].severity, 0.0);
        assert_eq!(normalized.records[2].detector, "custom");
        assert_eq!(normalized.severity, 1.5);
    }

    #[test]
    fn scalars_filter_and_drop_unparsable() {
        let mut values: Vec<serde_json::Value> = SEVERITIES.iter().map(|v| json!(v)).collect();
        values.push(json!("not a number"));
        values.push(json!("4"));
        let normalized = normalize_detection("custom", Some(RawDetection::Scalars(values)));
        assert_eq!(normalized.count, 3);
        assert_eq!(normalized.severity, 9.0);
        assert_eq!(normalized.records[2].timestamp, Some(AnomalyTimestamp::Index(5)));
    }
}
