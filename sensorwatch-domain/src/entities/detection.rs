// Detection entities
// Raw detector output before normalization, in every shape a detector may produce

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::entities::TimeWindow;
use crate::utils::finite_or_zero;
use crate::value_objects::AnomalyTimestamp;

/// What a detector is asked to look at.
#[derive(Debug, Clone, Copy)]
pub enum DetectorInput<'a> {
    Series(&'a [f64]),
    Window(&'a TimeWindow),
}

impl DetectorInput<'_> {
    pub fn to_series(&self) -> Vec<f64> {
        match self {
            DetectorInput::Series(values) => values.iter().copied().map(finite_or_zero).collect(),
            DetectorInput::Window(window) => window.numeric_series(),
        }
    }
}

/// Per-point severities plus the detector's own total.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DetectionResult {
    pub anomalies: Vec<f64>,
    #[serde(default)]
    pub severity: Option<f64>,
}

impl DetectionResult {
    pub fn from_scores(anomalies: Vec<f64>) -> Self {
        let severity = anomalies.iter().sum();
        Self {
            anomalies,
            severity: Some(severity),
        }
    }
}

/// A loosely typed anomaly record, as emitted by record-producing detectors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    #[serde(default)]
    pub timestamp: Option<AnomalyTimestamp>,
    #[serde(default)]
    pub severity: Option<Value>,
    #[serde(default)]
    pub value: Option<Value>,
    #[serde(default)]
    pub detector: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RawDetection {
    /// Structured result: per-point series and an explicit total.
    Scored(DetectionResult),
    /// Bare per-point severities; the total is their sum.
    Series(Vec<f64>),
    /// Self-describing records; every record is kept.
    Records(Vec<RawRecord>),
    /// Bare scalars, positionally indexed; only positive ones are kept.
    Scalars(Vec<Value>),
}

impl RawDetection {
    pub fn shape(&self) -> &'static str {
        match self {
            RawDetection::Scored(_) => "scored",
            RawDetection::Series(_) => "series",
            RawDetection::Records(_) => "records",
            RawDetection::Scalars(_) => "scalars",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn from_scores_sums_severity() {
        let result = DetectionResult::from_scores(vec![0.0, 1.5, 2.5]);
        assert_eq!(result.severity, Some(4.0));
    }

    #[test]
    fn series_input_coerces_non_finite_values() {
        let values = [1.0, f64::NAN, f64::INFINITY];
        assert_eq!(DetectorInput::Series(&values).to_series(), vec![1.0, 0.0, 0.0]);
    }

    #[test]
    fn raw_record_deserializes_partial_objects() {
        let record: RawRecord =
            serde_json::from_value(json!({"timestamp": 3, "value": "2.0"})).expect("record");
        assert_eq!(record.timestamp, Some(AnomalyTimestamp::Index(3)));
        assert_eq!(record.value, Some(json!("2.0")));
        assert!(record.severity.is_none());
        assert!(record.detector.is_none());
    }
}
