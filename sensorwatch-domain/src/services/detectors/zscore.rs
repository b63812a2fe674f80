use crate::entities::{DetectionResult, DetectorInput, RawDetection};
use crate::error::DetectorError;
use crate::ports::Detector;
use crate::services::statistics::{deviation_severity, mean, population_std};

/// Global z-score detector over the whole series.
#[derive(Debug, Clone)]
pub struct ZScoreDetector {
    threshold: f64,
    name: String,
}

impl ZScoreDetector {
    pub const KIND: &'static str = "zscore";
    pub const DEFAULT_THRESHOLD: f64 = 3.0;

    pub fn new(threshold: f64) -> Self {
        Self {
            threshold,
            name: Self::KIND.to_string(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn score(&self, series: &[f64]) -> Vec<f64> {
        let center = mean(series);
        let spread = population_std(series, center);
        series
            .iter()
            .map(|&x| deviation_severity(x, center, spread, self.threshold))
            .collect()
    }
}

impl Default for ZScoreDetector {
    fn default() -> Self {
        Self::new(Self::DEFAULT_THRESHOLD)
    }
}

impl Detector for ZScoreDetector {
    fn kind(&self) -> &'static str {
        Self::KIND
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn detect(&self, input: DetectorInput<'_>) -> Result<RawDetection, DetectorError> {
        let series = input.to_series();
        Ok(RawDetection::Scored(DetectionResult::from_scores(
            self.score(&series),
        )))
    }
}
