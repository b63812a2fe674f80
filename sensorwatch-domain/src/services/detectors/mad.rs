use crate::entities::{DetectionResult, DetectorInput, RawDetection};
use crate::error::DetectorError;
use crate::ports::Detector;
use crate::services::statistics::median;

/// Scales MAD to the standard deviation of a normal distribution.
const MAD_SCALE: f64 = 0.6745;

/// Median absolute deviation detector (robust z-score).
#[derive(Debug, Clone)]
pub struct MadDetector {
    threshold: f64,
    name: String,
}

impl MadDetector {
    pub const KIND: &'static str = "mad";
    pub const DEFAULT_THRESHOLD: f64 = 3.5;

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
        let center = median(series);
        let deviations: Vec<f64> = series.iter().map(|x| (x - center).abs()).collect();
        let mad = median(&deviations);
        deviations
            .into_iter()
            .map(|dev| {
                let score = if mad == 0.0 { dev } else { MAD_SCALE * dev / mad };
                if score > self.threshold {
                    score
                } else {
                    0.0
                }
            })
            .collect()
    }
}

impl Default for MadDetector {
    fn default() -> Self {
        Self::new(Self::DEFAULT_THRESHOLD)
    }
}

impl Detector for MadDetector {
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
