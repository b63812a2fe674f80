use crate::entities::{DetectionResult, DetectorInput, RawDetection};
use crate::error::DetectorError;
use crate::ports::Detector;
use crate::services::statistics::{deviation_severity, mean, population_std};

/// Z-score against a trailing window, so the baseline follows the series.
#[derive(Debug, Clone)]
pub struct RollingDetector {
    window: usize,
    z_threshold: f64,
    name: String,
}

impl RollingDetector {
    pub const KIND: &'static str = "rolling";
    pub const DEFAULT_WINDOW: usize = 3;
    pub const DEFAULT_Z_THRESHOLD: f64 = 2.0;

    pub fn new(window: usize, z_threshold: f64) -> Result<Self, DetectorError> {
        if window == 0 {
            return Err(DetectorError::invalid("window", "must be at least 1"));
        }
        Ok(Self {
            window,
            z_threshold,
            name: Self::KIND.to_string(),
        })
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn window(&self) -> usize {
        self.window
    }

    pub fn z_threshold(&self) -> f64 {
        self.z_threshold
    }

    /// Each point is judged against the mean/std of itself and up to
    /// `window - 1` predecessors.
    pub fn score(&self, series: &[f64]) -> Vec<f64> {
        (0..series.len())
            .map(|idx| {
                let from = (idx + 1).saturating_sub(self.window);
                let trailing = &series[from..=idx];
                let center = mean(trailing);
                let spread = population_std(trailing, center);
                deviation_severity(series[idx], center, spread, self.z_threshold)
            })
            .collect()
    }
}

impl Default for RollingDetector {
    fn default() -> Self {
        Self {
            window: Self::DEFAULT_WINDOW,
            z_threshold: Self::DEFAULT_Z_THRESHOLD,
            name: Self::KIND.to_string(),
        }
    }
}

impl Detector for RollingDetector {
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
