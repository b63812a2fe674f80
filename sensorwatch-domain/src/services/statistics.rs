//! Small descriptive statistics shared by the detectors.

/// Spreads below this are treated as a constant series.
pub const NEAR_CONSTANT_SPREAD: f64 = 1e-6;

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation (denominator n).
pub fn population_std(values: &[f64], center: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let variance = values.iter().map(|x| (x - center).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

/// Median; the two middle values are averaged for even lengths.
pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Shared z-score decision rule.
///
/// Near-constant spread: flag on absolute deviation and report it. Otherwise
/// flag when either the z-score or the absolute deviation exceeds the
/// threshold and report the z-score. Unflagged points score 0.
pub fn deviation_severity(x: f64, center: f64, spread: f64, threshold: f64) -> f64 {
    let abs_dev = (x - center).abs();
    if spread < NEAR_CONSTANT_SPREAD {
        return if abs_dev > threshold { abs_dev } else { 0.0 };
    }
    let z = abs_dev / spread;
    if z > threshold || abs_dev > threshold {
        z
    } else {
        0.0
    }
}
