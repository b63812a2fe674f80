use crate::entities::{DetectorInput, RawDetection};
use crate::error::DetectorError;
use crate::ports::Detector;

/// Keeps local reachability density finite for duplicate points.
const LRD_EPSILON: f64 = 1e-10;

/// Local outlier factor over the one-dimensional series.
///
/// Emits a bare severity series: each point's outlier factor shifted so the
/// smallest is zero. `contamination` is the expected outlier share; it is
/// validated and exposed but does not change the scores.
#[derive(Debug, Clone)]
pub struct LofDetector {
    n_neighbors: usize,
    contamination: f64,
    name: String,
}

impl LofDetector {
    pub const KIND: &'static str = "lof";
    pub const DEFAULT_NEIGHBORS: usize = 20;
    pub const DEFAULT_CONTAMINATION: f64 = 0.01;

    pub fn new(n_neighbors: usize, contamination: f64) -> Result<Self, DetectorError> {
        if n_neighbors == 0 {
            return Err(DetectorError::invalid("n_neighbors", "must be at least 1"));
        }
        if !(contamination > 0.0 && contamination <= 0.5) {
            return Err(DetectorError::invalid(
                "contamination",
                format!("must be in (0, 0.5], got {}", contamination),
            ));
        }
        Ok(Self {
            n_neighbors,
            contamination,
            name: Self::KIND.to_string(),
        })
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn n_neighbors(&self) -> usize {
        self.n_neighbors
    }

    pub fn contamination(&self) -> f64 {
        self.contamination
    }

    /// Raw local outlier factors (about 1.0 for inliers).
    pub fn outlier_factors(&self, series: &[f64]) -> Vec<f64> {
        let n = series.len();
        if n < 2 {
            return vec![1.0; n];
        }
        let k = self.n_neighbors.min(n - 1);
        let neighbors = nearest_neighbors(series, k);

        let k_distance: Vec<f64> = neighbors
            .iter()
            .map(|near| near.last().map(|(_, dist)| *dist).unwrap_or(0.0))
            .collect();

        let lrd: Vec<f64> = neighbors
            .iter()
            .map(|near| {
                let reach: f64 = near
                    .iter()
                    .map(|&(j, dist)| dist.max(k_distance[j]))
                    .sum();
                1.0 / (reach / near.len() as f64 + LRD_EPSILON)
            })
            .collect();

        neighbors
            .iter()
            .enumerate()
            .map(|(i, near)| {
                let neighbor_lrd = near.iter().map(|&(j, _)| lrd[j]).sum::<f64>() / near.len() as f64;
                neighbor_lrd / lrd[i]
            })
            .collect()
    }
}

/// The `k` nearest neighbours of every point, closest first.
///
/// The series is one-dimensional, so after one sort each point's neighbours
/// sit contiguously around its rank: grow a window outwards, taking the
/// closer side each step (the lower index on ties).
fn nearest_neighbors(series: &[f64], k: usize) -> Vec<Vec<(usize, f64)>> {
    let mut order: Vec<usize> = (0..series.len()).collect();
    order.sort_by(|&a, &b| series[a].total_cmp(&series[b]).then(a.cmp(&b)));

    let mut neighbors = vec![Vec::new(); series.len()];
    for (rank, &point) in order.iter().enumerate() {
        let x = series[point];
        let mut near = Vec::with_capacity(k);
        // candidates are order[left - 1] and order[right]
        let (mut left, mut right) = (rank, rank + 1);
        while near.len() < k {
            let below = left.checked_sub(1).map(|idx| order[idx]);
            let above = order.get(right).copied();
            let take_below = match (below, above) {
                (Some(lo), Some(hi)) => {
                    let (d_lo, d_hi) = ((x - series[lo]).abs(), (series[hi] - x).abs());
                    d_lo < d_hi || (d_lo == d_hi && lo < hi)
                }
                (Some(_), None) => true,
                (None, Some(_)) => false,
                (None, None) => break,
            };
            let next = if take_below {
                left -= 1;
                order[left]
            } else {
                right += 1;
                order[right - 1]
            };
            near.push((next, (x - series[next]).abs()));
        }
        neighbors[point] = near;
    }
    neighbors
}

impl Default for LofDetector {
    fn default() -> Self {
        Self {
            n_neighbors: Self::DEFAULT_NEIGHBORS,
            contamination: Self::DEFAULT_CONTAMINATION,
            name: Self::KIND.to_string(),
        }
    }
}

impl Detector for LofDetector {
    fn kind(&self) -> &'static str {
        Self::KIND
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn detect(&self, input: DetectorInput<'_>) -> Result<RawDetection, DetectorError> {
        let factors = self.outlier_factors(&input.to_series());
        let floor = factors.iter().copied().fold(f64::INFINITY, f64::min);
        let scores = factors.into_iter().map(|factor| factor - floor).collect();
        Ok(RawDetection::Series(scores))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series_of(raw: RawDetection) -> Vec<f64> {
        match raw {
            RawDetection::Series(values) => values,
            other => panic!("unexpected shape {}", other.shape()),
        }
    }

    #[test]
    fn isolated_point_gets_the_only_positive_score() {
        let mut series = vec![1.0; 19];
        series.push(100.0);
        let scores = series_of(
            LofDetector::new(5, 0.05)
                .expect("detector")
                .detect(DetectorInput::Series(&series))
                .expect("detect"),
        );
        assert_eq!(scores.len(), 20);
        assert!(scores[19] > 0.0);
        assert!(scores[..19].iter().all(|v| *v == 0.0));
    }

    #[test]
    fn scores_are_shifted_to_zero_minimum() {
        let series = [1.0, 1.2, 0.9, 1.1, 5.0, 1.05, 0.95];
        let scores = series_of(
            LofDetector::new(3, 0.1)
                .expect("detector")
                .detect(DetectorInput::Series(&series))
                .expect("detect"),
        );
        let min = scores.iter().copied().fold(f64::INFINITY, f64::min);
        assert_eq!(min, 0.0);
        assert!(scores.iter().all(|v| *v >= 0.0));
        let max_idx = scores
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(idx, _)| idx);
        assert_eq!(max_idx, Some(4));
    }

    #[test]
    fn neighbors_are_clamped_to_series_length() {
        let factors = LofDetector::default().outlier_factors(&[1.0, 2.0, 3.0]);
        assert_eq!(factors.len(), 3);
        assert!(factors.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn tiny_series_scores_zero() {
        let detector = LofDetector::default();
        assert!(series_of(detector.detect(DetectorInput::Series(&[])).expect("detect")).is_empty());
        assert_eq!(
            series_of(detector.detect(DetectorInput::Series(&[3.0])).expect("detect")),
            vec![0.0]
        );
    }

    /// Exhaustive neighbour search, for checking the windowed one.
    fn brute_force_neighbors(series: &[f64], k: usize) -> Vec<Vec<(usize, f64)>> {
        (0..series.len())
            .map(|i| {
                let mut others: Vec<(usize, f64)> = (0..series.len())
                    .filter(|&j| j != i)
                    .map(|j| (j, (series[i] - series[j]).abs()))
                    .collect();
                others.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));
                others.truncate(k);
                others
            })
            .collect()
    }

    #[test]
    fn windowed_neighbors_match_exhaustive_search() {
        let series = [3.2, -1.0, 7.5, 0.4, 2.9, 11.0, 5.1, -4.3, 6.6, 1.7];
        for k in 1..series.len() {
            assert_eq!(nearest_neighbors(&series, k), brute_force_neighbors(&series, k), "k={}", k);
        }
    }

    #[test]
    fn neighbor_distances_are_ascending_with_duplicates() {
        let series = [2.0, 1.0, 2.0, 2.0, 5.0, 1.0];
        for near in nearest_neighbors(&series, 4) {
            assert_eq!(near.len(), 4);
            assert!(near.windows(2).all(|pair| pair[0].1 <= pair[1].1));
        }
    }

    #[test]
    fn large_series_finds_the_spike() {
        // every value of a 1e-4 grid over [0, 1), five times each
        let mut series: Vec<f64> = (0..50_000_u64)
            .map(|i| ((i * 7919) % 10_000) as f64 / 10_000.0)
            .collect();
        series[31_337] = 40.0;
        let scores = series_of(
            LofDetector::default()
                .detect(DetectorInput::Series(&series))
                .expect("detect"),
        );
        assert_eq!(scores.len(), series.len());
        let max_idx = scores
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(idx, _)| idx);
        assert_eq!(max_idx, Some(31_337));
    }

    #[test]
    fn invalid_parameters_fail_at_construction() {
        assert!(LofDetector::new(0, 0.01).is_err());
        assert!(LofDetector::new(20, 0.0).is_err());
        assert!(LofDetector::new(20, 0.6).is_err());
        assert!(LofDetector::new(20, f64::NAN).is_err());
        let detector = LofDetector::new(20, 0.5).expect("detector");
        assert_eq!(detector.n_neighbors(), 20);
        assert_eq!(detector.contamination(), 0.5);
    }
}
