use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use sensorwatch_domain::{
    Detector, DetectorConfig, DetectorError, FactoryError, LofDetector, MadDetector,
    RollingDetector, ZScoreDetector,
};

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ThresholdParams {
    threshold: Option<f64>,
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RollingParams {
    window: usize,
    z_threshold: f64,
    // historical spelling; wins over `z_threshold` when both are set
    threshold: Option<f64>,
    name: Option<String>,
}

impl Default for RollingParams {
    fn default() -> Self {
        Self {
            window: RollingDetector::DEFAULT_WINDOW,
            z_threshold: RollingDetector::DEFAULT_Z_THRESHOLD,
            threshold: None,
            name: None,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct LofParams {
    n_neighbors: usize,
    contamination: f64,
    name: Option<String>,
}

impl Default for LofParams {
    fn default() -> Self {
        Self {
            n_neighbors: LofDetector::DEFAULT_NEIGHBORS,
            contamination: LofDetector::DEFAULT_CONTAMINATION,
            name: None,
        }
    }
}

/// Builds detectors in config order. Unknown types are skipped; bad params
/// for a known type fail the whole build.
pub fn build_detectors(configs: &[DetectorConfig]) -> Result<Vec<Box<dyn Detector>>, FactoryError> {
    let mut detectors: Vec<Box<dyn Detector>> = Vec::with_capacity(configs.len());
    for (index, config) in configs.iter().enumerate() {
        let detector: Box<dyn Detector> = match config.kind.as_str() {
            ZScoreDetector::KIND => Box::new(zscore_detector(index, config)?),
            MadDetector::KIND => Box::new(mad_detector(index, config)?),
            RollingDetector::KIND => Box::new(rolling_detector(index, config)?),
            LofDetector::KIND => Box::new(lof_detector(index, config)?),
            other => {
                debug!("skipping unknown detector type '{}'", other);
                continue;
            }
        };
        detectors.push(detector);
    }
    Ok(detectors)
}

fn zscore_detector(index: usize, config: &DetectorConfig) -> Result<ZScoreDetector, FactoryError> {
    let params: ThresholdParams = parse_params(index, config)?;
    let mut detector =
        ZScoreDetector::new(params.threshold.unwrap_or(ZScoreDetector::DEFAULT_THRESHOLD));
    if let Some(name) = params.name {
        detector = detector.with_name(name);
    }
    debug!("detector '{}': threshold={}", detector.name(), detector.threshold());
    Ok(detector)
}

fn mad_detector(index: usize, config: &DetectorConfig) -> Result<MadDetector, FactoryError> {
    let params: ThresholdParams = parse_params(index, config)?;
    let mut detector =
        MadDetector::new(params.threshold.unwrap_or(MadDetector::DEFAULT_THRESHOLD));
    if let Some(name) = params.name {
        detector = detector.with_name(name);
    }
    debug!("detector '{}': threshold={}", detector.name(), detector.threshold());
    Ok(detector)
}

fn rolling_detector(index: usize, config: &DetectorConfig) -> Result<RollingDetector, FactoryError> {
    let params: RollingParams = parse_params(index, config)?;
    let z_threshold = params.threshold.unwrap_or(params.z_threshold);
    let mut detector = RollingDetector::new(params.window, z_threshold)
        .map_err(|source| detector_error(index, config, source))?;
    if let Some(name) = params.name {
        detector = detector.with_name(name);
    }
    debug!(
        "detector '{}': window={} z_threshold={}",
        detector.name(),
        detector.window(),
        detector.z_threshold()
    );
    Ok(detector)
}

fn lof_detector(index: usize, config: &DetectorConfig) -> Result<LofDetector, FactoryError> {
    let params: LofParams = parse_params(index, config)?;
    let mut detector = LofDetector::new(params.n_neighbors, params.contamination)
        .map_err(|source| detector_error(index, config, source))?;
    if let Some(name) = params.name {
        detector = detector.with_name(name);
    }
    debug!(
        "detector '{}': n_neighbors={} contamination={}",
        detector.name(),
        detector.n_neighbors(),
        detector.contamination()
    );
    Ok(detector)
}

fn parse_params<T: DeserializeOwned>(
    index: usize,
    config: &DetectorConfig,
) -> Result<T, FactoryError> {
    serde_json::from_value(Value::Object(config.params.clone())).map_err(|source| {
        FactoryError::InvalidParams {
            index,
            kind: config.kind.clone(),
            source,
        }
    })
}

fn detector_error(
    index: usize,
    config: &DetectorConfig,
    source: DetectorError,
) -> FactoryError {
    FactoryError::Detector {
        index,
        kind: config.kind.clone(),
        source,
    }
}
