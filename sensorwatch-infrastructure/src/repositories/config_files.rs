use serde::Deserialize;
use tokio::fs;

use sensorwatch_domain::DetectorConfig;

#[derive(Debug, Deserialize)]
struct DetectorFile {
    #[serde(default)]
    detectors: Option<Vec<DetectorConfig>>,
}

/// Reads a YAML `{detectors: [...]}` file. `Ok(None)` when the key is absent.
pub async fn load_detector_file(path: &str) -> anyhow::Result<Option<Vec<DetectorConfig>>> {
    let content = fs::read_to_string(path).await?;
    let file: DetectorFile = serde_yaml::from_str(&content)?;
    Ok(file.detectors)
}
