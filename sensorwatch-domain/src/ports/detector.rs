use crate::entities::{DetectorInput, RawDetection};
use crate::error::DetectorError;

/// A stateless detection strategy.
///
/// `kind` is the configuration type name and keys the report's detector stats;
/// `name` attributes individual anomaly records and defaults to `kind`.
pub trait Detector: Send + Sync {
    fn kind(&self) -> &'static str;
    fn name(&self) -> &str;
    fn detect(&self, input: DetectorInput<'_>) -> Result<RawDetection, DetectorError>;
}
