// Detector strategies

pub mod lof;
pub mod mad;
pub mod rolling;
pub mod zscore;

pub use lof::LofDetector;
pub use mad::MadDetector;
pub use rolling::RollingDetector;
pub use zscore::ZScoreDetector;
