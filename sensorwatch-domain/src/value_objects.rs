// Domain value objects
pub mod anomaly_timestamp;
pub mod severity_level;

pub use anomaly_timestamp::*;
pub use severity_level::*;
