// Factories turning declarative config into port implementations
pub mod detector_factory;
pub mod sink_factory;

pub use detector_factory::*;
pub use sink_factory::*;
