// Domain services
pub mod detectors;
pub mod normalizer;
pub mod statistics;

pub use detectors::*;
pub use normalizer::*;
