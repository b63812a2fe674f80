// Domain entities
pub mod config;
pub mod detection;
pub mod report;
pub mod window;

pub use config::*;
pub use detection::*;
pub use report::*;
pub use window::*;
