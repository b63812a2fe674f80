// Port traits (interfaces)
// Define what the detection core needs from the outside world

pub mod detector;
pub mod repositories;
pub mod sinks;

pub use detector::*;
pub use repositories::*;
pub use sinks::*;
