pub mod config;
pub mod factory;
pub mod repositories;
pub mod services;
pub mod sinks;
pub mod utils;

pub use config::*;
pub use factory::*;
pub use repositories::*;
pub use services::*;
pub use sinks::*;
pub use utils::*;
