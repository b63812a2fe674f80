// Sensorwatch Application Layer

pub mod commands;
pub mod delivery;
pub mod dtos;
pub mod error;
pub mod metrics;
pub mod queries;
pub mod service;
pub mod state;

pub use delivery::{DeliveryOutcome, DeliveryStatus};
pub use error::AppError;
pub use metrics::Metrics;
pub use service::{DetectionRun, DetectionService};
pub use state::AppState;
