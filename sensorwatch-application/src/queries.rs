// Application queries
pub mod report_queries;

pub use report_queries::*;
