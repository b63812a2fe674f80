pub mod jsonl_sink;
pub mod stdout_sink;
pub mod webhook_sink;

pub use jsonl_sink::*;
pub use stdout_sink::*;
pub use webhook_sink::*;
