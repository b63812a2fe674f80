// Application commands
pub mod run_commands;

pub use run_commands::*;
