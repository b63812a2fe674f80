pub mod clickhouse_window;
pub mod config_files;
pub mod csv_window;

pub use clickhouse_window::*;
pub use config_files::*;
pub use csv_window::*;
