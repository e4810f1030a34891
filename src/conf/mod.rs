mod bench;
mod config;
mod database;

pub use bench::{BenchSettings, WorkloadConfig};
pub use config::Config;
pub use database::DatabaseConfig;
