use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfig {
    #[serde(default = "DatabaseConfig::default_path")]
    pub path: PathBuf,
    #[serde(with = "humantime_serde", default = "DatabaseConfig::default_busy_timeout")]
    pub busy_timeout: Duration,
}

impl DatabaseConfig {
    fn default_path() -> PathBuf {
        std::env::temp_dir().join("bookbench.sqlite")
    }

    fn default_busy_timeout() -> Duration {
        Duration::from_secs(5)
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: Self::default_path(),
            busy_timeout: Self::default_busy_timeout(),
        }
    }
}
