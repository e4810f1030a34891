use crate::{
    conf::{BenchSettings, DatabaseConfig, WorkloadConfig},
    core::BenchError::{self, ConfigParsingError},
};
use config::Config as CConfig;
use log::info;
use serde::{Deserialize, Serialize};

const ENV_PREFIX: &str = "BOOKBENCH";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub bench: BenchSettings,
    #[serde(default)]
    pub workload: WorkloadConfig,
}

impl Config {
    pub fn from_str(toml_str: &str) -> Result<Config, BenchError> {
        CConfig::builder()
            .add_source(config::File::from_str(toml_str, config::FileFormat::Toml))
            .build()
            .map_err(|e| ConfigParsingError(e.to_string()))?
            .try_deserialize::<Config>()
            .map_err(|e| ConfigParsingError(e.to_string()))
    }

    /// Load the optional TOML file, then let `BOOKBENCH_*` environment
    /// variables override it (`BOOKBENCH_DATABASE__PATH=/tmp/x.sqlite`).
    pub fn load(path: Option<&str>) -> Result<Config, BenchError> {
        let mut builder = CConfig::builder();
        match path {
            Some(path) => {
                info!("Loading config from {}", path);
                builder = builder.add_source(config::File::with_name(path));
            }
            None => info!("No config file given, using defaults"),
        }
        builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("bench.backends")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| ConfigParsingError(e.to_string()))?
            .try_deserialize::<Config>()
            .map_err(|e| ConfigParsingError(e.to_string()))
    }
}
