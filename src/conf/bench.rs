use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::backend::BACKENDS;

/// Controls how long each operation is measured and which backends take part.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct BenchSettings {
    /// Measured time a calibration round must reach before it is accepted.
    #[serde(with = "humantime_serde", default = "BenchSettings::default_bench_time")]
    pub bench_time: Duration,
    /// Fixed iteration count. Disables calibration when set.
    #[serde(default)]
    pub iterations: Option<u64>,
    #[serde(default = "BenchSettings::default_max_iterations")]
    pub max_iterations: u64,
    /// Divide per-op figures by successful iterations only.
    #[serde(default)]
    pub exclude_failed_iterations: bool,
    #[serde(default = "BenchSettings::default_backends")]
    pub backends: Vec<String>,
    #[serde(default)]
    pub seed: Option<u64>,
}

impl BenchSettings {
    fn default_bench_time() -> Duration {
        Duration::from_secs(1)
    }

    fn default_max_iterations() -> u64 {
        1_000_000_000
    }

    fn default_backends() -> Vec<String> {
        BACKENDS.iter().map(|(name, _)| name.to_string()).collect()
    }
}

impl Default for BenchSettings {
    fn default() -> Self {
        Self {
            bench_time: Self::default_bench_time(),
            iterations: None,
            max_iterations: Self::default_max_iterations(),
            exclude_failed_iterations: false,
            backends: Self::default_backends(),
            seed: None,
        }
    }
}

/// Sizes of the fixture batches the operations work with.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct WorkloadConfig {
    #[serde(default = "WorkloadConfig::default_bulk_insert_rows")]
    pub bulk_insert_rows: usize,
    #[serde(default = "WorkloadConfig::default_page_rows")]
    pub page_rows: usize,
    #[serde(default = "WorkloadConfig::default_page_size")]
    pub page_size: usize,
    #[serde(default = "WorkloadConfig::default_find_one_loop")]
    pub find_one_loop: usize,
    #[serde(default = "WorkloadConfig::default_seed_batch_size")]
    pub seed_batch_size: usize,
}

impl WorkloadConfig {
    fn default_bulk_insert_rows() -> usize {
        2000
    }

    fn default_page_rows() -> usize {
        2000
    }

    fn default_page_size() -> usize {
        100
    }

    fn default_find_one_loop() -> usize {
        10
    }

    fn default_seed_batch_size() -> usize {
        500
    }
}

impl Default for WorkloadConfig {
    fn default() -> Self {
        Self {
            bulk_insert_rows: Self::default_bulk_insert_rows(),
            page_rows: Self::default_page_rows(),
            page_size: Self::default_page_size(),
            find_one_loop: Self::default_find_one_loop(),
            seed_batch_size: Self::default_seed_batch_size(),
        }
    }
}
