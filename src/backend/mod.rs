//! Pluggable backend trait for benchmark comparisons.

use std::path::PathBuf;
use std::time::Duration;

use crate::conf::{Config, WorkloadConfig};
use crate::core::BenchError;
use crate::measure::Measure;

pub mod sqlite;

use sqlite::{CachedBackend, RawBackend, TxBackend};

/// Everything a backend needs to reach the database and size its workload.
#[derive(Debug, Clone, PartialEq)]
pub struct BenchConfig {
    pub database: PathBuf,
    pub busy_timeout: Duration,
    pub workload: WorkloadConfig,
}

impl From<&Config> for BenchConfig {
    fn from(config: &Config) -> Self {
        Self {
            database: config.database.path.clone(),
            busy_timeout: config.database.busy_timeout,
            workload: config.workload.clone(),
        }
    }
}

/// One way of talking to the database.
///
/// The harness calls `init` once per pass, then any of the timed operations,
/// then `close`. Timed operations run their own `m.iterations()` loop and
/// report failures through `m` instead of returning them.
pub trait Backend {
    /// Human-readable name for benchmark identification.
    fn name(&self) -> &'static str;

    /// Open the connection and prepare the schema.
    /// Called once before any operation, outside the timing loop.
    fn init(&mut self, config: &BenchConfig) -> Result<(), BenchError>;

    /// Release resources. Must be safe after a failed or missing `init`.
    fn close(&mut self) -> Result<(), BenchError>;

    fn insert(&mut self, m: &mut dyn Measure);
    fn insert_bulk(&mut self, m: &mut dyn Measure);
    fn update(&mut self, m: &mut dyn Measure);
    fn delete(&mut self, m: &mut dyn Measure);
    fn find_by_id(&mut self, m: &mut dyn Measure);
    fn find_page(&mut self, m: &mut dyn Measure);
}

pub type BackendConstructor = fn() -> Box<dyn Backend>;

/// Registered backends, by symbolic name.
pub const BACKENDS: &[(&str, BackendConstructor)] = &[
    (RawBackend::NAME, raw),
    (CachedBackend::NAME, cached),
    (TxBackend::NAME, tx),
];

fn raw() -> Box<dyn Backend> {
    Box::new(RawBackend::new())
}

fn cached() -> Box<dyn Backend> {
    Box::new(CachedBackend::new())
}

fn tx() -> Box<dyn Backend> {
    Box::new(TxBackend::new())
}

pub fn backend_names() -> Vec<&'static str> {
    BACKENDS.iter().map(|(name, _)| *name).collect()
}

/// Construct the named backends, in the order given. Each name may appear
/// only once, since results are keyed by backend name.
pub fn build_backends(names: &[String]) -> Result<Vec<Box<dyn Backend>>, BenchError> {
    names
        .iter()
        .enumerate()
        .map(|(i, name)| {
            if names[..i].contains(name) {
                return Err(BenchError::DuplicateBackend(name.clone()));
            }
            BACKENDS
                .iter()
                .find(|(registered, _)| registered == name)
                .map(|(_, construct)| construct())
                .ok_or_else(|| BenchError::UnknownBackend(name.clone()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_backends_by_name() {
        let names = vec!["rusqlite-tx".to_string(), "rusqlite".to_string()];
        let backends = build_backends(&names).unwrap();
        let built: Vec<&str> = backends.iter().map(|b| b.name()).collect();
        assert_eq!(built, vec!["rusqlite-tx", "rusqlite"]);
    }

    #[test]
    fn test_build_unknown_backend() {
        let names = vec!["gorm".to_string()];
        assert_eq!(
            build_backends(&names).err(),
            Some(BenchError::UnknownBackend("gorm".to_string()))
        );
    }

    #[test]
    fn test_build_duplicate_backend() {
        let names = vec!["rusqlite".to_string(), "rusqlite".to_string()];
        assert_eq!(
            build_backends(&names).err(),
            Some(BenchError::DuplicateBackend("rusqlite".to_string()))
        );
    }

    #[test]
    fn test_registered_names_are_unique() {
        let mut names = backend_names();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), BACKENDS.len());
    }
}
