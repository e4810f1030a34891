use crate::measure::BenchResult;
use crate::operation::Operation;

/// Everything one backend produced during a run.
#[derive(Debug, Clone, PartialEq)]
pub struct BackendReport {
    pub backend: String,
    /// Set when `init` failed. No results exist in that case.
    pub init_error: Option<String>,
    pub close_error: Option<String>,
    pub results: Vec<(Operation, BenchResult)>,
}

impl BackendReport {
    pub fn new(backend: &str) -> Self {
        Self {
            backend: backend.to_string(),
            init_error: None,
            close_error: None,
            results: Vec::new(),
        }
    }

    pub fn initialized(&self) -> bool {
        self.init_error.is_none()
    }

    pub fn result(&self, operation: Operation) -> Option<&BenchResult> {
        self.results
            .iter()
            .find(|(op, _)| *op == operation)
            .map(|(_, result)| result)
    }
}

/// Results of one run, in the order the backends were executed.
#[derive(Debug, Clone, PartialEq)]
pub struct RunTable {
    pub seed: u64,
    pub operations: Vec<Operation>,
    pub backends: Vec<BackendReport>,
}

impl RunTable {
    /// Backend names in execution order.
    pub fn order(&self) -> Vec<&str> {
        self.backends.iter().map(|b| b.backend.as_str()).collect()
    }

    pub fn get(&self, backend: &str, operation: Operation) -> Option<&BenchResult> {
        self.backends
            .iter()
            .find(|b| b.backend == backend)
            .and_then(|b| b.result(operation))
    }

    pub fn init_failures(&self) -> impl Iterator<Item = &BackendReport> {
        self.backends.iter().filter(|b| !b.initialized())
    }
}
