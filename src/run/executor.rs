use log::{error, info, warn};

use crate::backend::{Backend, BenchConfig};
use crate::measure::{BenchResult, MeasureSettings, run_benchmark};
use crate::operation::Operation;

use super::table::BackendReport;

/// Drives one backend through init, the requested operations and close.
pub struct Executor {
    settings: MeasureSettings,
    config: BenchConfig,
}

impl Executor {
    pub fn new(settings: MeasureSettings, config: BenchConfig) -> Self {
        Self { settings, config }
    }

    pub fn settings(&self) -> &MeasureSettings {
        &self.settings
    }

    /// A failed `init` yields an error-only report and skips every
    /// operation. `close` always runs and its failure is only logged.
    pub fn execute(&self, backend: &mut dyn Backend, operations: &[Operation]) -> BackendReport {
        let name = backend.name();
        let mut report = BackendReport::new(name);

        match backend.init(&self.config) {
            Ok(()) => {
                info!("{}: initialized", name);
                for &operation in operations {
                    let result = self.measure(backend, operation);
                    report.results.push((operation, result));
                }
            }
            Err(e) => {
                error!("{}: init failed, skipping all operations: {}", name, e);
                report.init_error = Some(e.to_string());
            }
        }

        match backend.close() {
            Ok(()) => info!("{}: closed", name),
            Err(e) => {
                warn!("{}: close failed: {}", name, e);
                report.close_error = Some(e.to_string());
            }
        }

        report
    }

    pub fn measure(&self, backend: &mut dyn Backend, operation: Operation) -> BenchResult {
        let name = backend.name();
        let result = run_benchmark(&self.settings, |m| operation.run(backend, m));

        if result.failed() {
            warn!(
                "{} {}: {} of {} iterations failed, first error: {}",
                name,
                operation,
                result.failures,
                result.iterations,
                result.first_failure.as_deref().unwrap_or("")
            );
        } else {
            info!(
                "{} {}: {} iterations, {} ns/op",
                name,
                operation,
                result.iterations,
                result.ns_per_op()
            );
        }
        result
    }
}
