use std::time::Duration;

/// Statistics for one (backend, operation) pair.
///
/// Totals cover only the timed regions of the reported calibration round.
#[derive(Debug, Clone, PartialEq)]
pub struct BenchResult {
    pub iterations: u64,
    pub elapsed: Duration,
    pub alloc_bytes: u64,
    pub alloc_count: u64,
    pub failures: u64,
    pub first_failure: Option<String>,
    pub exclude_failed: bool,
}

impl BenchResult {
    pub fn failed(&self) -> bool {
        self.failures > 0
    }

    /// Iterations the per-op figures are divided by.
    pub fn divisor(&self) -> u64 {
        if self.exclude_failed {
            self.iterations.saturating_sub(self.failures)
        } else {
            self.iterations
        }
    }

    pub fn ns_per_op(&self) -> u64 {
        per_op(self.elapsed.as_nanos() as u64, self.divisor())
    }

    pub fn bytes_per_op(&self) -> u64 {
        per_op(self.alloc_bytes, self.divisor())
    }

    pub fn allocs_per_op(&self) -> u64 {
        per_op(self.alloc_count, self.divisor())
    }
}

fn per_op(total: u64, divisor: u64) -> u64 {
    if divisor == 0 { 0 } else { total / divisor }
}
