//! Adaptive iteration count: grow N until a round is long enough to trust.

use std::time::Duration;

use super::bencher::{Bencher, Measure};
use super::result::BenchResult;

/// Settings for one benchmark run.
#[derive(Debug, Clone, PartialEq)]
pub struct MeasureSettings {
    pub bench_time: Duration,
    pub iterations: Option<u64>,
    pub max_iterations: u64,
    pub exclude_failed: bool,
}

impl Default for MeasureSettings {
    fn default() -> Self {
        Self {
            bench_time: Duration::from_secs(1),
            iterations: None,
            max_iterations: 1_000_000_000,
            exclude_failed: false,
        }
    }
}

impl From<&crate::conf::BenchSettings> for MeasureSettings {
    fn from(bench: &crate::conf::BenchSettings) -> Self {
        Self {
            bench_time: bench.bench_time,
            iterations: bench.iterations,
            max_iterations: bench.max_iterations.max(1),
            exclude_failed: bench.exclude_failed_iterations,
        }
    }
}

fn run_round<F>(f: &mut F, iterations: u64) -> Bencher
where
    F: FnMut(&mut dyn Measure),
{
    let mut bencher = Bencher::new(iterations);
    f(&mut bencher);
    bencher.pause();
    bencher
}

/// Predict the next iteration count from the previous round.
///
/// Aims 20% past the goal, never grows more than 100x, always grows by at
/// least one and never exceeds `max`.
pub fn predict_iterations(goal: Duration, prev_iters: u64, prev_elapsed: Duration, max: u64) -> u64 {
    let prev_ns = prev_elapsed.as_nanos().max(1);
    let mut n = goal.as_nanos().saturating_mul(prev_iters as u128) / prev_ns;
    n += n / 5;
    n = n.min(prev_iters as u128 * 100);
    n = n.max(prev_iters as u128 + 1);
    n.min(max as u128) as u64
}

/// Run `f` until its measured time reaches the goal, or once with a fixed
/// count when one is configured. The last round is the result.
pub fn run_benchmark<F>(settings: &MeasureSettings, mut f: F) -> BenchResult
where
    F: FnMut(&mut dyn Measure),
{
    if let Some(n) = settings.iterations {
        return run_round(&mut f, n.max(1)).finish(settings.exclude_failed);
    }

    let mut n = 1;
    let mut bencher = run_round(&mut f, n);
    while !bencher.failed() && bencher.elapsed() < settings.bench_time && n < settings.max_iterations {
        n = predict_iterations(settings.bench_time, n, bencher.elapsed(), settings.max_iterations);
        bencher = run_round(&mut f, n);
    }
    bencher.finish(settings.exclude_failed)
}
