//! Bencher - the measurement context handed to every operation.
//!
//! An operation owns its iteration loop. It does unmeasured setup, calls
//! [`Measure::reset`], then runs `iterations()` times, pausing the timer
//! around anything that is not part of the operation under test.

use std::time::{Duration, Instant};

use log::debug;

use super::allocator::AllocSnapshot;
use super::result::BenchResult;

/// Timer control and failure reporting for one measured round.
pub trait Measure {
    /// Number of iterations the operation must perform this round.
    fn iterations(&self) -> u64;
    /// Stop timing and allocation accounting.
    fn pause(&mut self);
    /// Resume timing and allocation accounting.
    fn resume(&mut self);
    /// Discard everything measured so far. Leaves the timer state unchanged.
    fn reset(&mut self);
    /// Record a failed iteration. The loop keeps going.
    fn record_failure(&mut self, message: String);
}

pub struct Bencher {
    iterations: u64,
    running: bool,
    started: Instant,
    started_allocs: AllocSnapshot,
    elapsed: Duration,
    allocs: AllocSnapshot,
    failures: u64,
    first_failure: Option<String>,
}

impl Bencher {
    /// A bencher for `iterations` iterations with the timer already running.
    pub fn new(iterations: u64) -> Self {
        Self {
            iterations,
            running: true,
            started: Instant::now(),
            started_allocs: AllocSnapshot::now(),
            elapsed: Duration::ZERO,
            allocs: AllocSnapshot::default(),
            failures: 0,
            first_failure: None,
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn failed(&self) -> bool {
        self.failures > 0
    }

    pub fn finish(mut self, exclude_failed: bool) -> BenchResult {
        self.pause();
        BenchResult {
            iterations: self.iterations,
            elapsed: self.elapsed,
            alloc_bytes: self.allocs.bytes,
            alloc_count: self.allocs.count,
            failures: self.failures,
            first_failure: self.first_failure,
            exclude_failed,
        }
    }
}

impl Measure for Bencher {
    fn iterations(&self) -> u64 {
        self.iterations
    }

    #[inline]
    fn pause(&mut self) {
        if self.running {
            self.elapsed += self.started.elapsed();
            self.allocs.add(AllocSnapshot::now().since(self.started_allocs));
            self.running = false;
        }
    }

    #[inline]
    fn resume(&mut self) {
        if !self.running {
            self.started_allocs = AllocSnapshot::now();
            self.started = Instant::now();
            self.running = true;
        }
    }

    fn reset(&mut self) {
        if self.running {
            self.started_allocs = AllocSnapshot::now();
            self.started = Instant::now();
        }
        self.elapsed = Duration::ZERO;
        self.allocs = AllocSnapshot::default();
    }

    fn record_failure(&mut self, message: String) {
        self.failures += 1;
        debug!("iteration failed: {}", message);
        if self.first_failure.is_none() {
            self.first_failure = Some(message);
        }
    }
}
