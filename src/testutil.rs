//! Test doubles for the harness.
//!
//! This module is only available when the `testutil` feature is enabled.

use std::cell::RefCell;
use std::rc::Rc;
use std::thread::sleep;
use std::time::Duration;

use crate::backend::{Backend, BenchConfig};
use crate::core::BenchError;
use crate::fixture::{Book, new_book, new_books, reset_identity};
use crate::measure::Measure;
use crate::operation::Operation;

/// Calls observed by a [`RecordingMeasure`].
#[derive(Debug, Clone, PartialEq)]
pub enum MeasureEvent {
    Pause,
    Resume,
    Reset,
    Failure(String),
}

/// A measurement context that only records what the operation asked of it.
#[derive(Debug, Default)]
pub struct RecordingMeasure {
    pub iterations: u64,
    pub events: Vec<MeasureEvent>,
}

impl RecordingMeasure {
    pub fn new(iterations: u64) -> Self {
        Self {
            iterations,
            events: Vec::new(),
        }
    }

    pub fn failures(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|e| match e {
                MeasureEvent::Failure(message) => Some(message.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, event: &MeasureEvent) -> usize {
        self.events.iter().filter(|e| *e == event).count()
    }
}

impl Measure for RecordingMeasure {
    fn iterations(&self) -> u64 {
        self.iterations
    }

    fn pause(&mut self) {
        self.events.push(MeasureEvent::Pause);
    }

    fn resume(&mut self) {
        self.events.push(MeasureEvent::Resume);
    }

    fn reset(&mut self) {
        self.events.push(MeasureEvent::Reset);
    }

    fn record_failure(&mut self, message: String) {
        self.events.push(MeasureEvent::Failure(message));
    }
}

/// What a [`StubBackend`] saw, shared with the test after the backend has
/// been handed to the orchestrator.
#[derive(Debug, Default)]
pub struct StubLog {
    pub inits: u32,
    pub closes: u32,
    /// One entry per measured round, in call order.
    pub rounds: Vec<(Operation, u64)>,
    /// Inserts that found a book with its identity still set.
    pub identity_violations: u64,
    pub inserted: u64,
}

/// Scripted backend: sleeps instead of talking to a database and fails on
/// demand.
pub struct StubBackend {
    name: &'static str,
    setup_delay: Duration,
    op_delay: Duration,
    init_error: Option<String>,
    close_error: Option<String>,
    fail_on: Option<u64>,
    bulk_rows: usize,
    next_id: i64,
    log: Rc<RefCell<StubLog>>,
}

impl StubBackend {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            setup_delay: Duration::ZERO,
            op_delay: Duration::ZERO,
            init_error: None,
            close_error: None,
            fail_on: None,
            bulk_rows: 4,
            next_id: 1,
            log: Rc::new(RefCell::new(StubLog::default())),
        }
    }

    /// Unmeasured work done before every iteration.
    pub fn with_setup_delay(mut self, delay: Duration) -> Self {
        self.setup_delay = delay;
        self
    }

    /// Measured work done by every iteration.
    pub fn with_op_delay(mut self, delay: Duration) -> Self {
        self.op_delay = delay;
        self
    }

    pub fn failing_init(mut self, message: &str) -> Self {
        self.init_error = Some(message.to_string());
        self
    }

    pub fn failing_close(mut self, message: &str) -> Self {
        self.close_error = Some(message.to_string());
        self
    }

    /// Fail the iteration with this index in every round.
    pub fn failing_on(mut self, iteration: u64) -> Self {
        self.fail_on = Some(iteration);
        self
    }

    pub fn with_bulk_rows(mut self, rows: usize) -> Self {
        self.bulk_rows = rows;
        self
    }

    pub fn log(&self) -> Rc<RefCell<StubLog>> {
        Rc::clone(&self.log)
    }

    pub fn boxed(self) -> Box<dyn Backend> {
        Box::new(self)
    }

    fn persist(&mut self, books: &mut [Book]) {
        let mut log = self.log.borrow_mut();
        for book in books.iter_mut() {
            if book.is_persisted() {
                log.identity_violations += 1;
            }
            book.id = Some(self.next_id);
            self.next_id += 1;
            log.inserted += 1;
        }
    }

    fn run(&mut self, operation: Operation, m: &mut dyn Measure, books: &mut [Book]) {
        self.log.borrow_mut().rounds.push((operation, m.iterations()));
        m.reset();

        for i in 0..m.iterations() {
            m.pause();
            if !self.setup_delay.is_zero() {
                sleep(self.setup_delay);
            }
            reset_identity(books);
            m.resume();

            if !self.op_delay.is_zero() {
                sleep(self.op_delay);
            }
            self.persist(books);

            if self.fail_on == Some(i) {
                m.pause();
                m.record_failure(format!("{} {} failed on iteration {}", self.name, operation, i));
                m.resume();
            }
        }
    }
}

impl Backend for StubBackend {
    fn name(&self) -> &'static str {
        self.name
    }

    fn init(&mut self, _config: &BenchConfig) -> Result<(), BenchError> {
        self.log.borrow_mut().inits += 1;
        match &self.init_error {
            Some(message) => Err(BenchError::BackendError(message.clone())),
            None => Ok(()),
        }
    }

    fn close(&mut self) -> Result<(), BenchError> {
        self.log.borrow_mut().closes += 1;
        match &self.close_error {
            Some(message) => Err(BenchError::BackendError(message.clone())),
            None => Ok(()),
        }
    }

    fn insert(&mut self, m: &mut dyn Measure) {
        let mut book = [new_book()];
        self.run(Operation::Insert, m, &mut book);
    }

    fn insert_bulk(&mut self, m: &mut dyn Measure) {
        let mut books = new_books(self.bulk_rows);
        self.run(Operation::InsertBulk, m, &mut books);
    }

    fn update(&mut self, m: &mut dyn Measure) {
        self.run(Operation::Update, m, &mut []);
    }

    fn delete(&mut self, m: &mut dyn Measure) {
        self.run(Operation::Delete, m, &mut []);
    }

    fn find_by_id(&mut self, m: &mut dyn Measure) {
        self.run(Operation::SelectOne, m, &mut []);
    }

    fn find_page(&mut self, m: &mut dyn Measure) {
        self.run(Operation::SelectPage, m, &mut []);
    }
}

/// Settings that finish quickly: a fixed iteration count, no calibration.
pub fn fixed_iterations(n: u64) -> crate::measure::MeasureSettings {
    crate::measure::MeasureSettings {
        iterations: Some(n),
        ..Default::default()
    }
}

/// A backend config pointing at `path` with a small workload.
pub fn small_bench_config(path: &std::path::Path) -> BenchConfig {
    BenchConfig {
        database: path.to_path_buf(),
        busy_timeout: Duration::from_secs(5),
        workload: crate::conf::WorkloadConfig {
            bulk_insert_rows: 50,
            page_rows: 60,
            page_size: 20,
            find_one_loop: 2,
            seed_batch_size: 16,
        },
    }
}
