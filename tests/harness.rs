use std::hint::black_box;
use std::path::Path;
use std::time::Duration;

use bookbench::measure::{MeasureSettings, TrackingAllocator, run_benchmark};
use bookbench::operation::{Operation, Selection};
use bookbench::report::format_report;
use bookbench::run::{Executor, Orchestrator, shuffled_order};
use bookbench::testutil::{StubBackend, fixed_iterations, small_bench_config};
use rstest::rstest;

#[global_allocator]
static GLOBAL: TrackingAllocator = TrackingAllocator;

fn executor(settings: MeasureSettings) -> Executor {
    Executor::new(settings, small_bench_config(Path::new("stub.sqlite")))
}

/// The lines of one report section, without its header.
fn section<'a>(report: &'a str, operation: &str) -> Vec<&'a str> {
    let header = format!("Operation: {}", operation);
    report
        .lines()
        .skip_while(|line| *line != header)
        .skip(1)
        .take_while(|line| !line.is_empty())
        .collect()
}

#[test]
fn test_select_one_with_two_backends() {
    let backends = vec![
        StubBackend::new("alpha").boxed(),
        StubBackend::new("beta").boxed(),
    ];
    let table = Orchestrator::new(backends, executor(fixed_iterations(10)))
        .with_seed(Some(1))
        .run(Selection::One(Operation::SelectOne));

    assert_eq!(table.backends.len(), 2);
    let report = format_report(&table).unwrap();
    assert_eq!(report.matches("Operation:").count(), 1);

    let rows = section(&report, "select-one");
    assert_eq!(rows.len(), 2);
    for (row, name) in rows.iter().zip(table.order()) {
        assert!(row.trim_start().starts_with(&format!("{}:", name)));
        assert!(row.contains("ns/op"));
        assert!(row.contains("B/op"));
        assert!(row.contains("allocs/op"));
    }
}

#[test]
fn test_report_follows_execution_order() {
    let names = ["a", "b", "c", "d"];
    let backends = names.iter().map(|&n| StubBackend::new(n).boxed()).collect();
    let table = Orchestrator::new(backends, executor(fixed_iterations(3)))
        .with_seed(Some(3))
        .run(Selection::All);

    let expected: Vec<&str> = shuffled_order(names.len(), 3)
        .into_iter()
        .map(|i| names[i])
        .collect();
    assert_eq!(table.order(), expected);

    let report = format_report(&table).unwrap();
    for operation in Operation::REGISTRY {
        let rows = section(&report, operation.name());
        let order: Vec<&str> = rows
            .iter()
            .map(|row| row.trim_start().split(':').next().unwrap())
            .collect();
        assert_eq!(order, expected, "section {}", operation);
    }
}

#[test]
fn test_all_runs_every_operation_in_registry_order() {
    let stub = StubBackend::new("stub");
    let log = stub.log();
    let table = Orchestrator::new(vec![stub.boxed()], executor(fixed_iterations(4)))
        .run(Selection::All);

    let report = format_report(&table).unwrap();
    assert_eq!(report.matches("Operation:").count(), Operation::REGISTRY.len());

    let rounds: Vec<Operation> = log.borrow().rounds.iter().map(|(op, _)| *op).collect();
    assert_eq!(rounds, Operation::REGISTRY.to_vec());
    assert_eq!(log.borrow().inits, 1);
    assert_eq!(log.borrow().closes, 1);
}

#[rstest]
#[case(Operation::Insert)]
#[case(Operation::InsertBulk)]
#[case(Operation::Update)]
#[case(Operation::Delete)]
#[case(Operation::SelectOne)]
#[case(Operation::SelectPage)]
fn test_single_operation_runs_alone(#[case] operation: Operation) {
    let stub = StubBackend::new("stub");
    let log = stub.log();
    let table = Orchestrator::new(vec![stub.boxed()], executor(fixed_iterations(5)))
        .run(Selection::One(operation));

    assert_eq!(log.borrow().rounds, vec![(operation, 5)]);
    let result = table.get("stub", operation).unwrap();
    assert_eq!(result.iterations, 5);
    assert!(!result.failed());
}

#[test]
fn test_bulk_insert_always_starts_from_fresh_identities() {
    let stub = StubBackend::new("stub").with_bulk_rows(8);
    let log = stub.log();
    Orchestrator::new(vec![stub.boxed()], executor(fixed_iterations(30)))
        .run(Selection::One(Operation::InsertBulk));

    assert_eq!(log.borrow().identity_violations, 0);
    assert_eq!(log.borrow().inserted, 30 * 8);
}

#[test]
fn test_setup_time_is_excluded() {
    let setup = Duration::from_millis(5);
    let op = Duration::from_millis(1);
    let mut stub = StubBackend::new("stub")
        .with_setup_delay(setup)
        .with_op_delay(op);
    let result = executor(fixed_iterations(20)).measure(&mut stub, Operation::Update);

    let per_op = Duration::from_nanos(result.ns_per_op());
    assert!(per_op >= op, "{:?}", per_op);
    assert!(per_op < (setup + op) / 2, "{:?}", per_op);
}

#[test]
fn test_setup_time_is_excluded_during_calibration() {
    let setup = Duration::from_millis(5);
    let op = Duration::from_millis(1);
    let mut stub = StubBackend::new("stub")
        .with_setup_delay(setup)
        .with_op_delay(op);
    let settings = MeasureSettings {
        bench_time: Duration::from_millis(30),
        ..Default::default()
    };
    let result = executor(settings).measure(&mut stub, Operation::Insert);

    assert!(result.iterations > 1);
    assert!(result.elapsed >= Duration::from_millis(30));
    assert!(Duration::from_nanos(result.ns_per_op()) < (setup + op) / 2);
}

#[test]
fn test_failed_iteration_does_not_stop_the_loop() {
    let mut stub = StubBackend::new("stub").failing_on(7);
    let result = executor(fixed_iterations(50)).measure(&mut stub, Operation::Update);

    assert_eq!(result.iterations, 50);
    assert_eq!(result.failures, 1);
    assert_eq!(result.divisor(), 50);
    assert!(result.first_failure.unwrap().contains("iteration 7"));
}

#[test]
fn test_failed_iterations_can_be_excluded() {
    let settings = MeasureSettings {
        exclude_failed: true,
        ..fixed_iterations(50)
    };
    let mut stub = StubBackend::new("stub").failing_on(0);
    let result = executor(settings).measure(&mut stub, Operation::Delete);

    assert_eq!(result.iterations, 50);
    assert_eq!(result.divisor(), 49);
}

#[test]
fn test_init_failure_is_isolated() {
    let broken = StubBackend::new("broken").failing_init("connection refused");
    let broken_log = broken.log();
    let healthy = StubBackend::new("healthy");
    let healthy_log = healthy.log();

    let table = Orchestrator::new(
        vec![broken.boxed(), healthy.boxed()],
        executor(fixed_iterations(3)),
    )
    .run(Selection::All);

    assert!(broken_log.borrow().rounds.is_empty());
    assert_eq!(healthy_log.borrow().rounds.len(), Operation::REGISTRY.len());

    let report = format_report(&table).unwrap();
    for operation in Operation::REGISTRY {
        let rows = section(&report, operation.name());
        assert_eq!(rows.len(), 1);
        assert!(rows[0].contains("healthy:"));
    }
    assert!(report.contains("Init failures:\nbroken: connection refused\n"));
}

#[test]
fn test_close_failure_is_not_fatal() {
    let stub = StubBackend::new("leaky").failing_close("socket already closed");
    let other = StubBackend::new("other");
    let table = Orchestrator::new(
        vec![stub.boxed(), other.boxed()],
        executor(fixed_iterations(2)),
    )
    .with_seed(Some(11))
    .run(Selection::One(Operation::Insert));

    let leaky = table.backends.iter().find(|b| b.backend == "leaky").unwrap();
    assert_eq!(leaky.close_error.as_deref(), Some("socket already closed"));
    assert!(leaky.result(Operation::Insert).is_some());
    assert!(table.get("other", Operation::Insert).is_some());
}

#[test]
fn test_allocations_counted_only_while_running() {
    let settings = fixed_iterations(100);
    let result = run_benchmark(&settings, |m| {
        m.reset();
        for _ in 0..m.iterations() {
            m.pause();
            black_box(vec![0u8; 8 << 20]);
            m.resume();
            black_box(vec![0u8; 1024]);
        }
    });

    assert!(result.bytes_per_op() >= 1024);
    assert!(result.allocs_per_op() >= 1);
    assert!(result.bytes_per_op() < 8 << 20);
}
