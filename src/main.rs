use anyhow::Context;
use bookbench::backend::{BenchConfig, backend_names, build_backends};
use bookbench::conf::Config;
use bookbench::core::{CliArgs, setup_logging};
use bookbench::measure::{MeasureSettings, TrackingAllocator};
use bookbench::operation::{ALL, Operation, Selection};
use bookbench::report::format_report;
use bookbench::run::{Executor, Orchestrator};
use clap::Parser;
use log::info;

#[global_allocator]
static GLOBAL: TrackingAllocator = TrackingAllocator;

fn print_registry() {
    println!("Backends:");
    for name in backend_names() {
        println!("  {}", name);
    }
    println!("Operations:");
    for operation in Operation::REGISTRY {
        println!("  {}", operation);
    }
    println!("  {}", ALL);
}

fn main() -> anyhow::Result<()> {
    setup_logging();
    let args = CliArgs::parse();
    info!(args = args; "Bookbench started.");

    if args.list {
        print_registry();
        return Ok(());
    }

    let selection: Selection = args
        .operation
        .parse()
        .with_context(|| format!("cannot run operation '{}'", args.operation))?;

    let mut config = Config::load(args.config.as_deref()).context("failed to load config")?;
    if !args.backends.is_empty() {
        config.bench.backends = args.backends.clone();
    }
    if args.seed.is_some() {
        config.bench.seed = args.seed;
    }

    let backends = build_backends(&config.bench.backends)?;
    let executor = Executor::new(
        MeasureSettings::from(&config.bench),
        BenchConfig::from(&config),
    );
    let table = Orchestrator::new(backends, executor)
        .with_seed(config.bench.seed)
        .run(selection);

    print!("{}", format_report(&table)?);
    Ok(())
}
