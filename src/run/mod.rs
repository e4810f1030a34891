//! Executing backends and collecting their results.

mod executor;
mod orchestrator;
mod table;

pub use executor::Executor;
pub use orchestrator::{Orchestrator, shuffled_order};
pub use table::{BackendReport, RunTable};
