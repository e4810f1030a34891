use std::time::{SystemTime, UNIX_EPOCH};

use log::info;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::backend::Backend;
use crate::operation::Selection;

use super::executor::Executor;
use super::table::RunTable;

/// Owns the backends for one run and executes them one after another in a
/// freshly shuffled order.
pub struct Orchestrator {
    backends: Vec<Box<dyn Backend>>,
    executor: Executor,
    seed: Option<u64>,
}

impl Orchestrator {
    pub fn new(backends: Vec<Box<dyn Backend>>, executor: Executor) -> Self {
        Self {
            backends,
            executor,
            seed: None,
        }
    }

    /// Fix the shuffle seed. `None` derives one from the clock at run time.
    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    pub fn backend_names(&self) -> Vec<&'static str> {
        self.backends.iter().map(|b| b.name()).collect()
    }

    /// Run the selection against every backend. Backends are closed and
    /// dropped afterwards; an orchestrator is good for a single run.
    pub fn run(mut self, selection: Selection) -> RunTable {
        let seed = self.seed.unwrap_or_else(time_seed);
        let order = shuffled_order(self.backends.len(), seed);
        let names: Vec<&str> = order.iter().map(|&i| self.backends[i].name()).collect();
        info!("Backend order (seed {}): {}", seed, names.join(", "));

        let operations = selection.operations();
        let mut table = RunTable {
            seed,
            operations: operations.clone(),
            backends: Vec::with_capacity(order.len()),
        };
        for index in order {
            let backend = self.backends[index].as_mut();
            table.backends.push(self.executor.execute(backend, &operations));
        }
        table
    }
}

fn time_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or_default()
}

/// A permutation of `0..len` derived from `seed`.
pub fn shuffled_order(len: usize, seed: u64) -> Vec<usize> {
    let mut order: Vec<usize> = (0..len).collect();
    order.shuffle(&mut StdRng::seed_from_u64(seed));
    order
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_shuffled_order_is_permutation() {
        let mut order = shuffled_order(7, 99);
        order.sort();
        assert_eq!(order, (0..7).collect::<Vec<_>>());
    }

    #[test]
    fn test_shuffled_order_is_seeded() {
        assert_eq!(shuffled_order(6, 1), shuffled_order(6, 1));
        let distinct: HashSet<Vec<usize>> = (0..20).map(|seed| shuffled_order(6, seed)).collect();
        assert!(distinct.len() > 1);
    }

    #[test]
    fn test_time_seed_moves() {
        let first = time_seed();
        std::thread::sleep(std::time::Duration::from_millis(1));
        assert_ne!(first, time_seed());
    }
}
