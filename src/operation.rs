//! Operation registry: symbolic names bound to backend methods.

use std::fmt;
use std::str::FromStr;

use crate::backend::Backend;
use crate::core::BenchError;
use crate::measure::Measure;

pub const ALL: &str = "all";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Insert,
    InsertBulk,
    Update,
    Delete,
    SelectOne,
    SelectPage,
}

impl Operation {
    /// Every registered operation, in the order "all" runs them.
    pub const REGISTRY: [Operation; 6] = [
        Operation::Insert,
        Operation::InsertBulk,
        Operation::Update,
        Operation::Delete,
        Operation::SelectOne,
        Operation::SelectPage,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Operation::Insert => "insert",
            Operation::InsertBulk => "insert-bulk",
            Operation::Update => "update",
            Operation::Delete => "delete",
            Operation::SelectOne => "select-one",
            Operation::SelectPage => "select-page",
        }
    }

    /// Run this operation against `backend`.
    pub fn run(self, backend: &mut dyn Backend, m: &mut dyn Measure) {
        match self {
            Operation::Insert => backend.insert(m),
            Operation::InsertBulk => backend.insert_bulk(m),
            Operation::Update => backend.update(m),
            Operation::Delete => backend.delete(m),
            Operation::SelectOne => backend.find_by_id(m),
            Operation::SelectPage => backend.find_page(m),
        }
    }
}

fn valid_names() -> String {
    let mut names: Vec<&str> = Operation::REGISTRY.iter().map(|op| op.name()).collect();
    names.push(ALL);
    names.join(", ")
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Operation {
    type Err = BenchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Operation::REGISTRY
            .into_iter()
            .find(|op| op.name() == s)
            .ok_or_else(|| BenchError::InvalidOperation(s.to_string(), valid_names()))
    }
}

/// What a run was asked to measure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    All,
    One(Operation),
}

impl Selection {
    pub fn operations(self) -> Vec<Operation> {
        match self {
            Selection::All => Operation::REGISTRY.to_vec(),
            Selection::One(op) => vec![op],
        }
    }
}

impl FromStr for Selection {
    type Err = BenchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == ALL {
            Ok(Selection::All)
        } else {
            s.parse().map(Selection::One)
        }
    }
}
