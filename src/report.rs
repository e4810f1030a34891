//! Human-readable report: one section per operation, one row per backend,
//! in the order the backends ran.

use std::io::Write;

use tabwriter::{Alignment, TabWriter};

use crate::core::BenchError;
use crate::measure::BenchResult;
use crate::operation::Operation;
use crate::run::RunTable;

/// Minimum width of every column, padding included.
pub const MIN_CELL_WIDTH: usize = 8;
/// Blank space kept to the left of the widest cell in a column.
pub const CELL_PADDING: usize = 2;

fn row_cells(backend: &str, result: &BenchResult) -> Vec<String> {
    let mut cells = vec![
        format!("{}:", backend),
        result.iterations.to_string(),
        format!("{} ns/op", result.ns_per_op()),
        format!("{} B/op", result.bytes_per_op()),
        format!("{} allocs/op", result.allocs_per_op()),
    ];
    if result.failed() {
        cells.push(format!("{} failed", result.failures));
    }
    cells
}

/// Right-align every column to its widest cell.
fn align(rows: &[Vec<String>]) -> Result<String, BenchError> {
    let mut tw = TabWriter::new(Vec::new())
        .minwidth(MIN_CELL_WIDTH)
        .padding(CELL_PADDING)
        .alignment(Alignment::Right);
    for row in rows {
        for cell in row {
            write!(tw, "{}\t", cell)?;
        }
        writeln!(tw)?;
    }
    let bytes = tw
        .into_inner()
        .map_err(|e| BenchError::IoError(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| BenchError::IoError(e.to_string()))
}

/// Rows of one operation section, skipping backends without a result.
pub fn section_rows(table: &RunTable, operation: Operation) -> Vec<Vec<String>> {
    table
        .backends
        .iter()
        .filter_map(|b| b.result(operation).map(|r| row_cells(&b.backend, r)))
        .collect()
}

pub fn format_report(table: &RunTable) -> Result<String, BenchError> {
    let mut output = String::new();

    for &operation in &table.operations {
        output.push('\n');
        output.push_str(&format!("Operation: {}\n", operation));
        output.push_str(&align(&section_rows(table, operation))?);
    }

    let failures: Vec<_> = table.init_failures().collect();
    if !failures.is_empty() {
        output.push('\n');
        output.push_str("Init failures:\n");
        for backend in failures {
            output.push_str(&format!(
                "{}: {}\n",
                backend.backend,
                backend.init_error.as_deref().unwrap_or("unknown error")
            ));
        }
    }

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::run::BackendReport;
    use std::time::Duration;

    fn result(iterations: u64, nanos: u64, failures: u64) -> BenchResult {
        BenchResult {
            iterations,
            elapsed: Duration::from_nanos(nanos),
            alloc_bytes: iterations * 64,
            alloc_count: iterations * 2,
            failures,
            first_failure: None,
            exclude_failed: false,
        }
    }

    fn report(name: &str, results: Vec<(Operation, BenchResult)>) -> BackendReport {
        BackendReport {
            results,
            ..BackendReport::new(name)
        }
    }

    #[test]
    fn test_align_right_justifies_columns() {
        let rows = vec![
            vec!["a:".to_string(), "1".to_string()],
            vec!["longname:".to_string(), "12345".to_string()],
        ];
        let text = align(&rows).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "         a:       1");
        assert_eq!(lines[1], "  longname:   12345");
    }

    #[test]
    fn test_format_sections_follow_run_order() {
        let table = RunTable {
            seed: 0,
            operations: vec![Operation::Insert, Operation::Delete],
            backends: vec![
                report(
                    "zeta",
                    vec![
                        (Operation::Insert, result(10, 1000, 0)),
                        (Operation::Delete, result(5, 500, 1)),
                    ],
                ),
                report(
                    "alpha",
                    vec![
                        (Operation::Insert, result(20, 4000, 0)),
                        (Operation::Delete, result(8, 800, 0)),
                    ],
                ),
            ],
        };
        let text = format_report(&table).unwrap();

        assert!(text.starts_with("\nOperation: insert\n"));
        let insert = text.find("Operation: insert").unwrap();
        let delete = text.find("Operation: delete").unwrap();
        assert!(insert < delete);

        let zeta = text[insert..delete].find("zeta:").unwrap();
        let alpha = text[insert..delete].find("alpha:").unwrap();
        assert!(zeta < alpha);
        assert!(text.contains("100 ns/op"));
        assert!(text.contains("64 B/op"));
        assert!(text.contains("2 allocs/op"));
        assert!(text.contains("1 failed"));
    }

    #[test]
    fn test_init_failures_listed_separately() {
        let mut broken = BackendReport::new("broken");
        broken.init_error = Some("connection refused".to_string());
        let table = RunTable {
            seed: 0,
            operations: vec![Operation::SelectOne],
            backends: vec![
                broken,
                report("ok", vec![(Operation::SelectOne, result(3, 30, 0))]),
            ],
        };
        let text = format_report(&table).unwrap();

        let section = &text[..text.find("Init failures:").unwrap()];
        assert!(!section.contains("broken"));
        assert!(section.contains("ok:"));
        assert!(text.ends_with("Init failures:\nbroken: connection refused\n"));
    }
}
