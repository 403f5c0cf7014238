//! sortgen conformance suite.
//!
//! Validates the artifacts the generator depends on, each against an
//! independent oracle, and aggregates the outcome into one report.
//!
//! # Conformance Scope
//!
//! | Artifact | Checks |
//! |----------|--------|
//! | Shuffle table | closure completeness, replay, minimality, determinism, snapshot round trip |
//! | Sorting networks | zero-one precondition, all 8! permutations, fixed scenarios |
//! | Generated code | one statement per step in each dialect, register pressure |
//!
//! # Entry Point
//!
//! ```no_run
//! use sortgen::network::builtin;
//! use sortgen::SequenceTable;
//! use sortgen_conformance::{run_all, Suite};
//!
//! let table = SequenceTable::build();
//! let networks = builtin();
//! let report = run_all(&Suite { table: &table, networks: &networks })?;
//! assert!(report.all_passed());
//! # Ok::<(), anyhow::Error>(())
//! ```

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs,
    clippy::missing_errors_doc
)]

pub mod report;
pub mod validators;

use sortgen::{Compiler, SequenceTable, SortingNetwork};

pub use report::{ConformanceReport, Severity, TestResult};

/// Inputs to the conformance runner.
#[derive(Debug, Clone, Copy)]
pub struct Suite<'a> {
    /// Table under test.
    pub table: &'a SequenceTable,
    /// Networks to compile and exercise.
    pub networks: &'a [SortingNetwork],
}

/// Runs all conformance validators and returns the aggregated report.
///
/// Validators are run in this order:
/// 1. Shuffle table
/// 2. Sorting networks
/// 3. Generated code for the networks that compile
///
/// # Errors
///
/// Returns an error only if the table snapshot cannot be serialized.
pub fn run_all(suite: &Suite<'_>) -> anyhow::Result<ConformanceReport> {
    let mut report = ConformanceReport::new();

    // 1. Table
    report.extend(validators::table::validate(suite.table)?);

    // 2. Networks
    report.extend(validators::network::validate(suite.table, suite.networks));

    // 3. Codegen
    let compiler = Compiler::new(suite.table);
    let programs: Vec<_> = suite
        .networks
        .iter()
        .filter_map(|n| compiler.compile(n).ok())
        .collect();
    report.extend(validators::codegen::validate(&programs));

    log::info!(
        "conformance: {} checks, {} warnings, {} failures",
        report.results.len(),
        report.warning_count(),
        report.failure_count()
    );
    Ok(report)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests_unit {
    use sortgen::network::builtin;

    use super::*;

    #[test]
    fn builtin_suite_passes() {
        let table = SequenceTable::build();
        let networks = builtin();
        let report = run_all(&Suite {
            table: &table,
            networks: &networks,
        })
        .unwrap();
        let failures: Vec<_> = report.results.iter().filter(|r| r.is_failure()).collect();
        assert!(failures.is_empty(), "conformance failures: {:#?}", failures);
        assert_eq!(report.warning_count(), 0);
    }

    #[test]
    fn empty_table_fails_completeness() {
        let table = SequenceTable::from_snapshot(sortgen::TableSnapshot {
            entries: Vec::new(),
        })
        .unwrap();
        let result = validators::table::completeness(&table);
        assert!(result.is_failure());
        assert!(!result.details.is_empty());
    }
}
