//! Sorting-network validators.

use sortgen::verify::check_permutations;
use sortgen::{Compiler, SequenceTable, SortingNetwork};

use crate::report::{ConformanceReport, TestResult};

/// Inputs every sorter must get right, including duplicates.
const SCENARIOS: [([i32; 8], [i32; 8]); 2] = [
    ([7, 6, 5, 4, 3, 2, 1, 0], [0, 1, 2, 3, 4, 5, 6, 7]),
    ([3, 1, 4, 1, 5, 9, 2, 6], [1, 1, 2, 3, 4, 5, 6, 9]),
];

/// Checks each network's precondition, then compiles and exercises it.
pub fn validate(table: &SequenceTable, networks: &[SortingNetwork]) -> ConformanceReport {
    let mut report = ConformanceReport::new();
    let compiler = Compiler::new(table);
    for network in networks {
        let validator = format!("network/{}", network.name());
        let sorts = network.is_sorting_network();
        report.push(TestResult::check(
            format!("{validator}/precondition"),
            sorts,
            format!("zero-one check over {} rounds", network.rounds().len()),
            vec!["network does not sort every 0/1 input".to_string()],
        ));

        let program = match compiler.compile(network) {
            Ok(program) => program,
            Err(e) => {
                report.push(TestResult::check(
                    format!("{validator}/compile"),
                    false,
                    "compilation failed",
                    vec![e.to_string()],
                ));
                continue;
            }
        };

        if !sorts {
            report.push(TestResult::warn(
                format!("{validator}/permutations"),
                "skipped: precondition failed",
            ));
            continue;
        }

        let perms = check_permutations(&program);
        report.push(TestResult::check(
            format!("{validator}/permutations"),
            perms.passed(),
            format!(
                "{}/{} permutations sorted in {:.1} ms",
                perms.checked - perms.failed,
                perms.checked,
                perms.elapsed.as_secs_f64() * 1e3
            ),
            perms
                .first_failure
                .map(|p| vec![format!("first unsorted input: {p:?}")])
                .unwrap_or_default(),
        ));

        let wrong: Vec<String> = SCENARIOS
            .iter()
            .filter_map(|(input, expected)| {
                let mut data = *input;
                program.sort(&mut data);
                (data != *expected).then(|| format!("{input:?} -> {data:?}"))
            })
            .collect();
        report.push(TestResult::check(
            format!("{validator}/scenarios"),
            wrong.is_empty(),
            format!("{} fixed inputs", SCENARIOS.len()),
            wrong,
        ));
    }
    report
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use sortgen::network::{bitonic1, builtin};

    use super::*;
    use crate::report::Severity;

    #[test]
    fn builtins_pass() {
        let table = SequenceTable::build();
        let report = validate(&table, &builtin());
        assert!(report.all_passed(), "{:#?}", report.results);
        assert_eq!(report.results.len(), 6);
    }

    #[test]
    fn truncated_network_fails_precondition_and_skips_execution() {
        let table = SequenceTable::build();
        let partial = SortingNetwork::new("partial", bitonic1().rounds()[..3].to_vec()).unwrap();
        let report = validate(&table, &[partial]);
        assert_eq!(report.failure_count(), 1);
        assert_eq!(report.results[0].severity, Severity::Failure);
        assert_eq!(report.results[1].severity, Severity::Warning);
    }
}
