//! End-to-end checks: networks compiled against the table and run through
//! the reference executor.

use std::sync::OnceLock;

use proptest::prelude::*;
use sortgen::network::{bitonic1, bitonic2, builtin};
use sortgen::verify::check_permutations;
use sortgen::{Compiler, LaneExecutor, Program, Round, SequenceTable, SortingNetwork};

fn table() -> &'static SequenceTable {
    static TABLE: OnceLock<SequenceTable> = OnceLock::new();
    TABLE.get_or_init(SequenceTable::build)
}

fn programs() -> &'static [Program] {
    static PROGRAMS: OnceLock<Vec<Program>> = OnceLock::new();
    PROGRAMS.get_or_init(|| {
        let compiler = Compiler::new(table());
        builtin()
            .iter()
            .map(|net| compiler.compile(net).unwrap())
            .collect()
    })
}

#[test]
fn test_builtins_sort_every_permutation() {
    for program in programs() {
        let report = check_permutations(program);
        assert_eq!(report.checked, 40320);
        assert!(report.passed(), "{}: {:?}", report.name, report.first_failure);
    }
}

#[test]
fn test_reversed_input() {
    for program in programs() {
        let mut data = [7, 6, 5, 4, 3, 2, 1, 0];
        program.sort(&mut data);
        assert_eq!(data, [0, 1, 2, 3, 4, 5, 6, 7], "{}", program.name());
    }
}

#[test]
fn test_input_with_duplicates() {
    for program in programs() {
        let mut data = [3, 1, 4, 1, 5, 9, 2, 6];
        program.sort(&mut data);
        assert_eq!(data, [1, 1, 2, 3, 4, 5, 6, 9], "{}", program.name());
    }
}

#[test]
fn test_compiled_program_matches_scalar_network() {
    let compiler = Compiler::new(table());
    for net in [bitonic1(), bitonic2()] {
        let program = compiler.compile(&net).unwrap();
        let mut expected = [40, -3, 17, 17, 0, 99, -50, 8];
        let mut actual = expected;
        net.apply(&mut expected);
        program.sort(&mut actual);
        assert_eq!(actual, expected);
    }
}

#[test]
fn test_partial_network_compiles_but_does_not_sort() {
    let partial = SortingNetwork::new("partial", bitonic1().rounds()[..2].to_vec()).unwrap();
    assert!(!partial.is_sorting_network());
    let program = Compiler::new(table()).compile(&partial).unwrap();
    assert!(!check_permutations(&program).passed());
}

/// A random round: a shuffled 0..8 paired off in order.
fn round() -> impl Strategy<Value = Round> {
    Just((0u8..8).collect::<Vec<_>>())
        .prop_shuffle()
        .prop_map(|w| {
            Round::new(0, [(w[0], w[1]), (w[2], w[3]), (w[4], w[5]), (w[6], w[7])]).unwrap()
        })
}

proptest! {
    /// One round in isolation leaves lane-wise min in the low output and
    /// lane-wise max in the high output.
    #[test]
    fn prop_single_round_is_compare_exchange(
        round in round(),
        values in prop::array::uniform8(-1000i32..1000),
    ) {
        let mut compilation = Compiler::new(table()).begin("round");
        compilation.step(&round).unwrap();
        let program = compilation.finish_unrestored();

        let mut data = values;
        LaneExecutor::new().run(&program, &mut data);

        for (lane, c) in round.comparators().iter().enumerate() {
            let (x, y) = (values[usize::from(c.lo)], values[usize::from(c.hi)]);
            prop_assert_eq!(data[lane], x.min(y));
            prop_assert_eq!(data[lane + 4], x.max(y));
        }
    }

    /// Builtin programs sort arbitrary integers, duplicates included.
    #[test]
    fn prop_builtins_sort(values in prop::array::uniform8(-20i64..20)) {
        let mut expected = values;
        expected.sort_unstable();
        for program in programs() {
            let mut data = values;
            program.sort(&mut data);
            prop_assert_eq!(data, expected);
        }
    }

    /// Floats without NaN sort the same way.
    #[test]
    fn prop_builtins_sort_floats(values in prop::array::uniform8(-1.0e6f32..1.0e6)) {
        let mut expected = values;
        expected.sort_by(f32::total_cmp);
        for program in programs() {
            let mut data = values;
            program.sort(&mut data);
            prop_assert_eq!(data, expected);
        }
    }
}
