//! Runs the generated sorters, not the programs they came from.

#![cfg(target_arch = "x86_64")]

use proptest::prelude::*;
use sortgen::verify::Permutations;
use sortgen_sorters::{sort_bitonic1, sort_bitonic2};

const SORTERS: [(&str, fn(&mut [f32; 8])); 2] =
    [("bitonic1", sort_bitonic1), ("bitonic2", sort_bitonic2)];

#[test]
fn every_permutation_comes_out_sorted() {
    let sorted: [f32; 8] = core::array::from_fn(|i| i as f32);
    for (name, sorter) in SORTERS {
        let mut bad = 0;
        let mut count = 0;
        for perm in Permutations::new() {
            let mut data = perm.map(f32::from);
            sorter(&mut data);
            count += 1;
            if data != sorted {
                bad += 1;
            }
        }
        assert_eq!(count, 40320);
        assert_eq!(bad, 0, "{name} left {bad} permutations unsorted");
    }
}

#[test]
fn fixed_scenarios() {
    for (name, sorter) in SORTERS {
        let mut reversed = [7.0, 6.0, 5.0, 4.0, 3.0, 2.0, 1.0, 0.0];
        sorter(&mut reversed);
        assert_eq!(reversed, [0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0], "{name}");

        let mut repeated = [3.0, 1.0, 4.0, 1.0, 5.0, 9.0, 2.0, 6.0];
        sorter(&mut repeated);
        assert_eq!(repeated, [1.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 9.0], "{name}");
    }
}

proptest! {
    #[test]
    fn matches_slice_sort(values in prop::array::uniform8(-1.0e6f32..1.0e6)) {
        let mut expected = values;
        expected.sort_unstable_by(f32::total_cmp);
        for (name, sorter) in SORTERS {
            let mut data = values;
            sorter(&mut data);
            prop_assert_eq!(data, expected, "{}", name);
        }
    }
}
