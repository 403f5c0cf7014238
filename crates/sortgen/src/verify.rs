//! Independent oracles for the search and the compiled programs.
//!
//! Nothing here reuses the BFS: the closure is computed over the set of
//! reachable vectors rather than over instruction paths, and minimality is
//! checked by plain iterative deepening.

use std::time::{Duration, Instant};

use serde::Serialize;

use crate::compiler::Program;
use crate::executor::LaneExecutor;
use crate::isa::Opcode;
use crate::lane::{LaneKey, LaneVector, INPUTS, KEY_SPACE};

/// Every lane vector obtainable from the seeds by any number of
/// instructions, as a dense membership array indexed by key.
///
/// Semi-naive fixed point: each pass only combines pairs with at least one
/// member new in the previous pass. Stops as soon as the whole key universe
/// is covered.
pub fn reachable_closure() -> Vec<bool> {
    let mut member = vec![false; KEY_SPACE];
    let mut known: Vec<LaneVector> = LaneVector::SEEDS.to_vec();
    for seed in LaneVector::SEEDS {
        member[seed.key().index()] = true;
    }
    let mut count = known.len();
    let mut frontier_start = 0;

    while frontier_start < known.len() && count < KEY_SPACE {
        let end = known.len();
        let mut fresh = Vec::new();
        'pass: for (i, &a) in known[..end].iter().enumerate() {
            for (j, &b) in known[..end].iter().enumerate() {
                if i < frontier_start && j < frontier_start {
                    continue;
                }
                for opcode in Opcode::candidates() {
                    let r = opcode.apply_lanes(a, b);
                    let slot = &mut member[r.key().index()];
                    if !*slot {
                        *slot = true;
                        fresh.push(r);
                        count += 1;
                        if count == KEY_SPACE {
                            break 'pass;
                        }
                    }
                }
            }
        }
        log::debug!("closure pass: {} new, {count} total", fresh.len());
        frontier_start = end;
        known.extend(fresh);
    }
    member
}

/// Number of keys set in a membership array.
pub fn count_members(member: &[bool]) -> usize {
    member.iter().filter(|&&m| m).count()
}

/// Length of the shortest instruction sequence producing `target`, searched
/// up to `limit` instructions. Seeds have length 0.
pub fn shortest_length(target: LaneVector, limit: usize) -> Option<usize> {
    if target.seed_slot().is_some() {
        return Some(0);
    }
    let mut frame = LaneVector::SEEDS.to_vec();
    (1..=limit).find(|&depth| deepen(&mut frame, target, depth))
}

fn deepen(frame: &mut Vec<LaneVector>, target: LaneVector, remaining: usize) -> bool {
    if remaining == 0 {
        return false;
    }
    let width = frame.len();
    for i in 0..width {
        for j in 0..width {
            for opcode in Opcode::candidates() {
                let r = opcode.apply_lanes(frame[i], frame[j]);
                if r == target {
                    return true;
                }
                if remaining > 1 {
                    frame.push(r);
                    let found = deepen(frame, target, remaining - 1);
                    frame.pop();
                    if found {
                        return true;
                    }
                }
            }
        }
    }
    false
}

/// Keys in `0..KEY_SPACE` whose membership differs between two arrays.
pub fn membership_difference(left: &[bool], right: &[bool]) -> Vec<LaneKey> {
    LaneKey::all()
        .filter(|k| left.get(k.index()) != right.get(k.index()))
        .collect()
}

/// Lexicographic permutations of `0..8`, starting from the identity.
#[derive(Debug, Clone)]
pub struct Permutations {
    next: Option<[u8; INPUTS]>,
}

impl Permutations {
    /// Starts at `[0, 1, .., 7]`.
    pub fn new() -> Self {
        Self {
            next: Some([0, 1, 2, 3, 4, 5, 6, 7]),
        }
    }
}

impl Default for Permutations {
    fn default() -> Self {
        Self::new()
    }
}

impl Iterator for Permutations {
    type Item = [u8; INPUTS];

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = successor(current);
        Some(current)
    }
}

fn successor(mut p: [u8; INPUTS]) -> Option<[u8; INPUTS]> {
    let i = (0..INPUTS - 1).rev().find(|&i| p[i] < p[i + 1])?;
    let j = (i + 1..INPUTS).rev().find(|&j| p[j] > p[i])?;
    p.swap(i, j);
    p[i + 1..].reverse();
    Some(p)
}

/// Outcome of [`check_permutations`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PermutationReport {
    /// Program name.
    pub name: String,
    /// Inputs tried.
    pub checked: usize,
    /// Inputs left unsorted.
    pub failed: usize,
    /// First unsorted input, if any.
    pub first_failure: Option<[u8; INPUTS]>,
    /// Wall time of the whole run.
    #[serde(skip)]
    pub elapsed: Duration,
}

impl PermutationReport {
    /// True if every permutation came out sorted.
    pub fn passed(&self) -> bool {
        self.failed == 0
    }
}

/// Runs every permutation of `0..8` through `program` and checks each
/// comes out as `[0, 1, .., 7]`.
pub fn check_permutations(program: &Program) -> PermutationReport {
    const SORTED: [u8; INPUTS] = [0, 1, 2, 3, 4, 5, 6, 7];

    let start = Instant::now();
    let mut exec = LaneExecutor::new();
    let mut checked = 0;
    let mut failed = 0;
    let mut first_failure = None;
    for input in Permutations::new() {
        let mut data = input;
        exec.run(program, &mut data);
        checked += 1;
        if data != SORTED {
            failed += 1;
            if first_failure.is_none() {
                first_failure = Some(input);
            }
        }
    }
    let elapsed = start.elapsed();
    log::info!(
        "{}: {checked} permutations, {failed} unsorted, {:.3} ms",
        program.name(),
        elapsed.as_secs_f64() * 1e3
    );
    PermutationReport {
        name: program.name().to_string(),
        checked,
        failed,
        first_failure,
        elapsed,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_permutations_count_and_order() {
        let mut perms = Permutations::new();
        assert_eq!(perms.next(), Some([0, 1, 2, 3, 4, 5, 6, 7]));
        assert_eq!(perms.next(), Some([0, 1, 2, 3, 4, 5, 7, 6]));
        assert_eq!(perms.next(), Some([0, 1, 2, 3, 4, 6, 5, 7]));
        assert_eq!(Permutations::new().count(), 40320);
        assert_eq!(Permutations::new().last(), Some([7, 6, 5, 4, 3, 2, 1, 0]));
    }

    #[test]
    fn test_shortest_length_small_cases() {
        assert_eq!(shortest_length(LaneVector::LOW_SEED, 0), Some(0));
        let unpacked = LaneVector::new([0, 4, 1, 5]).unwrap();
        assert_eq!(shortest_length(unpacked, 2), Some(1));
        assert_eq!(shortest_length(unpacked, 0), None);
    }

    #[test]
    fn test_two_step_vector_has_no_single_step() {
        // Needs lanes from both halves in an order no single permute gives.
        let target = LaneVector::new([7, 3, 6, 2]).unwrap();
        assert_eq!(shortest_length(target, 1), None);
    }

    #[test]
    fn test_membership_difference() {
        let mut a = vec![false; KEY_SPACE];
        let b = a.clone();
        a[5] = true;
        let diff = membership_difference(&a, &b);
        assert_eq!(diff.len(), 1);
        assert_eq!(diff[0].index(), 5);
    }
}
