//! Eight-wire sorting networks made of four-comparator rounds.
//!
//! Each [`Round`] pairs all eight wires into four disjoint comparators. A
//! comparator `(lo, hi)` leaves the smaller value on `lo` and the larger on
//! `hi`; `lo > hi` is allowed and simply sorts that pair the other way.
//!
//! Networks are plain data. They can come from [`builtin`] or from JSON:
//!
//! ```json
//! { "name": "bitonic1", "rounds": [[[0, 1], [2, 3], [4, 5], [6, 7]], ...] }
//! ```
//!
//! The compiler assumes a network actually sorts; [`SortingNetwork::is_sorting_network`]
//! checks that assumption with the zero-one principle.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SynthError};
use crate::lane::{INPUTS, LANES};

/// A wire index, `0..8`.
pub type Wire = u8;

/// One compare-exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "(Wire, Wire)", into = "(Wire, Wire)")]
pub struct Comparator {
    /// Receives the minimum.
    pub lo: Wire,
    /// Receives the maximum.
    pub hi: Wire,
}

impl From<(Wire, Wire)> for Comparator {
    fn from((lo, hi): (Wire, Wire)) -> Self {
        Self { lo, hi }
    }
}

impl From<Comparator> for (Wire, Wire) {
    fn from(c: Comparator) -> Self {
        (c.lo, c.hi)
    }
}

/// Four comparators covering each of the eight wires once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "[Comparator; 4]")]
pub struct Round([Comparator; LANES]);

impl Round {
    /// Validates and builds a round. `index` is only used in errors.
    ///
    /// # Errors
    ///
    /// Returns [`SynthError::WireOutOfRange`] or [`SynthError::WireReused`].
    pub fn new(index: usize, pairs: [(Wire, Wire); LANES]) -> Result<Self> {
        let mut used = [false; INPUTS];
        for wire in pairs.iter().flat_map(|&(lo, hi)| [lo, hi]) {
            let slot = used
                .get_mut(usize::from(wire))
                .ok_or(SynthError::WireOutOfRange(wire))?;
            if *slot {
                return Err(SynthError::WireReused { round: index, wire });
            }
            *slot = true;
        }
        Ok(Self(pairs.map(Comparator::from)))
    }

    /// The comparators, in lane order.
    pub fn comparators(&self) -> &[Comparator; LANES] {
        &self.0
    }

    /// Wires receiving minima, in lane order.
    pub fn lo_wires(&self) -> [Wire; LANES] {
        self.0.map(|c| c.lo)
    }

    /// Wires receiving maxima, in lane order.
    pub fn hi_wires(&self) -> [Wire; LANES] {
        self.0.map(|c| c.hi)
    }
}

impl From<Round> for [Comparator; LANES] {
    fn from(r: Round) -> Self {
        r.0
    }
}

/// An ordered list of rounds with a name used for the emitted function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawNetwork")]
pub struct SortingNetwork {
    name: String,
    rounds: Vec<Round>,
}

#[derive(Deserialize)]
struct RawNetwork {
    name: String,
    rounds: Vec<[(Wire, Wire); LANES]>,
}

impl TryFrom<RawNetwork> for SortingNetwork {
    type Error = SynthError;

    fn try_from(raw: RawNetwork) -> Result<Self> {
        Self::from_pairs(raw.name, &raw.rounds)
    }
}

impl SortingNetwork {
    /// Builds a network from validated rounds.
    ///
    /// # Errors
    ///
    /// Returns [`SynthError::EmptyNetwork`] if `rounds` is empty.
    pub fn new(name: impl Into<String>, rounds: Vec<Round>) -> Result<Self> {
        let name = name.into();
        if rounds.is_empty() {
            return Err(SynthError::EmptyNetwork(name));
        }
        Ok(Self { name, rounds })
    }

    /// Builds a network from raw wire pairs, validating every round.
    ///
    /// # Errors
    ///
    /// Propagates the first [`Round::new`] failure, or
    /// [`SynthError::EmptyNetwork`].
    pub fn from_pairs(name: impl Into<String>, rounds: &[[(Wire, Wire); LANES]]) -> Result<Self> {
        let rounds = rounds
            .iter()
            .enumerate()
            .map(|(i, pairs)| Round::new(i, *pairs))
            .collect::<Result<Vec<_>>>()?;
        Self::new(name, rounds)
    }

    /// Network name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The rounds, in application order.
    pub fn rounds(&self) -> &[Round] {
        &self.rounds
    }

    /// Applies the network with scalar compare-exchanges. Reference oracle
    /// for the compiled form.
    pub fn apply<T: PartialOrd + Copy>(&self, values: &mut [T; INPUTS]) {
        for round in &self.rounds {
            for c in round.comparators() {
                let (lo, hi) = (usize::from(c.lo), usize::from(c.hi));
                if values[hi] < values[lo] {
                    values.swap(lo, hi);
                }
            }
        }
    }

    /// Checks the sorting precondition on all 256 zero-one inputs.
    ///
    /// By the zero-one principle a comparator network sorts every input
    /// iff it sorts every binary one.
    pub fn is_sorting_network(&self) -> bool {
        (0u16..1 << INPUTS).all(|bits| {
            let mut values = [0u8; INPUTS];
            for (i, v) in values.iter_mut().enumerate() {
                *v = ((bits >> i) & 1) as u8;
            }
            self.apply(&mut values);
            values.windows(2).all(|w| w[0] <= w[1])
        })
    }
}

const BITONIC1: [[(Wire, Wire); LANES]; 6] = [
    [(0, 1), (2, 3), (4, 5), (6, 7)],
    [(0, 3), (1, 2), (4, 7), (5, 6)],
    [(0, 1), (2, 3), (4, 5), (6, 7)],
    [(0, 7), (1, 6), (2, 5), (3, 4)],
    [(0, 2), (1, 3), (4, 6), (5, 7)],
    [(0, 1), (2, 3), (4, 5), (6, 7)],
];

const BITONIC2: [[(Wire, Wire); LANES]; 6] = [
    [(1, 0), (2, 3), (5, 4), (6, 7)],
    [(2, 0), (3, 1), (4, 6), (5, 7)],
    [(1, 0), (3, 2), (4, 5), (6, 7)],
    [(0, 4), (1, 5), (2, 6), (3, 7)],
    [(0, 2), (1, 3), (4, 6), (5, 7)],
    [(0, 1), (2, 3), (4, 5), (6, 7)],
];

/// Bitonic network whose merge steps all sort ascending, flipping the
/// second half by comparator wiring.
pub fn bitonic1() -> SortingNetwork {
    literal("bitonic1", &BITONIC1)
}

/// Classic bitonic network with descending comparators in the build phase.
pub fn bitonic2() -> SortingNetwork {
    literal("bitonic2", &BITONIC2)
}

/// Every builtin network.
pub fn builtin() -> Vec<SortingNetwork> {
    vec![bitonic1(), bitonic2()]
}

fn literal(name: &str, rounds: &[[(Wire, Wire); LANES]]) -> SortingNetwork {
    SortingNetwork {
        name: name.to_string(),
        rounds: rounds
            .iter()
            .map(|pairs| Round(pairs.map(Comparator::from)))
            .collect(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_literals_are_valid_rounds() {
        for net in builtin() {
            let pairs: Vec<[(Wire, Wire); LANES]> = net
                .rounds()
                .iter()
                .map(|r| r.comparators().map(<(Wire, Wire)>::from))
                .collect();
            assert_eq!(SortingNetwork::from_pairs(net.name(), &pairs).unwrap(), net);
        }
    }

    #[test]
    fn test_builtins_sort() {
        for net in builtin() {
            assert!(net.is_sorting_network(), "{} does not sort", net.name());
            let mut values = [7, 6, 5, 4, 3, 2, 1, 0];
            net.apply(&mut values);
            assert_eq!(values, [0, 1, 2, 3, 4, 5, 6, 7]);
        }
    }

    #[test]
    fn test_truncated_network_is_rejected_by_zero_one_check() {
        let net = SortingNetwork::from_pairs("partial", &BITONIC1[..3]).unwrap();
        assert!(!net.is_sorting_network());
    }

    #[test]
    fn test_round_validation() {
        assert_eq!(
            Round::new(2, [(0, 1), (2, 3), (4, 5), (6, 8)]),
            Err(SynthError::WireOutOfRange(8))
        );
        assert_eq!(
            Round::new(2, [(0, 1), (2, 3), (4, 5), (6, 1)]),
            Err(SynthError::WireReused { round: 2, wire: 1 })
        );
        assert_eq!(
            SortingNetwork::new("none", vec![]),
            Err(SynthError::EmptyNetwork("none".to_string()))
        );
    }

    #[test]
    fn test_json_shape() {
        let json = serde_json::to_string(&bitonic1()).unwrap();
        assert!(json.starts_with(r#"{"name":"bitonic1","rounds":[[[0,1],[2,3],[4,5],[6,7]]"#));
        let back: SortingNetwork = serde_json::from_str(&json).unwrap();
        assert_eq!(back, bitonic1());
    }

    #[test]
    fn test_json_rejects_bad_round() {
        let json = r#"{"name":"bad","rounds":[[[0,1],[0,3],[4,5],[6,7]]]}"#;
        let err = serde_json::from_str::<SortingNetwork>(json).unwrap_err();
        assert!(err.to_string().contains("uses wire 0 more than once"));
    }
}
