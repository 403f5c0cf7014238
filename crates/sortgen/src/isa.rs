//! The 4-lane shuffle instruction set.
//!
//! Five two-operand permutes, each modelled on an SSE instruction:
//!
//! | Opcode | SSE | Result lanes |
//! |--------|-----|--------------|
//! | `UnpackLow` | `unpcklps` | `{a0, b0, a1, b1}` |
//! | `UnpackHigh` | `unpckhps` | `{a2, b2, a3, b3}` |
//! | `MergeLowHigh` | `movlhps` | `{a0, a1, b0, b1}` |
//! | `MergeHighLow` | `movhlps` | `{b2, b3, a2, a3}` |
//! | `Shuffle(m)` | `shufps` | `{a[lo0], a[lo1], b[hi0], b[hi1]}` |
//!
//! [`Opcode::apply`] is generic over the lane type: the search runs it on
//! lane provenance, the executor on actual values.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::error::SynthError;
use crate::lane::{LaneVector, LANES};

/// Number of opcode variants tried per operand pair.
pub const CANDIDATE_COUNT: usize = 4 + 256;

const TAG_SHUFFLE: u16 = 0;
const TAG_UNPACK_HIGH: u16 = 1;
const TAG_UNPACK_LOW: u16 = 2;
const TAG_MERGE_LOW_HIGH: u16 = 3;
const TAG_MERGE_HIGH_LOW: u16 = 4;
const TAG_BITS: u16 = 3;
const TAG_MASK: u16 = (1 << TAG_BITS) - 1;

/// `shufps` immediate: four 2-bit lane selects.
///
/// Bit layout `hi1 hi0 lo1 lo0` from most to least significant, i.e. the
/// value `_MM_SHUFFLE(hi1, hi0, lo1, lo0)` would produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShuffleMask(u8);

impl ShuffleMask {
    /// Builds a mask; only the low two bits of each select are used.
    pub const fn from_selects(lo0: u8, lo1: u8, hi0: u8, hi1: u8) -> Self {
        Self((lo0 & 3) | ((lo1 & 3) << 2) | ((hi0 & 3) << 4) | ((hi1 & 3) << 6))
    }

    /// Wraps a raw immediate.
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    /// Raw immediate.
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// `[lo0, lo1, hi0, hi1]`.
    pub const fn selects(self) -> [usize; LANES] {
        let m = self.0 as usize;
        [m & 3, (m >> 2) & 3, (m >> 4) & 3, (m >> 6) & 3]
    }
}

/// Operation tag of an [`Instruction`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub enum Opcode {
    /// `shufps`: two lanes from the first operand, two from the second.
    Shuffle(ShuffleMask),
    /// `unpckhps`: interleave the high halves.
    UnpackHigh,
    /// `unpcklps`: interleave the low halves.
    UnpackLow,
    /// `movlhps`: low half of the first operand, then low half of the second.
    MergeLowHigh,
    /// `movhlps`: high half of the second operand, then high half of the first.
    MergeHighLow,
}

/// Every opcode variant in exploration order.
///
/// The fixed permutes come first (unpack-low, unpack-high, merge-low-high,
/// merge-high-low), then the 256 shuffles with `lo0` varying slowest and
/// `hi1` fastest. The search's tie-break depends on this order.
pub static CANDIDATES: [Opcode; CANDIDATE_COUNT] = {
    let mut table = [Opcode::UnpackLow; CANDIDATE_COUNT];
    table[1] = Opcode::UnpackHigh;
    table[2] = Opcode::MergeLowHigh;
    table[3] = Opcode::MergeHighLow;
    let mut i = 0usize;
    while i < 256 {
        let lo0 = ((i >> 6) & 3) as u8;
        let lo1 = ((i >> 4) & 3) as u8;
        let hi0 = ((i >> 2) & 3) as u8;
        let hi1 = (i & 3) as u8;
        table[4 + i] = Opcode::Shuffle(ShuffleMask::from_selects(lo0, lo1, hi0, hi1));
        i += 1;
    }
    table
};

impl Opcode {
    /// Iterates [`CANDIDATES`].
    pub fn candidates() -> impl Iterator<Item = Opcode> {
        CANDIDATES.iter().copied()
    }

    /// Computes the result lanes from the two operands.
    #[inline]
    pub fn apply<T: Copy>(self, a: [T; LANES], b: [T; LANES]) -> [T; LANES] {
        match self {
            Opcode::UnpackLow => [a[0], b[0], a[1], b[1]],
            Opcode::UnpackHigh => [a[2], b[2], a[3], b[3]],
            Opcode::MergeLowHigh => [a[0], a[1], b[0], b[1]],
            Opcode::MergeHighLow => [b[2], b[3], a[2], a[3]],
            Opcode::Shuffle(mask) => {
                let [lo0, lo1, hi0, hi1] = mask.selects();
                [a[lo0], a[lo1], b[hi0], b[hi1]]
            }
        }
    }

    /// [`Opcode::apply`] on provenance vectors.
    #[inline]
    pub fn apply_lanes(self, a: LaneVector, b: LaneVector) -> LaneVector {
        LaneVector::from_lanes(self.apply(a.lanes(), b.lanes()))
    }

    /// SSE mnemonic.
    pub const fn mnemonic(self) -> &'static str {
        match self {
            Opcode::Shuffle(_) => "shufps",
            Opcode::UnpackHigh => "unpckhps",
            Opcode::UnpackLow => "unpcklps",
            Opcode::MergeLowHigh => "movlhps",
            Opcode::MergeHighLow => "movhlps",
        }
    }

    /// Packed form: tag in the low three bits, shuffle immediate above.
    pub const fn to_bits(self) -> u16 {
        match self {
            Opcode::Shuffle(mask) => TAG_SHUFFLE | ((mask.0 as u16) << TAG_BITS),
            Opcode::UnpackHigh => TAG_UNPACK_HIGH,
            Opcode::UnpackLow => TAG_UNPACK_LOW,
            Opcode::MergeLowHigh => TAG_MERGE_LOW_HIGH,
            Opcode::MergeHighLow => TAG_MERGE_HIGH_LOW,
        }
    }

    /// Parses the packed form.
    ///
    /// # Errors
    ///
    /// Returns [`SynthError::UnknownOpcode`] for an unassigned tag, or for a
    /// fixed permute carrying immediate bits.
    pub fn from_bits(bits: u16) -> Result<Self, SynthError> {
        let payload = bits >> TAG_BITS;
        let op = match bits & TAG_MASK {
            TAG_SHUFFLE if payload <= u16::from(u8::MAX) => {
                return Ok(Opcode::Shuffle(ShuffleMask(payload as u8)))
            }
            _ if payload != 0 => return Err(SynthError::UnknownOpcode(bits)),
            TAG_UNPACK_HIGH => Opcode::UnpackHigh,
            TAG_UNPACK_LOW => Opcode::UnpackLow,
            TAG_MERGE_LOW_HIGH => Opcode::MergeLowHigh,
            TAG_MERGE_HIGH_LOW => Opcode::MergeHighLow,
            _ => return Err(SynthError::UnknownOpcode(bits)),
        };
        Ok(op)
    }
}

impl TryFrom<u16> for Opcode {
    type Error = SynthError;

    fn try_from(bits: u16) -> Result<Self, SynthError> {
        Self::from_bits(bits)
    }
}

impl From<Opcode> for u16 {
    fn from(op: Opcode) -> Self {
        op.to_bits()
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Opcode::Shuffle(mask) => {
                let [lo0, lo1, hi0, hi1] = mask.selects();
                write!(f, "shufps[{lo0}, {lo1} | {hi0}, {hi1}]")
            }
            other => f.write_str(other.mnemonic()),
        }
    }
}

/// One recorded instruction.
///
/// Operands index the register frame of the sequence that holds the
/// instruction: 0 and 1 are the two source registers, 2 onwards the results
/// of earlier instructions in production order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Instruction {
    /// What to compute.
    pub opcode: Opcode,
    /// First operand.
    pub a: u8,
    /// Second operand.
    pub b: u8,
}

impl Instruction {
    /// Creates an instruction.
    pub const fn new(opcode: Opcode, a: u8, b: u8) -> Self {
        Self { opcode, a, b }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} %{}, %{}", self.opcode, self.a, self.b)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const A: [u8; 4] = [10, 11, 12, 13];
    const B: [u8; 4] = [20, 21, 22, 23];

    #[test]
    fn test_fixed_permutes() {
        assert_eq!(Opcode::UnpackLow.apply(A, B), [10, 20, 11, 21]);
        assert_eq!(Opcode::UnpackHigh.apply(A, B), [12, 22, 13, 23]);
        assert_eq!(Opcode::MergeLowHigh.apply(A, B), [10, 11, 20, 21]);
        assert_eq!(Opcode::MergeHighLow.apply(A, B), [22, 23, 12, 13]);
    }

    #[test]
    fn test_shuffle_selects() {
        let mask = ShuffleMask::from_selects(3, 0, 2, 1);
        assert_eq!(mask.bits(), 0b01_10_00_11);
        assert_eq!(Opcode::Shuffle(mask).apply(A, B), [13, 10, 22, 21]);
    }

    #[test]
    fn test_candidate_order() {
        assert_eq!(CANDIDATES[0], Opcode::UnpackLow);
        assert_eq!(CANDIDATES[1], Opcode::UnpackHigh);
        assert_eq!(CANDIDATES[2], Opcode::MergeLowHigh);
        assert_eq!(CANDIDATES[3], Opcode::MergeHighLow);
        // hi1 varies fastest, lo0 slowest
        assert_eq!(CANDIDATES[4], Opcode::Shuffle(ShuffleMask::from_selects(0, 0, 0, 0)));
        assert_eq!(CANDIDATES[5], Opcode::Shuffle(ShuffleMask::from_selects(0, 0, 0, 1)));
        assert_eq!(CANDIDATES[8], Opcode::Shuffle(ShuffleMask::from_selects(0, 0, 1, 0)));
        assert_eq!(
            CANDIDATES[CANDIDATE_COUNT - 1],
            Opcode::Shuffle(ShuffleMask::from_selects(3, 3, 3, 3))
        );
    }

    #[test]
    fn test_candidates_are_distinct() {
        let mut bits: Vec<u16> = Opcode::candidates().map(Opcode::to_bits).collect();
        bits.sort_unstable();
        bits.dedup();
        assert_eq!(bits.len(), CANDIDATE_COUNT);
    }

    #[test]
    fn test_packed_roundtrip_and_rejects() {
        for op in Opcode::candidates() {
            assert_eq!(Opcode::from_bits(op.to_bits()), Ok(op));
        }
        assert_eq!(Opcode::from_bits(5), Err(SynthError::UnknownOpcode(5)));
        assert_eq!(Opcode::from_bits(7), Err(SynthError::UnknownOpcode(7)));
        assert_eq!(
            Opcode::from_bits(1 | (1 << 3)),
            Err(SynthError::UnknownOpcode(9))
        );
        assert!(Opcode::from_bits(256 << 3).is_err());
    }
}
