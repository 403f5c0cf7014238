//! Register model: lane provenance vectors and their canonical keys.
//!
//! A [`LaneVector`] records, for each of the four lanes of a register, which
//! of the eight original inputs it holds. Inputs `0..4` arrive in the low
//! source register and `4..8` in the high one, so the two seeds are
//! `{0, 1, 2, 3}` and `{4, 5, 6, 7}`.
//!
//! # Key encoding
//!
//! ```text
//! bits:  11..9   8..6   5..3   2..0
//! lane:    3      2      1      0
//! ```
//!
//! Every field is three bits, so the key universe is exactly
//! [`KEY_SPACE`] = 4096 and keys double as dense table indices.
//!
//! ```
//! use sortgen::lane::{encode, LaneVector};
//!
//! let v = LaneVector::new([0, 4, 1, 5]).unwrap();
//! assert_eq!(encode(v).decode(), v);
//! assert_eq!(LaneVector::LOW_SEED.key().index(), 0b011_010_001_000);
//! ```

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SynthError};

/// Lanes per register.
pub const LANES: usize = 4;

/// Distinct input identities (two registers of four lanes).
pub const INPUTS: usize = 8;

/// Bits per packed lane field.
pub const KEY_BITS: usize = 3;

/// Size of the key universe: every 4-tuple over `0..8`.
pub const KEY_SPACE: usize = 1 << (KEY_BITS * LANES);

const FIELD_MASK: u16 = (1 << KEY_BITS) - 1;

/// Provenance of each lane of a 4-wide register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "[u8; 4]", into = "[u8; 4]")]
pub struct LaneVector([u8; LANES]);

impl LaneVector {
    /// The low source register: inputs 0..4.
    pub const LOW_SEED: Self = Self([0, 1, 2, 3]);

    /// The high source register: inputs 4..8.
    pub const HIGH_SEED: Self = Self([4, 5, 6, 7]);

    /// Both seeds, in source-slot order.
    pub const SEEDS: [Self; 2] = [Self::LOW_SEED, Self::HIGH_SEED];

    /// Creates a lane vector, rejecting identities outside `0..8`.
    ///
    /// # Errors
    ///
    /// Returns [`SynthError::LaneOutOfRange`] for the first offending lane.
    pub fn new(lanes: [u8; LANES]) -> Result<Self> {
        match lanes.iter().find(|&&l| usize::from(l) >= INPUTS) {
            Some(&bad) => Err(SynthError::LaneOutOfRange(bad)),
            None => Ok(Self(lanes)),
        }
    }

    /// Wraps lanes already known to be in range.
    ///
    /// Only combinations of in-range vectors reach this, so the
    /// invariant carries over.
    pub(crate) const fn from_lanes(lanes: [u8; LANES]) -> Self {
        Self(lanes)
    }

    /// The four lane identities.
    #[inline]
    pub const fn lanes(&self) -> [u8; LANES] {
        self.0
    }

    /// Identity held by lane `i`.
    ///
    /// # Panics
    ///
    /// Panics if `i >= LANES`.
    #[inline]
    pub const fn lane(&self, i: usize) -> u8 {
        self.0[i]
    }

    /// Canonical key of this vector.
    #[inline]
    pub const fn key(&self) -> LaneKey {
        encode(*self)
    }

    /// Source slot (0 = low, 1 = high) if this vector is one of the seeds.
    pub fn seed_slot(&self) -> Option<usize> {
        Self::SEEDS.iter().position(|s| s == self)
    }
}

impl TryFrom<[u8; LANES]> for LaneVector {
    type Error = SynthError;

    fn try_from(lanes: [u8; LANES]) -> Result<Self> {
        Self::new(lanes)
    }
}

impl From<LaneVector> for [u8; LANES] {
    fn from(v: LaneVector) -> Self {
        v.0
    }
}

impl fmt::Display for LaneVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d] = self.0;
        write!(f, "{{{a}, {b}, {c}, {d}}}")
    }
}

/// Packed 12-bit key of a [`LaneVector`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LaneKey(u16);

impl LaneKey {
    pub(crate) const fn from_raw(raw: u16) -> Self {
        Self(raw)
    }

    /// Builds a key from a dense index.
    ///
    /// # Errors
    ///
    /// Returns [`SynthError::KeyOutOfRange`] if `index >= KEY_SPACE`.
    pub fn from_index(index: usize) -> Result<Self> {
        if index < KEY_SPACE {
            Ok(Self(index as u16))
        } else {
            Err(SynthError::KeyOutOfRange(index))
        }
    }

    /// Dense table index.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Recovers the vector this key encodes.
    pub const fn decode(self) -> LaneVector {
        let k = self.0;
        LaneVector([
            (k & FIELD_MASK) as u8,
            ((k >> KEY_BITS) & FIELD_MASK) as u8,
            ((k >> (2 * KEY_BITS)) & FIELD_MASK) as u8,
            ((k >> (3 * KEY_BITS)) & FIELD_MASK) as u8,
        ])
    }

    /// Every key in the universe, ascending.
    pub fn all() -> impl Iterator<Item = LaneKey> {
        (0..KEY_SPACE as u16).map(LaneKey)
    }
}

impl fmt::Display for LaneKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#05x}", self.0)
    }
}

/// Packs four 3-bit lane fields into a key. Total and collision-free over
/// in-range vectors.
#[inline]
pub const fn encode(v: LaneVector) -> LaneKey {
    let [a, b, c, d] = v.0;
    LaneKey(
        (a as u16)
            | ((b as u16) << KEY_BITS)
            | ((c as u16) << (2 * KEY_BITS))
            | ((d as u16) << (3 * KEY_BITS)),
    )
}
