//! Error type shared by the search, the network model, and the compiler.

use crate::lane::{LaneKey, LaneVector};

/// Failures surfaced while building or consuming the shuffle table.
///
/// None of these are recoverable locally: generation aborts rather than
/// emitting code that might be wrong.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SynthError {
    /// A lane identity outside `0..8`.
    #[error("lane identity {0} is outside the 8-input universe")]
    LaneOutOfRange(u8),

    /// A table index outside the 4096-entry key universe.
    #[error("lane key {0:#x} is outside the key universe")]
    KeyOutOfRange(usize),

    /// The search never sealed this key, so no sequence gathers it.
    #[error("no instruction sequence produces {vector} (key {key})")]
    UnreachableKey {
        /// The requested lane vector.
        vector: LaneVector,
        /// Its canonical key.
        key: LaneKey,
    },

    /// A packed instruction carried an opcode tag outside the instruction set.
    #[error("unrecognized opcode encoding {0:#06x}")]
    UnknownOpcode(u16),

    /// An instruction referenced a register that does not exist yet.
    #[error("instruction {index} reads register {operand}, but only {available} exist")]
    DanglingOperand {
        /// Position of the offending instruction in its sequence.
        index: usize,
        /// The operand that was read.
        operand: u8,
        /// Number of registers available at that point.
        available: usize,
    },

    /// A snapshot entry replays to a different lane vector than its key.
    #[error("sequence stored at {expected} produces {actual}")]
    SequenceMismatch {
        /// Vector encoded by the entry's key.
        expected: LaneVector,
        /// Vector the sequence actually produces.
        actual: LaneVector,
    },

    /// A snapshot entry is longer than the shortest sequence for its vector.
    #[error("sequence stored at {vector} has {stored} instructions, but {shortest} suffice")]
    NonMinimalSequence {
        /// Vector the entry is stored under.
        vector: LaneVector,
        /// Length of the stored sequence.
        stored: usize,
        /// Length of a shortest sequence.
        shortest: usize,
    },

    /// A snapshot entry repeats a key or stores a seed.
    #[error("snapshot entry for {0} is duplicated or names a seed register")]
    InvalidSnapshotEntry(LaneVector),

    /// A sequence with no instructions has no result register.
    #[error("sequence has no instructions")]
    EmptySequence,

    /// A wire index outside `0..8`.
    #[error("wire {0} is outside the 8-wire network")]
    WireOutOfRange(u8),

    /// A round whose pairs do not cover each wire exactly once.
    #[error("round {round} uses wire {wire} more than once")]
    WireReused {
        /// Index of the round inside its network.
        round: usize,
        /// The repeated wire.
        wire: u8,
    },

    /// A network with no rounds.
    #[error("sorting network `{0}` has no rounds")]
    EmptyNetwork(String),
}

/// Result alias for this crate.
pub type Result<T> = core::result::Result<T, SynthError>;
