//! Sorting-network compiler.
//!
//! Lowers a [`SortingNetwork`] to a straight-line [`Program`] over two 4-wide
//! registers. Per round:
//!
//! 1. translate the round's `lo` and `hi` wires into physical positions
//!    through the [`WireMap`], giving two target [`LaneVector`]s;
//! 2. resolve each target through the [`SequenceTable`] and emit its
//!    instructions (a seed target emits nothing);
//! 3. emit a lane-wise `min` and `max` of the two gathers;
//! 4. advance the wire map: lanes of the `min` register now hold the round's
//!    `lo` wires, lanes of the `max` register its `hi` wires.
//!
//! After the last round one more pair of gathers puts wires `0..4` and
//! `4..8` back into the low and high registers.
//!
//! Registers come from a monotonic arena and are never reused; `r0`/`r1`
//! are the loaded inputs.

use core::fmt;

use serde::Serialize;

use crate::error::{Result, SynthError};
use crate::isa::Opcode;
use crate::lane::{LaneVector, INPUTS, LANES};
use crate::network::{Round, SortingNetwork, Wire};
use crate::search::{Gather, SequenceTable};

/// Virtual register handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct VReg(u32);

impl VReg {
    /// Register loaded from elements `0..4`.
    pub const LOW_INPUT: VReg = VReg(0);
    /// Register loaded from elements `4..8`.
    pub const HIGH_INPUT: VReg = VReg(1);

    /// Allocation index.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for VReg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "r{}", self.0)
    }
}

/// One operation of a compiled program. Each step defines exactly one
/// fresh register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Step {
    /// A shuffle-family instruction.
    Permute {
        /// Result register.
        dst: VReg,
        /// Instruction to apply.
        opcode: Opcode,
        /// First operand.
        a: VReg,
        /// Second operand.
        b: VReg,
    },
    /// Lane-wise minimum.
    Min {
        /// Result register.
        dst: VReg,
        /// First operand.
        a: VReg,
        /// Second operand.
        b: VReg,
    },
    /// Lane-wise maximum.
    Max {
        /// Result register.
        dst: VReg,
        /// First operand.
        a: VReg,
        /// Second operand.
        b: VReg,
    },
}

impl Step {
    /// Register this step defines.
    pub fn dst(&self) -> VReg {
        match *self {
            Step::Permute { dst, .. } | Step::Min { dst, .. } | Step::Max { dst, .. } => dst,
        }
    }
}

/// Straight-line code for one network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Program {
    name: String,
    steps: Vec<Step>,
    register_count: usize,
    outputs: [VReg; 2],
}

impl Program {
    /// Name of the source network.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Steps in execution order.
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Registers used, inputs included.
    pub fn register_count(&self) -> usize {
        self.register_count
    }

    /// Registers stored back to elements `0..4` and `4..8`.
    pub fn outputs(&self) -> [VReg; 2] {
        self.outputs
    }

    /// Number of shuffle-family steps.
    pub fn permute_count(&self) -> usize {
        self.steps
            .iter()
            .filter(|s| matches!(s, Step::Permute { .. }))
            .count()
    }
}

/// Monotonic register allocator; inputs occupy the first two slots.
#[derive(Debug)]
struct RegisterArena {
    next: u32,
}

impl RegisterArena {
    fn new() -> Self {
        Self { next: 2 }
    }

    fn alloc(&mut self) -> VReg {
        let reg = VReg(self.next);
        self.next += 1;
        reg
    }

    fn len(&self) -> usize {
        self.next as usize
    }
}

#[derive(Debug)]
struct ProgramBuilder {
    arena: RegisterArena,
    steps: Vec<Step>,
}

impl ProgramBuilder {
    fn new() -> Self {
        Self {
            arena: RegisterArena::new(),
            steps: Vec::new(),
        }
    }

    /// Emits the instructions of `gather` reading from `sources`, returning
    /// the register that holds the result.
    fn gather(&mut self, sources: [VReg; 2], gather: Gather<'_>) -> Result<VReg> {
        let sequence = match gather {
            Gather::Source(slot) => return Ok(sources[slot]),
            Gather::Sequence(seq) if seq.is_empty() => return Err(SynthError::EmptySequence),
            Gather::Sequence(seq) => seq,
        };

        let mut frame = sources.to_vec();
        for (index, insn) in sequence.instructions().iter().enumerate() {
            let a = frame_operand(&frame, index, insn.a)?;
            let b = frame_operand(&frame, index, insn.b)?;
            let dst = self.arena.alloc();
            self.steps.push(Step::Permute {
                dst,
                opcode: insn.opcode,
                a,
                b,
            });
            frame.push(dst);
        }
        frame.last().copied().ok_or(SynthError::EmptySequence)
    }

    fn compare_exchange(&mut self, lo: VReg, hi: VReg) -> [VReg; 2] {
        let min = self.arena.alloc();
        self.steps.push(Step::Min { dst: min, a: lo, b: hi });
        let max = self.arena.alloc();
        self.steps.push(Step::Max { dst: max, a: lo, b: hi });
        [min, max]
    }

    fn finish(self, name: String, outputs: [VReg; 2]) -> Program {
        Program {
            name,
            register_count: self.arena.len(),
            steps: self.steps,
            outputs,
        }
    }
}

fn frame_operand(frame: &[VReg], index: usize, operand: u8) -> Result<VReg> {
    frame
        .get(usize::from(operand))
        .copied()
        .ok_or(SynthError::DanglingOperand {
            index,
            operand,
            available: frame.len(),
        })
}

/// Which logical wire each physical lane currently holds.
///
/// Positions `0..4` are the lanes of the low register, `4..8` the lanes of
/// the high one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WireMap([Wire; INPUTS]);

impl WireMap {
    /// Wire `k` at position `k`.
    pub const fn identity() -> Self {
        Self([0, 1, 2, 3, 4, 5, 6, 7])
    }

    /// Wire held at each position.
    pub fn wires(&self) -> [Wire; INPUTS] {
        self.0
    }

    /// Physical position of `wire`.
    ///
    /// # Errors
    ///
    /// Returns [`SynthError::WireOutOfRange`] if no position holds it.
    pub fn position_of(&self, wire: Wire) -> Result<u8> {
        self.0
            .iter()
            .position(|&w| w == wire)
            .map(|p| p as u8)
            .ok_or(SynthError::WireOutOfRange(wire))
    }

    /// Lane vector gathering `wires` from their current positions.
    ///
    /// # Errors
    ///
    /// Propagates [`WireMap::position_of`].
    pub fn gather_for(&self, wires: [Wire; LANES]) -> Result<LaneVector> {
        let mut lanes = [0u8; LANES];
        for (lane, wire) in lanes.iter_mut().zip(wires) {
            *lane = self.position_of(wire)?;
        }
        LaneVector::new(lanes)
    }

    /// Records the layout a round leaves behind.
    pub fn advance(&mut self, round: &Round) {
        for (i, c) in round.comparators().iter().enumerate() {
            self.0[i] = c.lo;
            self.0[i + LANES] = c.hi;
        }
    }
}

impl Default for WireMap {
    fn default() -> Self {
        Self::identity()
    }
}

/// Compiles networks against a finished [`SequenceTable`].
#[derive(Debug, Clone, Copy)]
pub struct Compiler<'t> {
    table: &'t SequenceTable,
}

impl<'t> Compiler<'t> {
    /// Creates a compiler reading `table`.
    pub fn new(table: &'t SequenceTable) -> Self {
        Self { table }
    }

    /// Compiles a whole network.
    ///
    /// # Errors
    ///
    /// Returns [`SynthError::UnreachableKey`] if a round needs a gather the
    /// table cannot produce.
    pub fn compile(&self, network: &SortingNetwork) -> Result<Program> {
        let mut compilation = self.begin(network.name());
        for round in network.rounds() {
            compilation.step(round)?;
        }
        let program = compilation.finish()?;
        log::info!(
            "compiled {}: {} rounds, {} permutes, {} registers",
            program.name(),
            network.rounds().len(),
            program.permute_count(),
            program.register_count()
        );
        Ok(program)
    }

    /// Starts an incremental compilation with the identity wire map.
    pub fn begin(&self, name: &str) -> Compilation<'t> {
        Compilation {
            table: self.table,
            name: name.to_string(),
            wires: WireMap::identity(),
            builder: ProgramBuilder::new(),
            current: [VReg::LOW_INPUT, VReg::HIGH_INPUT],
            rounds: 0,
        }
    }
}

/// A network compilation in progress.
///
/// The only state that evolves between rounds is the [`WireMap`] and the
/// pair of registers holding the current values.
#[derive(Debug)]
pub struct Compilation<'t> {
    table: &'t SequenceTable,
    name: String,
    wires: WireMap,
    builder: ProgramBuilder,
    current: [VReg; 2],
    rounds: usize,
}

impl Compilation<'_> {
    /// Emits one round.
    ///
    /// # Errors
    ///
    /// Returns [`SynthError::UnreachableKey`] if either gather is missing
    /// from the table.
    pub fn step(&mut self, round: &Round) -> Result<()> {
        let lo_target = self.wires.gather_for(round.lo_wires())?;
        let hi_target = self.wires.gather_for(round.hi_wires())?;
        log::debug!(
            "{} round {}: gather lo {lo_target}, hi {hi_target}",
            self.name,
            self.rounds
        );

        let lo = self
            .builder
            .gather(self.current, self.table.gather(lo_target)?)?;
        let hi = self
            .builder
            .gather(self.current, self.table.gather(hi_target)?)?;
        self.current = self.builder.compare_exchange(lo, hi);

        self.wires.advance(round);
        self.rounds += 1;
        Ok(())
    }

    /// Current wire layout.
    pub fn wires(&self) -> &WireMap {
        &self.wires
    }

    /// Registers holding the values after the last emitted round.
    pub fn current(&self) -> [VReg; 2] {
        self.current
    }

    /// Restores wire order and returns the finished program.
    ///
    /// # Errors
    ///
    /// Returns [`SynthError::UnreachableKey`] if a restoring gather is
    /// missing from the table.
    pub fn finish(mut self) -> Result<Program> {
        let lo_target = self.wires.gather_for([0, 1, 2, 3])?;
        let hi_target = self.wires.gather_for([4, 5, 6, 7])?;
        let lo = self
            .builder
            .gather(self.current, self.table.gather(lo_target)?)?;
        let hi = self
            .builder
            .gather(self.current, self.table.gather(hi_target)?)?;
        Ok(self.builder.finish(self.name, [lo, hi]))
    }

    /// Returns the program as-is, outputs in round layout: the low output
    /// holds the last round's minima, the high output its maxima.
    pub fn finish_unrestored(self) -> Program {
        let outputs = self.current;
        self.builder.finish(self.name, outputs)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::OnceLock;

    use super::*;
    use crate::network::{bitonic1, builtin};

    fn table() -> &'static SequenceTable {
        static TABLE: OnceLock<SequenceTable> = OnceLock::new();
        TABLE.get_or_init(SequenceTable::build)
    }

    #[test]
    fn test_wire_map_identity_gathers_are_seeds() {
        let wires = WireMap::identity();
        assert_eq!(wires.gather_for([0, 1, 2, 3]).unwrap(), LaneVector::LOW_SEED);
        assert_eq!(wires.gather_for([4, 5, 6, 7]).unwrap(), LaneVector::HIGH_SEED);
    }

    #[test]
    fn test_wire_map_advance() {
        let round = Round::new(0, [(0, 1), (2, 3), (4, 5), (6, 7)]).unwrap();
        let mut wires = WireMap::identity();
        wires.advance(&round);
        assert_eq!(wires.wires(), [0, 2, 4, 6, 1, 3, 5, 7]);
        assert_eq!(
            wires.gather_for([0, 1, 2, 3]).unwrap(),
            LaneVector::new([0, 4, 1, 5]).unwrap()
        );
    }

    #[test]
    fn test_first_round_gathers() {
        let compiler = Compiler::new(table());
        let mut c = compiler.begin("t");
        c.step(&bitonic1().rounds()[0]).unwrap();
        let program = c.finish_unrestored();

        // {0,2,4,6} and {1,3,5,7} are both one shufps, then min and max.
        assert_eq!(program.steps().len(), 4);
        assert_eq!(program.permute_count(), 2);
        assert_eq!(program.outputs(), [VReg(4), VReg(5)]);
        assert_eq!(
            program.steps()[2],
            Step::Min {
                dst: VReg(4),
                a: VReg(2),
                b: VReg(3)
            }
        );
    }

    #[test]
    fn test_registers_are_allocated_in_step_order() {
        let compiler = Compiler::new(table());
        for net in builtin() {
            let program = compiler.compile(&net).unwrap();
            for (k, step) in program.steps().iter().enumerate() {
                assert_eq!(step.dst().index(), k + 2);
            }
            assert_eq!(program.register_count(), program.steps().len() + 2);
        }
    }

    #[test]
    fn test_operands_are_defined_before_use() {
        let compiler = Compiler::new(table());
        let program = compiler.compile(&bitonic1()).unwrap();
        for step in program.steps() {
            let (a, b) = match *step {
                Step::Permute { a, b, .. } | Step::Min { a, b, .. } | Step::Max { a, b, .. } => {
                    (a, b)
                }
            };
            assert!(a < step.dst() && b < step.dst());
        }
    }

    #[test]
    fn test_unreachable_gather_is_an_error() {
        let empty = SequenceTable::from_snapshot(crate::search::TableSnapshot {
            entries: Vec::new(),
        })
        .unwrap();
        let err = Compiler::new(&empty).compile(&bitonic1()).unwrap_err();
        assert!(matches!(err, SynthError::UnreachableKey { .. }));
    }
}
