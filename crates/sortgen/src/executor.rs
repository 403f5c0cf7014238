//! Scalar reference executor for compiled programs.
//!
//! Interprets a [`Program`] over plain arrays, with no SIMD. It is the test
//! oracle for generated code: anything the emitted intrinsics compute, this
//! computes the same way.
//!
//! `min` and `max` follow `minps`/`maxps`: when the comparison fails
//! (equal values, or a NaN) the second operand is returned.
//!
//! ```
//! use sortgen::compiler::Compiler;
//! use sortgen::network::bitonic1;
//! use sortgen::search::SequenceTable;
//!
//! let table = SequenceTable::build();
//! let program = Compiler::new(&table).compile(&bitonic1()).unwrap();
//!
//! let mut data = [3, 1, 4, 1, 5, 9, 2, 6];
//! program.sort(&mut data);
//! assert_eq!(data, [1, 1, 2, 3, 4, 5, 6, 9]);
//! ```

use crate::compiler::{Program, Step, VReg};
use crate::lane::{INPUTS, LANES};

/// Lane-wise minimum with `minps` semantics.
#[inline]
pub fn lane_min<T: Copy + PartialOrd>(a: [T; LANES], b: [T; LANES]) -> [T; LANES] {
    core::array::from_fn(|i| if a[i] < b[i] { a[i] } else { b[i] })
}

/// Lane-wise maximum with `maxps` semantics.
#[inline]
pub fn lane_max<T: Copy + PartialOrd>(a: [T; LANES], b: [T; LANES]) -> [T; LANES] {
    core::array::from_fn(|i| if a[i] > b[i] { a[i] } else { b[i] })
}

/// Register-file interpreter.
///
/// The register file grows with the program; steps define registers in
/// allocation order, so each step appends exactly one entry. Reusing one
/// executor across runs keeps the allocation.
#[derive(Debug, Clone)]
pub struct LaneExecutor<T> {
    registers: Vec<[T; LANES]>,
}

impl<T: Copy + PartialOrd> LaneExecutor<T> {
    /// Creates an executor with an empty register file.
    pub fn new() -> Self {
        Self {
            registers: Vec::new(),
        }
    }

    /// Register file after the last run.
    pub fn registers(&self) -> &[[T; LANES]] {
        &self.registers
    }

    /// Runs `program` over `data` in place.
    ///
    /// # Panics
    ///
    /// Panics if the program reads a register it never defined. Programs
    /// produced by [`Compiler`](crate::compiler::Compiler) never do.
    pub fn run(&mut self, program: &Program, data: &mut [T; INPUTS]) {
        self.registers.clear();
        self.registers.reserve(program.register_count());
        let (low, high) = data.split_at(LANES);
        self.registers.push(core::array::from_fn(|i| low[i]));
        self.registers.push(core::array::from_fn(|i| high[i]));

        for step in program.steps() {
            debug_assert_eq!(step.dst().index(), self.registers.len());
            let value = match *step {
                Step::Permute { opcode, a, b, .. } => opcode.apply(self.read(a), self.read(b)),
                Step::Min { a, b, .. } => lane_min(self.read(a), self.read(b)),
                Step::Max { a, b, .. } => lane_max(self.read(a), self.read(b)),
            };
            self.registers.push(value);
        }

        let [lo, hi] = program.outputs();
        let (lo, hi) = (self.read(lo), self.read(hi));
        data[..LANES].copy_from_slice(&lo);
        data[LANES..].copy_from_slice(&hi);
    }

    #[inline]
    fn read(&self, reg: VReg) -> [T; LANES] {
        self.registers[reg.index()]
    }
}

impl<T: Copy + PartialOrd> Default for LaneExecutor<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl Program {
    /// Runs the program on `data` with a fresh [`LaneExecutor`].
    pub fn sort<T: Copy + PartialOrd>(&self, data: &mut [T; INPUTS]) {
        LaneExecutor::new().run(self, data);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::compiler::Compiler;
    use crate::network::{bitonic2, builtin};
    use crate::search::SequenceTable;

    #[test]
    fn test_min_max_follow_sse_operand_order() {
        let nan = f32::NAN;
        let lo = lane_min([1.0, 2.0, nan, 0.0], [2.0, 1.0, 0.0, nan]);
        assert_eq!(lo[..2], [1.0, 1.0]);
        assert_eq!(lo[2], 0.0);
        assert!(lo[3].is_nan());

        let hi = lane_max([1.0, 2.0, nan, 0.0], [2.0, 1.0, 0.0, nan]);
        assert_eq!(hi[..2], [2.0, 2.0]);
        assert_eq!(hi[2], 0.0);
        assert!(hi[3].is_nan());
    }

    #[test]
    fn test_builtins_sort_samples() {
        let table = SequenceTable::build();
        let compiler = Compiler::new(&table);
        for net in builtin() {
            let program = compiler.compile(&net).unwrap();
            let mut exec = LaneExecutor::new();

            let mut rev = [7, 6, 5, 4, 3, 2, 1, 0];
            exec.run(&program, &mut rev);
            assert_eq!(rev, [0, 1, 2, 3, 4, 5, 6, 7], "{}", net.name());

            let mut floats = [0.5f32, -1.0, 3.25, 3.25, 8.0, -7.5, 0.0, 2.0];
            program.sort(&mut floats);
            assert_eq!(floats, [-7.5, -1.0, 0.0, 0.5, 2.0, 3.25, 3.25, 8.0]);
        }
    }

    #[test]
    fn test_register_file_matches_program() {
        let table = SequenceTable::build();
        let program = Compiler::new(&table).compile(&bitonic2()).unwrap();
        let mut exec = LaneExecutor::new();
        let mut data = [1u8, 0, 0, 1, 1, 0, 1, 0];
        exec.run(&program, &mut data);
        assert_eq!(exec.registers().len(), program.register_count());
        assert_eq!(data, [0, 0, 0, 0, 1, 1, 1, 1]);
    }
}
