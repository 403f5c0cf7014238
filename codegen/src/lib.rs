//! sortgen code generator.
//!
//! Renders [`Program`]s produced by `sortgen::Compiler` as straight-line SSE
//! intrinsics in a chosen [`Dialect`]. Every step becomes exactly one
//! statement defining exactly one register, so the output reads the same way
//! as the program it came from.
//!
//! ```
//! use sortgen::network::bitonic1;
//! use sortgen::{Compiler, SequenceTable};
//! use sortgen_codegen::{generate, Target};
//!
//! let table = SequenceTable::build();
//! let program = Compiler::new(&table).compile(&bitonic1())?;
//! let source = generate(&[program], Target::Cpp.dialect());
//! assert!(source.contains("void sort_bitonic1(std::array<float, 8>& arr)"));
//! # Ok::<(), sortgen::SynthError>(())
//! ```

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs,
    clippy::missing_errors_doc
)]

pub mod dialect;
pub mod emit;

use std::path::Path;

use anyhow::{bail, Context, Result};
use sortgen::{Instruction, LaneVector, Program, Sequence, Step};

pub use dialect::{CppSse, Dialect, RustSse, Target};
use emit::{function_ident, SourceFile};

/// Summary of one generated function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionReport {
    /// Network name.
    pub network: String,
    /// Emitted identifier.
    pub ident: String,
    /// Shuffle-family statements.
    pub permutes: usize,
    /// `min`/`max` statements.
    pub compares: usize,
    /// Registers used, loads included.
    pub registers: usize,
}

impl FunctionReport {
    fn of(program: &Program) -> Self {
        let permutes = program.permute_count();
        Self {
            network: program.name().to_string(),
            ident: function_ident(program.name()),
            permutes,
            compares: program.steps().len() - permutes,
            registers: program.register_count(),
        }
    }
}

/// Report of what was generated.
#[derive(Debug, Default)]
pub struct GenerationReport {
    /// Dialect used.
    pub dialect: &'static str,
    /// One entry per function, in output order.
    pub functions: Vec<FunctionReport>,
    /// Size of the output in bytes.
    pub bytes: usize,
}

/// Renders one step as a statement.
pub fn render_step(dialect: &dyn Dialect, step: &Step) -> String {
    match *step {
        Step::Permute { dst, opcode, a, b } => {
            dialect.permute(dst.index(), opcode, a.index(), b.index())
        }
        Step::Min { dst, a, b } => dialect.min(dst.index(), a.index(), b.index()),
        Step::Max { dst, a, b } => dialect.max(dst.index(), a.index(), b.index()),
    }
}

/// Register naming for a sequence emitted on its own: operands 0 and 1 name
/// the two sources, operand `2 + k` the `k`-th result, which lands in
/// register `base + k`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    /// Registers bound to operands 0 and 1.
    pub sources: [usize; 2],
    /// Register receiving the first result.
    pub base: usize,
    /// Results emitted so far.
    pub produced: usize,
}

impl Frame {
    /// Fresh frame over `sources`, writing results from `base` upwards.
    pub fn new(sources: [usize; 2], base: usize) -> Self {
        Self {
            sources,
            base,
            produced: 0,
        }
    }

    fn resolve(&self, operand: u8) -> Result<usize> {
        match usize::from(operand) {
            slot @ 0..=1 => Ok(self.sources[slot]),
            k if k - 2 < self.produced => Ok(self.base + k - 2),
            _ => bail!(
                "operand {operand} names a register not yet produced ({} available)",
                self.produced + 2
            ),
        }
    }
}

/// Renders one instruction inside `frame` and advances it by the single
/// register the instruction defines.
///
/// # Errors
///
/// Returns an error if an operand names a result not yet produced.
pub fn render_instruction(
    dialect: &dyn Dialect,
    frame: &mut Frame,
    insn: &Instruction,
) -> Result<String> {
    let a = frame.resolve(insn.a)?;
    let b = frame.resolve(insn.b)?;
    let dst = frame.base + frame.produced;
    frame.produced += 1;
    Ok(dialect.permute(dst, insn.opcode, a, b))
}

/// Appends the function for `program` to `out`.
pub fn render_program(dialect: &dyn Dialect, program: &Program, out: &mut SourceFile) {
    dialect.open_function(out, &function_ident(program.name()), program.name());
    for step in program.steps() {
        out.line(&render_step(dialect, step));
    }
    dialect.close_function(out, program.outputs().map(|r| r.index()));
}

/// Renders a complete source file holding one function per program.
pub fn generate(programs: &[Program], dialect: &dyn Dialect) -> String {
    let mut out = SourceFile::new();
    dialect.prelude(&mut out);
    for (i, program) in programs.iter().enumerate() {
        if i > 0 {
            out.blank();
        }
        render_program(dialect, program, &mut out);
    }
    out.finish()
}

/// Generates the file for `programs` and writes it to `path`.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn generate_file(
    programs: &[Program],
    dialect: &dyn Dialect,
    path: &Path,
) -> Result<GenerationReport> {
    let source = generate(programs, dialect);
    emit::write_file(path, &source)?;
    let report = GenerationReport {
        dialect: dialect.name(),
        functions: programs.iter().map(FunctionReport::of).collect(),
        bytes: source.len(),
    };
    log::info!(
        "wrote {} ({} functions, {} bytes, {})",
        path.display(),
        report.functions.len(),
        report.bytes,
        report.dialect
    );
    Ok(report)
}

/// Diagnostic listing of one sequence: each statement followed by the lane
/// vector it produces, reading from `r0`/`r1` as the two seeds.
///
/// # Errors
///
/// Returns an error if the sequence reads a register it never defined.
pub fn dump_sequence(dialect: &dyn Dialect, sequence: &Sequence) -> Result<String> {
    let trace = sequence
        .trace(LaneVector::SEEDS)
        .context("Failed to trace sequence")?;
    let mut frame = Frame::new([0, 1], LaneVector::SEEDS.len());
    let mut out = SourceFile::new();
    for (insn, lanes) in &trace {
        let stmt = render_instruction(dialect, &mut frame, insn)?;
        out.line(&format!("{stmt} // {lanes}"));
    }
    Ok(out.finish())
}
