//! Generated-source validators.

use sortgen::{Program, Step, VReg};
use sortgen_codegen::{generate, render_step, Target};

use crate::report::{ConformanceReport, TestResult};

/// Architectural XMM registers on x86_64 without AVX-512.
const XMM_REGISTERS: usize = 16;

/// Checks both dialects' output and register pressure of each program.
pub fn validate(programs: &[Program]) -> ConformanceReport {
    let mut report = ConformanceReport::new();
    for target in [Target::Rust, Target::Cpp] {
        report.push(statements(programs, target));
    }
    for program in programs {
        report.push(pressure(program));
    }
    report
}

/// Every step appears as exactly one line of the generated source.
pub fn statements(programs: &[Program], target: Target) -> TestResult {
    let dialect = target.dialect();
    let validator = format!("codegen/{}", dialect.name());
    let mut missing = Vec::new();
    let mut total = 0;
    for program in programs {
        let source = generate(std::slice::from_ref(program), dialect);
        let lines: Vec<&str> = source.lines().map(str::trim).collect();
        for step in program.steps() {
            total += 1;
            let stmt = render_step(dialect, step);
            let count = lines.iter().filter(|&&l| l == stmt).count();
            if count != 1 {
                missing.push(format!("{}: `{stmt}` appears {count} times", program.name()));
            }
        }
    }
    TestResult::check(
        validator,
        missing.is_empty(),
        format!("{total} statements across {} functions", programs.len()),
        missing,
    )
}

/// Warns when more values are live at once than there are XMM registers.
pub fn pressure(program: &Program) -> TestResult {
    let validator = format!("codegen/{}/registers", program.name());
    let peak = peak_live(program);
    let message = format!("peak of {peak} live registers");
    if peak > XMM_REGISTERS {
        TestResult::warn(validator, format!("{message}; expect spills"))
    } else {
        TestResult::pass(validator, message)
    }
}

fn operands(step: &Step) -> [VReg; 2] {
    match *step {
        Step::Permute { a, b, .. } | Step::Min { a, b, .. } | Step::Max { a, b, .. } => [a, b],
    }
}

/// Largest number of registers defined and still needed at any step.
pub fn peak_live(program: &Program) -> usize {
    let count = program.register_count();
    let steps = program.steps();
    // Position of the last read; outputs stay live to the end.
    let mut last_use = vec![0usize; count];
    for (pos, step) in steps.iter().enumerate() {
        for reg in operands(step) {
            last_use[reg.index()] = pos;
        }
    }
    for reg in program.outputs() {
        last_use[reg.index()] = steps.len();
    }

    // Registers 0 and 1 are live from the start; step k defines register k + 2.
    let mut peak = 0;
    for pos in 0..=steps.len() {
        let defined = (pos + 2).min(count);
        let live = (0..defined).filter(|&r| last_use[r] >= pos).count();
        peak = peak.max(live);
    }
    peak
}
