//! Target dialects.
//!
//! Both dialects emit the same SSE intrinsics; they differ in how a result
//! is bound, how the shuffle immediate is spelled, and the function frame.
//!
//! | Opcode | Intrinsic |
//! |--------|-----------|
//! | `Shuffle(m)` | `_mm_shuffle_ps(a, b, m)` |
//! | `UnpackHigh` | `_mm_unpackhi_ps(a, b)` |
//! | `UnpackLow` | `_mm_unpacklo_ps(a, b)` |
//! | `MergeLowHigh` | `_mm_movelh_ps(a, b)` |
//! | `MergeHighLow` | `_mm_movehl_ps(a, b)` |
//! | min / max | `_mm_min_ps(a, b)` / `_mm_max_ps(a, b)` |

use sortgen::{Opcode, ShuffleMask};

use crate::emit::SourceFile;

const GENERATED_NOTICE: &str = "@generated by sortgen. Do not edit.";

/// How one target language spells a generated sorter.
///
/// Registers are named `r{index}`; `r0` and `r1` hold `arr[0..4]` and
/// `arr[4..8]` once [`Dialect::open_function`] has run.
pub trait Dialect {
    /// Short name used in logs and reports.
    fn name(&self) -> &'static str;

    /// File extension without the dot.
    fn extension(&self) -> &'static str;

    /// File header: notice, includes or imports.
    fn prelude(&self, out: &mut SourceFile);

    /// Function signature and the two loads. Leaves `out` indented inside
    /// the body.
    fn open_function(&self, out: &mut SourceFile, ident: &str, network: &str);

    /// The two stores and the closing brace(s).
    fn close_function(&self, out: &mut SourceFile, outputs: [usize; 2]);

    /// Spelling of a `shufps` immediate.
    fn shuffle_immediate(&self, mask: ShuffleMask) -> String;

    /// Statement binding `expr` to register `dst`.
    fn binding(&self, dst: usize, expr: &str) -> String;

    /// Statement computing `opcode(r{a}, r{b})` into `r{dst}`.
    fn permute(&self, dst: usize, opcode: Opcode, a: usize, b: usize) -> String {
        let expr = match opcode {
            Opcode::Shuffle(mask) => {
                format!("_mm_shuffle_ps(r{a}, r{b}, {})", self.shuffle_immediate(mask))
            }
            Opcode::UnpackHigh => format!("_mm_unpackhi_ps(r{a}, r{b})"),
            Opcode::UnpackLow => format!("_mm_unpacklo_ps(r{a}, r{b})"),
            Opcode::MergeLowHigh => format!("_mm_movelh_ps(r{a}, r{b})"),
            Opcode::MergeHighLow => format!("_mm_movehl_ps(r{a}, r{b})"),
        };
        self.binding(dst, &expr)
    }

    /// Statement computing the lane-wise minimum.
    fn min(&self, dst: usize, a: usize, b: usize) -> String {
        self.binding(dst, &format!("_mm_min_ps(r{a}, r{b})"))
    }

    /// Statement computing the lane-wise maximum.
    fn max(&self, dst: usize, a: usize, b: usize) -> String {
        self.binding(dst, &format!("_mm_max_ps(r{a}, r{b})"))
    }
}

/// Rust with `core::arch::x86_64` intrinsics.
///
/// Sorters take `&mut [f32; 8]`; shuffle immediates are binary literals
/// grouped as `hi1 hi0 lo1 lo0`.
#[derive(Debug, Clone, Copy, Default)]
pub struct RustSse;

impl Dialect for RustSse {
    fn name(&self) -> &'static str {
        "rust"
    }

    fn extension(&self) -> &'static str {
        "rs"
    }

    fn prelude(&self, out: &mut SourceFile) {
        out.comment(GENERATED_NOTICE);
        out.comment("");
        out.comment("Branch-free sorters for eight f32 values.");
        out.blank();
        out.line("#[cfg(target_arch = \"x86_64\")]");
        out.line("use core::arch::x86_64::*;");
        out.blank();
    }

    fn open_function(&self, out: &mut SourceFile, ident: &str, network: &str) {
        out.doc_comment(&format!("Sorts `arr` ascending with the `{network}` network."));
        out.line("#[cfg(target_arch = \"x86_64\")]");
        out.line(&format!("pub fn {ident}(arr: &mut [f32; 8]) {{"));
        out.indent();
        out.comment("SAFETY: SSE is baseline on x86_64; both 4-lane halves of `arr` are in bounds.");
        out.line("unsafe {");
        out.indent();
        out.line(&self.binding(0, "_mm_loadu_ps(arr.as_ptr())"));
        out.line(&self.binding(1, "_mm_loadu_ps(arr.as_ptr().add(4))"));
    }

    fn close_function(&self, out: &mut SourceFile, [lo, hi]: [usize; 2]) {
        out.line(&format!("_mm_storeu_ps(arr.as_mut_ptr(), r{lo});"));
        out.line(&format!("_mm_storeu_ps(arr.as_mut_ptr().add(4), r{hi});"));
        out.dedent();
        out.line("}");
        out.dedent();
        out.line("}");
    }

    fn shuffle_immediate(&self, mask: ShuffleMask) -> String {
        let [lo0, lo1, hi0, hi1] = mask.selects();
        format!("0b{hi1:02b}_{hi0:02b}_{lo1:02b}_{lo0:02b}")
    }

    fn binding(&self, dst: usize, expr: &str) -> String {
        format!("let r{dst} = {expr};")
    }
}

/// C++ with `<xmmintrin.h>`, sorting a `std::array<float, 8>&`.
#[derive(Debug, Clone, Copy, Default)]
pub struct CppSse;

impl Dialect for CppSse {
    fn name(&self) -> &'static str {
        "cpp"
    }

    fn extension(&self) -> &'static str {
        "cc"
    }

    fn prelude(&self, out: &mut SourceFile) {
        out.comment(GENERATED_NOTICE);
        out.blank();
        out.line("#include <array>");
        out.line("#include <xmmintrin.h>");
        out.blank();
    }

    fn open_function(&self, out: &mut SourceFile, ident: &str, _network: &str) {
        out.line(&format!("void {ident}(std::array<float, 8>& arr)"));
        out.line("{");
        out.indent();
        out.line(&self.binding(0, "_mm_loadu_ps(arr.data())"));
        out.line(&self.binding(1, "_mm_loadu_ps(arr.data() + 4)"));
    }

    fn close_function(&self, out: &mut SourceFile, [lo, hi]: [usize; 2]) {
        out.line(&format!("_mm_storeu_ps(arr.data(), r{lo});"));
        out.line(&format!("_mm_storeu_ps(arr.data() + 4, r{hi});"));
        out.dedent();
        out.line("}");
    }

    fn shuffle_immediate(&self, mask: ShuffleMask) -> String {
        let [lo0, lo1, hi0, hi1] = mask.selects();
        format!("_MM_SHUFFLE({hi1}, {hi0}, {lo1}, {lo0})")
    }

    fn binding(&self, dst: usize, expr: &str) -> String {
        format!("const __m128 r{dst} = {expr};")
    }
}

/// Selectable output language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// [`RustSse`].
    Rust,
    /// [`CppSse`].
    Cpp,
}

static RUST_SSE: RustSse = RustSse;
static CPP_SSE: CppSse = CppSse;

impl Target {
    /// The dialect implementing this target.
    pub fn dialect(self) -> &'static dyn Dialect {
        match self {
            Target::Rust => &RUST_SSE,
            Target::Cpp => &CPP_SSE,
        }
    }

    /// Guesses the target from an output file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "rs" => Some(Target::Rust),
            "cc" | "cpp" | "cxx" | "h" | "hpp" => Some(Target::Cpp),
            _ => None,
        }
    }
}
