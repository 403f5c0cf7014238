//! Shortest shuffle sequences for 4-lane registers, and a sorting-network
//! compiler built on them.
//!
//! Two 4-wide registers hold eight inputs. The crate answers one question
//! offline: for every way of arranging four of those inputs into one
//! register, what is the shortest sequence of SSE-style permutes producing
//! it? It then uses the answers to lower 8-wire sorting networks to
//! straight-line min/max code.
//!
//! # Pipeline
//!
//! ```text
//! lane     LaneVector / LaneKey           provenance model, 4096-key universe
//! isa      Opcode / Instruction           five permutes, 260 variants
//! search   SequenceTable::build()         BFS, one minimal Sequence per key
//! network  SortingNetwork / Round         compare-exchange rounds
//! compiler Compiler::compile()            network -> Program (gathers + min/max)
//! executor Program::sort()                scalar reference interpreter
//! verify   closure / IDDFS / 8! harness   oracles independent of the BFS
//! ```
//!
//! Text emission for concrete targets lives in `sortgen-codegen`.
//!
//! # Example
//!
//! ```
//! use sortgen::{Compiler, SequenceTable};
//! use sortgen::network::bitonic2;
//!
//! let table = SequenceTable::build();
//! let program = Compiler::new(&table).compile(&bitonic2())?;
//!
//! let mut data = [7, 6, 5, 4, 3, 2, 1, 0];
//! program.sort(&mut data);
//! assert_eq!(data, [0, 1, 2, 3, 4, 5, 6, 7]);
//! # Ok::<(), sortgen::SynthError>(())
//! ```
//!
//! The table is a plain value: build it once and pass it by reference.

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs,
    clippy::missing_errors_doc
)]

pub mod compiler;
pub mod error;
pub mod executor;
pub mod isa;
pub mod lane;
pub mod network;
pub mod search;
pub mod verify;

pub use compiler::{Compilation, Compiler, Program, Step, VReg, WireMap};
pub use error::{Result, SynthError};
pub use executor::LaneExecutor;
pub use isa::{Instruction, Opcode, ShuffleMask, CANDIDATES, CANDIDATE_COUNT};
pub use lane::{encode, LaneKey, LaneVector, INPUTS, KEY_SPACE, LANES};
pub use network::{Comparator, Round, SortingNetwork, Wire};
pub use search::{Gather, SearchStats, Sequence, SequenceTable, TableSnapshot};
