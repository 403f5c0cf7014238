//! Compiles the builtin networks and writes `$OUT_DIR/sorters.rs`.

use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};
use sortgen::network::builtin;
use sortgen::{Compiler, SequenceTable};
use sortgen_codegen::{generate_file, RustSse};

fn main() -> Result<()> {
    println!("cargo:rerun-if-changed=build.rs");

    let out_dir = env::var_os("OUT_DIR").context("OUT_DIR is not set")?;
    let out = PathBuf::from(out_dir).join("sorters.rs");

    let table = SequenceTable::build();
    let compiler = Compiler::new(&table);
    let programs = builtin()
        .iter()
        .map(|n| {
            compiler
                .compile(n)
                .with_context(|| format!("Failed to compile network `{}`", n.name()))
        })
        .collect::<Result<Vec<_>>>()?;

    generate_file(&programs, &RustSse, &out)?;
    Ok(())
}
