//! `sortgen-build`: compiles sorting networks to SSE sorters.
//!
//! Builds (or loads) the shuffle table, checks every network with the
//! zero-one principle, compiles it, and writes one source file holding a
//! sorter per network.
//!
//! **Usage:**
//! ```
//! sortgen-build --out <file> [--dialect rust|cpp] [--network <json>]... [--table <snapshot>]
//! ```

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs,
    clippy::missing_errors_doc
)]

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use sortgen::Compiler;
use sortgen_clients::{resolve_target, DialectArg, Inputs};
use sortgen_codegen::generate_file;

/// Generate branch-free SSE sorters for eight floats.
#[derive(Parser)]
#[command(name = "sortgen-build", about = "Generate SSE sorting functions")]
struct Args {
    /// Output source file.
    #[arg(long, default_value = "sorters.rs")]
    out: PathBuf,

    /// Output language (default: inferred from the --out extension).
    #[arg(long, value_enum)]
    dialect: Option<DialectArg>,

    /// Compile networks that fail the zero-one check anyway.
    #[arg(long)]
    allow_unsorted: bool,

    #[command(flatten)]
    inputs: Inputs,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let target = resolve_target(args.dialect, &args.out)?;
    let networks = args.inputs.networks()?;
    let table = args.inputs.table()?;
    let stats = table.stats();
    println!(
        "Shuffle table: {} sequences, longest {}",
        stats.sealed, stats.longest
    );

    for network in &networks {
        if !network.is_sorting_network() {
            if args.allow_unsorted {
                log::warn!("{} does not sort every input", network.name());
            } else {
                bail!(
                    "network `{}` fails the zero-one check; pass --allow-unsorted to compile it anyway",
                    network.name()
                );
            }
        }
    }

    let compiler = Compiler::new(&table);
    let programs = networks
        .iter()
        .map(|n| {
            compiler
                .compile(n)
                .with_context(|| format!("Failed to compile network `{}`", n.name()))
        })
        .collect::<Result<Vec<_>>>()?;

    let report = generate_file(&programs, target.dialect(), &args.out)?;
    for f in &report.functions {
        println!(
            "  {}: {} shuffles, {} min/max, {} registers",
            f.ident, f.permutes, f.compares, f.registers
        );
    }
    println!(
        "  Written: {} ({}, {} bytes)",
        args.out.display(),
        report.dialect,
        report.bytes
    );
    Ok(())
}
