//! `sortgen-conformance`: validates the shuffle table and the compiled
//! networks against independent oracles.
//!
//! Runs the complete conformance suite across:
//! - Shuffle table (closure, replay, minimality, determinism, snapshot)
//! - Sorting networks (zero-one precondition, all 8! permutations, scenarios)
//! - Generated code (statement coverage per dialect, register pressure)
//!
//! **Usage:**
//! ```
//! sortgen-conformance [--network <json>]... [--table <snapshot>] [--json]
//! ```
//!
//! Exits non-zero if any conformance check fails.

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs,
    clippy::missing_errors_doc
)]

use std::process;

use anyhow::{Context, Result};
use clap::Parser;
use sortgen_clients::Inputs;
use sortgen_conformance::{run_all, Severity, Suite};

/// Run the sortgen conformance suite.
#[derive(Parser)]
#[command(
    name = "sortgen-conformance",
    about = "Validate the shuffle table and compiled sorting networks"
)]
struct Args {
    /// Print the report as JSON.
    #[arg(long)]
    json: bool,

    #[command(flatten)]
    inputs: Inputs,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let table = args.inputs.table()?;
    let networks = args.inputs.networks()?;
    let report = run_all(&Suite {
        table: &table,
        networks: &networks,
    })?;

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("Failed to serialize report")?
        );
    } else {
        println!("sortgen Conformance Report");
        println!("==========================");
        println!();

        for result in &report.results {
            println!(
                "[{}] {}: {}",
                result.severity.label(),
                result.validator,
                result.message
            );
            for detail in &result.details {
                println!("       {}", detail);
            }
        }

        println!();
        println!(
            "Summary: {} passed, {} warnings, {} failed",
            report.count(Severity::Pass),
            report.warning_count(),
            report.failure_count()
        );
    }

    if !report.all_passed() {
        eprintln!(
            "Conformance FAILED: {} check(s) did not pass.",
            report.failure_count()
        );
        process::exit(1);
    }

    if !args.json {
        println!("Conformance PASSED.");
    }
    Ok(())
}
