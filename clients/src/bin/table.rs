//! `sortgen-table`: inspects the shuffle-sequence table.
//!
//! Prints the table statistics, optionally exports a snapshot, and dumps
//! the sequence for individual lane vectors.
//!
//! **Usage:**
//! ```
//! sortgen-table [--snapshot <file>] [--lanes a,b,c,d]... [--dialect rust|cpp] [--json]
//! ```

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs,
    clippy::missing_errors_doc
)]

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use sortgen::{Gather, LaneVector, SequenceTable};
use sortgen_clients::{load_table, parse_lanes, DialectArg};
use sortgen_codegen::{dump_sequence, Target};

/// Inspect the shortest-shuffle table.
#[derive(Parser)]
#[command(name = "sortgen-table", about = "Inspect the shuffle-sequence table")]
struct Args {
    /// Load an existing snapshot instead of searching.
    #[arg(long)]
    table: Option<PathBuf>,

    /// Write the table to this snapshot file.
    #[arg(long)]
    snapshot: Option<PathBuf>,

    /// Lane vector to dump, as `a,b,c,d`. Repeatable.
    #[arg(long = "lanes", value_name = "A,B,C,D")]
    lanes: Vec<String>,

    /// Dialect for dumped sequences.
    #[arg(long, value_enum, default_value = "rust")]
    dialect: DialectArg,

    /// Print statistics as JSON.
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let table = match &args.table {
        Some(path) => load_table(path)?,
        None => SequenceTable::build(),
    };

    let stats = table.stats();
    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&stats).context("Failed to serialize statistics")?
        );
    } else {
        println!(
            "Shuffle table: {} reachable keys, {} sequences",
            stats.reachable, stats.sealed
        );
        for (len, count) in &stats.by_length {
            println!("  length {len}: {count}");
        }
    }

    if let Some(path) = &args.snapshot {
        let json = serde_json::to_string(&table.snapshot())
            .context("Failed to serialize table snapshot")?;
        fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
        println!("  Written: {}", path.display());
    }

    let dialect = Target::from(args.dialect).dialect();
    for text in &args.lanes {
        let vector = LaneVector::new(parse_lanes(text)?)
            .with_context(|| format!("Invalid lane vector `{text}`"))?;
        println!();
        println!("{vector} (key {}):", vector.key());
        match table.gather(vector)? {
            Gather::Source(slot) => println!("  source register r{slot}, no instructions"),
            Gather::Sequence(seq) => {
                for line in dump_sequence(dialect, seq)?.lines() {
                    println!("  {line}");
                }
            }
        }
    }
    Ok(())
}
