//! Shared plumbing for the sortgen binaries: table and network loading.

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs,
    clippy::missing_errors_doc
)]

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, ValueEnum};
use sortgen::network::builtin;
use sortgen::{SequenceTable, SortingNetwork, TableSnapshot};
use sortgen_codegen::Target;

/// Where the table and the networks come from.
#[derive(Debug, Args)]
pub struct Inputs {
    /// Load the shuffle table from a snapshot instead of searching.
    #[arg(long)]
    pub table: Option<PathBuf>,

    /// Network definition (JSON). Repeatable; defaults to the builtin networks.
    #[arg(long = "network", value_name = "FILE")]
    pub networks: Vec<PathBuf>,
}

impl Inputs {
    /// Builds or loads the table.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be read, parsed, or replayed.
    pub fn table(&self) -> Result<SequenceTable> {
        match &self.table {
            Some(path) => load_table(path),
            None => Ok(SequenceTable::build()),
        }
    }

    /// Loads the requested networks, or the builtins when none are given.
    ///
    /// # Errors
    ///
    /// Returns an error if a file cannot be read or does not describe a
    /// valid network.
    pub fn networks(&self) -> Result<Vec<SortingNetwork>> {
        if self.networks.is_empty() {
            return Ok(builtin());
        }
        self.networks.iter().map(|p| load_network(p)).collect()
    }
}

/// Reads a table snapshot and replays every entry.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, or an entry fails
/// to replay.
pub fn load_table(path: &Path) -> Result<SequenceTable> {
    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let snapshot: TableSnapshot = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse {} as a table snapshot", path.display()))?;
    let table = SequenceTable::from_snapshot(snapshot)
        .with_context(|| format!("Invalid table snapshot {}", path.display()))?;
    log::info!("loaded {} sequences from {}", table.len(), path.display());
    Ok(table)
}

/// Reads one network definition.
///
/// # Errors
///
/// Returns an error if the file cannot be read or does not describe a valid
/// network.
pub fn load_network(path: &Path) -> Result<SortingNetwork> {
    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse network {}", path.display()))
}

/// Output language on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DialectArg {
    /// Rust with `core::arch::x86_64`.
    Rust,
    /// C++ with `<xmmintrin.h>`.
    Cpp,
}

impl From<DialectArg> for Target {
    fn from(arg: DialectArg) -> Self {
        match arg {
            DialectArg::Rust => Target::Rust,
            DialectArg::Cpp => Target::Cpp,
        }
    }
}

/// Picks the target from an explicit flag, else from the output extension.
///
/// # Errors
///
/// Returns an error if neither names a known target.
pub fn resolve_target(flag: Option<DialectArg>, out: &Path) -> Result<Target> {
    if let Some(flag) = flag {
        return Ok(flag.into());
    }
    let ext = out.extension().and_then(|e| e.to_str()).unwrap_or_default();
    match Target::from_extension(ext) {
        Some(target) => Ok(target),
        None => bail!(
            "cannot infer dialect from {}; pass --dialect",
            out.display()
        ),
    }
}

/// Parses `a,b,c,d` into four lane identities.
///
/// # Errors
///
/// Returns an error unless the text is exactly four comma-separated
/// integers.
pub fn parse_lanes(text: &str) -> Result<[u8; 4]> {
    let parts = text
        .split(',')
        .map(|p| p.trim().parse::<u8>())
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("Invalid lane list `{text}`"))?;
    match <[u8; 4]>::try_from(parts) {
        Ok(lanes) => Ok(lanes),
        Err(v) => bail!("expected 4 lanes, got {}", v.len()),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn lanes_parse() {
        assert_eq!(parse_lanes("0,4, 1,5").unwrap(), [0, 4, 1, 5]);
        assert!(parse_lanes("0,4,1").is_err());
        assert!(parse_lanes("0,x,1,2").is_err());
    }

    #[test]
    fn target_resolution() {
        let out = Path::new("sorters.cc");
        assert_eq!(resolve_target(None, out).unwrap(), Target::Cpp);
        assert_eq!(
            resolve_target(Some(DialectArg::Rust), out).unwrap(),
            Target::Rust
        );
        assert!(resolve_target(None, Path::new("out.txt")).is_err());
    }

    #[test]
    fn network_file_loads() {
        let path = std::env::temp_dir().join(format!("sortgen-net-{}.json", std::process::id()));
        let json = serde_json::to_string(&sortgen::network::bitonic2()).unwrap();
        fs::write(&path, json).unwrap();
        let net = load_network(&path).unwrap();
        fs::remove_file(&path).unwrap();
        assert_eq!(net, sortgen::network::bitonic2());
    }
}
