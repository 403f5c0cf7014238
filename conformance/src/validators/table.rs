//! Shuffle-table validators.
//!
//! Each check compares the BFS table against something that does not share
//! its code path: the closure fixed point, iterative deepening, a second
//! build, or a JSON round trip.

use anyhow::{Context, Result};
use sortgen::verify::{count_members, membership_difference, reachable_closure, shortest_length};
use sortgen::{LaneKey, LaneVector, SequenceTable, TableSnapshot, KEY_SPACE};

use crate::report::{ConformanceReport, TestResult};

const MAX_DETAILS: usize = 8;

/// Runs every table check.
///
/// # Errors
///
/// Returns an error if the snapshot cannot be serialized or parsed.
pub fn validate(table: &SequenceTable) -> Result<ConformanceReport> {
    let mut report = ConformanceReport::new();
    report.push(completeness(table));
    report.push(replay(table));
    report.push(minimality(table));
    report.push(determinism(table));
    report.push(snapshot(table)?);
    Ok(report)
}

/// Sealed keys plus seeds equal the closure of the seeds.
pub fn completeness(table: &SequenceTable) -> TestResult {
    let closure = reachable_closure();
    let sealed: Vec<bool> = LaneKey::all()
        .map(|k| table.is_reachable(k.decode()))
        .collect();
    let diff = membership_difference(&closure, &sealed);
    TestResult::check(
        "table/completeness",
        diff.is_empty(),
        format!(
            "{} of {KEY_SPACE} keys reachable, table covers {}",
            count_members(&closure),
            count_members(&sealed)
        ),
        diff.iter()
            .take(MAX_DETAILS)
            .map(|k| format!("{} ({k})", k.decode()))
            .collect(),
    )
}

/// Every entry replays from the seeds to the vector its key encodes.
pub fn replay(table: &SequenceTable) -> TestResult {
    let bad: Vec<String> = table
        .iter()
        .filter_map(|(key, seq)| match seq.evaluate(LaneVector::SEEDS) {
            Ok(v) if v == key.decode() => None,
            Ok(v) => Some(format!("{key}: expected {}, got {v}", key.decode())),
            Err(e) => Some(format!("{key}: {e}")),
        })
        .collect();
    TestResult::check(
        "table/replay",
        bad.is_empty(),
        format!("{} sequences replayed", table.len()),
        bad.into_iter().take(MAX_DETAILS).collect(),
    )
}

/// No entry has a shorter sequence under brute force.
pub fn minimality(table: &SequenceTable) -> TestResult {
    let bad: Vec<String> = table
        .iter()
        .filter_map(|(key, seq)| {
            let shorter = shortest_length(key.decode(), seq.len().saturating_sub(1))?;
            Some(format!(
                "{}: stored {} instructions, {shorter} suffice",
                key.decode(),
                seq.len()
            ))
        })
        .collect();
    TestResult::check(
        "table/minimality",
        bad.is_empty(),
        format!("{} entries checked against iterative deepening", table.len()),
        bad.into_iter().take(MAX_DETAILS).collect(),
    )
}

/// A second build is identical.
pub fn determinism(table: &SequenceTable) -> TestResult {
    let again = SequenceTable::build();
    let differing: Vec<String> = LaneKey::all()
        .filter(|&k| table.get(k) != again.get(k))
        .take(MAX_DETAILS)
        .map(|k| k.decode().to_string())
        .collect();
    TestResult::check(
        "table/determinism",
        differing.is_empty(),
        "rebuild matches entry for entry",
        differing,
    )
}

/// The table survives a JSON round trip through its snapshot.
///
/// # Errors
///
/// Returns an error if serialization or parsing fails.
pub fn snapshot(table: &SequenceTable) -> Result<TestResult> {
    let json = serde_json::to_string(&table.snapshot()).context("Failed to serialize snapshot")?;
    let parsed: TableSnapshot =
        serde_json::from_str(&json).context("Failed to parse serialized snapshot")?;
    let result = match SequenceTable::from_snapshot(parsed) {
        Ok(restored) if &restored == table => TestResult::pass(
            "table/snapshot",
            format!("snapshot round trip ({} bytes)", json.len()),
        ),
        Ok(_) => TestResult::check("table/snapshot", false, "restored table differs", vec![]),
        Err(e) => TestResult::check(
            "table/snapshot",
            false,
            "snapshot rejected on reload",
            vec![e.to_string()],
        ),
    };
    Ok(result)
}
