//! Breadth-first search for the shortest shuffle sequence per lane vector.
//!
//! Starting from the two seed registers, every state is expanded by applying
//! each of the [`CANDIDATE_COUNT`](crate::isa::CANDIDATE_COUNT) opcode
//! variants to every ordered pair `(i, j)` of registers the state holds,
//! `i == j` included. The first time a [`LaneKey`] is produced it is sealed
//! with the sequence that produced it; because states leave the queue in
//! order of sequence length, that sequence is minimal.
//!
//! Both operand orders are explored. Most of the permutes are not symmetric,
//! so `(i, j)` and `(j, i)` reach different vectors.
//!
//! The table is a dense array indexed by key, built once and read-only
//! afterwards.
//!
//! ```
//! use sortgen::lane::LaneVector;
//! use sortgen::search::SequenceTable;
//!
//! let table = SequenceTable::build();
//! let target = LaneVector::new([0, 4, 1, 5]).unwrap();
//! let seq = table.lookup(target).unwrap();
//! assert_eq!(seq.len(), 1);
//! assert_eq!(seq.evaluate(LaneVector::SEEDS).unwrap(), target);
//! ```

use std::collections::{BTreeMap, VecDeque};

use serde::{Deserialize, Serialize};

use crate::error::{Result, SynthError};
use crate::isa::{Instruction, Opcode};
use crate::lane::{LaneKey, LaneVector, KEY_SPACE, LANES};
use crate::verify::shortest_length;

/// Minimal instruction list producing one lane vector from the two sources.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Sequence(Vec<Instruction>);

impl Sequence {
    /// Wraps an instruction list.
    pub fn new(instructions: Vec<Instruction>) -> Self {
        Self(instructions)
    }

    /// The instructions, in execution order.
    pub fn instructions(&self) -> &[Instruction] {
        &self.0
    }

    /// Number of instructions.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True for the zero-instruction sequence.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Runs the sequence over any lane type and returns the whole register
    /// frame: the two sources followed by one result per instruction.
    ///
    /// # Errors
    ///
    /// Returns [`SynthError::DanglingOperand`] if an instruction reads a
    /// register that has not been produced yet.
    pub fn run<T: Copy>(&self, sources: [[T; LANES]; 2]) -> Result<Vec<[T; LANES]>> {
        let mut frame = Vec::with_capacity(sources.len() + self.0.len());
        frame.extend(sources);
        for (index, insn) in self.0.iter().enumerate() {
            let a = read_operand(&frame, index, insn.a)?;
            let b = read_operand(&frame, index, insn.b)?;
            frame.push(insn.opcode.apply(a, b));
        }
        Ok(frame)
    }

    /// Each instruction paired with the lane vector it produces.
    ///
    /// # Errors
    ///
    /// Same as [`Sequence::run`].
    pub fn trace(&self, sources: [LaneVector; 2]) -> Result<Vec<(Instruction, LaneVector)>> {
        let frame = self.run(sources.map(|s| s.lanes()))?;
        Ok(self
            .0
            .iter()
            .zip(&frame[sources.len()..])
            .map(|(insn, lanes)| (*insn, LaneVector::from_lanes(*lanes)))
            .collect())
    }

    /// Symbolically executes the sequence and returns its final register.
    ///
    /// # Errors
    ///
    /// Returns [`SynthError::EmptySequence`] for a sequence without
    /// instructions, otherwise the errors of [`Sequence::run`].
    pub fn evaluate(&self, sources: [LaneVector; 2]) -> Result<LaneVector> {
        if self.is_empty() {
            return Err(SynthError::EmptySequence);
        }
        let frame = self.run(sources.map(|s| s.lanes()))?;
        frame
            .last()
            .map(|lanes| LaneVector::from_lanes(*lanes))
            .ok_or(SynthError::EmptySequence)
    }
}

fn read_operand<T: Copy>(frame: &[[T; LANES]], index: usize, operand: u8) -> Result<[T; LANES]> {
    frame
        .get(usize::from(operand))
        .copied()
        .ok_or(SynthError::DanglingOperand {
            index,
            operand,
            available: frame.len(),
        })
}

/// How to obtain a lane vector from the two current source registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gather<'a> {
    /// The vector already is source register `0` or `1`; nothing to emit.
    Source(usize),
    /// Run this sequence.
    Sequence(&'a Sequence),
}

/// One BFS node: the registers produced along one path, and the path.
#[derive(Debug, Clone)]
struct SearchState {
    registers: Vec<LaneVector>,
    instructions: Vec<Instruction>,
}

impl SearchState {
    fn initial() -> Self {
        Self {
            registers: LaneVector::SEEDS.to_vec(),
            instructions: Vec::new(),
        }
    }

    fn depth(&self) -> usize {
        self.instructions.len()
    }

    fn extend(&self, insn: Instruction, result: LaneVector) -> Self {
        let mut next = self.clone();
        next.registers.push(result);
        next.instructions.push(insn);
        next
    }
}

/// Summary of a built table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchStats {
    /// Keys holding a sequence (seeds excluded).
    pub sealed: usize,
    /// Keys reachable at all, seeds included.
    pub reachable: usize,
    /// Sequence length -> number of keys.
    pub by_length: BTreeMap<usize, usize>,
    /// Longest stored sequence.
    pub longest: usize,
}

/// Dense map from [`LaneKey`] to its minimal [`Sequence`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceTable {
    entries: Box<[Option<Sequence>]>,
}

impl SequenceTable {
    /// Runs the breadth-first search and returns the finished table.
    ///
    /// Among equally short sequences the one found first under
    /// [`CANDIDATES`](crate::isa::CANDIDATES) order wins, so repeated builds
    /// are identical.
    pub fn build() -> Self {
        let mut entries: Vec<Option<Sequence>> = vec![None; KEY_SPACE];
        let mut seen = vec![false; KEY_SPACE];
        for seed in LaneVector::SEEDS {
            seen[seed.key().index()] = true;
        }
        let mut unsealed = KEY_SPACE - LaneVector::SEEDS.len();

        let mut queue = VecDeque::from([SearchState::initial()]);
        let mut layer = 0;

        'search: while let Some(state) = queue.pop_front() {
            if state.depth() > layer {
                layer = state.depth();
                log::debug!(
                    "search layer {layer}: {} keys sealed, {} states queued",
                    KEY_SPACE - LaneVector::SEEDS.len() - unsealed,
                    queue.len() + 1
                );
            }

            let width = state.registers.len();
            for i in 0..width {
                for j in 0..width {
                    let (a, b) = (state.registers[i], state.registers[j]);
                    for opcode in Opcode::candidates() {
                        let result = opcode.apply_lanes(a, b);
                        let key = result.key().index();
                        if seen[key] {
                            continue;
                        }
                        seen[key] = true;

                        let next = state.extend(Instruction::new(opcode, i as u8, j as u8), result);
                        entries[key] = Some(Sequence::new(next.instructions.clone()));
                        queue.push_back(next);

                        // Nothing left to seal: the remaining queue cannot
                        // change any entry.
                        unsealed -= 1;
                        if unsealed == 0 {
                            break 'search;
                        }
                    }
                }
            }
        }

        let table = Self {
            entries: entries.into_boxed_slice(),
        };
        log::info!(
            "shuffle search sealed {} keys, longest sequence {}",
            table.len(),
            table.stats().longest
        );
        table
    }

    /// Sequence stored for `key`, if the search sealed it.
    pub fn get(&self, key: LaneKey) -> Option<&Sequence> {
        self.entries.get(key.index()).and_then(Option::as_ref)
    }

    /// Sequence producing `target`.
    ///
    /// # Errors
    ///
    /// Returns [`SynthError::UnreachableKey`] if no sequence was sealed for
    /// the target (the seeds included: they need no sequence).
    pub fn lookup(&self, target: LaneVector) -> Result<&Sequence> {
        self.get(target.key()).ok_or(SynthError::UnreachableKey {
            vector: target,
            key: target.key(),
        })
    }

    /// Resolves `target` to either a source register or a sequence.
    ///
    /// # Errors
    ///
    /// Returns [`SynthError::UnreachableKey`] for a key the search never
    /// reached.
    pub fn gather(&self, target: LaneVector) -> Result<Gather<'_>> {
        match target.seed_slot() {
            Some(slot) => Ok(Gather::Source(slot)),
            None => self.lookup(target).map(Gather::Sequence),
        }
    }

    /// True if `target` is a seed or has a sequence.
    pub fn is_reachable(&self, target: LaneVector) -> bool {
        target.seed_slot().is_some() || self.get(target.key()).is_some()
    }

    /// Number of stored sequences.
    pub fn len(&self) -> usize {
        self.entries.iter().filter(|e| e.is_some()).count()
    }

    /// True if nothing was sealed.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Stored entries in ascending key order.
    pub fn iter(&self) -> impl Iterator<Item = (LaneKey, &Sequence)> {
        self.entries
            .iter()
            .enumerate()
            .filter_map(|(i, e)| e.as_ref().map(|s| (LaneKey::from_raw(i as u16), s)))
    }

    /// Size and length distribution of the table.
    pub fn stats(&self) -> SearchStats {
        let mut by_length = BTreeMap::new();
        for (_, seq) in self.iter() {
            *by_length.entry(seq.len()).or_insert(0) += 1;
        }
        let sealed: usize = by_length.values().sum();
        SearchStats {
            sealed,
            reachable: sealed + LaneVector::SEEDS.len(),
            longest: by_length.keys().next_back().copied().unwrap_or(0),
            by_length,
        }
    }

    /// Exports every entry for storage.
    pub fn snapshot(&self) -> TableSnapshot {
        TableSnapshot {
            entries: self
                .iter()
                .map(|(key, seq)| SnapshotEntry {
                    lanes: key.decode(),
                    sequence: seq.clone(),
                })
                .collect(),
        }
    }

    /// Rebuilds a table from a snapshot, replaying every entry.
    ///
    /// # Errors
    ///
    /// Fails on the first entry that names a seed or a key already loaded,
    /// has no instructions, reads a register that does not exist, does not
    /// produce the vector it is stored under, or is longer than a shortest
    /// sequence for that vector.
    pub fn from_snapshot(snapshot: TableSnapshot) -> Result<Self> {
        let mut entries: Vec<Option<Sequence>> = vec![None; KEY_SPACE];
        for entry in snapshot.entries {
            let slot = &mut entries[entry.lanes.key().index()];
            if entry.lanes.seed_slot().is_some() || slot.is_some() {
                return Err(SynthError::InvalidSnapshotEntry(entry.lanes));
            }
            let actual = entry.sequence.evaluate(LaneVector::SEEDS)?;
            if actual != entry.lanes {
                return Err(SynthError::SequenceMismatch {
                    expected: entry.lanes,
                    actual,
                });
            }
            // Every stored vector is reachable, so the deepening stops at
            // its true length.
            let stored = entry.sequence.len();
            if let Some(shortest) = shortest_length(entry.lanes, stored - 1) {
                return Err(SynthError::NonMinimalSequence {
                    vector: entry.lanes,
                    stored,
                    shortest,
                });
            }
            *slot = Some(entry.sequence);
        }
        Ok(Self {
            entries: entries.into_boxed_slice(),
        })
    }
}

/// Serializable form of a [`SequenceTable`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSnapshot {
    /// One entry per sealed key, ascending.
    pub entries: Vec<SnapshotEntry>,
}

/// One stored sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotEntry {
    /// Vector the sequence produces.
    pub lanes: LaneVector,
    /// The sequence.
    pub sequence: Sequence,
}
