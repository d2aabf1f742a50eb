//! Store of splice junctions discovered from reads.
//!
//! Each junction is a start/end node pair keyed by chromosome, strand and
//! intron coordinates. Re-discovering a junction bumps its read support
//! instead of creating a new entry.

use crate::pipelines::spliced::read::Strand;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Mutex;

pub type JunctionId = usize;

/// Canonical splice-site dinucleotide pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SpliceType {
    /// GT donor, AG acceptor.
    GtAg,
    /// CT...AC, the reverse complement of GT...AG.
    CtAc,
}

impl fmt::Display for SpliceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpliceType::GtAg => write!(f, "GT-AG"),
            SpliceType::CtAc => write!(f, "CT-AC"),
        }
    }
}

/// Snapshot of one stored junction. `start..=end` is the intron.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Junction {
    pub id: JunctionId,
    pub chromosome: usize,
    pub strand: Strand,
    pub start: u64,
    pub end: u64,
    pub splice_type: SpliceType,
    pub support: u32,
}

impl Junction {
    pub fn intron_len(&self) -> u64 {
        self.end - self.start + 1
    }
}

type JunctionKey = (usize, Strand, u64, u64);

#[derive(Default)]
struct JunctionTable {
    entries: BTreeMap<JunctionKey, Junction>,
    next_id: JunctionId,
}

#[derive(Default)]
pub struct JunctionStore {
    table: Mutex<JunctionTable>,
}

impl JunctionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a junction, or add one read of support to an existing one.
    /// Returns the junction id.
    pub fn allocate_node(
        &self,
        chromosome: usize,
        strand: Strand,
        start: u64,
        end: u64,
        splice_type: SpliceType,
    ) -> JunctionId {
        let mut table = self.table.lock().unwrap_or_else(|e| e.into_inner());
        let key = (chromosome, strand, start, end);
        if let Some(existing) = table.entries.get_mut(&key) {
            existing.support += 1;
            return existing.id;
        }
        let id = table.next_id;
        table.next_id += 1;
        table.entries.insert(
            key,
            Junction {
                id,
                chromosome,
                strand,
                start,
                end,
                splice_type,
                support: 1,
            },
        );
        log::trace!(
            "New junction #{} chr{} {} {}-{} {}",
            id,
            chromosome,
            strand.symbol(),
            start,
            end,
            splice_type
        );
        id
    }

    /// All junctions ordered by chromosome, strand and position.
    pub fn junctions(&self) -> Vec<Junction> {
        let table = self.table.lock().unwrap_or_else(|e| e.into_inner());
        table.entries.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.table.lock().unwrap_or_else(|e| e.into_inner()).entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
