//! Metaexon cache: exon intervals discovered while mapping, per strand and
//! chromosome, with the splice junctions seen at their ends.
//!
//! Each chromosome has its own `Mutex`; callers hold it only for a single
//! insert or search, never across an alignment.

use super::junctions::JunctionId;
use crate::pipelines::spliced::read::Strand;
use std::sync::Mutex;

/// Which end of the exon a junction sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetaexonSide {
    /// Acceptor side: the exon starts right after an intron.
    LeftEnd,
    /// Donor side: the exon ends right before an intron.
    RightEnd,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metaexon {
    pub start: u64,
    pub end: u64,
    pub left_junctions: Vec<JunctionId>,
    pub right_junctions: Vec<JunctionId>,
}

impl Metaexon {
    fn overlaps(&self, start: u64, end: u64) -> bool {
        self.start <= end && start <= self.end
    }

    fn add_junction(&mut self, side: MetaexonSide, junction: JunctionId) {
        let list = match side {
            MetaexonSide::LeftEnd => &mut self.left_junctions,
            MetaexonSide::RightEnd => &mut self.right_junctions,
        };
        if !list.contains(&junction) {
            list.push(junction);
        }
    }
}

pub struct MetaexonCache {
    // [strand][chromosome], each list sorted by start and non-overlapping
    strands: [Vec<Mutex<Vec<Metaexon>>>; 2],
}

impl MetaexonCache {
    pub fn new(num_chromosomes: usize) -> Self {
        let make = || -> Vec<Mutex<Vec<Metaexon>>> {
            (0..num_chromosomes).map(|_| Mutex::new(Vec::new())).collect()
        };
        Self {
            strands: [make(), make()],
        }
    }

    fn bucket(&self, strand: Strand, chromosome: usize) -> Option<&Mutex<Vec<Metaexon>>> {
        self.strands[strand.index()].get(chromosome)
    }

    /// Record an exon ending (or starting) at a junction.
    ///
    /// An interval shorter than `min_size` is widened away from the junction
    /// side to `min_size`. Overlapping metaexons are merged into one that
    /// keeps all their junctions.
    #[allow(clippy::too_many_arguments)]
    pub fn insert(
        &self,
        strand: Strand,
        chromosome: usize,
        start: u64,
        end: u64,
        min_size: u64,
        side: MetaexonSide,
        junction: JunctionId,
    ) {
        let Some(bucket) = self.bucket(strand, chromosome) else {
            log::warn!("Metaexon insert on unknown chromosome {}", chromosome);
            return;
        };
        let (mut start, mut end) = if start <= end { (start, end) } else { (end, start) };
        if end - start + 1 < min_size {
            match side {
                MetaexonSide::RightEnd => start = (end + 1).saturating_sub(min_size),
                MetaexonSide::LeftEnd => end = start + min_size - 1,
            }
        }

        let mut exons = bucket.lock().unwrap_or_else(|e| e.into_inner());

        let mut merged = Metaexon {
            start,
            end,
            left_junctions: Vec::new(),
            right_junctions: Vec::new(),
        };
        merged.add_junction(side, junction);

        let first = exons.partition_point(|m| m.end < start);
        let mut last = first;
        while last < exons.len() && exons[last].overlaps(start, end) {
            last += 1;
        }
        for old in exons.drain(first..last) {
            merged.start = merged.start.min(old.start);
            merged.end = merged.end.max(old.end);
            for j in old.left_junctions {
                merged.add_junction(MetaexonSide::LeftEnd, j);
            }
            for j in old.right_junctions {
                merged.add_junction(MetaexonSide::RightEnd, j);
            }
        }
        exons.insert(first, merged);
    }

    /// First metaexon overlapping `start..=end`.
    pub fn search(&self, strand: Strand, chromosome: usize, start: u64, end: u64) -> Option<Metaexon> {
        let bucket = self.bucket(strand, chromosome)?;
        let exons = bucket.lock().unwrap_or_else(|e| e.into_inner());
        let idx = exons.partition_point(|m| m.end < start);
        exons
            .get(idx)
            .filter(|m| m.overlaps(start, end))
            .cloned()
    }

    pub fn len(&self, strand: Strand, chromosome: usize) -> usize {
        self.bucket(strand, chromosome)
            .map(|b| b.lock().unwrap_or_else(|e| e.into_inner()).len())
            .unwrap_or(0)
    }
}
