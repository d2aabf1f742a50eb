//! Reference genome access.
//!
//! Coordinates are 0-based and ranges inclusive on both ends; a range never
//! crosses a chromosome boundary.

use crate::core::error::MapError;
use crate::core::io::FastaReader;
use crate::core::sequence::normalize_sequence;
use std::path::Path;

/// Read-only access to chromosome sequences.
pub trait GenomeAccessor: Send + Sync {
    fn num_chromosomes(&self) -> usize;

    fn chromosome_len(&self, chromosome: usize) -> u64;

    fn chromosome_name(&self, chromosome: usize) -> &str;

    /// Bases `start..=end` of a chromosome. `end` is clamped to the last base;
    /// a range starting past the end is an error.
    fn read_sequence(&self, chromosome: usize, start: u64, end: u64) -> Result<Vec<u8>, MapError>;

    /// Like [`GenomeAccessor::read_sequence`] but refusing windows longer than `max_len`.
    fn read_window(
        &self,
        chromosome: usize,
        start: u64,
        end: u64,
        max_len: usize,
    ) -> Result<Vec<u8>, MapError> {
        if end >= start {
            let len = (end - start + 1) as usize;
            if len > max_len {
                return Err(MapError::IntervalTooLarge { len, max: max_len });
            }
        }
        self.read_sequence(chromosome, start, end)
    }
}

/// In-memory genome holding uppercase chromosome sequences.
#[derive(Debug, Clone, Default)]
pub struct ReferenceGenome {
    names: Vec<String>,
    sequences: Vec<Vec<u8>>,
}

impl ReferenceGenome {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_chromosome(&mut self, name: impl Into<String>, sequence: &[u8]) {
        self.names.push(name.into());
        self.sequences.push(normalize_sequence(sequence));
    }

    /// Load every record of a FASTA file as a chromosome.
    pub fn from_fasta(path: &Path) -> Result<Self, MapError> {
        let mut genome = Self::new();
        for record in FastaReader::new(path)? {
            let record = record?;
            log::debug!("Loaded {} ({} bp)", record.name, record.seq.len());
            genome.add_chromosome(record.name, &record.seq);
        }
        if genome.names.is_empty() {
            return Err(MapError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("{}: no FASTA records", path.display()),
            )));
        }
        Ok(genome)
    }

    pub fn sequences(&self) -> &[Vec<u8>] {
        &self.sequences
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn total_len(&self) -> u64 {
        self.sequences.iter().map(|s| s.len() as u64).sum()
    }

    fn chromosome(&self, chromosome: usize) -> Result<&[u8], MapError> {
        self.sequences
            .get(chromosome)
            .map(Vec::as_slice)
            .ok_or(MapError::ChromosomeOutOfRange {
                chromosome,
                count: self.sequences.len(),
            })
    }
}

impl GenomeAccessor for ReferenceGenome {
    fn num_chromosomes(&self) -> usize {
        self.sequences.len()
    }

    fn chromosome_len(&self, chromosome: usize) -> u64 {
        self.sequences
            .get(chromosome)
            .map(|s| s.len() as u64)
            .unwrap_or(0)
    }

    fn chromosome_name(&self, chromosome: usize) -> &str {
        self.names.get(chromosome).map(String::as_str).unwrap_or("*")
    }

    fn read_sequence(&self, chromosome: usize, start: u64, end: u64) -> Result<Vec<u8>, MapError> {
        let seq = self.chromosome(chromosome)?;
        let len = seq.len() as u64;
        if start >= len || start > end {
            return Err(MapError::GenomeRangeOutOfBounds {
                chromosome,
                start,
                end,
                len,
            });
        }
        let end = end.min(len - 1);
        Ok(seq[start as usize..=end as usize].to_vec())
    }
}
