use crate::core::io::ReadBatch;
use crate::core::sequence::{normalize_sequence, reverse_complement};

/// Genomic strand a read is mapped on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Strand {
    Forward,
    Reverse,
}

impl Strand {
    pub const BOTH: [Strand; 2] = [Strand::Forward, Strand::Reverse];

    #[inline]
    pub fn index(self) -> usize {
        match self {
            Strand::Forward => 0,
            Strand::Reverse => 1,
        }
    }

    pub fn symbol(self) -> char {
        match self {
            Strand::Forward => '+',
            Strand::Reverse => '-',
        }
    }
}

/// A read with its precomputed reverse complement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Read {
    pub id: String,
    pub sequence: Vec<u8>,
    pub revcomp: Vec<u8>,
    pub quality: Vec<u8>,
}

impl Read {
    /// Build a read; the sequence is uppercased and non-ACGT bases become N.
    pub fn new(id: impl Into<String>, sequence: &[u8], quality: &[u8]) -> Self {
        let sequence = normalize_sequence(sequence);
        let revcomp = reverse_complement(&sequence);
        Self {
            id: id.into(),
            sequence,
            revcomp,
            quality: quality.to_vec(),
        }
    }

    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    /// Sequence as seen from the given strand.
    pub fn oriented(&self, strand: Strand) -> &[u8] {
        match strand {
            Strand::Forward => &self.sequence,
            Strand::Reverse => &self.revcomp,
        }
    }

    pub fn from_batch(batch: &ReadBatch) -> Vec<Read> {
        batch
            .names
            .iter()
            .zip(&batch.seqs)
            .zip(&batch.quals)
            .map(|((name, seq), qual)| Read::new(name.as_str(), seq, qual))
            .collect()
    }
}
