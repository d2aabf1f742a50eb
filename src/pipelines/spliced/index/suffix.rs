//! Suffix-array search over the whole genome.
//!
//! Chromosomes are concatenated with a `$` separator (also used as the final
//! sentinel) and the suffix array is built with `bio`'s SAIS implementation.
//! A pattern is matched one character at a time by narrowing the suffix-array
//! interval with two binary searches per step, which yields the longest
//! matching prefix and its occurrence interval in one pass.

use super::genome::ReferenceGenome;
use bio::data_structures::suffix_array::suffix_array;

const SEPARATOR: u8 = b'$';

/// Result of a suffix search. `low..=high` is the suffix-array interval of
/// the longest matched prefix; `count == 0` means no usable hit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SuffixHits {
    pub count: usize,
    pub low: usize,
    pub high: usize,
    pub matched_len: usize,
}

impl SuffixHits {
    pub fn is_hit(&self) -> bool {
        self.count > 0
    }
}

/// Prefix search against a genome index.
pub trait SuffixSearch: Send + Sync {
    /// Find the longest prefix of `pattern` present in the genome. The hit
    /// count is zero when the prefix is shorter than `k` or occurs more than
    /// `max_hits` times.
    fn search_suffix(&self, pattern: &[u8], k: usize, max_hits: usize) -> SuffixHits;

    /// Map a suffix-array index to `(chromosome, offset)`.
    fn locate(&self, sa_index: usize) -> (usize, u64);
}

/// In-memory suffix array over the concatenated genome.
pub struct SuffixArrayIndex {
    text: Vec<u8>,
    sa: Vec<usize>,
    chrom_starts: Vec<usize>,
}

impl SuffixArrayIndex {
    pub fn build(genome: &ReferenceGenome) -> Self {
        let total: usize = genome.sequences().iter().map(|s| s.len() + 1).sum();
        let mut text = Vec::with_capacity(total.max(1));
        let mut chrom_starts = Vec::with_capacity(genome.sequences().len());
        for seq in genome.sequences() {
            chrom_starts.push(text.len());
            text.extend_from_slice(seq);
            text.push(SEPARATOR);
        }
        if text.is_empty() {
            text.push(SEPARATOR);
        }

        log::info!("Building suffix array over {} bases", text.len());
        let sa = suffix_array(&text);
        log::debug!("Suffix array built: {} entries", sa.len());

        Self {
            text,
            sa,
            chrom_starts,
        }
    }

    pub fn len(&self) -> usize {
        self.sa.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sa.is_empty()
    }

    #[inline(always)]
    fn char_at(&self, pos: usize) -> u8 {
        self.text.get(pos).copied().unwrap_or(0)
    }
}

impl SuffixSearch for SuffixArrayIndex {
    fn search_suffix(&self, pattern: &[u8], k: usize, max_hits: usize) -> SuffixHits {
        let mut lo = 0usize;
        let mut hi = self.sa.len();
        let mut matched = 0usize;

        for (depth, &c) in pattern.iter().enumerate() {
            if c == SEPARATOR {
                break;
            }
            let window = &self.sa[lo..hi];
            let new_lo = lo + window.partition_point(|&p| self.char_at(p + depth) < c);
            let new_hi = lo + window.partition_point(|&p| self.char_at(p + depth) <= c);
            if new_lo == new_hi {
                break;
            }
            lo = new_lo;
            hi = new_hi;
            matched = depth + 1;
        }

        if matched == 0 {
            return SuffixHits::default();
        }

        let occurrences = hi - lo;
        let count = if matched < k || occurrences > max_hits {
            0
        } else {
            occurrences
        };
        SuffixHits {
            count,
            low: lo,
            high: hi - 1,
            matched_len: matched,
        }
    }

    fn locate(&self, sa_index: usize) -> (usize, u64) {
        let pos = self.sa[sa_index];
        let chrom = self.chrom_starts.partition_point(|&start| start <= pos) - 1;
        (chrom, (pos - self.chrom_starts[chrom]) as u64)
    }
}
