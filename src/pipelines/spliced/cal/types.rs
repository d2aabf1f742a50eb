use crate::core::cigar::CigarCode;
use crate::pipelines::spliced::read::Strand;

/// An exactly matched read segment placed on the genome.
///
/// Read coordinates are 0-based inclusive offsets into the oriented read;
/// genome coordinates are 0-based inclusive chromosome offsets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedRegion {
    pub read_start: i32,
    pub read_end: i32,
    pub genome_start: u64,
    pub genome_end: u64,
    pub id: u32,
    /// CIGAR closing this segment, set during gap filling.
    pub fragment: Option<CigarCode>,
}

impl SeedRegion {
    pub fn new(read_start: i32, read_end: i32, genome_start: u64, genome_end: u64, id: u32) -> Self {
        Self {
            read_start,
            read_end,
            genome_start,
            genome_end,
            id,
            fragment: None,
        }
    }

    #[inline]
    pub fn read_len(&self) -> i32 {
        self.read_end - self.read_start + 1
    }

    #[inline]
    pub fn genome_len(&self) -> i64 {
        self.genome_end as i64 - self.genome_start as i64 + 1
    }

    /// `genome_start - read_start`; equal for seeds that need no gap between them.
    #[inline]
    pub fn diagonal(&self) -> i64 {
        self.genome_start as i64 - self.read_start as i64
    }

    /// A seed shrunk past its own length no longer covers anything.
    pub fn is_degenerate(&self) -> bool {
        self.read_end < self.read_start || self.genome_end < self.genome_start
    }

    /// Move the end back by `n` on both axes.
    pub fn shrink_end(&mut self, n: i32) {
        self.read_end -= n;
        self.genome_end = (self.genome_end as i64 - n as i64).max(0) as u64;
    }

    /// Move the start forward by `n` on both axes.
    pub fn shrink_start(&mut self, n: i32) {
        self.read_start += n;
        self.genome_start = (self.genome_start as i64 + n as i64).max(0) as u64;
    }

    /// Fragment for this seed: the computed one, or `M` over the read span.
    pub fn fragment_or_match(&self) -> CigarCode {
        match &self.fragment {
            Some(f) => f.clone(),
            None => CigarCode::from_op(b'M', self.read_len(), 0),
        }
    }
}

/// Candidate alignment location: seeds on one chromosome and strand that
/// are close enough to belong to the same alignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cal {
    pub chromosome: usize,
    pub strand: Strand,
    pub start: u64,
    pub end: u64,
    /// Kept in increasing `read_start` order.
    pub seeds: Vec<SeedRegion>,
}

impl Cal {
    pub fn new(chromosome: usize, strand: Strand, start: u64, end: u64) -> Self {
        Self {
            chromosome,
            strand,
            start,
            end,
            seeds: Vec::new(),
        }
    }

    pub fn first_seed(&self) -> Option<&SeedRegion> {
        self.seeds.first()
    }

    pub fn last_seed(&self) -> Option<&SeedRegion> {
        self.seeds.last()
    }

    /// Reset `start`/`end` to the genome span of the current seeds.
    pub fn settle_span(&mut self) {
        if let (Some(first), Some(last)) = (
            self.seeds.iter().map(|s| s.genome_start).min(),
            self.seeds.iter().map(|s| s.genome_end).max(),
        ) {
            self.start = first;
            self.end = last;
        }
    }

    /// Sum of `read_end - read_start` over the seeds; the merge-score numerator.
    pub fn read_coverage(&self) -> i64 {
        self.seeds
            .iter()
            .map(|s| (s.read_end - s.read_start) as i64)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shrink_both_axes() {
        let mut seed = SeedRegion::new(10, 40, 1010, 1040, 0);
        seed.shrink_end(8);
        seed.shrink_start(5);
        assert_eq!((seed.read_start, seed.read_end), (15, 32));
        assert_eq!((seed.genome_start, seed.genome_end), (1015, 1032));
        assert_eq!(seed.read_len(), 18);
        assert_eq!(seed.genome_len(), 18);
        assert!(!seed.is_degenerate());

        seed.shrink_end(20);
        assert!(seed.is_degenerate());
    }

    #[test]
    fn test_fragment_fallback() {
        let seed = SeedRegion::new(0, 49, 100, 149, 0);
        assert_eq!(seed.fragment_or_match().to_string(), "50M");
    }

    #[test]
    fn test_settle_span() {
        let mut cal = Cal::new(0, Strand::Forward, 0, 0);
        cal.seeds.push(SeedRegion::new(0, 9, 500, 509, 0));
        cal.seeds.push(SeedRegion::new(20, 29, 520, 529, 1));
        cal.settle_span();
        assert_eq!((cal.start, cal.end), (500, 529));
        assert_eq!(cal.read_coverage(), 18);
    }
}
