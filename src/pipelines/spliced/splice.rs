//! Canonical splice-junction search between two seeds.
//!
//! The seeds are pulled back from the gap, the genome right after the left
//! seed and right before the right seed is scanned for donor (`GT`/`CT`) and
//! acceptor (`AG`/`AC`) dinucleotides, and every motif pair whose implied
//! exonic length fits the read gap is scored by aligning the read gap against
//! the two exon pieces joined together. The best pair gives the junction.

use super::cal::SeedRegion;
use super::index::{GenomeAccessor, JunctionId, JunctionStore, MetaexonCache, MetaexonSide, SpliceType};
use super::read::Strand;
use crate::core::alignment::{generate_fragment, AlignmentKernel, SwItemKind};
use crate::core::cigar::CigarCode;
use crate::core::error::MapError;
use crate::defaults::{SECURITY_FLANK, SEMI_CANONICAL_FLANK, SPLICE_FLANK, SPLICE_LENGTH_TOLERANCE};

/// A resolved intron and the fragment covering the read gap across it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpliceJunction {
    /// First intronic base.
    pub start: u64,
    /// Last intronic base.
    pub end: u64,
    pub splice_type: SpliceType,
    /// Covers the read between the two (pulled back) seeds, `N` included.
    pub fragment: CigarCode,
}

impl SpliceJunction {
    pub fn intron_len(&self) -> u64 {
        self.end - self.start + 1
    }

    /// Record the junction and the exons on both of its sides.
    #[allow(clippy::too_many_arguments)]
    pub fn register(
        &self,
        chromosome: usize,
        strand: Strand,
        left_exon_start: u64,
        right_exon_end: u64,
        min_exon_size: u64,
        junctions: &JunctionStore,
        metaexons: &MetaexonCache,
    ) -> JunctionId {
        let id = junctions.allocate_node(chromosome, strand, self.start, self.end, self.splice_type);
        metaexons.insert(
            strand,
            chromosome,
            left_exon_start,
            self.start.saturating_sub(1),
            min_exon_size,
            MetaexonSide::RightEnd,
            id,
        );
        metaexons.insert(
            strand,
            chromosome,
            self.end + 1,
            right_exon_end,
            min_exon_size,
            MetaexonSide::LeftEnd,
            id,
        );
        id
    }
}

/// Everything the search needs besides the two seeds.
pub struct SpliceContext<'a> {
    pub genome: &'a dyn GenomeAccessor,
    pub kernel: &'a dyn AlignmentKernel,
    pub max_window: usize,
}

#[inline]
fn read_gap(prev: &SeedRegion, next: &SeedRegion) -> i64 {
    next.read_start as i64 - prev.read_end as i64 - 1
}

/// Donor motifs at the start of the window, as offsets from the window start.
fn scan_donors(window: &[u8], steps: usize) -> Vec<(usize, SpliceType)> {
    let mut found = Vec::new();
    for c in 0..steps.min(window.len().saturating_sub(1)) {
        match (window[c], window[c + 1]) {
            (b'G', b'T') => found.push((c, SpliceType::GtAg)),
            (b'C', b'T') => found.push((c, SpliceType::CtAc)),
            _ => {}
        }
    }
    found
}

/// Acceptor motifs at the end of the window, as distances from the window end.
fn scan_acceptors(window: &[u8], steps: usize) -> Vec<(usize, SpliceType)> {
    let mut found = Vec::new();
    let len = window.len();
    for dsp in 0..steps.min(len.saturating_sub(1)) {
        let c = len - 1 - dsp;
        match (window[c - 1], window[c]) {
            (b'A', b'G') => found.push((dsp, SpliceType::GtAg)),
            (b'A', b'C') => found.push((dsp, SpliceType::CtAc)),
            _ => {}
        }
    }
    found
}

fn left_window(ctx: &SpliceContext, chromosome: usize, prev: &SeedRegion, gap: i64) -> Result<Vec<u8>, MapError> {
    let start = prev.genome_end + 1;
    let end = prev.genome_end + (gap + SPLICE_FLANK) as u64;
    ctx.genome.read_window(chromosome, start, end, ctx.max_window)
}

fn right_window(ctx: &SpliceContext, chromosome: usize, next: &SeedRegion, gap: i64) -> Result<Vec<u8>, MapError> {
    let start = next.genome_start.saturating_sub((gap + SPLICE_FLANK) as u64);
    ctx.genome.read_window(chromosome, start, next.genome_start - 1, ctx.max_window)
}

/// Search a canonical junction between `prev` and `next`.
///
/// Both seeds are pulled back from the gap (and further when a side has no
/// motif in the first window); they are left that way even when nothing is
/// found, so callers that need the original seeds must keep a copy.
pub fn search_splice_junction(
    prev: &mut SeedRegion,
    next: &mut SeedRegion,
    chromosome: usize,
    query: &[u8],
    ctx: &SpliceContext,
) -> Result<Option<SpliceJunction>, MapError> {
    let mut gap = read_gap(prev, next);
    if gap == 0 {
        gap = -1;
    }
    let pull = if gap < 0 {
        gap.unsigned_abs() as i32 + SECURITY_FLANK
    } else {
        SECURITY_FLANK
    };
    prev.shrink_end(pull);
    next.shrink_start(pull);
    if prev.is_degenerate() || next.is_degenerate() || next.genome_start == 0 {
        return Ok(None);
    }
    gap = read_gap(prev, next);

    let mut left = left_window(ctx, chromosome, prev, gap)?;
    let mut right = right_window(ctx, chromosome, next, gap)?;
    let steps = (gap + SECURITY_FLANK as i64) as usize;
    let mut donors = scan_donors(&left, steps);
    let mut acceptors = scan_acceptors(&right, steps);

    // Semi-canonical retry: widen the side that found nothing
    if donors.is_empty() {
        prev.shrink_end(SEMI_CANONICAL_FLANK);
        if prev.is_degenerate() {
            return Ok(None);
        }
        gap = read_gap(prev, next);
        left = left_window(ctx, chromosome, prev, gap)?;
        donors = scan_donors(&left, left.len());
    }
    if acceptors.is_empty() {
        next.shrink_start(SEMI_CANONICAL_FLANK);
        if next.is_degenerate() {
            return Ok(None);
        }
        gap = read_gap(prev, next);
        right = right_window(ctx, chromosome, next, gap)?;
        acceptors = scan_acceptors(&right, right.len());
    }
    if donors.is_empty() || acceptors.is_empty() {
        log::trace!(
            "No splice motif between read {}-{} ({} donors, {} acceptors)",
            prev.read_end,
            next.read_start,
            donors.len(),
            acceptors.len()
        );
        return Ok(None);
    }

    let candidates: Vec<(usize, usize, SpliceType)> = donors
        .iter()
        .flat_map(|&(dsp_l, t_l)| {
            acceptors
                .iter()
                .filter(move |&&(dsp_r, t_r)| {
                    t_l == t_r && ((dsp_l + dsp_r) as i64 - gap).abs() <= SPLICE_LENGTH_TOLERANCE
                })
                .map(move |&(dsp_r, _)| (dsp_l, dsp_r, t_l))
        })
        .collect();
    if candidates.is_empty() {
        return Ok(None);
    }

    let q_start = (prev.read_end + 1) as usize;
    let q_end = next.read_start as usize;
    if q_end > query.len() {
        return Err(MapError::ReadOutOfBounds {
            pos: q_end as i64,
            len: query.len(),
        });
    }
    let gap_query = &query[q_start..q_end];

    let references: Vec<Vec<u8>> = candidates
        .iter()
        .map(|&(dsp_l, dsp_r, _)| {
            let mut r = Vec::with_capacity(dsp_l + dsp_r);
            r.extend_from_slice(&left[..dsp_l]);
            r.extend_from_slice(&right[right.len() - dsp_r..]);
            r
        })
        .collect();
    let queries: Vec<&[u8]> = vec![gap_query; references.len()];
    let ref_slices: Vec<&[u8]> = references.iter().map(Vec::as_slice).collect();
    let hits = ctx.kernel.align_batch(&queries, &ref_slices);
    let match_score = ctx.kernel.scoring().match_score;

    let mut best: Option<usize> = None;
    let mut best_score = 0.0f32;
    for (i, hit) in hits.iter().enumerate() {
        let norm = hit.normalized_score(gap_query.len(), match_score);
        if norm > best_score {
            best_score = norm;
            best = Some(i);
        }
    }
    let Some(best) = best else {
        return Ok(None);
    };

    let (dsp_l, dsp_r, splice_type) = candidates[best];
    let start = prev.genome_end + dsp_l as u64 + 1;
    let end = next.genome_start - dsp_r as u64 - 1;
    if !(prev.genome_start < start && end < next.genome_end && start < end) {
        return Ok(None);
    }
    let intron = (end - start + 1) as i32;
    let fragment = generate_fragment(&hits[best], gap_query, &references[best], SwItemKind::Middle)
        .with_intron_at(dsp_l as i32, intron);

    log::trace!(
        "Junction {}:{}-{} {} ({} nt, norm {:.2}) cigar {}",
        chromosome,
        start,
        end,
        splice_type,
        intron,
        best_score,
        fragment
    );
    Ok(Some(SpliceJunction {
        start,
        end,
        splice_type,
        fragment,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::alignment::ScalarSmithWaterman;
    use crate::pipelines::spliced::index::ReferenceGenome;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    /// Random sequence that never contains `GT`, `CT`, `AG` or `AC`, so the
    /// only motifs are the planted ones.
    fn motif_free(rng: &mut StdRng, len: usize) -> Vec<u8> {
        let mut seq: Vec<u8> = Vec::with_capacity(len);
        while seq.len() < len {
            let b = b"ACGT"[rng.gen_range(0..4)];
            let ok = match seq.last() {
                Some(b'G') | Some(b'C') => b != b'T',
                Some(b'A') => b != b'G' && b != b'C',
                _ => true,
            };
            if ok {
                seq.push(b);
            }
        }
        seq
    }

    /// exon1 (50) + GT..AG intron (1000) + exon2 (50) starting at 2000.
    fn planted() -> (Vec<u8>, Vec<u8>) {
        planted_with(b"GT", b"AG")
    }

    fn planted_with(donor: &[u8; 2], acceptor: &[u8; 2]) -> (Vec<u8>, Vec<u8>) {
        let mut rng = StdRng::seed_from_u64(42);
        let mut chrom = motif_free(&mut rng, 2000);
        let exon1 = motif_free(&mut rng, 50);
        let mut intron = motif_free(&mut rng, 1000);
        intron[..2].copy_from_slice(donor);
        intron[998..].copy_from_slice(acceptor);
        let exon2 = motif_free(&mut rng, 50);
        chrom.extend_from_slice(&exon1);
        chrom.extend_from_slice(&intron);
        chrom.extend_from_slice(&exon2);
        chrom.extend(motif_free(&mut rng, 2000));
        let mut read = exon1;
        read.extend_from_slice(&exon2);
        (chrom, read)
    }

    #[test]
    fn test_planted_gt_ag_intron() {
        let (chrom, read) = planted();
        let mut genome = ReferenceGenome::new();
        genome.add_chromosome("chr1", &chrom);
        let kernel = ScalarSmithWaterman::default();
        let ctx = SpliceContext {
            genome: &genome,
            kernel: &kernel,
            max_window: 2048,
        };

        let mut prev = SeedRegion::new(0, 44, 2000, 2044, 0);
        let mut next = SeedRegion::new(55, 99, 3055, 3099, 1);
        let junction = search_splice_junction(&mut prev, &mut next, 0, &read, &ctx)
            .unwrap()
            .expect("junction");
        assert_eq!(junction.start, 2050);
        assert_eq!(junction.end, 3049);
        assert_eq!(junction.intron_len(), 1000);
        assert_eq!(junction.splice_type, SpliceType::GtAg);
        assert_eq!(junction.fragment.intron_len(), 1000);
        assert_eq!(junction.fragment.distance, 0);

        // Seeds plus fragment cover the read exactly
        let covered = prev.read_len() + junction.fragment.query_len() + next.read_len();
        assert_eq!(covered as usize, read.len());
    }

    #[test]
    fn test_planted_ct_ac_intron() {
        let (chrom, read) = planted_with(b"CT", b"AC");
        let mut genome = ReferenceGenome::new();
        genome.add_chromosome("chr1", &chrom);
        let kernel = ScalarSmithWaterman::default();
        let ctx = SpliceContext {
            genome: &genome,
            kernel: &kernel,
            max_window: 2048,
        };

        let mut prev = SeedRegion::new(0, 44, 2000, 2044, 0);
        let mut next = SeedRegion::new(55, 99, 3055, 3099, 1);
        let junction = search_splice_junction(&mut prev, &mut next, 0, &read, &ctx)
            .unwrap()
            .expect("junction");
        assert_eq!((junction.start, junction.end), (2050, 3049));
        assert_eq!(junction.splice_type, SpliceType::CtAc);
        assert_eq!(junction.fragment.intron_len(), 1000);
        assert_eq!(junction.fragment.distance, 0);
    }

    #[test]
    fn test_donor_behind_overrunning_seed_found_on_retry() {
        let (chrom, read) = planted();
        let mut genome = ReferenceGenome::new();
        genome.add_chromosome("chr1", &chrom);
        let kernel = ScalarSmithWaterman::default();
        let ctx = SpliceContext {
            genome: &genome,
            kernel: &kernel,
            max_window: 2048,
        };

        // The left seed claims 10 nt past the donor; after the first pull-back
        // its end is still 4 nt inside the intron.
        let mut prev = SeedRegion::new(0, 59, 2000, 2059, 0);
        let mut next = SeedRegion::new(60, 99, 3060, 3099, 1);
        let junction = search_splice_junction(&mut prev, &mut next, 0, &read, &ctx)
            .unwrap()
            .expect("junction");
        assert_eq!((junction.start, junction.end), (2050, 3049));
        assert_eq!(junction.splice_type, SpliceType::GtAg);
        assert_eq!(junction.fragment.distance, 0);

        // First pull-back of 6, then the extra 10 on the donor side only
        assert_eq!((prev.read_end, prev.genome_end), (43, 2043));
        assert_eq!((next.read_start, next.genome_start), (66, 3066));
        let covered = prev.read_len() + junction.fragment.query_len() + next.read_len();
        assert_eq!(covered as usize, read.len());
    }

    #[test]
    fn test_no_motif_returns_none() {
        let mut rng = StdRng::seed_from_u64(3);
        let chrom = motif_free(&mut rng, 4000);
        let mut genome = ReferenceGenome::new();
        genome.add_chromosome("chr1", &chrom);
        let kernel = ScalarSmithWaterman::default();
        let ctx = SpliceContext {
            genome: &genome,
            kernel: &kernel,
            max_window: 2048,
        };
        let mut read = chrom[1000..1050].to_vec();
        read.extend_from_slice(&chrom[2050..2100]);

        let mut prev = SeedRegion::new(0, 49, 1000, 1049, 0);
        let mut next = SeedRegion::new(50, 99, 2050, 2099, 1);
        let found = search_splice_junction(&mut prev, &mut next, 0, &read, &ctx).unwrap();
        assert!(found.is_none());
    }

    #[test]
    fn test_window_limit_is_an_error() {
        let (chrom, read) = planted();
        let mut genome = ReferenceGenome::new();
        genome.add_chromosome("chr1", &chrom);
        let kernel = ScalarSmithWaterman::default();
        let ctx = SpliceContext {
            genome: &genome,
            kernel: &kernel,
            max_window: 8,
        };
        let mut prev = SeedRegion::new(0, 44, 2000, 2044, 0);
        let mut next = SeedRegion::new(55, 99, 3055, 3099, 1);
        let err = search_splice_junction(&mut prev, &mut next, 0, &read, &ctx).unwrap_err();
        assert!(matches!(err, MapError::IntervalTooLarge { .. }));
    }

    #[test]
    fn test_motif_scanners() {
        assert_eq!(
            scan_donors(b"AAGTCTAA", 8),
            vec![(2, SpliceType::GtAg), (4, SpliceType::CtAc)]
        );
        assert_eq!(
            scan_acceptors(b"TTACTTAGTT", 10),
            vec![(2, SpliceType::GtAg), (6, SpliceType::CtAc)]
        );
        assert!(scan_donors(b"G", 4).is_empty());
    }
}
