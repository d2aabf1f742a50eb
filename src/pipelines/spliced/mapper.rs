//! Per-read mapping driver.
//!
//! `map_read` runs the whole pipeline for one read:
//!
//! 1. exact whole-read lookup (returns early on a hit)
//! 2. seeding of both strands into the thread's CAL managers
//! 3. CAL chaining, scoring and target selection
//! 4. per candidate: CAL validation, junctions between CALs, gap filling and
//!    read-end queueing
//! 5. one flush of the deferred queue, fragments handed back to their owners
//! 6. CIGAR assembly and validation
//!
//! Everything built for the read is dropped before it returns. Failures of a
//! single candidate (no junction, window too large, invalid CIGAR) only drop
//! that candidate; a read without any surviving candidate is unmapped.

use super::alignment::{mapping_quality, Alignment, AlignmentCandidate, FragmentSlot, ReadState, SlotTarget};
use super::assembly::assemble_cigar;
use super::cal::{cal_purge, validate_cal, Cal};
use super::extremity::{queue_extremities, rescue_with_soft_clips};
use super::gap_fill::GapFiller;
use super::index::{GenomeAccessor, JunctionStore, MetaexonCache, SuffixSearch};
use super::merge::{build_target_groups, select_targets};
use super::options::MapperOpt;
use super::read::{Read, Strand};
use super::seeding::{exact_read_hits, seed_read, ExactHit};
use super::workspace::with_workspace;
use crate::core::alignment::{AlignmentKernel, SwOutcome, SwQueue};
use crate::core::error::MapError;
use crate::core::stats::MapperStats;

pub struct ReadMapper<'a> {
    genome: &'a dyn GenomeAccessor,
    index: &'a dyn SuffixSearch,
    kernel: &'a dyn AlignmentKernel,
    opt: MapperOpt,
    metaexons: MetaexonCache,
    junctions: JunctionStore,
    stats: MapperStats,
}

/// Check the span and seed overlaps of a CAL, purging it once if needed.
fn settle_cal(cal: &mut Cal) -> bool {
    if validate_cal(cal) {
        return true;
    }
    cal_purge(cal);
    cal.settle_span();
    !cal.seeds.is_empty() && validate_cal(cal)
}

impl<'a> ReadMapper<'a> {
    pub fn new(
        genome: &'a dyn GenomeAccessor,
        index: &'a dyn SuffixSearch,
        kernel: &'a dyn AlignmentKernel,
        opt: MapperOpt,
    ) -> Result<Self, MapError> {
        opt.validate().map_err(|errors| MapError::invalid_options(&errors))?;
        let num_chromosomes = genome.num_chromosomes();
        Ok(Self {
            genome,
            index,
            kernel,
            opt,
            metaexons: MetaexonCache::new(num_chromosomes),
            junctions: JunctionStore::new(),
            stats: MapperStats::new(),
        })
    }

    pub fn opt(&self) -> &MapperOpt {
        &self.opt
    }

    pub fn genome(&self) -> &dyn GenomeAccessor {
        self.genome
    }

    pub fn stats(&self) -> &MapperStats {
        &self.stats
    }

    pub fn junctions(&self) -> &JunctionStore {
        &self.junctions
    }

    pub fn metaexons(&self) -> &MetaexonCache {
        &self.metaexons
    }

    /// Map one read, counting into the mapper's own statistics.
    pub fn map_read(&self, read: &Read) -> Vec<Alignment> {
        self.map_read_with_stats(read, &self.stats)
    }

    /// Map one read, counting into `stats`.
    pub fn map_read_with_stats(&self, read: &Read, stats: &MapperStats) -> Vec<Alignment> {
        stats.add_read();
        if read.is_empty() {
            stats.add_unmapped();
            return Vec::new();
        }

        let exact = exact_read_hits(read, self.index, &self.opt.seeding_params());
        if !exact.is_empty() {
            stats.add_exact();
            return self.exact_alignments(read, &exact);
        }

        let alignments = self.map_spliced(read, stats);
        if alignments.is_empty() {
            log::trace!("{}: unmapped", read.id);
            stats.add_unmapped();
        }
        alignments
    }

    fn exact_alignments(&self, read: &Read, hits: &[ExactHit]) -> Vec<Alignment> {
        hits.iter()
            .enumerate()
            .map(|(i, hit)| Alignment {
                read_id: read.id.clone(),
                strand: hit.strand,
                chromosome: hit.chromosome,
                chromosome_name: self.genome.chromosome_name(hit.chromosome).to_string(),
                genomic_start: hit.offset + 1,
                cigar: hit.cigar.clone(),
                edit_distance: 0,
                mapping_quality: mapping_quality(read.len(), 0),
                secondary: i > 0,
                num_hits: hits.len(),
            })
            .collect()
    }

    fn map_spliced(&self, read: &Read, stats: &MapperStats) -> Vec<Alignment> {
        let seeding = self.opt.seeding_params();
        let selection = self.opt.selection_params();

        let (groups, next_id) = with_workspace(|ws| {
            ws.reset(self.genome.num_chromosomes());
            let mut next_id = 0u32;
            for strand in Strand::BOTH {
                let placed = seed_read(
                    read.oriented(strand),
                    self.index,
                    ws.manager_mut(strand),
                    &seeding,
                    &mut next_id,
                );
                log::trace!("{} ({}): {} seeds", read.id, strand.symbol(), placed);
            }
            let groups = build_target_groups(&mut ws.managers, selection.max_intron_size, read.len());
            (groups, next_id)
        });
        if groups.is_empty() {
            return Vec::new();
        }

        let mut candidates: Vec<AlignmentCandidate> = select_targets(groups, &selection)
            .into_iter()
            .map(AlignmentCandidate::new)
            .collect();
        log::trace!("{}: {} candidates", read.id, candidates.len());

        let filler = GapFiller {
            genome: self.genome,
            kernel: self.kernel,
            junctions: &self.junctions,
            metaexons: &self.metaexons,
            stats,
            params: self.opt.gap_fill_params(),
        };
        let mut state = ReadState::new(
            SwQueue::new(self.opt.sw_batch_depth, self.opt.extremity_min_norm_score),
            next_id,
        );

        for (idx, cand) in candidates.iter_mut().enumerate() {
            match self.prepare_candidate(&filler, cand, idx, read, &mut state) {
                Ok(true) => {}
                Ok(false) => cand.discarded = true,
                Err(e) if e.is_recoverable() => {
                    log::debug!("{}: candidate {} dropped: {}", read.id, idx, e);
                    cand.discarded = true;
                }
                Err(e) => {
                    log::error!("{}: {}", read.id, e);
                    cand.discarded = true;
                }
            }
        }

        state.queue.flush(self.kernel);
        stats.add_sw_invocations(state.queue.invocations());
        for outcome in state.queue.take_completed() {
            if let Some(cand) = candidates.get_mut(outcome.owner.candidate) {
                deliver(cand, outcome);
            }
        }

        let mut alignments = Vec::with_capacity(candidates.len());
        for cand in &mut candidates {
            if cand.discarded
                || !rescue_with_soft_clips(cand, read.len(), self.opt.soft_clip_min_score)
            {
                stats.add_discarded();
                continue;
            }
            let Some(assembled) = assemble_cigar(cand, read.len()) else {
                stats.add_discarded();
                continue;
            };
            let chromosome = cand.chromosome();
            alignments.push(Alignment {
                read_id: read.id.clone(),
                strand: cand.strand(),
                chromosome,
                chromosome_name: self.genome.chromosome_name(chromosome).to_string(),
                genomic_start: assembled.genome_start + 1,
                edit_distance: assembled.cigar.distance,
                mapping_quality: mapping_quality(read.len(), assembled.cigar.distance),
                cigar: assembled.cigar,
                secondary: false,
                num_hits: 0,
            });
        }

        let num_hits = alignments.len();
        for (i, alignment) in alignments.iter_mut().enumerate() {
            alignment.secondary = i > 0;
            alignment.num_hits = num_hits;
        }
        alignments
    }

    fn prepare_candidate(
        &self,
        filler: &GapFiller,
        cand: &mut AlignmentCandidate,
        idx: usize,
        read: &Read,
        state: &mut ReadState,
    ) -> Result<bool, MapError> {
        if !cand.cals.iter_mut().all(settle_cal) {
            log::trace!("{}: candidate {} has inconsistent CALs", read.id, idx);
            return Ok(false);
        }
        let query = read.oriented(cand.strand());
        if !filler.resolve_cal_junctions(cand, query)? {
            return Ok(false);
        }
        filler.fill_candidate(cand, idx, query, state)?;
        queue_extremities(
            cand,
            idx,
            query,
            self.genome,
            self.kernel,
            self.opt.max_reference_window,
            state,
        )?;
        Ok(true)
    }
}

/// Hand one alignment outcome to the part of the candidate that owns it.
fn deliver(cand: &mut AlignmentCandidate, outcome: SwOutcome<FragmentSlot>) {
    if cand.discarded {
        return;
    }
    match outcome.owner.target {
        SlotTarget::Seed { cal, seed_id } => {
            let seed = cand
                .cals
                .get_mut(cal)
                .and_then(|c| c.seeds.iter_mut().find(|s| s.id == seed_id));
            match (seed, outcome.fragment) {
                (Some(seed), Some(fragment)) => seed.fragment = Some(fragment),
                _ => cand.discarded = true,
            }
        }
        SlotTarget::LeftEnd => {
            if let Some(fragment) = outcome.fragment {
                cand.c_left = Some(fragment);
                cand.left_close = true;
            }
        }
        SlotTarget::RightEnd => {
            if let Some(fragment) = outcome.fragment {
                cand.c_right = Some(fragment);
                cand.right_close = true;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::alignment::ScalarSmithWaterman;
    use crate::pipelines::spliced::index::{ReferenceGenome, SuffixArrayIndex};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn random_genome(seed: u64, len: usize) -> ReferenceGenome {
        let mut rng = StdRng::seed_from_u64(seed);
        let chrom: Vec<u8> = (0..len).map(|_| b"ACGT"[rng.gen_range(0..4)]).collect();
        let mut genome = ReferenceGenome::new();
        genome.add_chromosome("chr1", &chrom);
        genome
    }

    #[test]
    fn test_invalid_options_are_rejected() {
        let genome = random_genome(1, 1000);
        let index = SuffixArrayIndex::build(&genome);
        let kernel = ScalarSmithWaterman::default();
        let opt = MapperOpt {
            min_intron_size: 1000,
            max_intron_size: 10,
            ..Default::default()
        };
        let err = ReadMapper::new(&genome, &index, &kernel, opt).err().unwrap();
        assert!(matches!(err, MapError::InvalidOptions(_)));
    }

    #[test]
    fn test_exact_read_takes_fast_path() {
        let genome = random_genome(2, 5000);
        let index = SuffixArrayIndex::build(&genome);
        let kernel = ScalarSmithWaterman::default();
        let mapper = ReadMapper::new(&genome, &index, &kernel, MapperOpt::default()).unwrap();

        let seq = genome.sequences()[0][1200..1300].to_vec();
        let read = Read::new("r1", &seq, &[b'I'; 100]);
        let hits = mapper.map_read(&read);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].genomic_start, 1201);
        assert_eq!(hits[0].cigar_string(), "100M");
        assert_eq!(hits[0].chromosome_name, "chr1");
        assert!(!hits[0].secondary);

        let snap = mapper.stats().snapshot();
        assert_eq!(snap.exact_reads, 1);
        assert_eq!(snap.sw_invocations, 0);
    }

    #[test]
    fn test_read_without_seeds_is_unmapped() {
        let mut genome = ReferenceGenome::new();
        genome.add_chromosome("chr1", &[b'A'; 2000]);
        let index = SuffixArrayIndex::build(&genome);
        let kernel = ScalarSmithWaterman::default();
        let mapper = ReadMapper::new(&genome, &index, &kernel, MapperOpt::default()).unwrap();

        let read = Read::new("r1", &[b'C'; 60], &[b'I'; 60]);
        assert!(mapper.map_read(&read).is_empty());
        let snap = mapper.stats().snapshot();
        assert_eq!(snap.total_reads, 1);
        assert_eq!(snap.unmapped_reads, 1);
    }

    #[test]
    fn test_mismatch_island_is_filled() {
        let genome = random_genome(3, 6000);
        let index = SuffixArrayIndex::build(&genome);
        let kernel = ScalarSmithWaterman::default();
        let mapper = ReadMapper::new(&genome, &index, &kernel, MapperOpt::default()).unwrap();

        let mut seq = genome.sequences()[0][3000..3100].to_vec();
        for pos in 48..51 {
            seq[pos] = match seq[pos] {
                b'A' => b'C',
                b'C' => b'G',
                b'G' => b'T',
                _ => b'A',
            };
        }
        let read = Read::new("r2", &seq, &[b'I'; 100]);
        let hits = mapper.map_read(&read);
        assert!(!hits.is_empty());
        let best = &hits[0];
        assert_eq!(best.strand, Strand::Forward);
        assert_eq!(best.genomic_start, 3001);
        assert_eq!(best.cigar.query_len(), 100);
        assert_eq!(best.edit_distance, 3);
    }
}
