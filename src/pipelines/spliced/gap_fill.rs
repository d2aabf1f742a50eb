//! Closing the gaps between consecutive seeds.
//!
//! Each gap is resolved by an ordered list of strategies:
//!
//! - splice search, when the genome gap exceeds the read gap by more than
//!   `min_intron_size`
//! - exact comparison, when both gaps have the same length and few bases differ
//! - a plain deletion or insertion, when one of the gaps is empty
//! - a deferred Smith-Waterman alignment otherwise
//!
//! `SpliceFirst` tries the splice search on the untouched seeds; `ExactFirst`
//! pulls the seeds apart and tries the exact comparison before it. Every
//! strategy except the first case of an already closed gap adds a new seed
//! between the two, carrying (or waiting for) its fragment.

use super::alignment::{AlignmentCandidate, FragmentSlot, ReadState, SlotTarget};
use super::cal::{Cal, SeedRegion};
use super::index::{GenomeAccessor, JunctionStore, MetaexonCache};
use super::options::{GapFillParams, GapFillStrategy};
use super::read::Strand;
use super::splice::{search_splice_junction, SpliceContext, SpliceJunction};
use crate::core::alignment::{AlignmentKernel, SwItem, SwItemKind};
use crate::core::cigar::CigarCode;
use crate::core::error::MapError;
use crate::core::sequence::count_mismatches;
use crate::core::stats::MapperStats;
use crate::defaults::{GAP_FLANK, MIN_GAP};

#[inline]
fn gaps(prev: &SeedRegion, next: &SeedRegion) -> (i64, i64) {
    (
        next.read_start as i64 - prev.read_end as i64 - 1,
        next.genome_start as i64 - prev.genome_end as i64 - 1,
    )
}

/// Pull touching or nearly touching seeds apart by the gap flank, then remove
/// whatever overlap is left on either axis.
fn retract(prev: &mut SeedRegion, next: &mut SeedRegion) {
    let read_dist = next.read_start as i64 - prev.read_end as i64;
    let genome_dist = next.genome_start as i64 - prev.genome_end as i64;
    if read_dist <= MIN_GAP as i64 || genome_dist <= MIN_GAP as i64 {
        prev.shrink_end(GAP_FLANK);
        next.shrink_start(GAP_FLANK);
    }

    let dsp = prev.read_end - next.read_start + 1;
    if dsp > 0 {
        prev.shrink_end(dsp);
        next.shrink_start(dsp);
    }
    let dsp = prev.genome_end as i64 - next.genome_start as i64 + 1;
    if dsp > 0 {
        prev.shrink_end(dsp as i32);
        next.shrink_start(dsp as i32);
    }
}

/// Seed covering exactly the gap between `prev` and `next`.
fn gap_seed(prev: &SeedRegion, next: &SeedRegion, id: u32) -> SeedRegion {
    SeedRegion::new(
        prev.read_end + 1,
        next.read_start - 1,
        prev.genome_end + 1,
        next.genome_start.saturating_sub(1),
        id,
    )
}

/// Per-CAL identity needed while closing its gaps.
struct GapSite<'q> {
    chromosome: usize,
    strand: Strand,
    cal_index: usize,
    candidate: usize,
    query: &'q [u8],
}

pub struct GapFiller<'a> {
    pub genome: &'a dyn GenomeAccessor,
    pub kernel: &'a dyn AlignmentKernel,
    pub junctions: &'a JunctionStore,
    pub metaexons: &'a MetaexonCache,
    pub stats: &'a MapperStats,
    pub params: GapFillParams,
}

impl<'a> GapFiller<'a> {
    fn splice_context(&self) -> SpliceContext<'a> {
        SpliceContext {
            genome: self.genome,
            kernel: self.kernel,
            max_window: self.params.max_reference_window,
        }
    }

    fn register(&self, junction: &SpliceJunction, chromosome: usize, strand: Strand, prev: &SeedRegion, next: &SeedRegion) {
        junction.register(
            chromosome,
            strand,
            prev.genome_start,
            next.genome_end,
            self.params.min_intron_size,
            self.junctions,
            self.metaexons,
        );
        self.stats.add_junction();
    }

    /// Resolve the junction between every pair of consecutive CALs of the
    /// candidate. Returns `false` when a pair has no acceptable junction.
    pub fn resolve_cal_junctions(&self, cand: &mut AlignmentCandidate, query: &[u8]) -> Result<bool, MapError> {
        let ctx = self.splice_context();
        for i in 1..cand.cals.len() {
            let (head, tail) = cand.cals.split_at_mut(i);
            let (prev_cal, next_cal) = (&mut head[i - 1], &mut tail[0]);
            let chromosome = prev_cal.chromosome;
            let strand = prev_cal.strand;
            let (Some(prev), Some(next)) = (prev_cal.seeds.last_mut(), next_cal.seeds.first_mut()) else {
                return Ok(false);
            };

            let Some(junction) = search_splice_junction(prev, next, chromosome, query, &ctx)? else {
                log::debug!("No junction between CALs {} and {}", i - 1, i);
                return Ok(false);
            };
            if junction.intron_len() <= self.params.min_intron_size {
                log::debug!("Junction {}-{} shorter than an intron", junction.start, junction.end);
                return Ok(false);
            }
            self.register(&junction, chromosome, strand, prev, next);
            cand.splice_middle.push(junction.fragment);
            cand.num_splice += 1;
            prev_cal.settle_span();
            next_cal.settle_span();
        }
        Ok(true)
    }

    /// Close every gap inside every CAL of the candidate.
    pub fn fill_candidate(
        &self,
        cand: &mut AlignmentCandidate,
        candidate: usize,
        query: &[u8],
        state: &mut ReadState,
    ) -> Result<(), MapError> {
        for (cal_index, cal) in cand.cals.iter_mut().enumerate() {
            let site = GapSite {
                chromosome: cal.chromosome,
                strand: cal.strand,
                cal_index,
                candidate,
                query,
            };
            cand.num_splice += self.fill_cal(cal, &site, state)?;
        }
        Ok(())
    }

    /// Returns the number of junctions found inside the CAL.
    fn fill_cal(&self, cal: &mut Cal, site: &GapSite, state: &mut ReadState) -> Result<usize, MapError> {
        let mut junctions = 0;
        let mut i = 1;
        while i < cal.seeds.len() {
            let (head, tail) = cal.seeds.split_at_mut(i);
            let prev = &mut head[i - 1];
            let next = &mut tail[0];

            let filled = match self.params.strategy {
                GapFillStrategy::SpliceFirst => self.close_splice_first(prev, next, site, state)?,
                GapFillStrategy::ExactFirst => self.close_exact_first(prev, next, site, state)?,
            };
            if prev.is_degenerate() || next.is_degenerate() {
                return Err(MapError::ReadOutOfBounds {
                    pos: next.read_start as i64,
                    len: site.query.len(),
                });
            }
            match filled {
                Some((seed, spliced)) => {
                    junctions += spliced as usize;
                    cal.seeds.insert(i, seed);
                    i += 2;
                }
                None => i += 1,
            }
        }
        cal.settle_span();
        Ok(junctions)
    }

    fn close_splice_first(
        &self,
        prev: &mut SeedRegion,
        next: &mut SeedRegion,
        site: &GapSite,
        state: &mut ReadState,
    ) -> Result<Option<(SeedRegion, bool)>, MapError> {
        if let Some(seed) = self.try_splice(prev, next, site, state)? {
            return Ok(Some((seed, true)));
        }
        retract(prev, next);
        if let Some(closed) = self.try_exact(prev, next, site, state)? {
            return Ok(closed.map(|s| (s, false)));
        }
        self.close_unequal(prev, next, site, state).map(|s| s.map(|s| (s, false)))
    }

    fn close_exact_first(
        &self,
        prev: &mut SeedRegion,
        next: &mut SeedRegion,
        site: &GapSite,
        state: &mut ReadState,
    ) -> Result<Option<(SeedRegion, bool)>, MapError> {
        retract(prev, next);
        if let Some(closed) = self.try_exact(prev, next, site, state)? {
            return Ok(closed.map(|s| (s, false)));
        }
        if let Some(seed) = self.try_splice(prev, next, site, state)? {
            return Ok(Some((seed, true)));
        }
        self.close_unequal(prev, next, site, state).map(|s| s.map(|s| (s, false)))
    }

    /// Splice search gated on the intron threshold. The seeds are restored
    /// when nothing is found.
    fn try_splice(
        &self,
        prev: &mut SeedRegion,
        next: &mut SeedRegion,
        site: &GapSite,
        state: &mut ReadState,
    ) -> Result<Option<SeedRegion>, MapError> {
        let (gap_read, gap_genome) = gaps(prev, next);
        if gap_genome - gap_read <= self.params.min_intron_size as i64 {
            return Ok(None);
        }

        let saved = (prev.clone(), next.clone());
        let found = search_splice_junction(prev, next, site.chromosome, site.query, &self.splice_context())?;
        match found {
            Some(junction) if junction.intron_len() > 0 => {
                self.register(&junction, site.chromosome, site.strand, prev, next);
                let mut seed = gap_seed(prev, next, state.take_id());
                seed.fragment = Some(junction.fragment);
                Ok(Some(seed))
            }
            _ => {
                (*prev, *next) = saved;
                Ok(None)
            }
        }
    }

    /// Equal read and genome gaps. `Some(None)` means the gap is already
    /// closed, `Some(Some(seed))` that it closes with a plain match, `None`
    /// that too many bases differ (or the gaps differ).
    #[allow(clippy::option_option)]
    fn try_exact(
        &self,
        prev: &SeedRegion,
        next: &SeedRegion,
        site: &GapSite,
        state: &mut ReadState,
    ) -> Result<Option<Option<SeedRegion>>, MapError> {
        let (gap_read, gap_genome) = gaps(prev, next);
        if gap_read != gap_genome {
            return Ok(None);
        }
        if gap_read == 0 {
            return Ok(Some(None));
        }

        let query = gap_query(prev, next, site.query)?;
        let reference = self.genome.read_window(
            site.chromosome,
            prev.genome_end + 1,
            next.genome_start - 1,
            self.params.max_reference_window,
        )?;
        let mismatches = count_mismatches(query, &reference);
        if mismatches as i64 > gap_genome / 3 + 2 {
            log::trace!("Gap of {} nt has {} mismatches", gap_read, mismatches);
            return Ok(None);
        }
        let mut seed = gap_seed(prev, next, state.take_id());
        seed.fragment = Some(CigarCode::from_op(b'M', gap_read as i32, mismatches));
        Ok(Some(Some(seed)))
    }

    /// Gaps of different length (or equal but too divergent).
    fn close_unequal(
        &self,
        prev: &SeedRegion,
        next: &SeedRegion,
        site: &GapSite,
        state: &mut ReadState,
    ) -> Result<Option<SeedRegion>, MapError> {
        let (gap_read, gap_genome) = gaps(prev, next);
        debug_assert!(gap_read >= 0 && gap_genome >= 0);
        if gap_read == 0 && gap_genome == 0 {
            return Ok(None);
        }

        let mut seed = gap_seed(prev, next, state.take_id());
        if gap_read == 0 {
            seed.fragment = Some(CigarCode::from_op(b'D', gap_genome as i32, gap_genome as u32));
            return Ok(Some(seed));
        }
        if gap_genome == 0 {
            seed.fragment = Some(CigarCode::from_op(b'I', gap_read as i32, gap_read as u32));
            return Ok(Some(seed));
        }

        let query = gap_query(prev, next, site.query)?.to_vec();
        let reference = self.genome.read_window(
            site.chromosome,
            prev.genome_end + 1,
            next.genome_start - 1,
            self.params.max_reference_window,
        )?;
        log::trace!(
            "Queueing SW for gap read {}-{} genome {}-{}",
            seed.read_start,
            seed.read_end,
            seed.genome_start,
            seed.genome_end
        );
        state.queue.push(
            SwItem {
                query,
                reference,
                kind: SwItemKind::Middle,
                owner: FragmentSlot {
                    candidate: site.candidate,
                    target: SlotTarget::Seed {
                        cal: site.cal_index,
                        seed_id: seed.id,
                    },
                },
            },
            self.kernel,
        );
        Ok(Some(seed))
    }
}

/// Read bases strictly between two seeds.
fn gap_query<'q>(prev: &SeedRegion, next: &SeedRegion, query: &'q [u8]) -> Result<&'q [u8], MapError> {
    let start = prev.read_end + 1;
    let end = next.read_start;
    if start < 0 || end < start || end as usize > query.len() {
        return Err(MapError::ReadOutOfBounds {
            pos: end as i64,
            len: query.len(),
        });
    }
    Ok(&query[start as usize..end as usize])
}
