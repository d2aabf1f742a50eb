//! Read seeding against the suffix-array index.
//!
//! The read is walked left to right. A usable hit places one seed per
//! occurrence and skips past the matched prefix (plus the base that stopped
//! the match); a miss advances by half a seed. A last anchor is tried at the
//! read end so the 3' bases are not left unseeded.

use super::cal::{CalManager, SeedRegion};
use super::index::SuffixSearch;
use super::options::SeedingParams;
use super::read::{Read, Strand};
use crate::core::cigar::CigarCode;

/// One exact whole-read hit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExactHit {
    pub strand: Strand,
    pub chromosome: usize,
    pub offset: u64,
    pub cigar: CigarCode,
}

/// Place every occurrence of one suffix-search hit as a seed.
fn store_hits(
    index: &dyn SuffixSearch,
    manager: &mut CalManager,
    hits: &super::index::SuffixHits,
    read_pos: usize,
    max_cal_distance: u64,
    next_id: &mut u32,
) {
    let read_start = read_pos as i32;
    let read_end = (read_pos + hits.matched_len - 1) as i32;
    for sa_index in hits.low..=hits.high {
        let (chromosome, offset) = index.locate(sa_index);
        let seed = SeedRegion::new(
            read_start,
            read_end,
            offset,
            offset + hits.matched_len as u64 - 1,
            *next_id,
        );
        log::trace!(
            "({}) seed #{} {}:[{}|{}-{}|{}]",
            manager.strand().symbol(),
            next_id,
            chromosome,
            seed.genome_start,
            read_start,
            read_end,
            seed.genome_end
        );
        *next_id += 1;
        manager.add_seed(chromosome, seed, max_cal_distance);
    }
}

/// Seed one oriented read sequence into the CAL manager of its strand.
/// Returns the number of seeds placed.
pub fn seed_read(
    query: &[u8],
    index: &dyn SuffixSearch,
    manager: &mut CalManager,
    params: &SeedingParams,
    next_id: &mut u32,
) -> usize {
    let len = query.len();
    let k = params.seed_size;
    let seed_inc = (k / 2).max(1);
    let max_cal_distance = len as u64;
    let first_id = *next_id;

    if len <= k {
        return 0;
    }

    let mut read_pos = 0usize;
    while read_pos + k < len {
        let hits = index.search_suffix(&query[read_pos..], k, params.max_suffix_hits);
        if hits.matched_len > 0 && hits.is_hit() {
            store_hits(index, manager, &hits, read_pos, max_cal_distance, next_id);
            read_pos += hits.matched_len + 1;
        } else {
            read_pos += seed_inc;
        }
    }

    if read_pos != len - 1 {
        let read_pos = len - k - 1;
        let hits = index.search_suffix(&query[read_pos..], k, params.max_suffix_hits);
        if hits.matched_len > 0 && hits.is_hit() {
            store_hits(index, manager, &hits, read_pos, max_cal_distance, next_id);
        }
    }

    (*next_id - first_id) as usize
}

/// Look the whole read up on both strands. Returns one `{len}M` hit per
/// occurrence (capped per strand) when the read occurs verbatim.
pub fn exact_read_hits(read: &Read, index: &dyn SuffixSearch, params: &SeedingParams) -> Vec<ExactHit> {
    let len = read.len();
    let mut out = Vec::new();
    if len < params.seed_size {
        return out;
    }

    for strand in Strand::BOTH {
        let hits = index.search_suffix(read.oriented(strand), params.seed_size, usize::MAX);
        if !hits.is_hit() || hits.matched_len != len {
            continue;
        }
        let num = hits.count.min(params.max_exact_alignments);
        if hits.count > num {
            log::debug!(
                "{}: {} exact hits on {} strand, reporting {}",
                read.id,
                hits.count,
                strand.symbol(),
                num
            );
        }
        for sa_index in hits.low..hits.low + num {
            let (chromosome, offset) = index.locate(sa_index);
            out.push(ExactHit {
                strand,
                chromosome,
                offset,
                cigar: CigarCode::from_op(b'M', len as i32, 0),
            });
        }
    }
    out
}
