//! CAL consistency checks.
//!
//! `validate_cal` repairs small seed overlaps in place and reports whether
//! the CAL is usable; `cal_purge` is the destructive fallback that drops
//! seeds until no overlap remains.

use super::types::{Cal, SeedRegion};
use crate::defaults::MAX_AUTO_TRIM;

#[inline]
fn read_overlap(prev: &SeedRegion, next: &SeedRegion) -> i64 {
    prev.read_end as i64 - next.read_start as i64 + 1
}

#[inline]
fn genome_overlap(prev: &SeedRegion, next: &SeedRegion) -> i64 {
    prev.genome_end as i64 - next.genome_start as i64 + 1
}

/// Check the CAL span against its seeds and resolve seed overlaps of up to
/// 10 nt by trimming both seeds. Returns `false` when the span does not
/// match or an overlap is too large to trim.
pub fn validate_cal(cal: &mut Cal) -> bool {
    let (Some(first), Some(last)) = (cal.seeds.first(), cal.seeds.last()) else {
        return false;
    };
    if first.genome_start != cal.start || last.genome_end != cal.end {
        log::trace!(
            "CAL {}-{} does not match its seeds ({}-{})",
            cal.start,
            cal.end,
            first.genome_start,
            last.genome_end
        );
        return false;
    }
    if cal
        .seeds
        .iter()
        .any(|s| s.fragment.is_none() && s.read_len() as i64 != s.genome_len())
    {
        log::trace!("CAL {}-{} holds a seed spanning an indel", cal.start, cal.end);
        return false;
    }

    for i in 1..cal.seeds.len() {
        let (head, tail) = cal.seeds.split_at_mut(i);
        let prev = &mut head[i - 1];
        let next = &mut tail[0];

        for overlap in [read_overlap(prev, next), genome_overlap(prev, next)] {
            if overlap <= 0 {
                continue;
            }
            if overlap > MAX_AUTO_TRIM as i64 {
                log::trace!("Seed overlap of {} nt cannot be trimmed", overlap);
                return false;
            }
            // Both overlaps are re-measured: the first trim may already fix the second axis
            let remaining = read_overlap(prev, next).max(genome_overlap(prev, next));
            if remaining > 0 {
                prev.shrink_end(remaining as i32);
                next.shrink_start(remaining as i32);
            }
        }
        if prev.is_degenerate() || next.is_degenerate() {
            return false;
        }
    }
    true
}

/// Remove seeds lying outside the CAL span, then drop the shorter seed of
/// every overlapping pair (the earlier one on a tie).
pub fn cal_purge(cal: &mut Cal) {
    let (start, end) = (cal.start, cal.end);
    cal.seeds
        .retain(|s| s.genome_start >= start && s.genome_end <= end && !s.is_degenerate());

    let mut i = 1;
    while i < cal.seeds.len() {
        let prev = &cal.seeds[i - 1];
        let next = &cal.seeds[i];
        if read_overlap(prev, next) > 0 || genome_overlap(prev, next) > 0 {
            if prev.read_len() > next.read_len() {
                cal.seeds.remove(i);
            } else {
                cal.seeds.remove(i - 1);
                // The survivor must also be checked against its new predecessor
                i = (i - 1).max(1);
            }
            continue;
        }
        i += 1;
    }
}
