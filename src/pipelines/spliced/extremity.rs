//! Read-end extension.
//!
//! The bases before the first seed and after the last seed are aligned
//! against the genome just outside the seeds, with a small margin so that a
//! few indels still fit. Both ends go through the deferred queue as
//! `First`/`Last` items.

use super::alignment::{AlignmentCandidate, FragmentSlot, ReadState, SlotTarget};
use super::index::GenomeAccessor;
use crate::core::alignment::{AlignmentKernel, SwItem, SwItemKind};
use crate::core::cigar::CigarCode;
use crate::core::error::MapError;
use crate::defaults::EXTREMITY_MARGIN;

/// Queue the unaligned read ends of a candidate. Ends already covered by a
/// seed are marked closed right away; ends with no genome left to align
/// against stay open.
pub fn queue_extremities(
    cand: &mut AlignmentCandidate,
    candidate: usize,
    query: &[u8],
    genome: &dyn GenomeAccessor,
    kernel: &dyn AlignmentKernel,
    max_window: usize,
    state: &mut ReadState,
) -> Result<(), MapError> {
    let chromosome = cand.chromosome();
    let (Some(first), Some(last)) = (
        cand.cals.first().and_then(|c| c.first_seed()),
        cand.cals.last().and_then(|c| c.last_seed()),
    ) else {
        return Ok(());
    };
    let (first_read, first_genome) = (first.read_start, first.genome_start);
    let (last_read, last_genome) = (last.read_end, last.genome_end);

    if first_read <= 0 {
        cand.left_close = true;
    } else if first_genome > 0 {
        let prefix = first_read as usize;
        let start = first_genome.saturating_sub(prefix as u64 + EXTREMITY_MARGIN);
        let reference = genome.read_window(chromosome, start, first_genome - 1, max_window)?;
        state.queue.push(
            SwItem {
                query: query[..prefix].to_vec(),
                reference,
                kind: SwItemKind::First,
                owner: FragmentSlot {
                    candidate,
                    target: SlotTarget::LeftEnd,
                },
            },
            kernel,
        );
    }

    let read_len = query.len() as i32;
    if last_read >= read_len - 1 {
        cand.right_close = true;
    } else if last_genome + 1 < genome.chromosome_len(chromosome) {
        let suffix = (read_len - 1 - last_read) as usize;
        let end = last_genome + suffix as u64 + EXTREMITY_MARGIN;
        let reference = genome.read_window(chromosome, last_genome + 1, end, max_window)?;
        state.queue.push(
            SwItem {
                query: query[(last_read + 1) as usize..].to_vec(),
                reference,
                kind: SwItemKind::Last,
                owner: FragmentSlot {
                    candidate,
                    target: SlotTarget::RightEnd,
                },
            },
            kernel,
        );
    }
    Ok(())
}

/// Soft-clip the still open ends of a well-covered candidate. Returns whether
/// both ends are closed afterwards.
pub fn rescue_with_soft_clips(cand: &mut AlignmentCandidate, read_len: usize, min_score: f32) -> bool {
    if cand.complete() {
        return true;
    }
    if cand.score <= min_score {
        log::trace!(
            "Candidate with score {:.1} keeps an open end",
            cand.score
        );
        return false;
    }
    if !cand.left_close {
        if let Some(first) = cand.cals.first().and_then(|c| c.first_seed()) {
            cand.c_left = Some(CigarCode::from_op(b'S', first.read_start, 0));
            cand.left_close = true;
        }
    }
    if !cand.right_close {
        if let Some(last) = cand.cals.last().and_then(|c| c.last_seed()) {
            let clip = read_len as i32 - 1 - last.read_end;
            cand.c_right = Some(CigarCode::from_op(b'S', clip, 0));
            cand.right_close = true;
        }
    }
    cand.complete()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::alignment::{ScalarSmithWaterman, SwQueue};
    use crate::pipelines::spliced::cal::{Cal, SeedRegion};
    use crate::pipelines::spliced::index::ReferenceGenome;
    use crate::pipelines::spliced::merge::TargetGroup;
    use crate::pipelines::spliced::read::Strand;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn candidate(seed: SeedRegion, score: f32) -> AlignmentCandidate {
        let mut cal = Cal::new(0, Strand::Forward, 0, 0);
        cal.seeds.push(seed);
        cal.settle_span();
        AlignmentCandidate::new(TargetGroup {
            cals: vec![cal],
            score,
        })
    }

    #[test]
    fn test_both_ends_queued_and_aligned() {
        let mut rng = StdRng::seed_from_u64(5);
        let chrom: Vec<u8> = (0..3000).map(|_| b"ACGT"[rng.gen_range(0..4)]).collect();
        let mut genome = ReferenceGenome::new();
        genome.add_chromosome("chr1", &chrom);
        let kernel = ScalarSmithWaterman::default();
        let read = chrom[1000..1100].to_vec();

        let mut cand = candidate(SeedRegion::new(20, 79, 1020, 1079, 0), 60.0);
        let mut state = ReadState::new(SwQueue::new(4, 0.4), 1);
        queue_extremities(&mut cand, 0, &read, &genome, &kernel, 2048, &mut state).unwrap();
        assert!(!cand.left_close && !cand.right_close);
        assert_eq!(state.queue.pending(), 2);

        state.queue.flush(&kernel);
        let outcomes = state.queue.take_completed();
        let left = outcomes
            .iter()
            .find(|o| o.owner.target == SlotTarget::LeftEnd)
            .and_then(|o| o.fragment.clone())
            .unwrap();
        assert_eq!(left.to_string(), "20M");
        let right = outcomes
            .iter()
            .find(|o| o.owner.target == SlotTarget::RightEnd)
            .and_then(|o| o.fragment.clone())
            .unwrap();
        assert_eq!(right.to_string(), "20M");
    }

    #[test]
    fn test_full_length_seed_is_closed() {
        let mut genome = ReferenceGenome::new();
        genome.add_chromosome("chr1", &[b'A'; 500]);
        let kernel = ScalarSmithWaterman::default();
        let read = vec![b'A'; 50];
        let mut cand = candidate(SeedRegion::new(0, 49, 100, 149, 0), 90.0);
        let mut state = ReadState::new(SwQueue::new(4, 0.4), 1);
        queue_extremities(&mut cand, 0, &read, &genome, &kernel, 2048, &mut state).unwrap();
        assert!(cand.complete());
        assert_eq!(state.queue.pending(), 0);
    }

    #[test]
    fn test_soft_clip_rescue_depends_on_score() {
        let mut cand = candidate(SeedRegion::new(10, 89, 500, 579, 0), 80.0);
        assert!(rescue_with_soft_clips(&mut cand, 100, 60.0));
        assert_eq!(cand.c_left.as_ref().unwrap().to_string(), "10S");
        assert_eq!(cand.c_right.as_ref().unwrap().to_string(), "10S");

        let mut cand = candidate(SeedRegion::new(10, 89, 500, 579, 0), 50.0);
        assert!(!rescue_with_soft_clips(&mut cand, 100, 60.0));
        assert!(cand.c_left.is_none());
    }
}
