//! Final CIGAR assembly.
//!
//! Fragments are concatenated in read order: left extension, then per CAL
//! every seed's fragment followed by the junction to the next CAL, then the
//! right extension. Edit distances add up along the way.

use super::alignment::AlignmentCandidate;
use crate::core::cigar::CigarCode;

/// Assembled CIGAR with the 0-based leftmost genome position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembledCigar {
    pub cigar: CigarCode,
    pub genome_start: u64,
}

/// Concatenate the fragments of a candidate. Returns `None` when the result
/// does not cover the read exactly.
pub fn assemble_cigar(cand: &AlignmentCandidate, read_len: usize) -> Option<AssembledCigar> {
    let first = cand.cals.first()?.first_seed()?;

    let mut cigar = CigarCode::new();
    if let Some(left) = &cand.c_left {
        cigar.append(left);
    }
    for (i, cal) in cand.cals.iter().enumerate() {
        for seed in &cal.seeds {
            match &seed.fragment {
                Some(fragment) => cigar.append(fragment),
                None if !seed.is_degenerate() => cigar.push(b'M', seed.read_len()),
                None => {}
            }
        }
        if let Some(junction) = cand.splice_middle.get(i) {
            cigar.append(junction);
        }
    }
    if let Some(right) = &cand.c_right {
        cigar.append(right);
    }

    if !cigar.validate(read_len) {
        log::debug!(
            "Discarding CIGAR {} (covers {} of {} bases)",
            cigar,
            cigar.query_len(),
            read_len
        );
        return None;
    }

    let consumed = cand
        .c_left
        .as_ref()
        .map_or(0, |c| c.reference_len() as u64);
    let genome_start = first.genome_start.checked_sub(consumed)?;
    Some(AssembledCigar { cigar, genome_start })
}
