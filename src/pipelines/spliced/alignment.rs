use super::cal::Cal;
use super::merge::TargetGroup;
use super::read::Strand;
use crate::core::alignment::SwQueue;
use crate::core::cigar::CigarCode;

/// What a queued Smith-Waterman item will close once the batch runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotTarget {
    /// The gap seed with this id inside CAL `cal` of the candidate.
    Seed { cal: usize, seed_id: u32 },
    /// Read prefix before the first seed.
    LeftEnd,
    /// Read suffix after the last seed.
    RightEnd,
}

/// Owner handle of a queued item: candidate index plus target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FragmentSlot {
    pub candidate: usize,
    pub target: SlotTarget,
}

/// Per-read mutable state shared by all candidates of the read.
pub struct ReadState {
    pub queue: SwQueue<FragmentSlot>,
    /// Next free seed id; gap seeds continue after the seeding ids.
    pub next_id: u32,
}

impl ReadState {
    pub fn new(queue: SwQueue<FragmentSlot>, next_id: u32) -> Self {
        Self { queue, next_id }
    }

    pub fn take_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

/// Working alignment built from one target group.
#[derive(Debug, Clone)]
pub struct AlignmentCandidate {
    pub cals: Vec<Cal>,
    pub score: f32,
    pub c_left: Option<CigarCode>,
    pub c_right: Option<CigarCode>,
    pub left_close: bool,
    pub right_close: bool,
    /// Fragment between CAL `i` and CAL `i + 1`.
    pub splice_middle: Vec<CigarCode>,
    pub num_splice: usize,
    pub discarded: bool,
}

impl AlignmentCandidate {
    pub fn new(group: TargetGroup) -> Self {
        let capacity = group.cals.len().saturating_sub(1);
        Self {
            cals: group.cals,
            score: group.score,
            c_left: None,
            c_right: None,
            left_close: false,
            right_close: false,
            splice_middle: Vec::with_capacity(capacity),
            num_splice: 0,
            discarded: false,
        }
    }

    pub fn complete(&self) -> bool {
        self.left_close && self.right_close
    }

    pub fn strand(&self) -> Strand {
        self.cals.first().map_or(Strand::Forward, |c| c.strand)
    }

    pub fn chromosome(&self) -> usize {
        self.cals.first().map_or(0, |c| c.chromosome)
    }
}

/// A reported alignment.
#[derive(Debug, Clone, PartialEq)]
pub struct Alignment {
    pub read_id: String,
    pub strand: Strand,
    pub chromosome: usize,
    pub chromosome_name: String,
    /// 1-based leftmost reference position.
    pub genomic_start: u64,
    pub cigar: CigarCode,
    pub edit_distance: u32,
    pub mapping_quality: u8,
    pub secondary: bool,
    /// Number of hits reported for the read, for the `NH` tag.
    pub num_hits: usize,
}

impl Alignment {
    pub fn cigar_string(&self) -> String {
        self.cigar.to_string()
    }

    pub fn is_spliced(&self) -> bool {
        self.cigar.intron_len() > 0
    }
}

/// Alignment-score proxy in `0..=100`: half the read length, less 0.4 per
/// edit, relative to half the read length.
pub fn mapping_quality(read_len: usize, distance: u32) -> u8 {
    if read_len == 0 {
        return 0;
    }
    let half = read_len as f32 * 0.5;
    let score = ((half - distance as f32 * 0.4) * 100.0) / half;
    score.clamp(0.0, 100.0) as u8
}
