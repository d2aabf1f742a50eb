//! Chaining CALs into target groups and ranking them.
//!
//! Consecutive CALs of one chromosome and strand are chained into a group
//! when the read coordinates keep moving forward (allowing a 5 nt overlap),
//! the seeds are distinct and the genome distance fits an intron.

use super::cal::{Cal, CalManager};
use super::options::SelectionParams;
use crate::defaults::MAX_CAL_READ_OVERLAP;

/// CALs that may form one spliced alignment, in genome order.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetGroup {
    pub cals: Vec<Cal>,
    pub score: f32,
}

impl TargetGroup {
    pub fn new(cals: Vec<Cal>, read_len: usize) -> Self {
        let score = merge_score(&cals, read_len);
        Self { cals, score }
    }

    pub fn num_seeds(&self) -> usize {
        self.cals.iter().map(|c| c.seeds.len()).sum()
    }
}

/// Read coverage of a group as a percentage of the read length.
pub fn merge_score(cals: &[Cal], read_len: usize) -> f32 {
    if read_len == 0 {
        return 0.0;
    }
    let covered: i64 = cals.iter().map(Cal::read_coverage).sum();
    (covered as f32 * 100.0) / read_len as f32
}

fn can_chain(prev: &Cal, next: &Cal, max_intron_size: u64) -> bool {
    let (Some(s_prev), Some(s)) = (prev.last_seed(), next.first_seed()) else {
        return false;
    };
    let read_ok = s.read_start > s_prev.read_end
        || s_prev.read_end - s.read_start <= MAX_CAL_READ_OVERLAP;
    read_ok
        && prev.chromosome == next.chromosome
        && prev.strand == next.strand
        && s_prev.id != s.id
        && next.start <= prev.end + max_intron_size
}

/// Chain the CALs of one chromosome list into groups.
fn chain_cals(cals: Vec<Cal>, max_intron_size: u64, read_len: usize, out: &mut Vec<TargetGroup>) {
    let mut group: Vec<Cal> = Vec::new();
    for cal in cals {
        if cal.seeds.is_empty() {
            debug_assert!(false, "CAL without seeds");
            continue;
        }
        let chained = group
            .last()
            .is_some_and(|prev| can_chain(prev, &cal, max_intron_size));
        if !chained && !group.is_empty() {
            out.push(TargetGroup::new(std::mem::take(&mut group), read_len));
        }
        group.push(cal);
    }
    if !group.is_empty() {
        out.push(TargetGroup::new(group, read_len));
    }
}

/// Consume the CALs of both strands (forward first) and build target groups.
pub fn build_target_groups(
    managers: &mut [CalManager],
    max_intron_size: u64,
    read_len: usize,
) -> Vec<TargetGroup> {
    let mut groups = Vec::new();
    for manager in managers.iter_mut() {
        for cals in manager.drain() {
            if !cals.is_empty() {
                chain_cals(cals, max_intron_size, read_len, &mut groups);
            }
        }
    }
    groups
}

/// Keep at most `max_targets` groups, rank them by descending score (stable)
/// and keep the best one plus up to `max_reported - 1` others that reach
/// `min_report_score`.
pub fn select_targets(mut groups: Vec<TargetGroup>, params: &SelectionParams) -> Vec<TargetGroup> {
    if groups.len() > params.max_targets {
        log::debug!(
            "{} target groups, scoring the first {}",
            groups.len(),
            params.max_targets
        );
        groups.truncate(params.max_targets);
    }
    groups.sort_by(|a, b| b.score.total_cmp(&a.score));

    let mut keep = groups.len().min(1);
    for group in groups.iter().take(params.max_reported).skip(1) {
        if group.score < params.min_report_score {
            break;
        }
        keep += 1;
    }
    groups.truncate(keep);
    groups
}
