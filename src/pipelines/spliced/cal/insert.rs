//! Seed and CAL insertion.
//!
//! Both levels use the same five-way placement against the first element
//! whose start is past the new interval's start:
//!
//! 1. disjoint and before: insert a new element
//! 2. overlapping from the left: move the element's start back
//! 3. as 2, and also past its end: move the end forward too
//! 4. contained in an element: nothing to add
//! 5. overlapping from the right: move the element's end forward
//!
//! When an element's end moved, the following elements it now reaches are
//! folded into it ("actualization"). Seeds merge only when they overlap on
//! the same diagonal; an overlapping seed on another diagonal is kept as its
//! own element and left to `validate_cal`. CALs merge within
//! `max_cal_distance`.

use super::types::{Cal, SeedRegion};
use crate::pipelines::spliced::read::Strand;

enum Placement {
    Before(usize),
    WidenStart { idx: usize, widen_end: bool },
    Contained(usize),
    WidenEnd(usize),
    Append,
}

/// Insert a seed into a CAL's ordered seed list.
///
/// Widening keeps `read_len() == genome_len()` for every seed.
pub fn insert_seed(seeds: &mut Vec<SeedRegion>, seed: SeedRegion) {
    let mut placement = Placement::Append;
    for (idx, item) in seeds.iter().enumerate() {
        if seed.read_start < item.read_start {
            placement = if seed.diagonal() != item.diagonal()
                || (seed.read_end < item.read_start && seed.genome_end < item.genome_start)
            {
                Placement::Before(idx)
            } else {
                Placement::WidenStart {
                    idx,
                    widen_end: seed.read_end > item.read_end,
                }
            };
            break;
        } else if seed.read_end <= item.read_end {
            placement = Placement::Contained(idx);
            break;
        } else if item.diagonal() == seed.diagonal()
            && item.read_end >= seed.read_start
            && item.genome_end >= seed.genome_start
        {
            placement = Placement::WidenEnd(idx);
            break;
        }
    }

    let widened = match placement {
        Placement::Before(idx) => {
            seeds.insert(idx, seed);
            None
        }
        Placement::WidenStart { idx, widen_end } => {
            let item = &mut seeds[idx];
            item.read_start = seed.read_start;
            item.genome_start = seed.genome_start;
            if widen_end {
                item.read_end = seed.read_end;
                item.genome_end = seed.genome_end;
                Some(idx)
            } else {
                None
            }
        }
        Placement::Contained(_) => None,
        Placement::WidenEnd(idx) => {
            let item = &mut seeds[idx];
            item.read_end = seed.read_end;
            item.genome_end = seed.genome_end;
            Some(idx)
        }
        Placement::Append => {
            seeds.push(seed);
            None
        }
    };

    if let Some(idx) = widened {
        while idx + 1 < seeds.len() {
            let (item, next) = (&seeds[idx], &seeds[idx + 1]);
            if item.read_end < next.read_start {
                break;
            }
            if next.read_end > item.read_end && next.diagonal() != item.diagonal() {
                break;
            }
            let absorbed = seeds.remove(idx + 1);
            let item = &mut seeds[idx];
            if item.read_end < absorbed.read_end {
                item.read_end = absorbed.read_end;
                item.genome_end = absorbed.genome_end;
            }
        }
    }
}

/// Place a seed into the CAL list of one chromosome and strand, creating,
/// widening or merging CALs as needed.
pub fn generate_cals(
    cals: &mut Vec<Cal>,
    chromosome: usize,
    strand: Strand,
    seed: SeedRegion,
    max_cal_distance: u64,
) {
    let (start, end) = (seed.genome_start, seed.genome_end);

    let mut placement = Placement::Append;
    for (idx, item) in cals.iter().enumerate() {
        if start < item.start {
            placement = if end + max_cal_distance < item.start {
                Placement::Before(idx)
            } else {
                Placement::WidenStart {
                    idx,
                    widen_end: end > item.end,
                }
            };
            break;
        } else if end <= item.end {
            placement = Placement::Contained(idx);
            break;
        } else if item.end + max_cal_distance >= start {
            placement = Placement::WidenEnd(idx);
            break;
        }
    }

    let widened = match placement {
        Placement::Before(idx) => {
            let mut cal = Cal::new(chromosome, strand, start, end);
            insert_seed(&mut cal.seeds, seed);
            cals.insert(idx, cal);
            None
        }
        Placement::WidenStart { idx, widen_end } => {
            let item = &mut cals[idx];
            item.start = start;
            if widen_end {
                item.end = end;
            }
            insert_seed(&mut item.seeds, seed);
            widen_end.then_some(idx)
        }
        Placement::Contained(idx) => {
            insert_seed(&mut cals[idx].seeds, seed);
            None
        }
        Placement::WidenEnd(idx) => {
            let item = &mut cals[idx];
            item.end = end;
            insert_seed(&mut item.seeds, seed);
            Some(idx)
        }
        Placement::Append => {
            let mut cal = Cal::new(chromosome, strand, start, end);
            insert_seed(&mut cal.seeds, seed);
            cals.push(cal);
            None
        }
    };

    if let Some(idx) = widened {
        while idx + 1 < cals.len() {
            if cals[idx].end + max_cal_distance < cals[idx + 1].start {
                break;
            }
            let absorbed = cals.remove(idx + 1);
            log::trace!(
                "Merging CAL {}-{} into {}-{}",
                absorbed.start,
                absorbed.end,
                cals[idx].start,
                cals[idx].end
            );
            let item = &mut cals[idx];
            if item.end < absorbed.end {
                item.end = absorbed.end;
            }
            for seed in absorbed.seeds {
                insert_seed(&mut item.seeds, seed);
            }
        }
    }
}
