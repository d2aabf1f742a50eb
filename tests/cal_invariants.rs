// Property tests for seed and CAL bookkeeping

use ferrous_splice::pipelines::spliced::cal::{cal_purge, generate_cals, Cal, SeedRegion};
use ferrous_splice::pipelines::spliced::merge::merge_score;
use ferrous_splice::pipelines::spliced::Strand;
use proptest::prelude::*;
use std::collections::BTreeSet;

const READ_LEN: i32 = 150;
const DIAGONALS: [u64; 3] = [1_000, 11_000, 21_000];

/// (diagonal index, read_start, length)
fn seed_specs() -> impl Strategy<Value = Vec<(usize, i32, i32)>> {
    prop::collection::vec((0..DIAGONALS.len(), 0..READ_LEN - 18, 18..40i32), 1..40)
}

/// (diagonal index, shift off the diagonal, read_start, length); a shift
/// stands for indels between seeds of the same locus.
fn shifted_seed_specs() -> impl Strategy<Value = Vec<(usize, u64, i32, i32)>> {
    prop::collection::vec((0..DIAGONALS.len(), 0..4u64, 0..READ_LEN - 18, 18..40i32), 1..40)
}

fn seed_on_diagonal(diag: u64, read_start: i32, len: i32, id: u32) -> SeedRegion {
    let read_end = (read_start + len - 1).min(READ_LEN - 1);
    SeedRegion::new(
        read_start,
        read_end,
        diag + read_start as u64,
        diag + read_end as u64,
        id,
    )
}

fn read_positions(seeds: &[SeedRegion]) -> BTreeSet<i32> {
    seeds.iter().flat_map(|s| s.read_start..=s.read_end).collect()
}

proptest! {
    #[test]
    fn inserted_seeds_stay_ordered_and_spans_settled(specs in seed_specs()) {
        let mut cals = Vec::new();
        for (id, &(d, rs, len)) in specs.iter().enumerate() {
            let seed = seed_on_diagonal(DIAGONALS[d], rs, len, id as u32);
            generate_cals(&mut cals, 0, Strand::Forward, seed, READ_LEN as u64);
        }

        for pair in cals.windows(2) {
            prop_assert!(pair[0].end < pair[1].start);
        }
        for cal in &cals {
            prop_assert!(!cal.seeds.is_empty());
            for pair in cal.seeds.windows(2) {
                prop_assert!(pair[0].read_end < pair[1].read_start);
                prop_assert!(pair[0].genome_end < pair[1].genome_start);
            }
            let min_start = cal.seeds.iter().map(|s| s.genome_start).min().unwrap();
            let max_end = cal.seeds.iter().map(|s| s.genome_end).max().unwrap();
            prop_assert_eq!(cal.start, min_start);
            prop_assert_eq!(cal.end, max_end);
        }
    }

    #[test]
    fn off_diagonal_seeds_are_never_merged(specs in shifted_seed_specs()) {
        let mut cals = Vec::new();
        for (id, &(d, shift, rs, len)) in specs.iter().enumerate() {
            let seed = seed_on_diagonal(DIAGONALS[d] + shift, rs, len, id as u32);
            generate_cals(&mut cals, 0, Strand::Forward, seed, READ_LEN as u64);
        }

        for pair in cals.windows(2) {
            prop_assert!(pair[0].end < pair[1].start);
        }
        for cal in &cals {
            prop_assert!(!cal.seeds.is_empty());
            for seed in &cal.seeds {
                prop_assert_eq!(seed.read_len() as i64, seed.genome_len());
                prop_assert!(cal.start <= seed.genome_start && seed.genome_end <= cal.end);
            }
            for pair in cal.seeds.windows(2) {
                prop_assert!(pair[0].read_start <= pair[1].read_start);
            }
        }
    }

    #[test]
    fn insertion_preserves_read_coverage(specs in shifted_seed_specs()) {
        let mut cals = Vec::new();
        let mut expected: Vec<BTreeSet<i32>> = vec![BTreeSet::new(); DIAGONALS.len()];
        for (id, &(d, shift, rs, len)) in specs.iter().enumerate() {
            let seed = seed_on_diagonal(DIAGONALS[d] + shift, rs, len, id as u32);
            expected[d].extend(seed.read_start..=seed.read_end);
            generate_cals(&mut cals, 0, Strand::Forward, seed, READ_LEN as u64);
        }

        for cal in &cals {
            let d = DIAGONALS.iter().rposition(|&diag| cal.start >= diag).unwrap();
            prop_assert_eq!(read_positions(&cal.seeds), expected[d].clone());
        }
    }

    #[test]
    fn purge_leaves_no_overlapping_neighbours(
        raw in prop::collection::vec((0..READ_LEN - 20, 5..40i32, 0u64..400), 1..20)
    ) {
        let mut cal = Cal::new(0, Strand::Forward, 0, 0);
        cal.seeds = raw
            .iter()
            .enumerate()
            .map(|(id, &(rs, len, gs))| SeedRegion::new(rs, rs + len - 1, gs, gs + len as u64 - 1, id as u32))
            .collect();
        cal.seeds.sort_by_key(|s| s.read_start);
        cal.settle_span();
        cal_purge(&mut cal);

        prop_assert!(!cal.seeds.is_empty());
        for pair in cal.seeds.windows(2) {
            prop_assert!(pair[0].read_end < pair[1].read_start);
            prop_assert!(pair[0].genome_end < pair[1].genome_start);
        }
    }

    #[test]
    fn merge_score_grows_with_coverage(split in 20..120i32, extra in 5..25i32) {
        let mut cal = Cal::new(0, Strand::Forward, 0, 0);
        cal.seeds.push(seed_on_diagonal(5_000, 0, split, 0));
        cal.settle_span();
        let before = merge_score(std::slice::from_ref(&cal), READ_LEN as usize);

        let next_start = split + 2;
        cal.seeds.push(seed_on_diagonal(5_000, next_start, extra, 1));
        cal.settle_span();
        let after = merge_score(std::slice::from_ref(&cal), READ_LEN as usize);
        prop_assert!(after >= before);
        prop_assert!(after <= 100.0);
    }
}
