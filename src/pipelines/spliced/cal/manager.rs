use super::insert::generate_cals;
use super::types::{Cal, SeedRegion};
use crate::pipelines::spliced::read::Strand;

/// Per-read CAL lists of one strand, one ordered list per chromosome.
///
/// Managers are reused across reads: `clear` empties the lists but keeps
/// their allocations.
#[derive(Debug, Clone)]
pub struct CalManager {
    strand: Strand,
    per_chromosome: Vec<Vec<Cal>>,
}

impl CalManager {
    pub fn new(strand: Strand, num_chromosomes: usize) -> Self {
        Self {
            strand,
            per_chromosome: vec![Vec::new(); num_chromosomes],
        }
    }

    pub fn strand(&self) -> Strand {
        self.strand
    }

    pub fn num_chromosomes(&self) -> usize {
        self.per_chromosome.len()
    }

    /// Grow to cover `num_chromosomes` lists; existing lists are kept.
    pub fn ensure_chromosomes(&mut self, num_chromosomes: usize) {
        if self.per_chromosome.len() < num_chromosomes {
            self.per_chromosome.resize_with(num_chromosomes, Vec::new);
        }
    }

    /// Route a seed into the CAL list of its chromosome.
    pub fn add_seed(&mut self, chromosome: usize, seed: SeedRegion, max_cal_distance: u64) {
        if chromosome >= self.per_chromosome.len() {
            self.ensure_chromosomes(chromosome + 1);
        }
        generate_cals(
            &mut self.per_chromosome[chromosome],
            chromosome,
            self.strand,
            seed,
            max_cal_distance,
        );
    }

    pub fn cals(&self, chromosome: usize) -> &[Cal] {
        self.per_chromosome
            .get(chromosome)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn num_cals(&self) -> usize {
        self.per_chromosome.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.num_cals() == 0
    }

    /// Move all CALs out, chromosome by chromosome, leaving the manager empty
    /// with its lists still allocated.
    pub fn drain(&mut self) -> impl Iterator<Item = Vec<Cal>> + '_ {
        self.per_chromosome.iter_mut().map(|list| list.drain(..).collect())
    }

    pub fn clear(&mut self) {
        for list in &mut self.per_chromosome {
            list.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeds_routed_per_chromosome() {
        let mut manager = CalManager::new(Strand::Forward, 2);
        manager.add_seed(0, SeedRegion::new(0, 19, 100, 119, 0), 50);
        manager.add_seed(1, SeedRegion::new(0, 19, 100, 119, 1), 50);
        manager.add_seed(1, SeedRegion::new(30, 49, 130, 149, 2), 50);
        assert_eq!(manager.num_cals(), 2);
        assert_eq!(manager.cals(1)[0].seeds.len(), 2);
        assert!(manager.cals(7).is_empty());
    }

    #[test]
    fn test_drain_and_clear() {
        let mut manager = CalManager::new(Strand::Reverse, 1);
        manager.add_seed(0, SeedRegion::new(0, 19, 100, 119, 0), 50);
        manager.add_seed(3, SeedRegion::new(0, 19, 100, 119, 1), 50);
        assert_eq!(manager.num_chromosomes(), 4);

        let drained: Vec<Vec<Cal>> = manager.drain().collect();
        assert_eq!(drained.iter().map(Vec::len).sum::<usize>(), 2);
        assert!(manager.is_empty());
        assert!(manager.per_chromosome[0].capacity() > 0);
        assert!(manager.per_chromosome[3].capacity() > 0);

        manager.add_seed(0, SeedRegion::new(0, 19, 100, 119, 2), 50);
        manager.clear();
        assert!(manager.is_empty());
        assert_eq!(manager.strand(), Strand::Reverse);
    }
}
