//! Thread-local workspace for the per-read CAL managers.
//!
//! Every read needs one `CalManager` per strand. Rather than allocating the
//! per-chromosome lists for each read, each worker thread keeps a pair and
//! clears it before the next read.

use super::cal::CalManager;
use super::read::Strand;
use std::cell::RefCell;

thread_local! {
    static WORKSPACE: RefCell<MappingWorkspace> = RefCell::new(MappingWorkspace::new());
}

/// Reusable per-thread state of the seeding stage.
pub struct MappingWorkspace {
    /// Forward manager first, reverse second.
    pub managers: Vec<CalManager>,
}

impl MappingWorkspace {
    pub fn new() -> Self {
        Self {
            managers: Strand::BOTH.iter().map(|&s| CalManager::new(s, 0)).collect(),
        }
    }

    /// Empty both managers and make sure they cover `num_chromosomes`.
    pub fn reset(&mut self, num_chromosomes: usize) {
        for manager in &mut self.managers {
            manager.clear();
            manager.ensure_chromosomes(num_chromosomes);
        }
    }

    pub fn manager_mut(&mut self, strand: Strand) -> &mut CalManager {
        &mut self.managers[strand.index()]
    }
}

impl Default for MappingWorkspace {
    fn default() -> Self {
        Self::new()
    }
}

/// Run `f` with this thread's workspace. Must not be nested.
pub fn with_workspace<F, R>(f: F) -> R
where
    F: FnOnce(&mut MappingWorkspace) -> R,
{
    WORKSPACE.with(|ws| f(&mut ws.borrow_mut()))
}
