//! Candidate alignment locations (CALs): seed placement, CAL merging and
//! consistency checks.

pub mod insert;
pub mod manager;
pub mod purge;
pub mod types;

pub use insert::{generate_cals, insert_seed};
pub use manager::CalManager;
pub use purge::{cal_purge, validate_cal};
pub use types::{Cal, SeedRegion};
