//! Local alignment kernel and the deferred batch queue in front of it.
//!
//! Both are agnostic to where the query and reference windows come from:
//! the spliced pipeline feeds them read gaps, splice candidates and read ends.

pub mod smith_waterman;
pub mod sw_queue;

pub use smith_waterman::{AlignmentKernel, ScalarSmithWaterman, SwHit, SwScoring};
pub use sw_queue::{generate_fragment, SwItem, SwItemKind, SwOutcome, SwQueue};
