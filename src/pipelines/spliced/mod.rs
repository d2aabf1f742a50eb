//! Spliced (RNA-seq) seed-to-alignment pipeline.
//!
//! # Stages
//!
//! 1. **Seeding** ([`seeding`]): suffix-array lookups along both strands of
//!    the read, grouped into CALs per chromosome ([`cal`]).
//! 2. **CAL merge** ([`merge`]): CALs on one chromosome and strand are chained
//!    across possible introns and scored by read coverage.
//! 3. **Gap filling** ([`gap_fill`], [`splice`]): gaps between seeds are
//!    closed by exact comparison, canonical splice-junction search or deferred
//!    Smith-Waterman alignment.
//! 4. **Read ends** ([`extremity`]): prefix and suffix extension.
//! 5. **Assembly** ([`assembly`]): per-seed fragments are concatenated into
//!    the final CIGAR and validated against the read length.
//!
//! [`ReadMapper`] drives one read through all stages; [`batch`] maps batches
//! of reads in parallel.

pub mod alignment;
pub mod assembly;
pub mod batch;
pub mod cal;
pub mod extremity;
pub mod gap_fill;
pub mod index;
pub mod mapper;
pub mod merge;
pub mod options;
pub mod read;
pub mod seeding;
pub mod splice;
pub mod workspace;

pub use alignment::{mapping_quality, Alignment};
pub use batch::{map_batch, process_reads, BatchResult};
pub use mapper::ReadMapper;
pub use options::{GapFillStrategy, MapCliOptions, MapperOpt};
pub use read::{Read, Strand};
