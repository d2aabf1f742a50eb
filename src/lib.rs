//! FerrousSplice - spliced read mapper for RNA-seq data.
//!
//! Reads are seeded against a suffix-array index, seeds are grouped into
//! candidate alignment locations (CALs), CALs are chained across possible
//! introns, and the gaps between seeds are closed by exact comparison,
//! canonical splice-junction search or Smith-Waterman alignment.

pub mod core;
pub mod defaults;
pub mod pipelines;

pub use crate::core::cigar::CigarCode;
pub use crate::core::error::MapError;
pub use crate::pipelines::spliced::{Alignment, MapperOpt, Read, ReadMapper};
