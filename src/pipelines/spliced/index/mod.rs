//! Collaborators the mapper reads from and writes to: genome access, suffix
//! search, and the caches of discovered exons and junctions.

pub mod genome;
pub mod junctions;
pub mod metaexon;
pub mod suffix;

pub use genome::{GenomeAccessor, ReferenceGenome};
pub use junctions::{Junction, JunctionId, JunctionStore, SpliceType};
pub use metaexon::{Metaexon, MetaexonCache, MetaexonSide};
pub use suffix::{SuffixArrayIndex, SuffixHits, SuffixSearch};
