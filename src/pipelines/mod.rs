//! Spliced read mapping pipelines.

pub mod spliced;
