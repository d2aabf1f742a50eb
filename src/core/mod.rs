//! Core reusable components for spliced alignment.
//!
//! This module contains components that are agnostic to how candidates are
//! produced: CIGAR fragments, the Smith-Waterman kernel and its deferred
//! queue, sequence helpers, counters and I/O.

pub mod alignment;
pub mod cigar;
pub mod error;
pub mod io;
pub mod sequence;
pub mod stats;
