//! Typed errors raised by the mapping core.
//!
//! Ambiguity (no splice motif, too many mismatches, a CIGAR that fails
//! validation) is not an error: the candidate is dropped and mapping goes on.
//! The variants below cover bounds and resource violations, which abort only
//! the candidate or read being processed.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MapError {
    /// A genome or query window is larger than the configured scratch bound.
    #[error("interval of {len} nt exceeds the maximum window of {max} nt")]
    IntervalTooLarge {
        /// Requested window length.
        len: usize,
        /// Configured upper bound.
        max: usize,
    },

    /// A read coordinate would index past the end of the sequence.
    #[error("read position {pos} is out of bounds for a read of length {len}")]
    ReadOutOfBounds { pos: i64, len: usize },

    #[error("chromosome {chromosome} out of range ({count} chromosomes loaded)")]
    ChromosomeOutOfRange { chromosome: usize, count: usize },

    #[error("range {start}..={end} is outside chromosome {chromosome} (length {len})")]
    GenomeRangeOutOfBounds {
        chromosome: usize,
        start: u64,
        end: u64,
        len: u64,
    },

    #[error("invalid options: {0}")]
    InvalidOptions(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl MapError {
    /// Build an `InvalidOptions` error from the list produced by option validation.
    pub fn invalid_options(errors: &[String]) -> Self {
        MapError::InvalidOptions(errors.join("; "))
    }

    /// True for errors that only invalidate the current candidate.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, MapError::InvalidOptions(_) | MapError::Io(_))
    }
}
