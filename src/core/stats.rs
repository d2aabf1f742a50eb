//! Process-wide mapping counters.
//!
//! Counters are plain atomics so worker threads update them without a lock;
//! `snapshot()` gives a consistent-enough view for progress and summary logs.

use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct MapperStats {
    total_reads: AtomicU64,
    unmapped_reads: AtomicU64,
    sw_invocations: AtomicU64,
    discarded_candidates: AtomicU64,
    exact_reads: AtomicU64,
    junctions_found: AtomicU64,
}

/// Plain-value copy of [`MapperStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub total_reads: u64,
    pub unmapped_reads: u64,
    pub sw_invocations: u64,
    pub discarded_candidates: u64,
    pub exact_reads: u64,
    pub junctions_found: u64,
}

impl MapperStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_read(&self) {
        self.total_reads.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_unmapped(&self) {
        self.unmapped_reads.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_sw_invocations(&self, n: u64) {
        self.sw_invocations.fetch_add(n, Ordering::Relaxed);
    }

    pub fn add_discarded(&self) {
        self.discarded_candidates.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_exact(&self) {
        self.exact_reads.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_junction(&self) {
        self.junctions_found.fetch_add(1, Ordering::Relaxed);
    }

    /// Fold a batch-local snapshot into these counters.
    pub fn merge(&self, other: &StatsSnapshot) {
        self.total_reads.fetch_add(other.total_reads, Ordering::Relaxed);
        self.unmapped_reads
            .fetch_add(other.unmapped_reads, Ordering::Relaxed);
        self.sw_invocations
            .fetch_add(other.sw_invocations, Ordering::Relaxed);
        self.discarded_candidates
            .fetch_add(other.discarded_candidates, Ordering::Relaxed);
        self.exact_reads.fetch_add(other.exact_reads, Ordering::Relaxed);
        self.junctions_found
            .fetch_add(other.junctions_found, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            total_reads: self.total_reads.load(Ordering::Relaxed),
            unmapped_reads: self.unmapped_reads.load(Ordering::Relaxed),
            sw_invocations: self.sw_invocations.load(Ordering::Relaxed),
            discarded_candidates: self.discarded_candidates.load(Ordering::Relaxed),
            exact_reads: self.exact_reads.load(Ordering::Relaxed),
            junctions_found: self.junctions_found.load(Ordering::Relaxed),
        }
    }

    /// Log a one-line summary at info level.
    pub fn log_summary(&self) {
        let s = self.snapshot();
        let mapped = s.total_reads.saturating_sub(s.unmapped_reads);
        let pct = if s.total_reads > 0 {
            mapped as f64 * 100.0 / s.total_reads as f64
        } else {
            0.0
        };
        log::info!(
            "Processed {} reads: {} mapped ({:.2}%), {} exact, {} unmapped",
            s.total_reads,
            mapped,
            pct,
            s.exact_reads,
            s.unmapped_reads
        );
        log::info!(
            "Smith-Waterman invocations: {}, discarded candidates: {}, junctions: {}",
            s.sw_invocations,
            s.discarded_candidates,
            s.junctions_found
        );
    }
}
