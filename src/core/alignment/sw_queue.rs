//! Deferred, batched Smith-Waterman work.
//!
//! Gap filling does not align gaps one by one: each unresolved gap (or read
//! end) is pushed into a fixed-depth queue together with a handle naming the
//! seed or extremity that owns the result. When the queue is full, or when the
//! caller flushes it, the whole batch goes through one
//! [`AlignmentKernel::align_batch`] call and the results are converted into
//! CIGAR fragments.
//!
//! ## Acceptance
//!
//! - `Middle` items are always accepted: they are the only way to close an
//!   internal gap.
//! - `First`/`Last` items (read-end extensions) are accepted only when the
//!   normalised score is above the configured threshold. Rejected items are
//!   still reported, with `fragment: None`, so the owner knows the extremity
//!   stays open.

use super::smith_waterman::{AlignmentKernel, SwHit};
use crate::core::cigar::CigarCode;
use crate::core::sequence::count_mismatches;

/// Where in the read an item sits, which decides how unaligned ends are encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SwItemKind {
    /// Read prefix before the first seed; unaligned query start is soft-clipped.
    First,
    /// Gap between two seeds; the fragment spans both windows completely.
    Middle,
    /// Read suffix after the last seed; unaligned query end is soft-clipped.
    Last,
}

/// One queued alignment.
#[derive(Debug, Clone)]
pub struct SwItem<T> {
    pub query: Vec<u8>,
    pub reference: Vec<u8>,
    pub kind: SwItemKind,
    pub owner: T,
}

/// Result delivered back to the owner of an item.
#[derive(Debug, Clone)]
pub struct SwOutcome<T> {
    pub owner: T,
    pub kind: SwItemKind,
    pub fragment: Option<CigarCode>,
    pub norm_score: f32,
}

/// Fixed-capacity queue of pending alignments.
pub struct SwQueue<T> {
    depth: usize,
    min_extremity_score: f32,
    items: Vec<SwItem<T>>,
    completed: Vec<SwOutcome<T>>,
    invocations: u64,
}

impl<T> SwQueue<T> {
    pub fn new(depth: usize, min_extremity_score: f32) -> Self {
        let depth = depth.max(1);
        Self {
            depth,
            min_extremity_score,
            items: Vec::with_capacity(depth),
            completed: Vec::new(),
            invocations: 0,
        }
    }

    /// Queue an item; the batch is processed as soon as the queue is full.
    pub fn push(&mut self, item: SwItem<T>, kernel: &dyn AlignmentKernel) {
        self.items.push(item);
        if self.items.len() >= self.depth {
            self.process(kernel);
        }
    }

    /// Process whatever is pending. Must be called before the outcomes are
    /// collected, otherwise owners of pending items never get a fragment.
    pub fn flush(&mut self, kernel: &dyn AlignmentKernel) {
        if !self.items.is_empty() {
            self.process(kernel);
        }
    }

    /// Take all outcomes produced so far.
    pub fn take_completed(&mut self) -> Vec<SwOutcome<T>> {
        std::mem::take(&mut self.completed)
    }

    pub fn pending(&self) -> usize {
        self.items.len()
    }

    /// Number of individual alignments run through the kernel.
    pub fn invocations(&self) -> u64 {
        self.invocations
    }

    fn process(&mut self, kernel: &dyn AlignmentKernel) {
        let items = std::mem::take(&mut self.items);
        let queries: Vec<&[u8]> = items.iter().map(|it| it.query.as_slice()).collect();
        let references: Vec<&[u8]> = items.iter().map(|it| it.reference.as_slice()).collect();
        let hits = kernel.align_batch(&queries, &references);
        let match_score = kernel.scoring().match_score;
        self.invocations += items.len() as u64;

        for (item, hit) in items.into_iter().zip(hits) {
            let norm_score = hit.normalized_score(item.query.len(), match_score);
            let accepted = match item.kind {
                SwItemKind::Middle => true,
                SwItemKind::First | SwItemKind::Last => norm_score > self.min_extremity_score,
            };
            log::trace!(
                "SW {:?} item: qlen={} rlen={} score={} norm={:.3} accepted={}",
                item.kind,
                item.query.len(),
                item.reference.len(),
                hit.score,
                norm_score,
                accepted
            );
            let fragment = accepted
                .then(|| generate_fragment(&hit, &item.query, &item.reference, item.kind));
            self.completed.push(SwOutcome {
                owner: item.owner,
                kind: item.kind,
                fragment,
                norm_score,
            });
        }
    }
}

impl<T> Drop for SwQueue<T> {
    fn drop(&mut self) {
        if !self.items.is_empty() {
            log::warn!(
                "SW queue dropped with {} unprocessed items",
                self.items.len()
            );
        }
    }
}

/// Turn a local alignment into a fragment covering the whole item.
///
/// Unaligned ends of a `Middle` item become matched bases (mismatches
/// counted) plus an insertion or deletion for the length difference, so the
/// fragment consumes the full query and reference. `First` soft-clips the
/// query start and leaves the reference start unconsumed; `Last` does the
/// same at the end.
pub fn generate_fragment(hit: &SwHit, query: &[u8], reference: &[u8], kind: SwItemKind) -> CigarCode {
    let qlen = query.len();
    let rlen = reference.len();
    let (qs, rs) = if hit.is_empty() { (0, 0) } else { (hit.query_start, hit.ref_start) };
    let (qe, re) = if hit.is_empty() { (0, 0) } else { (hit.query_end, hit.ref_end) };

    let mut fragment = CigarCode::new();
    let mut mismatches = hit.mismatches;
    let mut indels = 0u32;

    // Leading part
    if kind == SwItemKind::First {
        fragment.push(b'S', qs as i32);
    } else {
        let common = qs.min(rs);
        mismatches += count_mismatches(&query[..common], &reference[..common]);
        fragment.push(b'M', common as i32);
        fragment.push(b'I', (qs - common) as i32);
        fragment.push(b'D', (rs - common) as i32);
        indels += (qs - common + rs - common) as u32;
    }

    for &(op, len) in &hit.ops {
        fragment.push(op, len);
        if op == b'I' || op == b'D' {
            indels += len as u32;
        }
    }

    // Trailing part
    let tq = qlen - qe;
    let tr = rlen - re;
    if kind == SwItemKind::Last {
        fragment.push(b'S', tq as i32);
    } else {
        let common = tq.min(tr);
        fragment.push(b'I', (tq - common) as i32);
        fragment.push(b'D', (tr - common) as i32);
        indels += (tq - common + tr - common) as u32;
        mismatches += count_mismatches(&query[qlen - common..], &reference[rlen - common..]);
        fragment.push(b'M', common as i32);
    }

    fragment.distance = mismatches + indels;
    fragment
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::alignment::smith_waterman::ScalarSmithWaterman;

    #[test]
    fn test_queue_processes_when_full() {
        let kernel = ScalarSmithWaterman::default();
        let mut queue: SwQueue<usize> = SwQueue::new(2, 0.4);
        queue.push(
            SwItem { query: b"ACGTACGT".to_vec(), reference: b"ACGTACGT".to_vec(), kind: SwItemKind::Middle, owner: 0 },
            &kernel,
        );
        assert_eq!(queue.pending(), 1);
        queue.push(
            SwItem { query: b"TTGACCAG".to_vec(), reference: b"TTGACCAG".to_vec(), kind: SwItemKind::Middle, owner: 1 },
            &kernel,
        );
        assert_eq!(queue.pending(), 0);
        let done = queue.take_completed();
        assert_eq!(done.len(), 2);
        assert_eq!(done[0].owner, 0);
        assert_eq!(done[1].fragment.as_ref().unwrap().to_string(), "8M");
        assert_eq!(queue.invocations(), 2);
    }

    #[test]
    fn test_flush_delivers_partial_batch() {
        let kernel = ScalarSmithWaterman::default();
        let mut queue: SwQueue<&str> = SwQueue::new(4, 0.4);
        queue.push(
            SwItem { query: b"GATTACA".to_vec(), reference: b"GATTACA".to_vec(), kind: SwItemKind::Middle, owner: "gap" },
            &kernel,
        );
        assert!(queue.take_completed().is_empty());
        queue.flush(&kernel);
        let done = queue.take_completed();
        assert_eq!(done.len(), 1);
        assert_eq!(done[0].owner, "gap");
    }

    #[test]
    fn test_low_scoring_extremity_is_rejected() {
        let kernel = ScalarSmithWaterman::default();
        let mut queue: SwQueue<u8> = SwQueue::new(4, 0.4);
        queue.push(
            SwItem { query: b"AAAAAAAAAA".to_vec(), reference: b"CCCCCCCCCCCCCCCCCCCC".to_vec(), kind: SwItemKind::First, owner: 7 },
            &kernel,
        );
        // Middle items are kept regardless of score
        queue.push(
            SwItem { query: b"AAAAAAAAAA".to_vec(), reference: b"CCCCCCCCCC".to_vec(), kind: SwItemKind::Middle, owner: 8 },
            &kernel,
        );
        queue.flush(&kernel);
        let done = queue.take_completed();
        assert!(done[0].fragment.is_none());
        let middle = done[1].fragment.as_ref().unwrap();
        assert_eq!(middle.to_string(), "10M");
        assert_eq!(middle.distance, 10);
    }

    #[test]
    fn test_first_fragment_soft_clips_and_skips_reference() {
        let kernel = ScalarSmithWaterman::default();
        // Last 12 query bases match the last 12 reference bases
        let query = b"TTTTACGTTGCAAGCT";
        let reference = b"GGGGGGGGGGGGACGTTGCAAGCT";
        let hit = kernel.align_pair(query, reference);
        let fragment = generate_fragment(&hit, query, reference, SwItemKind::First);
        assert_eq!(fragment.to_string(), "4S12M");
        assert_eq!(fragment.query_len() as usize, query.len());
        assert_eq!(fragment.reference_len(), 12);
        assert_eq!(fragment.distance, 0);
    }

    #[test]
    fn test_last_fragment_soft_clips_tail() {
        let kernel = ScalarSmithWaterman::default();
        let query = b"ACGTTGCAAGCTTTTT";
        let reference = b"ACGTTGCAAGCTGGGGGGGGGGGG";
        let hit = kernel.align_pair(query, reference);
        let fragment = generate_fragment(&hit, query, reference, SwItemKind::Last);
        assert_eq!(fragment.to_string(), "12M4S");
    }

    #[test]
    fn test_middle_fragment_covers_both_windows() {
        let kernel = ScalarSmithWaterman::default();
        let query = b"CAGTCCATGGACTTAG";
        let reference = b"CAGTCCATGGACGGTTAG";
        let hit = kernel.align_pair(query, reference);
        let fragment = generate_fragment(&hit, query, reference, SwItemKind::Middle);
        assert_eq!(fragment.query_len() as usize, query.len());
        assert_eq!(fragment.reference_len() as usize, reference.len());
        assert!(fragment.distance >= 2);
    }
}
