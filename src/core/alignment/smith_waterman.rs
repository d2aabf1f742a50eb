//! Affine-gap local alignment (Smith-Waterman-Gotoh) with full traceback.
//!
//! The mapper only aligns short windows (read gaps, splice candidates and
//! read ends against a bounded genome window), so a scalar O(m*n) kernel with
//! a byte traceback matrix is sufficient. The [`AlignmentKernel`] trait is the
//! seam for plugging in a vectorised batch kernel.

use crate::defaults;

// Traceback encoding: low 2 bits give the H source, bit 2/3 mark E/F extension.
const TB_STOP: u8 = 0;
const TB_MATCH: u8 = 1;
const TB_DEL: u8 = 2;
const TB_INS: u8 = 3;
const TB_E_EXT: u8 = 1 << 2;
const TB_F_EXT: u8 = 1 << 3;

const NEG_INF: i32 = i32::MIN / 2;

/// Scoring for the local aligner. A gap of length k costs `gap_open + k * gap_extend`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwScoring {
    pub match_score: i32,
    pub mismatch_penalty: i32,
    pub gap_open: i32,
    pub gap_extend: i32,
}

impl Default for SwScoring {
    fn default() -> Self {
        Self {
            match_score: defaults::MATCH_SCORE,
            mismatch_penalty: defaults::MISMATCH_PENALTY,
            gap_open: defaults::GAP_OPEN_PENALTY,
            gap_extend: defaults::GAP_EXTEND_PENALTY,
        }
    }
}

/// Result of one local alignment. Coordinates are 0-based, ends exclusive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SwHit {
    pub score: i32,
    pub query_start: usize,
    pub query_end: usize,
    pub ref_start: usize,
    pub ref_end: usize,
    /// Operations of the aligned core only (`M`, `I`, `D`).
    pub ops: Vec<(u8, i32)>,
    /// Mismatching `M` positions inside the aligned core.
    pub mismatches: u32,
}

impl SwHit {
    /// Score normalised by the best possible score for the query,
    /// `score / (query_len * match_score)`.
    pub fn normalized_score(&self, query_len: usize, match_score: i32) -> f32 {
        if query_len == 0 || match_score <= 0 {
            return 0.0;
        }
        self.score as f32 / (query_len as f32 * match_score as f32)
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

/// Batched local alignment. Implementations must be deterministic: identical
/// inputs give identical hits.
pub trait AlignmentKernel: Send + Sync {
    fn align_batch(&self, queries: &[&[u8]], references: &[&[u8]]) -> Vec<SwHit>;

    fn scoring(&self) -> SwScoring;
}

/// Scalar Gotoh aligner.
#[derive(Debug, Clone, Default)]
pub struct ScalarSmithWaterman {
    pub scoring: SwScoring,
}

impl ScalarSmithWaterman {
    pub fn new(scoring: SwScoring) -> Self {
        Self { scoring }
    }

    #[inline(always)]
    fn substitution(&self, q: u8, r: u8) -> i32 {
        if q == r && q != b'N' {
            self.scoring.match_score
        } else {
            -self.scoring.mismatch_penalty
        }
    }

    /// Align one query against one reference.
    ///
    /// Ties are broken towards the diagonal, then deletions, then insertions,
    /// and the first maximal cell in row-major order is the alignment end.
    pub fn align_pair(&self, query: &[u8], reference: &[u8]) -> SwHit {
        let m = query.len();
        let n = reference.len();
        if m == 0 || n == 0 {
            return SwHit::default();
        }

        let oe = self.scoring.gap_open + self.scoring.gap_extend;
        let ext = self.scoring.gap_extend;
        let width = n + 1;

        let mut h_prev = vec![0i32; width];
        let mut h_cur = vec![0i32; width];
        let mut f = vec![NEG_INF; width];
        let mut tb = vec![TB_STOP; (m + 1) * width];

        let mut best = 0i32;
        let mut best_i = 0usize;
        let mut best_j = 0usize;

        for i in 1..=m {
            let qb = query[i - 1];
            let mut e = NEG_INF;
            h_cur[0] = 0;
            for j in 1..=n {
                let mut flags = 0u8;

                // E: gap in the query (reference base consumed, 'D')
                let e_open = h_cur[j - 1] - oe;
                let e_ext = e - ext;
                if e_ext > e_open {
                    e = e_ext;
                    flags |= TB_E_EXT;
                } else {
                    e = e_open;
                }

                // F: gap in the reference (query base consumed, 'I')
                let f_open = h_prev[j] - oe;
                let f_ext = f[j] - ext;
                if f_ext > f_open {
                    f[j] = f_ext;
                    flags |= TB_F_EXT;
                } else {
                    f[j] = f_open;
                }

                let diag = h_prev[j - 1] + self.substitution(qb, reference[j - 1]);
                let mut h = 0;
                let mut dir = TB_STOP;
                if diag > h {
                    h = diag;
                    dir = TB_MATCH;
                }
                if e > h {
                    h = e;
                    dir = TB_DEL;
                }
                if f[j] > h {
                    h = f[j];
                    dir = TB_INS;
                }

                h_cur[j] = h;
                tb[i * width + j] = dir | flags;

                if h > best {
                    best = h;
                    best_i = i;
                    best_j = j;
                }
            }
            std::mem::swap(&mut h_prev, &mut h_cur);
        }

        if best == 0 {
            return SwHit::default();
        }

        // Traceback
        #[derive(Clone, Copy, PartialEq)]
        enum State {
            H,
            E,
            F,
        }
        let mut state = State::H;
        let (mut i, mut j) = (best_i, best_j);
        let mut rev_ops: Vec<u8> = Vec::with_capacity(best_i + best_j);
        let mut mismatches = 0u32;

        while i > 0 && j > 0 {
            let cell = tb[i * width + j];
            match state {
                State::H => match cell & 0b11 {
                    TB_MATCH => {
                        if query[i - 1] != reference[j - 1] || query[i - 1] == b'N' {
                            mismatches += 1;
                        }
                        rev_ops.push(b'M');
                        i -= 1;
                        j -= 1;
                    }
                    TB_DEL => state = State::E,
                    TB_INS => state = State::F,
                    _ => break,
                },
                State::E => {
                    rev_ops.push(b'D');
                    if cell & TB_E_EXT == 0 {
                        state = State::H;
                    }
                    j -= 1;
                }
                State::F => {
                    rev_ops.push(b'I');
                    if cell & TB_F_EXT == 0 {
                        state = State::H;
                    }
                    i -= 1;
                }
            }
        }

        let mut ops: Vec<(u8, i32)> = Vec::new();
        for &op in rev_ops.iter().rev() {
            match ops.last_mut() {
                Some((last, len)) if *last == op => *len += 1,
                _ => ops.push((op, 1)),
            }
        }

        SwHit {
            score: best,
            query_start: i,
            query_end: best_i,
            ref_start: j,
            ref_end: best_j,
            ops,
            mismatches,
        }
    }
}

impl AlignmentKernel for ScalarSmithWaterman {
    fn align_batch(&self, queries: &[&[u8]], references: &[&[u8]]) -> Vec<SwHit> {
        debug_assert_eq!(queries.len(), references.len());
        queries
            .iter()
            .zip(references.iter())
            .map(|(q, r)| self.align_pair(q, r))
            .collect()
    }

    fn scoring(&self) -> SwScoring {
        self.scoring
    }
}
