//! CIGAR fragments produced while closing gaps between seeds.
//!
//! A [`CigarCode`] is an ordered list of `(op, len)` pairs plus the edit
//! distance accumulated by whatever produced it (mismatch counting, splice
//! search or Smith-Waterman post-processing). Fragments are concatenated in
//! read order to build the final alignment CIGAR.

use std::fmt;
use std::str::FromStr;

/// An ordered CIGAR with its accumulated edit distance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CigarCode {
    /// `(op, len)` pairs, op is one of `M I D N S H = X`.
    pub ops: Vec<(u8, i32)>,
    /// Mismatches plus inserted and deleted bases.
    pub distance: u32,
}

#[inline]
fn consumes_query(op: u8) -> bool {
    matches!(op, b'M' | b'I' | b'S' | b'=' | b'X')
}

#[inline]
fn consumes_reference(op: u8) -> bool {
    matches!(op, b'M' | b'D' | b'N' | b'=' | b'X')
}

impl CigarCode {
    pub fn new() -> Self {
        Self::default()
    }

    /// Single-operation fragment, e.g. `M` over an exactly matched seed.
    pub fn from_op(op: u8, len: i32, distance: u32) -> Self {
        let mut cigar = Self::new();
        cigar.push(op, len);
        cigar.distance = distance;
        cigar
    }

    /// Append one operation, merging it into the last entry when the op matches.
    /// Zero and negative lengths are ignored.
    pub fn push(&mut self, op: u8, len: i32) {
        if len <= 0 {
            return;
        }
        match self.ops.last_mut() {
            Some((last_op, last_len)) if *last_op == op => *last_len += len,
            _ => self.ops.push((op, len)),
        }
    }

    /// Prepend one operation, merging it into the first entry when the op matches.
    pub fn push_front(&mut self, op: u8, len: i32) {
        if len <= 0 {
            return;
        }
        match self.ops.first_mut() {
            Some((first_op, first_len)) if *first_op == op => *first_len += len,
            _ => self.ops.insert(0, (op, len)),
        }
    }

    /// Concatenate another fragment; distances add up.
    pub fn append(&mut self, other: &CigarCode) {
        for &(op, len) in &other.ops {
            self.push(op, len);
        }
        self.distance += other.distance;
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn num_ops(&self) -> usize {
        self.ops.len()
    }

    /// Read bases covered (`M`, `I`, `S`, `=`, `X`).
    pub fn query_len(&self) -> i32 {
        self.ops
            .iter()
            .filter(|(op, _)| consumes_query(*op))
            .map(|(_, len)| len)
            .sum()
    }

    /// Reference bases spanned (`M`, `D`, `N`, `=`, `X`).
    pub fn reference_len(&self) -> i32 {
        self.ops
            .iter()
            .filter(|(op, _)| consumes_reference(*op))
            .map(|(_, len)| len)
            .sum()
    }

    /// Length of all `N` operations.
    pub fn intron_len(&self) -> i32 {
        self.ops
            .iter()
            .filter(|(op, _)| *op == b'N')
            .map(|(_, len)| len)
            .sum()
    }

    /// A CIGAR is valid for a read when it is non-empty and its `M`, `I` and
    /// `S` lengths add up to the read length exactly.
    pub fn validate(&self, read_len: usize) -> bool {
        !self.ops.is_empty()
            && self.ops.iter().all(|&(_, len)| len > 0)
            && self.query_len() as usize == read_len
    }

    /// Return a copy with an `N` of `intron_len` inserted after the first
    /// `ref_offset` reference-consuming (`M`/`D`) bases, splitting an operation
    /// when the intron falls inside it.
    pub fn with_intron_at(&self, ref_offset: i32, intron_len: i32) -> CigarCode {
        let mut out = CigarCode {
            ops: Vec::with_capacity(self.ops.len() + 2),
            distance: self.distance,
        };
        let mut remaining = ref_offset;
        let mut inserted = false;

        if remaining <= 0 {
            out.push(b'N', intron_len);
            inserted = true;
        }

        for &(op, len) in &self.ops {
            if inserted || !matches!(op, b'M' | b'D') {
                out.push(op, len);
                continue;
            }
            if len < remaining {
                out.push(op, len);
                remaining -= len;
            } else {
                out.push(op, remaining);
                out.push(b'N', intron_len);
                out.push(op, len - remaining);
                inserted = true;
            }
        }

        if !inserted {
            out.push(b'N', intron_len);
        }
        out
    }
}

impl fmt::Display for CigarCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.ops.is_empty() {
            return write!(f, "*");
        }
        for &(op, len) in &self.ops {
            write!(f, "{}{}", len, op as char)?;
        }
        Ok(())
    }
}

impl FromStr for CigarCode {
    type Err = String;

    /// Parse a CIGAR string such as `75M800N75M`; distance is left at 0.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut cigar = CigarCode::new();
        if s == "*" {
            return Ok(cigar);
        }
        let mut len: i32 = 0;
        let mut has_digits = false;
        for c in s.bytes() {
            match c {
                b'0'..=b'9' => {
                    len = len
                        .checked_mul(10)
                        .and_then(|l| l.checked_add((c - b'0') as i32))
                        .ok_or_else(|| format!("CIGAR length overflow in {}", s))?;
                    has_digits = true;
                }
                b'M' | b'I' | b'D' | b'N' | b'S' | b'H' | b'=' | b'X' => {
                    if !has_digits {
                        return Err(format!("Missing length before '{}' in {}", c as char, s));
                    }
                    cigar.push(c, len);
                    len = 0;
                    has_digits = false;
                }
                _ => return Err(format!("Invalid CIGAR operation '{}' in {}", c as char, s)),
            }
        }
        if has_digits {
            return Err(format!("Trailing length without operation in {}", s));
        }
        Ok(cigar)
    }
}
