// Sequence helpers shared by seeding, gap filling and the SW kernel.
// Sequences are handled as uppercase ASCII (A, C, G, T, N).

/// Complement of an ASCII base; anything other than ACGT becomes N.
#[inline(always)]
pub fn complement_base(base: u8) -> u8 {
    match base {
        b'A' | b'a' => b'T',
        b'C' | b'c' => b'G',
        b'G' | b'g' => b'C',
        b'T' | b't' => b'A',
        _ => b'N',
    }
}

/// Reverse complement of an ASCII sequence.
///
/// # Example
/// ```
/// use ferrous_splice::core::sequence::reverse_complement;
///
/// assert_eq!(reverse_complement(b"ACGTN"), b"NACGT".to_vec());
/// ```
#[inline]
pub fn reverse_complement(seq: &[u8]) -> Vec<u8> {
    seq.iter().rev().map(|&b| complement_base(b)).collect()
}

/// Uppercase a sequence and map IUPAC ambiguity codes to N.
pub fn normalize_sequence(seq: &[u8]) -> Vec<u8> {
    seq.iter()
        .map(|&b| match b.to_ascii_uppercase() {
            c @ (b'A' | b'C' | b'G' | b'T') => c,
            _ => b'N',
        })
        .collect()
}

/// Number of positions where two equal-length slices differ.
/// N never matches, not even another N.
pub fn count_mismatches(a: &[u8], b: &[u8]) -> u32 {
    debug_assert_eq!(a.len(), b.len());
    a.iter()
        .zip(b.iter())
        .filter(|&(&x, &y)| x != y || x == b'N')
        .count() as u32
}
