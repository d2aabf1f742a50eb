// src/defaults.rs

// Seeding Constants
pub const SEED_SIZE: usize = 18;
pub const MAX_SUFFIX_HITS: usize = 50;
pub const MAX_EXACT_ALIGNMENTS: usize = 100;

// Intron Constants
pub const MIN_INTRON_SIZE: u64 = 40;
pub const MAX_INTRON_SIZE: u64 = 500_000;

// Target Selection Constants
pub const MAX_TARGETS: usize = 200;
pub const MAX_REPORTED: usize = 5;
pub const MIN_REPORT_SCORE: f32 = 25.0;
pub const SOFT_CLIP_MIN_SCORE: f32 = 60.0;

// Smith-Waterman Constants
pub const EXTREMITY_MIN_NORM_SCORE: f32 = 0.4;
pub const MAX_REFERENCE_WINDOW: usize = 2048;
pub const SW_BATCH_DEPTH: usize = 4;
pub const MATCH_SCORE: i32 = 5;
pub const MISMATCH_PENALTY: i32 = 4;
pub const GAP_OPEN_PENALTY: i32 = 10;
pub const GAP_EXTEND_PENALTY: i32 = 1;

// Gap-fill Constants
pub const GAP_FLANK: i32 = 8;
pub const MIN_GAP: i32 = 5;
pub const MAX_AUTO_TRIM: i32 = 10;
pub const MAX_CAL_READ_OVERLAP: i32 = 5;

// Splice Search Constants
pub const SPLICE_FLANK: i64 = 20;
pub const SECURITY_FLANK: i32 = 5;
pub const SEMI_CANONICAL_FLANK: i32 = 10;
pub const SPLICE_LENGTH_TOLERANCE: i64 = 4;

// Read-end Extension Constants
pub const EXTREMITY_MARGIN: u64 = 10;

// Other Constants
pub const VERBOSITY: i32 = 3;
pub const BATCH_SIZE: usize = 4096;
