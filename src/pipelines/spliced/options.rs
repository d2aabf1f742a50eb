// Mapping options and their command-line surface.

use clap::Args;
use std::path::PathBuf;

use crate::core::alignment::SwScoring;
use crate::defaults;

/// Order in which gap-fill strategies are tried for a seed pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GapFillStrategy {
    /// Splice search first, then exact comparison, then Smith-Waterman.
    #[default]
    SpliceFirst,
    /// Exact comparison first, then splice search, then Smith-Waterman.
    ExactFirst,
}

impl std::str::FromStr for GapFillStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "splice-first" | "splice" => Ok(GapFillStrategy::SpliceFirst),
            "exact-first" | "exact" => Ok(GapFillStrategy::ExactFirst),
            _ => Err(format!(
                "Unknown gap-fill strategy '{}' (expected splice-first or exact-first)",
                s
            )),
        }
    }
}

/// Mapping options
#[derive(Debug, Clone)]
pub struct MapperOpt {
    // Seeding parameters
    pub seed_size: usize,            // Suffix-search seed length (k)
    pub max_suffix_hits: usize,      // Seeds with more hits are non-informative
    pub max_exact_alignments: usize, // Cap on exact-read hits reported per strand

    // Intron parameters
    pub min_intron_size: u64, // Gap-fill intron threshold
    pub max_intron_size: u64, // CAL-merge distance

    // Target selection
    pub max_targets: usize,      // Target groups scored per read
    pub max_reported: usize,     // Best target groups processed per read
    pub min_report_score: f32,   // Secondary groups below this coverage are dropped
    pub soft_clip_min_score: f32, // Rescue unclosed ends by soft clipping above this coverage

    // Smith-Waterman parameters
    pub extremity_min_norm_score: f32, // FIRST/LAST acceptance threshold
    pub max_reference_window: usize,   // Largest genome window fetched at once
    pub sw_batch_depth: usize,         // Deferred SW queue depth
    pub match_score: i32,
    pub mismatch_penalty: i32,
    pub gap_open: i32,
    pub gap_extend: i32,

    pub gap_fill: GapFillStrategy,

    // Processing parameters
    pub threads: usize,
    pub batch_size: usize,
    pub verbosity: i32,
}

impl Default for MapperOpt {
    fn default() -> Self {
        Self {
            seed_size: defaults::SEED_SIZE,
            max_suffix_hits: defaults::MAX_SUFFIX_HITS,
            max_exact_alignments: defaults::MAX_EXACT_ALIGNMENTS,
            min_intron_size: defaults::MIN_INTRON_SIZE,
            max_intron_size: defaults::MAX_INTRON_SIZE,
            max_targets: defaults::MAX_TARGETS,
            max_reported: defaults::MAX_REPORTED,
            min_report_score: defaults::MIN_REPORT_SCORE,
            soft_clip_min_score: defaults::SOFT_CLIP_MIN_SCORE,
            extremity_min_norm_score: defaults::EXTREMITY_MIN_NORM_SCORE,
            max_reference_window: defaults::MAX_REFERENCE_WINDOW,
            sw_batch_depth: defaults::SW_BATCH_DEPTH,
            match_score: defaults::MATCH_SCORE,
            mismatch_penalty: defaults::MISMATCH_PENALTY,
            gap_open: defaults::GAP_OPEN_PENALTY,
            gap_extend: defaults::GAP_EXTEND_PENALTY,
            gap_fill: GapFillStrategy::default(),
            threads: num_cpus::get(),
            batch_size: defaults::BATCH_SIZE,
            verbosity: defaults::VERBOSITY,
        }
    }
}

// ============================================================================
// STAGE-SPECIFIC PARAMETER BUNDLES
// ============================================================================

/// Parameters for the seeding stage
#[derive(Debug, Clone)]
pub struct SeedingParams {
    pub seed_size: usize,
    pub max_suffix_hits: usize,
    pub max_exact_alignments: usize,
}

/// Parameters for CAL merging and target selection
#[derive(Debug, Clone)]
pub struct SelectionParams {
    pub max_intron_size: u64,
    pub max_targets: usize,
    pub max_reported: usize,
    pub min_report_score: f32,
}

/// Parameters for gap filling and read-end extension
#[derive(Debug, Clone)]
pub struct GapFillParams {
    pub strategy: GapFillStrategy,
    pub min_intron_size: u64,
    pub max_reference_window: usize,
    pub soft_clip_min_score: f32,
}

impl MapperOpt {
    pub fn seeding_params(&self) -> SeedingParams {
        SeedingParams {
            seed_size: self.seed_size,
            max_suffix_hits: self.max_suffix_hits,
            max_exact_alignments: self.max_exact_alignments,
        }
    }

    pub fn selection_params(&self) -> SelectionParams {
        SelectionParams {
            max_intron_size: self.max_intron_size,
            max_targets: self.max_targets,
            max_reported: self.max_reported,
            min_report_score: self.min_report_score,
        }
    }

    pub fn gap_fill_params(&self) -> GapFillParams {
        GapFillParams {
            strategy: self.gap_fill,
            min_intron_size: self.min_intron_size,
            max_reference_window: self.max_reference_window,
            soft_clip_min_score: self.soft_clip_min_score,
        }
    }

    pub fn sw_scoring(&self) -> SwScoring {
        SwScoring {
            match_score: self.match_score,
            mismatch_penalty: self.mismatch_penalty,
            gap_open: self.gap_open,
            gap_extend: self.gap_extend,
        }
    }

    /// Check option consistency; all problems are reported at once.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        // Seeding validation
        if self.seed_size < 4 {
            errors.push(format!("seed_size must be >= 4, got {}", self.seed_size));
        }
        if self.max_suffix_hits < 1 {
            errors.push(format!(
                "max_suffix_hits must be >= 1, got {}",
                self.max_suffix_hits
            ));
        }

        // Intron validation
        if self.min_intron_size >= self.max_intron_size {
            errors.push(format!(
                "min_intron_size ({}) must be smaller than max_intron_size ({})",
                self.min_intron_size, self.max_intron_size
            ));
        }

        // Selection validation
        if self.max_targets < 1 {
            errors.push(format!("max_targets must be >= 1, got {}", self.max_targets));
        }
        if self.max_reported < 1 {
            errors.push(format!(
                "max_reported must be >= 1, got {}",
                self.max_reported
            ));
        }
        if !(0.0..=100.0).contains(&self.min_report_score) {
            errors.push(format!(
                "min_report_score must be in [0, 100], got {}",
                self.min_report_score
            ));
        }
        if !(0.0..=100.0).contains(&self.soft_clip_min_score) {
            errors.push(format!(
                "soft_clip_min_score must be in [0, 100], got {}",
                self.soft_clip_min_score
            ));
        }

        // Smith-Waterman validation
        if !(0.0..=1.0).contains(&self.extremity_min_norm_score) {
            errors.push(format!(
                "extremity_min_norm_score must be in [0, 1], got {}",
                self.extremity_min_norm_score
            ));
        }
        if self.max_reference_window < 64 {
            errors.push(format!(
                "max_reference_window must be >= 64, got {}",
                self.max_reference_window
            ));
        }
        if self.sw_batch_depth < 1 {
            errors.push(format!(
                "sw_batch_depth must be >= 1, got {}",
                self.sw_batch_depth
            ));
        }
        if self.match_score < 1 {
            errors.push(format!("match_score must be >= 1, got {}", self.match_score));
        }
        if self.mismatch_penalty < 0 || self.gap_open < 0 || self.gap_extend < 0 {
            errors.push(format!(
                "penalties must be >= 0, got mismatch={} gap_open={} gap_extend={}",
                self.mismatch_penalty, self.gap_open, self.gap_extend
            ));
        }

        // Processing validation
        if self.threads < 1 {
            errors.push(format!("threads must be >= 1, got {}", self.threads));
        }
        if self.batch_size < 1 {
            errors.push(format!("batch_size must be >= 1, got {}", self.batch_size));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Command-line options of the `map` subcommand
#[derive(Debug, Clone, Args)]
pub struct MapCliOptions {
    /// Reference genome FASTA (optionally gzip/bgzip compressed)
    #[arg(value_name = "GENOME.FA")]
    pub genome: PathBuf,

    /// Input FASTQ reads (optionally gzip/bgzip compressed)
    #[arg(value_name = "READS.FQ")]
    pub reads: PathBuf,

    /// Output SAM file (default: stdout)
    #[arg(short = 'o', long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    // ===== Seeding Options =====
    /// Seed size used for suffix-array search
    #[arg(short = 'k', long, value_name = "INT", default_value_t = defaults::SEED_SIZE)]
    pub seed_size: usize,

    /// Skip seeds with more than INT suffix-array hits
    #[arg(long, value_name = "INT", default_value_t = defaults::MAX_SUFFIX_HITS)]
    pub max_suffix_hits: usize,

    // ===== Splicing Options =====
    /// Minimum intron length
    #[arg(long, value_name = "INT", default_value_t = defaults::MIN_INTRON_SIZE)]
    pub min_intron: u64,

    /// Maximum intron length (CAL merge distance)
    #[arg(long, value_name = "INT", default_value_t = defaults::MAX_INTRON_SIZE)]
    pub max_intron: u64,

    /// Gap-fill order: splice-first or exact-first
    #[arg(long, value_name = "STR", default_value = "splice-first")]
    pub gap_fill: GapFillStrategy,

    // ===== Reporting Options =====
    /// Report at most INT alignments per read
    #[arg(short = 'n', long, value_name = "INT", default_value_t = defaults::MAX_REPORTED)]
    pub max_reported: usize,

    /// Minimum coverage score (percent of read) of secondary alignments
    #[arg(long, value_name = "FLOAT", default_value_t = defaults::MIN_REPORT_SCORE)]
    pub min_report_score: f32,

    // ===== Scoring Options =====
    /// Score for a sequence match
    #[arg(short = 'A', long, value_name = "INT", default_value_t = defaults::MATCH_SCORE)]
    pub match_score: i32,

    /// Penalty for a mismatch
    #[arg(short = 'B', long, value_name = "INT", default_value_t = defaults::MISMATCH_PENALTY)]
    pub mismatch_penalty: i32,

    /// Gap open penalty
    #[arg(short = 'O', long, value_name = "INT", default_value_t = defaults::GAP_OPEN_PENALTY)]
    pub gap_open: i32,

    /// Gap extension penalty; a gap of size k costs '{-O} + {-E}*k'
    #[arg(short = 'E', long, value_name = "INT", default_value_t = defaults::GAP_EXTEND_PENALTY)]
    pub gap_extend: i32,

    // ===== Processing Options =====
    /// Number of threads (default: all available cores)
    #[arg(short = 't', long, value_name = "INT")]
    pub threads: Option<usize>,

    /// Reads per processing batch
    #[arg(short = 'K', long, value_name = "INT", default_value_t = defaults::BATCH_SIZE)]
    pub batch_size: usize,

    /// Verbose level: 1=error, 2=warning, 3=message, 4=debug, 5+=trace
    #[arg(short = 'v', long, value_name = "INT", default_value_t = defaults::VERBOSITY)]
    pub verbosity: i32,
}

impl MapCliOptions {
    /// Copy command-line values into a `MapperOpt`.
    pub fn to_mapper_opt(&self) -> MapperOpt {
        MapperOpt {
            seed_size: self.seed_size,
            max_suffix_hits: self.max_suffix_hits,
            min_intron_size: self.min_intron,
            max_intron_size: self.max_intron,
            gap_fill: self.gap_fill,
            max_reported: self.max_reported,
            min_report_score: self.min_report_score,
            match_score: self.match_score,
            mismatch_penalty: self.mismatch_penalty,
            gap_open: self.gap_open,
            gap_extend: self.gap_extend,
            threads: self.threads.unwrap_or_else(num_cpus::get),
            batch_size: self.batch_size,
            verbosity: self.verbosity,
            ..MapperOpt::default()
        }
    }
}
