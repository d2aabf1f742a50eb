use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::time::Instant;

use ferrous_splice::core::alignment::ScalarSmithWaterman;
use ferrous_splice::core::io::SamWriter;
use ferrous_splice::pipelines::spliced::index::{ReferenceGenome, SuffixArrayIndex};
use ferrous_splice::pipelines::spliced::{process_reads, MapCliOptions, MapperOpt, ReadMapper};

#[derive(Parser)]
#[command(name = "ferrous-splice")]
#[command(about = "FerrousSplice - spliced read mapper for RNA-seq data", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Map RNA-seq reads to a reference genome
    Map(MapCliOptions),
}

fn init_logging(verbosity: i32) {
    // 1=error, 2=warning, 3=message, 4=debug, 5+=trace
    let log_level = match verbosity {
        v if v <= 1 => log::LevelFilter::Error,
        2 => log::LevelFilter::Warn,
        3 => log::LevelFilter::Info,
        4 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .format_timestamp(None)
        .format_target(false)
        .init();
}

fn configure_threads(requested: usize) -> usize {
    let mut num_threads = requested;
    if num_threads < 1 {
        log::warn!("Invalid thread count {}, using 1 thread", num_threads);
        num_threads = 1;
    }
    let max_threads = num_cpus::get() * 2;
    if num_threads > max_threads {
        log::warn!(
            "Thread count {} exceeds recommended maximum {}, capping at {}",
            num_threads,
            max_threads,
            max_threads
        );
        num_threads = max_threads;
    }

    if let Err(e) = rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build_global()
    {
        log::warn!("Failed to configure thread pool: {} (may already be initialized)", e);
    }
    let thread_word = if num_threads == 1 { "thread" } else { "threads" };
    log::info!("Using {} {}", num_threads, thread_word);
    num_threads
}

fn log_parameters(opt: &MapperOpt) {
    log::info!("Mapping parameters:");
    log::info!("  Seed size: {}, max suffix hits: {}", opt.seed_size, opt.max_suffix_hits);
    log::info!(
        "  Intron size: {}..{}, gap fill: {:?}",
        opt.min_intron_size,
        opt.max_intron_size,
        opt.gap_fill
    );
    log::info!(
        "  Match: {}, Mismatch: {}, Gap open: {}, Gap extend: {}",
        opt.match_score,
        opt.mismatch_penalty,
        opt.gap_open,
        opt.gap_extend
    );
}

fn run_map(cli: &MapCliOptions) -> Result<()> {
    let mut opt = cli.to_mapper_opt();
    if let Err(errors) = opt.validate() {
        for e in &errors {
            log::error!("{}", e);
        }
        anyhow::bail!("invalid options ({} errors)", errors.len());
    }
    opt.threads = configure_threads(opt.threads);
    if opt.verbosity >= 3 {
        log_parameters(&opt);
    }

    let start_time = Instant::now();
    log::info!("Loading reference genome: {}", cli.genome.display());
    let genome = ReferenceGenome::from_fasta(&cli.genome)
        .with_context(|| format!("Error loading genome {}", cli.genome.display()))?;
    log::info!(
        "Loaded {} chromosomes ({} bp)",
        genome.names().len(),
        genome.total_len()
    );
    let index = SuffixArrayIndex::build(&genome);
    log::info!(
        "Built suffix array ({} suffixes) in {:.2} sec",
        index.len(),
        start_time.elapsed().as_secs_f64()
    );

    let kernel = ScalarSmithWaterman::new(opt.sw_scoring());
    let batch_size = opt.batch_size;
    let mapper = ReadMapper::new(&genome, &index, &kernel, opt)?;

    let out: Box<dyn Write> = match &cli.output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("Error creating output file {}", path.display()))?,
        )),
        None => Box::new(BufWriter::new(io::stdout())),
    };
    let mut writer = SamWriter::new(out);
    let command_line = std::env::args().collect::<Vec<_>>().join(" ");
    writer
        .write_header(&genome, &command_line)
        .context("Error writing SAM header")?;

    process_reads(&mapper, &cli.reads, &mut writer, batch_size)
        .with_context(|| format!("Error mapping reads from {}", cli.reads.display()))?;

    mapper.stats().log_summary();
    log::info!(
        "{} junctions registered, total time {:.2} sec",
        mapper.junctions().len(),
        start_time.elapsed().as_secs_f64()
    );
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Map(map) => {
            init_logging(map.verbosity);
            run_map(&map)
        }
    }
}
