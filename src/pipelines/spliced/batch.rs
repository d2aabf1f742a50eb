// Batch processing for the spliced mapper
//
// Reads are loaded in batches, mapped in parallel with Rayon and written
// in input order. Each batch counts into its own statistics, which are
// merged into the mapper's totals once the batch is done.

use super::alignment::Alignment;
use super::mapper::ReadMapper;
use super::read::Read;
use crate::core::error::MapError;
use crate::core::io::{FastqReader, SamWriter};
use crate::core::stats::{MapperStats, StatsSnapshot};
use rayon::prelude::*;
use std::io::Write;
use std::path::Path;
use std::time::Instant;

/// Alignments of one batch, in read order, and the batch's counters.
pub struct BatchResult {
    pub alignments: Vec<Vec<Alignment>>,
    pub stats: StatsSnapshot,
}

impl BatchResult {
    pub fn num_mapped(&self) -> usize {
        self.alignments.iter().filter(|a| !a.is_empty()).count()
    }
}

/// Map a batch of reads in parallel.
pub fn map_batch(mapper: &ReadMapper, reads: &[Read]) -> BatchResult {
    let batch_stats = MapperStats::new();
    let alignments: Vec<Vec<Alignment>> = reads
        .par_iter()
        .map(|read| mapper.map_read_with_stats(read, &batch_stats))
        .collect();

    let stats = batch_stats.snapshot();
    mapper.stats().merge(&stats);
    BatchResult { alignments, stats }
}

/// Map every read of a FASTQ file and write the records. Returns the number
/// of reads processed.
pub fn process_reads<W: Write>(
    mapper: &ReadMapper,
    reads_path: &Path,
    writer: &mut SamWriter<W>,
    batch_size: usize,
) -> Result<usize, MapError> {
    let start_time = Instant::now();
    let mut total_reads = 0usize;
    let mut total_bases = 0usize;
    let mut reader = FastqReader::new(reads_path)?;

    loop {
        let batch = reader.read_batch(batch_size)?;
        if batch.is_empty() {
            break;
        }
        let batch_bp: usize = batch.seqs.iter().map(|s| s.len()).sum();
        log::info!("Read {} sequences ({} bp)", batch.len(), batch_bp);

        let batch_start = Instant::now();
        let reads = Read::from_batch(&batch);
        let result = map_batch(mapper, &reads);
        log::info!(
            "Mapped {} of {} reads in {:.3} sec ({} SW alignments)",
            result.num_mapped(),
            reads.len(),
            batch_start.elapsed().as_secs_f64(),
            result.stats.sw_invocations
        );

        for (read, alignments) in reads.iter().zip(&result.alignments) {
            if let Err(e) = writer.write_read(read, alignments) {
                log::error!("Error writing SAM record for {}: {}", read.id, e);
            }
        }

        total_reads += reads.len();
        total_bases += batch_bp;
        if reads.len() < batch_size {
            break;
        }
    }
    writer.flush()?;

    log::info!(
        "Processed {} reads ({} bp) in {:.2} sec",
        total_reads,
        total_bases,
        start_time.elapsed().as_secs_f64()
    );
    Ok(total_reads)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::alignment::ScalarSmithWaterman;
    use crate::pipelines::spliced::index::{ReferenceGenome, SuffixArrayIndex};
    use crate::pipelines::spliced::options::MapperOpt;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use std::io::Write as _;

    fn genome() -> ReferenceGenome {
        let mut rng = StdRng::seed_from_u64(11);
        let chrom: Vec<u8> = (0..8000).map(|_| b"ACGT"[rng.gen_range(0..4)]).collect();
        let mut genome = ReferenceGenome::new();
        genome.add_chromosome("chr1", &chrom);
        genome
    }

    #[test]
    fn test_batch_keeps_read_order_and_merges_stats() {
        let genome = genome();
        let index = SuffixArrayIndex::build(&genome);
        let kernel = ScalarSmithWaterman::default();
        let mapper = ReadMapper::new(&genome, &index, &kernel, MapperOpt::default()).unwrap();

        let chrom = &genome.sequences()[0];
        let reads: Vec<Read> = (0..20)
            .map(|i| {
                let start = 200 + i * 300;
                Read::new(format!("r{}", i), &chrom[start..start + 80], &[b'I'; 80])
            })
            .collect();

        let result = map_batch(&mapper, &reads);
        assert_eq!(result.alignments.len(), 20);
        for (i, alignments) in result.alignments.iter().enumerate() {
            assert_eq!(alignments[0].read_id, format!("r{}", i));
            assert_eq!(alignments[0].genomic_start, (200 + i * 300 + 1) as u64);
        }
        assert_eq!(result.stats.total_reads, 20);
        assert_eq!(mapper.stats().snapshot().total_reads, 20);

        map_batch(&mapper, &reads[..5]);
        assert_eq!(mapper.stats().snapshot().total_reads, 25);
    }

    #[test]
    fn test_process_reads_writes_one_record_per_read() {
        let genome = genome();
        let index = SuffixArrayIndex::build(&genome);
        let kernel = ScalarSmithWaterman::default();
        let mapper = ReadMapper::new(&genome, &index, &kernel, MapperOpt::default()).unwrap();

        let chrom = &genome.sequences()[0];
        let mut fastq = tempfile::NamedTempFile::new().unwrap();
        for i in 0..3 {
            let start = 1000 + i * 500;
            writeln!(fastq, "@q{}", i).unwrap();
            fastq.write_all(&chrom[start..start + 60]).unwrap();
            writeln!(fastq, "\n+\n{}", "I".repeat(60)).unwrap();
        }
        writeln!(fastq, "@unmapped\n{}\n+\n{}", "N".repeat(60), "I".repeat(60)).unwrap();
        fastq.flush().unwrap();

        let mut writer = SamWriter::new(Vec::new());
        let n = process_reads(&mapper, fastq.path(), &mut writer, 2).unwrap();
        assert_eq!(n, 4);
        assert_eq!(writer.records_written(), 4);
        let text = String::from_utf8(writer.into_inner()).unwrap();
        let last = text.lines().last().unwrap();
        assert!(last.starts_with("unmapped\t4\t*"));
    }
}
