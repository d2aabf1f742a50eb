//! Sequence input (FASTA reference, FASTQ reads) and SAM output.

pub mod compression;
pub mod fasta_reader;
pub mod fastq_reader;
pub mod sam_output;

pub use fasta_reader::{FastaReader, FastaRecord};
pub use fastq_reader::{FastqReader, ReadBatch};
pub use sam_output::SamWriter;
