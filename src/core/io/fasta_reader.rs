// FASTA reader for the reference genome, wrapping bio::io::fasta.

use super::compression::open_input;
use bio::io::fasta;
use std::io::{self, Read};
use std::path::Path;

/// One reference sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FastaRecord {
    pub name: String,
    pub seq: Vec<u8>,
}

/// FASTA reader with automatic gzip/bgzip detection.
pub struct FastaReader {
    records: fasta::Records<std::io::BufReader<Box<dyn Read + Send>>>,
}

impl FastaReader {
    /// Open a FASTA file (.fa, .fasta, optionally .gz).
    pub fn new(path: &Path) -> io::Result<Self> {
        let reader = fasta::Reader::new(open_input(path)?);
        Ok(Self {
            records: reader.records(),
        })
    }

    /// Read every record into memory.
    pub fn read_all(&mut self) -> io::Result<Vec<FastaRecord>> {
        let mut out = Vec::new();
        for record in &mut self.records {
            let record = record?;
            out.push(FastaRecord {
                name: record.id().to_string(),
                seq: record.seq().to_vec(),
            });
        }
        Ok(out)
    }
}

impl Iterator for FastaReader {
    type Item = io::Result<FastaRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        self.records.next().map(|r| {
            r.map(|record| FastaRecord {
                name: record.id().to_string(),
                seq: record.seq().to_vec(),
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_multi_record_fasta() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("genome.fa");
        std::fs::write(&path, b">chr1 primary\nACGTAC\nGTTA\n>chr2\nGGGG\n").unwrap();

        let records = FastaReader::new(&path).unwrap().read_all().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name, "chr1");
        assert_eq!(records[0].seq, b"ACGTACGTTA".to_vec());
        assert_eq!(records[1].name, "chr2");
    }
}
