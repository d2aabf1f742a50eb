// FASTQ reader module using bio::io::fastq
//
// Reads are pulled in batches so the mapper can process each batch in
// parallel while the next one is parsed.

use super::compression::open_input;
use bio::io::fastq;
use std::io::{self, BufReader, Read};
use std::path::Path;

/// Batch of FASTQ reads
#[derive(Debug, Default, Clone)]
pub struct ReadBatch {
    pub names: Vec<String>,
    pub seqs: Vec<Vec<u8>>,
    pub quals: Vec<Vec<u8>>,
}

impl ReadBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// FASTQ reader with automatic gzip/bgzip detection
pub struct FastqReader {
    records: fastq::Records<BufReader<Box<dyn Read + Send>>>,
}

impl FastqReader {
    /// Open a FASTQ file (.fq, .fastq, optionally .gz).
    pub fn new(path: &Path) -> io::Result<Self> {
        let reader = fastq::Reader::new(open_input(path)?);
        Ok(Self {
            records: reader.records(),
        })
    }

    /// Read up to `batch_size` reads. An empty batch means EOF.
    pub fn read_batch(&mut self, batch_size: usize) -> io::Result<ReadBatch> {
        let mut batch = ReadBatch::new();

        for _ in 0..batch_size {
            match self.records.next() {
                Some(Ok(record)) => {
                    batch.names.push(record.id().to_string());
                    batch.seqs.push(record.seq().to_vec());
                    batch.quals.push(record.qual().to_vec());
                }
                Some(Err(e)) => return Err(io::Error::other(e)),
                None => break,
            }
        }

        Ok(batch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_batches_until_eof() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reads.fq");
        std::fs::write(
            &path,
            b"@r1\nACGT\n+\nIIII\n@r2\nGGCC\n+\nJJJJ\n@r3\nTTAA\n+\nKKKK\n",
        )
        .unwrap();

        let mut reader = FastqReader::new(&path).unwrap();
        let first = reader.read_batch(2).unwrap();
        assert_eq!(first.len(), 2);
        assert_eq!(first.names, vec!["r1".to_string(), "r2".to_string()]);
        assert_eq!(first.quals[1], b"JJJJ".to_vec());

        let second = reader.read_batch(2).unwrap();
        assert_eq!(second.len(), 1);
        assert!(reader.read_batch(2).unwrap().is_empty());
    }
}
