// SAM output module
//
// Renders the header and one text line per reported alignment. Mapping
// quality is always 255 (unavailable); the alignment-score proxy goes into
// the AS tag.

use crate::core::sequence::reverse_complement;
use crate::pipelines::spliced::index::GenomeAccessor;
use crate::pipelines::spliced::read::{Read, Strand};
use crate::pipelines::spliced::Alignment;
use std::io::{self, Write};

pub mod sam_flags {
    pub const REVERSE: u16 = 0x10;
    pub const UNMAPPED: u16 = 0x4;
    pub const SECONDARY: u16 = 0x100;
}

const MAPQ_UNAVAILABLE: u8 = 255;

pub struct SamWriter<W: Write> {
    writer: W,
    tags: bool,
    records: u64,
}

impl<W: Write> SamWriter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            tags: true,
            records: 0,
        }
    }

    /// Leave out the optional `AS`/`NM`/`NH` tags.
    pub fn without_tags(mut self) -> Self {
        self.tags = false;
        self
    }

    pub fn records_written(&self) -> u64 {
        self.records
    }

    /// `@HD`, one `@SQ` per chromosome, then `@PG` with the command line.
    pub fn write_header(&mut self, genome: &dyn GenomeAccessor, command_line: &str) -> io::Result<()> {
        const PKG_NAME: &str = env!("CARGO_PKG_NAME");
        const PKG_VERSION: &str = env!("CARGO_PKG_VERSION");

        writeln!(self.writer, "@HD\tVN:1.0\tSO:unsorted")?;
        for c in 0..genome.num_chromosomes() {
            writeln!(
                self.writer,
                "@SQ\tSN:{}\tLN:{}",
                genome.chromosome_name(c),
                genome.chromosome_len(c)
            )?;
        }
        writeln!(
            self.writer,
            "@PG\tID:{}\tPN:{}\tVN:{}\tCL:{}",
            PKG_NAME, PKG_NAME, PKG_VERSION, command_line
        )
    }

    /// Write every alignment of a read, or one unmapped record when there are none.
    pub fn write_read(&mut self, read: &Read, alignments: &[Alignment]) -> io::Result<usize> {
        if alignments.is_empty() {
            self.write_unmapped(read)?;
            return Ok(1);
        }
        for alignment in alignments {
            self.write_alignment(read, alignment)?;
        }
        Ok(alignments.len())
    }

    pub fn write_alignment(&mut self, read: &Read, alignment: &Alignment) -> io::Result<()> {
        let mut flag = 0u16;
        if alignment.strand == Strand::Reverse {
            flag |= sam_flags::REVERSE;
        }
        if alignment.secondary {
            flag |= sam_flags::SECONDARY;
        }

        let (seq, qual) = oriented_seq_qual(read, alignment.strand);
        write!(
            self.writer,
            "{}\t{}\t{}\t{}\t{}\t{}\t*\t0\t0\t{}\t{}",
            read.id,
            flag,
            alignment.chromosome_name,
            alignment.genomic_start,
            MAPQ_UNAVAILABLE,
            alignment.cigar_string(),
            seq,
            qual
        )?;
        if self.tags {
            write!(
                self.writer,
                "\tAS:i:{}\tNM:i:{}\tNH:i:{}",
                alignment.mapping_quality, alignment.edit_distance, alignment.num_hits
            )?;
        }
        writeln!(self.writer)?;
        self.records += 1;
        Ok(())
    }

    pub fn write_unmapped(&mut self, read: &Read) -> io::Result<()> {
        let (seq, qual) = oriented_seq_qual(read, Strand::Forward);
        writeln!(
            self.writer,
            "{}\t{}\t*\t0\t0\t*\t*\t0\t0\t{}\t{}",
            read.id,
            sam_flags::UNMAPPED,
            seq,
            qual
        )?;
        self.records += 1;
        Ok(())
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

/// SEQ and QUAL as stored in SAM: reverse-strand records carry the reverse
/// complement and reversed qualities.
fn oriented_seq_qual(read: &Read, strand: Strand) -> (String, String) {
    let (seq, qual) = match strand {
        Strand::Forward => (read.sequence.clone(), read.quality.clone()),
        Strand::Reverse => {
            let mut qual = read.quality.clone();
            qual.reverse();
            (reverse_complement(&read.sequence), qual)
        }
    };
    let seq = if seq.is_empty() {
        "*".to_string()
    } else {
        String::from_utf8_lossy(&seq).into_owned()
    };
    let qual = if qual.is_empty() {
        "*".to_string()
    } else {
        String::from_utf8_lossy(&qual).into_owned()
    };
    (seq, qual)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::cigar::CigarCode;
    use crate::pipelines::spliced::index::ReferenceGenome;

    fn alignment(strand: Strand, secondary: bool) -> Alignment {
        Alignment {
            read_id: "r1".to_string(),
            strand,
            chromosome: 0,
            chromosome_name: "chr1".to_string(),
            genomic_start: 1001,
            cigar: "4M100N4M".parse::<CigarCode>().unwrap(),
            edit_distance: 1,
            mapping_quality: 90,
            secondary,
            num_hits: 2,
        }
    }

    fn output(f: impl FnOnce(&mut SamWriter<Vec<u8>>)) -> String {
        let mut writer = SamWriter::new(Vec::new());
        f(&mut writer);
        String::from_utf8(writer.into_inner()).unwrap()
    }

    #[test]
    fn test_header_lists_chromosomes() {
        let mut genome = ReferenceGenome::new();
        genome.add_chromosome("chr1", b"ACGTACGT");
        genome.add_chromosome("chr2", b"ACG");
        let text = output(|w| w.write_header(&genome, "ferrous-splice map g.fa r.fq").unwrap());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "@HD\tVN:1.0\tSO:unsorted");
        assert_eq!(lines[1], "@SQ\tSN:chr1\tLN:8");
        assert_eq!(lines[2], "@SQ\tSN:chr2\tLN:3");
        assert!(lines[3].starts_with("@PG\tID:ferrous-splice"));
        assert!(lines[3].ends_with("CL:ferrous-splice map g.fa r.fq"));
    }

    #[test]
    fn test_forward_primary_record() {
        let read = Read::new("r1", b"ACGTTGCA", b"ABCDEFGH");
        let text = output(|w| w.write_alignment(&read, &alignment(Strand::Forward, false)).unwrap());
        let fields: Vec<&str> = text.trim_end().split('\t').collect();
        assert_eq!(fields[1], "0");
        assert_eq!(fields[2], "chr1");
        assert_eq!(fields[3], "1001");
        assert_eq!(fields[4], "255");
        assert_eq!(fields[5], "4M100N4M");
        assert_eq!(fields[9], "ACGTTGCA");
        assert_eq!(&fields[11..], &["AS:i:90", "NM:i:1", "NH:i:2"]);
    }

    #[test]
    fn test_reverse_secondary_record() {
        let read = Read::new("r1", b"AACCGGTA", b"ABCDEFGH");
        let text = output(|w| w.write_alignment(&read, &alignment(Strand::Reverse, true)).unwrap());
        let fields: Vec<&str> = text.trim_end().split('\t').collect();
        assert_eq!(fields[1], "272");
        assert_eq!(fields[9], "TACCGGTT");
        assert_eq!(fields[10], "HGFEDCBA");
    }

    #[test]
    fn test_unmapped_record() {
        let read = Read::new("r9", b"ACGT", b"IIII");
        let mut writer = SamWriter::new(Vec::new());
        assert_eq!(writer.write_read(&read, &[]).unwrap(), 1);
        assert_eq!(writer.records_written(), 1);
        let text = String::from_utf8(writer.into_inner()).unwrap();
        assert_eq!(text, "r9\t4\t*\t0\t0\t*\t*\t0\t0\tACGT\tIIII\n");
    }

    #[test]
    fn test_tags_can_be_left_out() {
        let read = Read::new("r1", b"ACGTTGCA", b"ABCDEFGH");
        let mut writer = SamWriter::new(Vec::new()).without_tags();
        writer
            .write_alignment(&read, &alignment(Strand::Forward, false))
            .unwrap();
        let text = String::from_utf8(writer.into_inner()).unwrap();
        assert_eq!(text.trim_end().split('\t').count(), 11);
    }
}
