// Input opening with transparent gzip / BGZIP support.
//
// BGZIP files (blocked gzip, the bioinformatics flavour) are decompressed in
// parallel with noodles-bgzf; plain gzip falls back to flate2.

use flate2::read::GzDecoder;
use noodles_bgzf as bgzf;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

const BUFFER_SIZE: usize = 4 * 1024 * 1024;

/// Check the gzip magic bytes and the 'BC' extra subfield that marks BGZIP.
pub fn is_bgzip_format(path: &Path) -> io::Result<bool> {
    let mut file = File::open(path)?;
    let mut header = [0u8; 18];

    let mut filled = 0;
    while filled < header.len() {
        let n = file.read(&mut header[filled..])?;
        if n == 0 {
            return Ok(false);
        }
        filled += n;
    }

    if header[0] != 0x1f || header[1] != 0x8b {
        return Ok(false);
    }
    // FEXTRA flag
    if header[3] & 0x04 == 0 {
        return Ok(false);
    }
    Ok(header[12] == b'B' && header[13] == b'C')
}

/// Open a possibly compressed text input. Compression is keyed on the `.gz`
/// extension, BGZIP vs plain gzip on the header.
pub fn open_input(path: &Path) -> io::Result<Box<dyn Read + Send>> {
    let is_gz = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("gz"))
        .unwrap_or(false);

    let file = File::open(path)?;
    let reader: Box<dyn Read + Send> = if is_gz {
        if is_bgzip_format(path)? {
            log::debug!("{}: BGZIP input, using parallel decompression", path.display());
            Box::new(BufReader::with_capacity(
                BUFFER_SIZE,
                bgzf::MultithreadedReader::new(file),
            ))
        } else {
            log::debug!("{}: gzip input, using single-threaded decompression", path.display());
            Box::new(BufReader::with_capacity(BUFFER_SIZE, GzDecoder::new(file)))
        }
    } else {
        Box::new(BufReader::with_capacity(BUFFER_SIZE, file))
    };
    Ok(reader)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;

    #[test]
    fn test_plain_gzip_is_not_bgzip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reads.fq.gz");
        let mut enc = GzEncoder::new(File::create(&path).unwrap(), Compression::default());
        enc.write_all(b"@r1\nACGT\n+\nIIII\n").unwrap();
        enc.finish().unwrap();

        assert!(!is_bgzip_format(&path).unwrap());
        let mut text = String::new();
        open_input(&path).unwrap().read_to_string(&mut text).unwrap();
        assert_eq!(text, "@r1\nACGT\n+\nIIII\n");
    }

    #[test]
    fn test_uncompressed_input() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ref.fa");
        std::fs::write(&path, b">chr1\nACGT\n").unwrap();
        assert!(!is_bgzip_format(&path).unwrap());
        let mut text = String::new();
        open_input(&path).unwrap().read_to_string(&mut text).unwrap();
        assert!(text.starts_with(">chr1"));
    }
}
