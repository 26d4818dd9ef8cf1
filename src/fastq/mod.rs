//! Streaming read-header normalization of gzipped FASTQ.
//!
//! Header lines (the first line of every 4-line record, when it starts with
//! `@`) have each `/` replaced by a space. All other lines pass through
//! unchanged. Files are rewritten through a temp file in the same directory
//! and renamed over the original, so the original stays intact until the new
//! content is complete.

use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use flate2::read::MultiGzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use tempfile::NamedTempFile;

use crate::errors::JobError;

pub const HEADER_SENTINEL: u8 = b'@';
pub const HEADER_DELIMITER: u8 = b'/';
pub const DELIMITER_REPLACEMENT: u8 = b' ';
pub const LINES_PER_RECORD: u64 = 4;

const IO_BUFFER: usize = 128 * 1024;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NormalizeStats {
    pub lines: u64,
    pub headers_rewritten: u64,
}

/// True when line `index` is a header slot and carries the sentinel.
#[inline]
pub fn is_header_line(index: u64, line: &[u8]) -> bool {
    index % LINES_PER_RECORD == 0 && line.first() == Some(&HEADER_SENTINEL)
}

/// Copies `reader` to `writer` line by line, rewriting header delimiters.
/// Line terminators are kept as found, including a missing final newline.
pub fn normalize_headers<R: BufRead, W: Write>(mut reader: R, mut writer: W) -> io::Result<NormalizeStats> {
    let mut stats = NormalizeStats::default();
    let mut line = Vec::with_capacity(256);

    loop {
        line.clear();
        if reader.read_until(b'\n', &mut line)? == 0 {
            break;
        }
        if is_header_line(stats.lines, &line) {
            for b in line.iter_mut().filter(|b| **b == HEADER_DELIMITER) {
                *b = DELIMITER_REPLACEMENT;
            }
            stats.headers_rewritten += 1;
        }
        writer.write_all(&line)?;
        stats.lines += 1;
    }

    writer.flush()?;
    Ok(stats)
}

/// Rewrites the gzipped FASTQ at `path` in place. The temp file is removed on
/// every failure path; the rename happens only after the new content is
/// finished and synced.
pub fn normalize_file(path: &Path, compression_level: u32) -> Result<NormalizeStats, JobError> {
    rewrite_in_place(path, compression_level)
        .map_err(|source| JobError::HeaderRewriteFailure { path: path.to_path_buf(), source })
}

fn rewrite_in_place(path: &Path, compression_level: u32) -> io::Result<NormalizeStats> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let input = File::open(path)?;
    let permissions = input.metadata()?.permissions();
    let reader = BufReader::with_capacity(IO_BUFFER, MultiGzDecoder::new(input));

    let tmp = NamedTempFile::new_in(dir)?;
    // temp files start at 0600; keep the mode the trimmer gave the output
    tmp.as_file().set_permissions(permissions)?;
    let mut encoder =
        GzEncoder::new(BufWriter::with_capacity(IO_BUFFER, tmp), Compression::new(compression_level));
    let stats = normalize_headers(reader, &mut encoder)?;

    let tmp = encoder.finish()?.into_inner().map_err(io::IntoInnerError::into_error)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(stats)
}
