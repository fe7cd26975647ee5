//! File-level helpers over the block stream.
//!
//! - [`compress_file`] reads a plain file and writes a block stream.
//! - [`decompress_file`] does the reverse.
//!
//! Both return a [`Transfer`] with the byte counts on either side.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::Path;

use crate::displaylevel;
use crate::loader::QzLibrary;
use crate::stream::{BlockReader, BlockWriter, StreamOptions};

/// Options for the file helpers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FileOptions {
    pub stream: StreamOptions,
    /// Process-wide compression level to apply before compressing.
    pub level: Option<i32>,
}

/// Bytes read from the source and written to the destination.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Transfer {
    pub bytes_in: u64,
    pub bytes_out: u64,
}

impl Transfer {
    /// Output size as a percentage of input size.
    pub fn ratio(&self) -> f64 {
        if self.bytes_in == 0 {
            return 0.0;
        }
        self.bytes_out as f64 * 100.0 / self.bytes_in as f64
    }
}

/// Counts the bytes that pass through a writer.
struct Counting<W> {
    inner: W,
    count: u64,
}

impl<W: Write> Write for Counting<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.count += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// Compress `src` into a block stream at `dst` (created or truncated).
pub fn compress_file(lib: &QzLibrary, src: &Path, dst: &Path, opts: &FileOptions) -> io::Result<Transfer> {
    if let Some(level) = opts.level {
        lib.set_compression_level(level)?;
    }
    let mut input = BufReader::new(File::open(src)?);
    let sink = Counting { inner: BufWriter::new(File::create(dst)?), count: 0 };
    let mut writer = BlockWriter::with_options(lib, sink, opts.stream)?;
    let bytes_in = io::copy(&mut input, &mut writer)?;
    let sink = writer.finish()?;
    let transfer = Transfer { bytes_in, bytes_out: sink.count };
    displaylevel!(
        3,
        "Compressed {} bytes into {} bytes ==> {:.2}%\n",
        transfer.bytes_in,
        transfer.bytes_out,
        transfer.ratio()
    );
    Ok(transfer)
}

/// Decompress the block stream at `src` into `dst` (created or truncated).
pub fn decompress_file(lib: &QzLibrary, src: &Path, dst: &Path, opts: &FileOptions) -> io::Result<Transfer> {
    let input = File::open(src)?;
    let bytes_in = input.metadata()?.len();
    let mut reader = BlockReader::with_options(lib, BufReader::new(input), opts.stream)?;
    let mut output = BufWriter::new(File::create(dst)?);
    let bytes_out = io::copy(&mut reader, &mut output)?;
    output.flush()?;
    displaylevel!(3, "Decompressed {} bytes into {} bytes\n", bytes_in, bytes_out);
    Ok(Transfer { bytes_in, bytes_out })
}
