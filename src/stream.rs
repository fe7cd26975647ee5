//! Block stream format over `std::io`.
//!
//! A stream is a sequence of independently compressed blocks, each written as
//!
//! ```text
//! [u32 little-endian compressed length][compressed bytes]
//! ```
//!
//! Every block decompresses to at most `block_size` bytes, so a reader only
//! needs to agree with the writer on the block size. There is no stream
//! header or trailer; the stream ends at a block boundary.

use std::io::{self, Read, Write};

use crate::buffer::{BufferView, BufferViewMut, Scratch};
use crate::config::{self, NativeBufferPrefs};
use crate::displaylevel;
use crate::loader::QzLibrary;
use crate::session::Session;

/// Size of the per-block length prefix.
pub const BLOCK_HEADER_LEN: usize = 4;

/// Block size and scratch allocation for [`BlockWriter`] / [`BlockReader`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamOptions {
    /// Uncompressed bytes per block.
    pub block_size: usize,
    pub buffer_prefs: NativeBufferPrefs,
}

impl Default for StreamOptions {
    fn default() -> Self {
        StreamOptions {
            block_size: config::BLOCK_SIZE_DEFAULT,
            buffer_prefs: NativeBufferPrefs::default(),
        }
    }
}

impl StreamOptions {
    /// Defaults with the block size taken from `QATCODEC_BLOCK_SIZE`.
    pub fn from_env() -> Self {
        StreamOptions { block_size: config::init_block_size(), ..Default::default() }
    }

    pub fn with_block_size(mut self, block_size: usize) -> Self {
        self.block_size = block_size;
        self
    }

    fn validate(&self) -> io::Result<()> {
        if self.block_size == 0 || u32::try_from(self.block_size).is_err() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("block size {} is not usable", self.block_size),
            ));
        }
        Ok(())
    }
}

fn invalid_data(msg: String) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, msg)
}

/// Largest compressed payload a reader accepts for `block_size`.
pub fn max_block_payload(lib: &QzLibrary, block_size: usize) -> io::Result<usize> {
    Ok(lib.max_compressed_length(block_size)?)
}

/// Split a complete in-memory stream into its compressed payloads.
///
/// `max_payload` bounds each length prefix; a zero or larger length is
/// `InvalidData`, a truncated header or payload is `UnexpectedEof`.
pub fn split_blocks(mut stream: &[u8], max_payload: usize) -> io::Result<Vec<&[u8]>> {
    let mut blocks = Vec::new();
    while !stream.is_empty() {
        if stream.len() < BLOCK_HEADER_LEN {
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "truncated block header"));
        }
        let (header, rest) = stream.split_at(BLOCK_HEADER_LEN);
        let len = u32::from_le_bytes([header[0], header[1], header[2], header[3]]) as usize;
        if len == 0 || len > max_payload {
            return Err(invalid_data(format!(
                "block length {} outside 1..={}",
                len, max_payload
            )));
        }
        if rest.len() < len {
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "truncated block payload"));
        }
        let (payload, tail) = rest.split_at(len);
        blocks.push(payload);
        stream = tail;
    }
    Ok(blocks)
}

// ─────────────────────────────────────────────────────────────────────────────
// BlockWriter<W>
// ─────────────────────────────────────────────────────────────────────────────

/// Compressing writer producing the block stream format.
///
/// Data is buffered until a full block is available. Call
/// [`BlockWriter::finish`] to write the final partial block and get the sink
/// back; dropping the writer instead finishes on a best-effort basis and
/// discards any error.
pub struct BlockWriter<'lib, W: Write> {
    session: Session<'lib>,
    inner: Option<W>,
    block: Scratch<'lib>,
    filled: usize,
    compressed: Scratch<'lib>,
    errored: bool,
}

impl<'lib, W: Write> BlockWriter<'lib, W> {
    pub fn new(lib: &'lib QzLibrary, inner: W) -> io::Result<Self> {
        Self::with_options(lib, inner, StreamOptions::default())
    }

    pub fn with_options(lib: &'lib QzLibrary, inner: W, opts: StreamOptions) -> io::Result<Self> {
        opts.validate()?;
        let bound = max_block_payload(lib, opts.block_size)?;
        let block = Scratch::allocate(lib, opts.block_size, &opts.buffer_prefs)?;
        let compressed = Scratch::allocate(lib, bound, &opts.buffer_prefs)?;
        Ok(BlockWriter {
            session: Session::new(lib),
            inner: Some(inner),
            block,
            filled: 0,
            compressed,
            errored: false,
        })
    }

    pub fn block_size(&self) -> usize {
        self.block.len()
    }

    pub fn get_ref(&self) -> Option<&W> {
        self.inner.as_ref()
    }

    fn inner_mut(&mut self) -> io::Result<&mut W> {
        if self.errored {
            return Err(io::Error::new(io::ErrorKind::Other, "block writer failed earlier; stream is incomplete"));
        }
        self.inner
            .as_mut()
            .ok_or_else(|| io::Error::new(io::ErrorKind::BrokenPipe, "block writer already finished"))
    }

    /// Compress and emit whatever is buffered.
    fn write_block(&mut self) -> io::Result<()> {
        self.inner_mut()?;
        if self.filled == 0 {
            return Ok(());
        }
        let input = BufferView::new(&self.block[..self.filled]);
        let n = match self.session.compress(input, BufferViewMut::new(&mut self.compressed)) {
            Ok(n) => n as usize,
            Err(e) => {
                self.errored = true;
                return Err(e.into());
            }
        };
        displaylevel!(4, "qatcodec: block {} -> {} bytes\n", self.filled, n);
        let header = (n as u32).to_le_bytes();
        let Some(inner) = self.inner.as_mut() else {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "block writer already finished"));
        };
        let written = inner
            .write_all(&header)
            .and_then(|()| inner.write_all(&self.compressed[..n]));
        if let Err(e) = written {
            self.errored = true;
            return Err(e);
        }
        self.filled = 0;
        Ok(())
    }

    /// Write the final partial block and flush the sink.
    pub fn finish(mut self) -> io::Result<W> {
        self.write_block()?;
        self.inner_mut()?.flush()?;
        self.inner
            .take()
            .ok_or_else(|| io::Error::new(io::ErrorKind::BrokenPipe, "block writer already finished"))
    }

    /// Alias of [`BlockWriter::finish`].
    pub fn into_inner(self) -> io::Result<W> {
        self.finish()
    }
}

impl<W: Write> Write for BlockWriter<'_, W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner_mut()?;
        let mut p = 0;
        while p < buf.len() {
            let room = self.block.len() - self.filled;
            let n = room.min(buf.len() - p);
            self.block[self.filled..self.filled + n].copy_from_slice(&buf[p..p + n]);
            self.filled += n;
            p += n;
            if self.filled == self.block.len() {
                self.write_block()?;
            }
        }
        Ok(buf.len())
    }

    /// Emits the buffered data as a (short) block before flushing the sink.
    fn flush(&mut self) -> io::Result<()> {
        self.write_block()?;
        self.inner_mut()?.flush()
    }
}

impl<W: Write> Drop for BlockWriter<'_, W> {
    fn drop(&mut self) {
        if self.inner.is_none() || self.errored {
            return;
        }
        if let Err(e) = self.write_block() {
            displaylevel!(2, "qatcodec: dropping unfinished block stream: {}\n", e);
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// BlockReader<R>
// ─────────────────────────────────────────────────────────────────────────────

/// Decompressing reader for the block stream format.
pub struct BlockReader<'lib, R: Read> {
    session: Session<'lib>,
    inner: R,
    compressed: Scratch<'lib>,
    block: Scratch<'lib>,
    pos: usize,
    filled: usize,
}

impl<'lib, R: Read> BlockReader<'lib, R> {
    pub fn new(lib: &'lib QzLibrary, inner: R) -> io::Result<Self> {
        Self::with_options(lib, inner, StreamOptions::default())
    }

    pub fn with_options(lib: &'lib QzLibrary, inner: R, opts: StreamOptions) -> io::Result<Self> {
        opts.validate()?;
        let bound = max_block_payload(lib, opts.block_size)?;
        Ok(BlockReader {
            session: Session::new(lib),
            inner,
            compressed: Scratch::allocate(lib, bound, &opts.buffer_prefs)?,
            block: Scratch::allocate(lib, opts.block_size, &opts.buffer_prefs)?,
            pos: 0,
            filled: 0,
        })
    }

    pub fn into_inner(self) -> R {
        self.inner
    }

    /// Read the next length prefix. `None` at a clean end of stream.
    fn read_header(&mut self) -> io::Result<Option<usize>> {
        let mut header = [0u8; BLOCK_HEADER_LEN];
        let mut got = 0;
        while got < header.len() {
            match self.inner.read(&mut header[got..]) {
                Ok(0) => break,
                Ok(n) => got += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e),
            }
        }
        match got {
            0 => Ok(None),
            BLOCK_HEADER_LEN => Ok(Some(u32::from_le_bytes(header) as usize)),
            _ => Err(io::Error::new(io::ErrorKind::UnexpectedEof, "truncated block header")),
        }
    }

    /// Load and decompress the next block. Returns false at end of stream.
    fn fill_block(&mut self) -> io::Result<bool> {
        let Some(len) = self.read_header()? else {
            return Ok(false);
        };
        if len == 0 || len > self.compressed.len() {
            return Err(invalid_data(format!(
                "block length {} outside 1..={}",
                len,
                self.compressed.len()
            )));
        }
        self.inner.read_exact(&mut self.compressed[..len])?;
        let input = BufferView::new(&self.compressed[..len]);
        let n = self.session.decompress(input, BufferViewMut::new(&mut self.block))?;
        self.pos = 0;
        self.filled = n as usize;
        Ok(true)
    }
}

impl<R: Read> Read for BlockReader<'_, R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        while self.pos == self.filled {
            if !self.fill_block()? {
                return Ok(0);
            }
        }
        let n = buf.len().min(self.filled - self.pos);
        buf[..n].copy_from_slice(&self.block[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }
}
