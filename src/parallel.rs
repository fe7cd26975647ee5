//! Parallel block codec over whole in-memory buffers.
//!
//! Blocks are independent, so they are compressed (or decompressed) on rayon
//! workers and reassembled in order on the calling thread. Every worker gets
//! its own [`Session`] through `map_init`; sessions are never shared.
//! The output is the same block stream [`crate::stream`] reads and writes.

use std::io;

use rayon::prelude::*;

use crate::error::CodecError;
use crate::loader::QzLibrary;
use crate::session::Session;
use crate::stream::{max_block_payload, split_blocks, BLOCK_HEADER_LEN};

/// Default number of worker threads: all physical cores but a few spared.
pub fn default_workers() -> usize {
    let nb_cores = num_cpus::get_physical();
    let spared = 1 + (nb_cores >> 3);
    if nb_cores <= spared {
        1
    } else {
        nb_cores - spared
    }
}

fn check_block_size(block_size: usize) -> io::Result<()> {
    if block_size == 0 || u32::try_from(block_size).is_err() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("block size {} is not usable", block_size),
        ));
    }
    Ok(())
}

fn compress_into_stream(lib: &QzLibrary, data: &[u8], block_size: usize) -> io::Result<Vec<u8>> {
    check_block_size(block_size)?;
    let bound = max_block_payload(lib, block_size)?;
    let blocks: Vec<Vec<u8>> = data
        .par_chunks(block_size)
        .map_init(
            || Session::new(lib),
            |session, chunk| -> Result<Vec<u8>, CodecError> {
                let mut out = vec![0u8; BLOCK_HEADER_LEN + bound];
                let n = session.compress_slice(chunk, &mut out[BLOCK_HEADER_LEN..])?;
                out[..BLOCK_HEADER_LEN].copy_from_slice(&(n as u32).to_le_bytes());
                out.truncate(BLOCK_HEADER_LEN + n);
                Ok(out)
            },
        )
        .collect::<Result<_, _>>()?;
    Ok(blocks.concat())
}

fn decompress_from_stream(lib: &QzLibrary, stream: &[u8], block_size: usize) -> io::Result<Vec<u8>> {
    check_block_size(block_size)?;
    let bound = max_block_payload(lib, block_size)?;
    let payloads = split_blocks(stream, bound)?;
    let blocks: Vec<Vec<u8>> = payloads
        .par_iter()
        .map_init(
            || Session::new(lib),
            |session, payload| session.decompress_to_vec(payload, block_size),
        )
        .collect::<Result<_, _>>()?;
    Ok(blocks.concat())
}

/// Compress `data` into the block stream format on the global rayon pool.
pub fn compress_blocks(lib: &QzLibrary, data: &[u8], block_size: usize) -> io::Result<Vec<u8>> {
    compress_into_stream(lib, data, block_size)
}

/// Decode a complete block stream on the global rayon pool.
///
/// The whole stream is framed before any block is decompressed, so a bad
/// header fails the call without doing codec work.
pub fn decompress_blocks(lib: &QzLibrary, stream: &[u8], block_size: usize) -> io::Result<Vec<u8>> {
    decompress_from_stream(lib, stream, block_size)
}

fn with_pool<T: Send>(workers: usize, f: impl FnOnce() -> io::Result<T> + Send) -> io::Result<T> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers.max(1))
        .build()
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
    pool.install(f)
}

/// [`compress_blocks`] on a dedicated pool of `workers` threads.
pub fn compress_blocks_with_workers(
    lib: &QzLibrary,
    data: &[u8],
    block_size: usize,
    workers: usize,
) -> io::Result<Vec<u8>> {
    with_pool(workers, || compress_into_stream(lib, data, block_size))
}

/// [`decompress_blocks`] on a dedicated pool of `workers` threads.
pub fn decompress_blocks_with_workers(
    lib: &QzLibrary,
    stream: &[u8],
    block_size: usize,
    workers: usize,
) -> io::Result<Vec<u8>> {
    with_pool(workers, || decompress_from_stream(lib, stream, block_size))
}
