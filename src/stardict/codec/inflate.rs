//! Raw deflate decompression of dictzip chunks.
//!
//! Chunks are written by a single deflate stream that is fully flushed at
//! every chunk boundary, so each chunk inflates on its own without the zlib
//! or gzip wrapper. Only the final chunk carries the end-of-stream marker.

use flate2::{Decompress, FlushDecompress, Status};
use log::trace;

use crate::stardict::types::error::{Result, StardictError};
use crate::stardict::utils;

/// Inflates one chunk into a freshly allocated buffer.
///
/// # Validation
/// - Every input byte must be consumed.
/// - The output must be exactly `chunk_size` bytes, unless `is_last` is set, in
///   which case the chunk may be shorter and the buffer is truncated to what the
///   stream produced.
///
/// No partially inflated buffer is ever returned.
pub fn inflate_chunk(
    compressed: &[u8],
    chunk_size: usize,
    chunk: u16,
    is_last: bool,
) -> Result<Vec<u8>> {
    // One spare byte so the flush marker after a full chunk is still consumed.
    let mut output = utils::try_alloc(chunk_size + 1).ok_or(StardictError::Allocation {
        bytes: chunk_size as u64 + 1,
    })?;
    let mut inflater = Decompress::new(false);

    loop {
        let in_pos = inflater.total_in() as usize;
        let out_pos = inflater.total_out() as usize;
        let status = inflater
            .decompress(
                &compressed[in_pos..],
                &mut output[out_pos..],
                FlushDecompress::Sync,
            )
            .map_err(|e| StardictError::Decompression {
                chunk,
                reason: e.to_string(),
            })?;

        let progressed =
            inflater.total_in() as usize != in_pos || inflater.total_out() as usize != out_pos;
        match status {
            Status::StreamEnd => break,
            Status::Ok | Status::BufError if progressed => {}
            Status::Ok | Status::BufError => break,
        }
    }

    let consumed = inflater.total_in() as usize;
    let produced = inflater.total_out() as usize;
    trace!(
        "Inflated chunk {}: {} bytes -> {} bytes (expected {})",
        chunk, consumed, produced, chunk_size
    );

    if consumed != compressed.len() {
        return Err(StardictError::Decompression {
            chunk,
            reason: format!(
                "{} of {} input bytes left unconsumed",
                compressed.len() - consumed,
                compressed.len()
            ),
        });
    }

    if produced > chunk_size || (produced < chunk_size && (!is_last || produced == 0)) {
        return Err(StardictError::Decompression {
            chunk,
            reason: format!("inflated {} bytes, expected {}", produced, chunk_size),
        });
    }
    output.truncate(produced);

    Ok(output)
}
