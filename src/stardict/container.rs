//! Random access into a dictzip-compressed dictionary body.

use std::fs::File;
use std::path::{Path, PathBuf};

use log::{debug, info, trace};

use super::cache::ChunkCache;
use super::codec::inflate;
use super::format::dictzip;
use super::types::error::{IoContext, Result, StardictError};
use super::types::models::ChunkMeta;
use super::utils;

/// An open dictzip container.
///
/// Owns the file handle, the chunk table, and the chunk cache. Reads take
/// `&mut self` because the cache is updated on every read; share a container
/// between threads only behind a lock.
#[derive(Debug)]
pub struct DictZip {
    file: File,
    path: PathBuf,
    version: u16,
    chunk_size: u16,
    chunks: Vec<ChunkMeta>,
    cache: ChunkCache,
}

impl DictZip {
    /// Opens a dictzip file and parses its chunk table.
    ///
    /// # Errors
    /// Returns an error if:
    /// - The file cannot be opened or read
    /// - The gzip or dictzip header is malformed (`StardictError::Format`)
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        info!("Opening dictzip container: {}", path.display());
        let mut file = File::open(path).at("opening", path)?;

        let header = dictzip::parse(&mut file, path)?;

        Ok(Self {
            file,
            path: path.to_path_buf(),
            version: header.version,
            chunk_size: header.chunk_size,
            chunks: header.chunks,
            cache: ChunkCache::new(),
        })
    }

    /// Decompressed size of every chunk but the last.
    pub fn chunk_size(&self) -> u16 {
        self.chunk_size
    }

    pub fn chunk_count(&self) -> u16 {
        self.chunks.len() as u16
    }

    pub fn version(&self) -> u16 {
        self.version
    }

    pub fn chunks(&self) -> &[ChunkMeta] {
        &self.chunks
    }

    pub fn cache(&self) -> &ChunkCache {
        &self.cache
    }

    /// Reads `size` bytes starting at `offset` of the decompressed payload.
    ///
    /// The span is assembled from the first chunk's tail, any whole chunks in
    /// between, and the last chunk's head. Every chunk goes through the cache.
    ///
    /// # Errors
    /// - `OutOfRange` if the span does not lie within the chunk table; no
    ///   chunk is read in that case. A span running past the end of a short
    ///   final chunk is detected once that chunk is inflated.
    /// - `Decompression` if a chunk cannot be read or inflated. Nothing partial
    ///   is returned and the cache keeps its previous contents.
    pub fn read(&mut self, offset: u64, size: u32) -> Result<Vec<u8>> {
        let (chunk_count, chunk_size) = (self.chunk_count(), self.chunk_size);
        let out_of_range = move || StardictError::OutOfRange {
            offset,
            size,
            chunk_count,
            chunk_size,
        };

        let chunk_size = chunk_size as u64;
        let first_chunk = offset / chunk_size;
        let first_chunk_offset = (offset % chunk_size) as usize;
        let end = offset.checked_add(size as u64).ok_or_else(out_of_range)?;
        let last_chunk = match size {
            0 => first_chunk,
            _ => (end - 1) / chunk_size,
        };
        let chunk_count = chunk_count as u64;
        if first_chunk >= chunk_count || last_chunk >= chunk_count {
            return Err(out_of_range());
        }
        trace!(
            "Reading [{}, +{}) from chunks {}..={}",
            offset, size, first_chunk, last_chunk
        );

        let mut buf = Vec::new();
        buf.try_reserve_exact(size as usize)
            .map_err(|_| StardictError::Allocation { bytes: size as u64 })?;

        // Start of the data from the first chunk
        let first_len = (size as usize).min(chunk_size as usize - first_chunk_offset);
        let chunk = self.chunk(first_chunk as u16)?;
        let head = chunk
            .get(first_chunk_offset..first_chunk_offset + first_len)
            .ok_or_else(out_of_range)?;
        buf.extend_from_slice(head);

        if first_chunk == last_chunk {
            return Ok(buf);
        }

        // Whole chunks in between
        for idx in first_chunk + 1..last_chunk {
            let chunk = self.chunk(idx as u16)?;
            buf.extend_from_slice(chunk);
        }

        // The rest from the last chunk
        let rest = size as usize - buf.len();
        let chunk = self.chunk(last_chunk as u16)?;
        let tail = chunk.get(..rest).ok_or_else(out_of_range)?;
        buf.extend_from_slice(tail);

        Ok(buf)
    }

    /// Decompressed bytes of chunk `idx`, from the cache or freshly inflated.
    fn chunk(&mut self, idx: u16) -> Result<&[u8]> {
        let (file, path, chunks, chunk_size) = (
            &self.file,
            self.path.as_path(),
            self.chunks.as_slice(),
            self.chunk_size,
        );
        self.cache
            .get_or_load(idx, |idx| load_chunk(file, path, chunks, chunk_size, idx))
    }

    /// Releases the file handle and every cached chunk.
    pub fn close(self) {
        debug!("Closing dictzip container {}", self.path.display());
    }
}

/// Positioned read of one chunk's compressed bytes followed by an inflate pass.
fn load_chunk(
    file: &File,
    path: &Path,
    chunks: &[ChunkMeta],
    chunk_size: u16,
    idx: u16,
) -> Result<Vec<u8>> {
    let meta = chunks
        .get(idx as usize)
        .ok_or_else(|| StardictError::Decompression {
            chunk: idx,
            reason: "chunk index past the chunk table".to_string(),
        })?;

    let mut compressed = vec![0u8; meta.compressed_size as usize];
    utils::read_exact_at(file, &mut compressed, meta.file_offset).map_err(|e| {
        StardictError::Decompression {
            chunk: idx,
            reason: format!(
                "short read of {} bytes at offset {} in {}: {}",
                meta.compressed_size,
                meta.file_offset,
                path.display(),
                e
            ),
        }
    })?;

    let is_last = idx as usize + 1 == chunks.len();
    inflate::inflate_chunk(&compressed, chunk_size as usize, idx, is_last)
}
