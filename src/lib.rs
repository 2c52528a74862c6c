//! # stardict-reader
//!
//! A reader for StarDict dictionaries (`.ifo`, `.idx`, `.dict.dz`).
//!
//! The compressed dictionary body is a dictzip file: a gzip stream cut into
//! independently inflatable chunks, with a chunk table in the gzip header.
//! Byte ranges of the uncompressed body are read by inflating only the chunks
//! they touch, and recently used chunks are kept in a small cache.
//!
//! ```no_run
//! use stardict_reader::StarDict;
//!
//! let mut dict = StarDict::open("/usr/share/stardict/dic", "wordnet")?;
//! if let Some(range) = dict.lookup("apple") {
//!     let entry = dict.entry(range.min)?;
//!     println!("{}", entry.text());
//! }
//! # Ok::<(), stardict_reader::StardictError>(())
//! ```
pub mod stardict;

use std::path::Path;

// Re-export the main types for convenience
pub use stardict::{
    DictBody,
    DictLocation,
    DictPaths,
    DictZip,
    FormatError,
    Result,
    StarDict,
    StardictError,
    format::index::WordIndex,
    models::{
        ChunkMeta,
        DictInfo,
        Entry,
        EntryFormat,
        IndexRecord,
        LookupRange,
    },
    search::search_prefix,
};

/// Opens a dictzip file for random access.
pub fn open_container(path: impl AsRef<Path>) -> Result<DictZip> {
    DictZip::open(path)
}

/// Reads `size` bytes at `offset` of a container's uncompressed payload.
pub fn read_range(container: &mut DictZip, offset: u64, size: u32) -> Result<Vec<u8>> {
    container.read(offset, size)
}

/// Builds a word index over the raw contents of an `.idx` file.
pub fn build_index(blob: Vec<u8>, word_count: u32) -> Result<WordIndex> {
    stardict::format::index::build_index(blob, word_count)
}

/// Closes a container, releasing its file handle and cached chunks.
pub fn close(container: DictZip) {
    container.close()
}
