//! Custom error types for the stardict-reader crate.

use std::path::PathBuf;
use thiserror::Error;

/// The primary error type for all operations in this crate.
#[derive(Debug, Error)]
pub enum StardictError {
    /// An I/O failure at the OS boundary, with the stage and file it happened in.
    #[error("I/O error while {stage} '{}': {source}", path.display())]
    Io {
        stage: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The compressed container is structurally invalid.
    #[error("Invalid dictzip container: {0}")]
    Format(#[from] FormatError),

    /// A single chunk could not be inflated. The cache is left untouched.
    #[error("Failed to decompress chunk {chunk}: {reason}")]
    Decompression { chunk: u16, reason: String },

    /// The requested byte range lies outside the decompressed payload.
    #[error("Range [{offset}, +{size}) is outside the container ({chunk_count} chunks of {chunk_size} bytes)")]
    OutOfRange {
        offset: u64,
        size: u32,
        chunk_count: u16,
        chunk_size: u16,
    },

    /// The requested byte range runs past the end of an uncompressed body.
    #[error("Range [{offset}, +{size}) is outside the dictionary body ({body_len} bytes)")]
    BodyOutOfRange { offset: u64, size: u32, body_len: u64 },

    /// The index blob does not hold the records the metadata promised.
    #[error("Invalid index: {0}")]
    InvalidIndex(String),

    /// A declared count of items does not match the actual number of items found.
    #[error("Count mismatch for {item_type}: expected {expected}, but found {found}")]
    CountMismatch {
        item_type: &'static str,
        expected: u64,
        found: u64,
    },

    /// A buffer or file has an unexpected size.
    #[error("Size mismatch for {context}: expected {expected} bytes, but found {found} bytes")]
    SizeMismatch {
        context: &'static str,
        expected: u64,
        found: u64,
    },

    /// The `.ifo` metadata file is malformed.
    #[error("Invalid ifo file: {0}")]
    InvalidMetadata(String),

    /// A key the reader cannot work without is absent from the `.ifo` file.
    #[error("Missing '{0}' in ifo file")]
    MissingMetadataKey(&'static str),

    /// An entry index past the end of the word list.
    #[error("Entry index {index} is out of bounds ({word_count} words)")]
    EntryOutOfRange { index: usize, word_count: usize },

    /// Neither `.dict.dz` nor `.dict` was found next to the index.
    #[error("Dictionary body not found for '{}'", .0.display())]
    MissingBody(PathBuf),

    /// A buffer sized from untrusted metadata could not be allocated.
    #[error("Failed to allocate {bytes} bytes")]
    Allocation { bytes: u64 },
}

/// Structural problems found while parsing a dictzip header.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormatError {
    #[error("wrong gzip magic {0:#04x} {1:#04x}")]
    BadMagic(u8, u8),

    #[error("unsupported compression method {0:#04x}")]
    UnsupportedMethod(u8),

    #[error("no extra field in gzip header")]
    MissingExtraField,

    #[error("wrong dictzip magic {0:?}{1:?}")]
    BadContainerMagic(char, char),

    #[error("header is truncated: need {needed} bytes, file has {available}")]
    TruncatedHeader { needed: usize, available: usize },

    #[error("chunk size is zero")]
    ZeroChunkSize,

    #[error("chunk table of {chunk_count} entries does not fit into an extra field of {extra_len} bytes")]
    ChunkTableOverflow { chunk_count: u16, extra_len: u16 },

    #[error("header name/comment runs past {window} bytes")]
    HeaderOverrun { window: usize },

    #[error("chunk data ends at {end} but file is {file_len} bytes")]
    ChunkDataPastEof { end: u64, file_len: u64 },
}

/// A convenience `Result` type alias using the crate's `StardictError` type.
pub type Result<T> = std::result::Result<T, StardictError>;

/// Attaches a stage and path to raw I/O errors.
pub(crate) trait IoContext<T> {
    fn at(self, stage: &'static str, path: impl Into<PathBuf>) -> Result<T>;
}

impl<T> IoContext<T> for std::io::Result<T> {
    fn at(self, stage: &'static str, path: impl Into<PathBuf>) -> Result<T> {
        self.map_err(|source| StardictError::Io {
            stage,
            path: path.into(),
            source,
        })
    }
}
