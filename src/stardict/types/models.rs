//! Core data structures for StarDict dictionary components.
//!
//! This module defines the fundamental types used throughout the library:
//! - Dictionary metadata from the `.ifo` file
//! - Chunk layout of the dictzip container
//! - Index records and lookup results

use std::fmt;
use std::ops::RangeInclusive;

/// Format of an entry's data, taken from `sametypesequence` in the `.ifo` file.
///
/// The code is passed through verbatim; only [`EntryFormat::is_markup`] gives it
/// any meaning inside this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryFormat {
    /// `m`: plain UTF-8 text.
    Utf8Text,
    /// `g`: Pango html-like markup.
    PangoMarkup,
    /// `h`: HTML.
    Html,
    /// `x`: XDXF.
    Xdxf,
    /// `y`: Chinese YinBiao or Japanese Kana.
    ChineseJapanese,
    /// Any other single-byte code.
    Other(u8),
}

impl EntryFormat {
    pub fn code(self) -> u8 {
        match self {
            EntryFormat::Utf8Text => b'm',
            EntryFormat::PangoMarkup => b'g',
            EntryFormat::Html => b'h',
            EntryFormat::Xdxf => b'x',
            EntryFormat::ChineseJapanese => b'y',
            EntryFormat::Other(code) => code,
        }
    }

    /// Whether entries of this format carry `<...>` tags.
    pub fn is_markup(self) -> bool {
        matches!(
            self,
            EntryFormat::PangoMarkup | EntryFormat::Html | EntryFormat::Xdxf
        )
    }
}

impl From<u8> for EntryFormat {
    fn from(code: u8) -> Self {
        match code {
            b'm' => EntryFormat::Utf8Text,
            b'g' => EntryFormat::PangoMarkup,
            b'h' => EntryFormat::Html,
            b'x' => EntryFormat::Xdxf,
            b'y' => EntryFormat::ChineseJapanese,
            other => EntryFormat::Other(other),
        }
    }
}

impl fmt::Display for EntryFormat {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.code() as char)
    }
}

/// Parsed contents of a `.ifo` file.
#[derive(Debug, Clone)]
pub struct DictInfo {
    pub version: Option<String>,
    pub word_count: u32,
    /// Size of the uncompressed `.idx` file in bytes.
    pub idx_filesize: u32,
    pub entry_format: EntryFormat,
    pub book_name: Option<String>,
    pub author: Option<String>,
    pub email: Option<String>,
    pub website: Option<String>,
    pub description: Option<String>,
    pub date: Option<String>,
}

/// Location of one compressed chunk inside the container file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkMeta {
    /// Size of the deflate data as stored in the file (bytes).
    pub compressed_size: u16,
    /// Absolute byte offset where this chunk's compressed data begins.
    pub file_offset: u64,
}

/// A single index record, borrowed from the index that owns the word bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexRecord<'a> {
    pub word: &'a str,
    /// Offset of the entry in the decompressed dictionary body.
    pub data_offset: u32,
    pub data_size: u32,
}

/// Inclusive range of index positions whose words share a prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LookupRange {
    pub min: usize,
    pub max: usize,
}

impl LookupRange {
    /// Number of words in the range.
    pub fn len(&self) -> usize {
        self.max - self.min + 1
    }

    /// A lookup range always holds at least one word.
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn indices(&self) -> RangeInclusive<usize> {
        self.min..=self.max
    }
}

/// A dictionary entry loaded from the body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub format: EntryFormat,
    pub data: Vec<u8>,
}

impl Entry {
    /// Entry data as text, replacing invalid UTF-8 sequences.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.data).into_owned()
    }

    /// Entry text with markup removed.
    ///
    /// Plain text formats are returned as-is; formats this crate cannot
    /// render as text yield `None`.
    pub fn plain_text(&self) -> Option<String> {
        match self.format {
            EntryFormat::Utf8Text => Some(self.text()),
            format if format.is_markup() => Some(crate::stardict::markup::strip_tags(&self.text())),
            _ => None,
        }
    }
}
