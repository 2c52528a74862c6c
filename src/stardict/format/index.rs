//! Word index (`.idx`) loading and parsing.
//!
//! The index is a flat run of records, sorted by word:
//!
//! ```text
//! [word bytes][0x00][data offset: u32 BE][data size: u32 BE]
//! ```
//!
//! There is no record count or length field; the count comes from the `.ifo`
//! file. The whole blob is kept in one buffer and records point into it.

use std::fs::File;
use std::io::Read;
use std::ops::Range;
use std::path::{Path, PathBuf};

use byteorder::{BigEndian, ByteOrder};
use flate2::read::GzDecoder;
use log::{debug, info};

use crate::stardict::search::{self, SortedWords};
use crate::stardict::types::error::{IoContext, Result, StardictError};
use crate::stardict::types::models::{IndexRecord, LookupRange};
use crate::stardict::utils;

/// Size of the offset/size pair following each word.
const RECORD_TRAILER_SIZE: usize = 8;

/// Location of one record inside the index blob.
#[derive(Debug, Clone)]
struct RecordSpan {
    word: Range<usize>,
    data_offset: u32,
    data_size: u32,
}

/// Parsed word index. Owns the raw blob; every word is a view into it.
#[derive(Debug)]
pub struct WordIndex {
    blob: Vec<u8>,
    records: Vec<RecordSpan>,
}

impl WordIndex {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Word at position `idx`, or `None` past the end.
    pub fn word(&self, idx: usize) -> Option<&str> {
        let span = self.records.get(idx)?;
        std::str::from_utf8(&self.blob[span.word.clone()]).ok()
    }

    pub fn get(&self, idx: usize) -> Option<IndexRecord<'_>> {
        let span = self.records.get(idx)?;
        Some(IndexRecord {
            word: std::str::from_utf8(&self.blob[span.word.clone()]).ok()?,
            data_offset: span.data_offset,
            data_size: span.data_size,
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = IndexRecord<'_>> + '_ {
        (0..self.records.len()).filter_map(|idx| self.get(idx))
    }

    /// Case-insensitive prefix search, see [`search::search_prefix`].
    pub fn search_prefix(&self, prefix: &str) -> Option<LookupRange> {
        search::search_prefix(self, prefix)
    }
}

impl SortedWords for WordIndex {
    fn word_count(&self) -> usize {
        self.records.len()
    }

    fn word_bytes(&self, idx: usize) -> &[u8] {
        &self.blob[self.records[idx].word.clone()]
    }
}

/// Parses `word_count` records from `blob`.
///
/// Every record is bounds-checked against the blob; a missing terminator, a
/// truncated offset/size pair, or a word that is not UTF-8 is an error.
/// Bytes left over after the last record are ignored.
pub fn build_index(blob: Vec<u8>, word_count: u32) -> Result<WordIndex> {
    // Every record takes at least a terminator and the offset/size pair.
    let capacity = (word_count as usize).min(blob.len() / (1 + RECORD_TRAILER_SIZE));
    let mut records = Vec::new();
    records
        .try_reserve_exact(capacity)
        .map_err(|_| StardictError::Allocation {
            bytes: capacity as u64 * std::mem::size_of::<RecordSpan>() as u64,
        })?;

    let mut pos = 0usize;
    for i in 0..word_count {
        let rest = &blob[pos..];
        let word_len = utils::find_nul(rest).ok_or_else(|| {
            StardictError::InvalidIndex(format!(
                "record {} at offset {}: missing word terminator",
                i, pos
            ))
        })?;
        let trailer_start = word_len + 1;
        let trailer = rest
            .get(trailer_start..trailer_start + RECORD_TRAILER_SIZE)
            .ok_or_else(|| {
                StardictError::InvalidIndex(format!(
                    "record {} at offset {}: truncated offset/size pair",
                    i, pos
                ))
            })?;

        if std::str::from_utf8(&rest[..word_len]).is_err() {
            return Err(StardictError::InvalidIndex(format!(
                "record {} at offset {}: word is not valid UTF-8",
                i, pos
            )));
        }

        records.push(RecordSpan {
            word: pos..pos + word_len,
            data_offset: BigEndian::read_u32(&trailer[0..4]),
            data_size: BigEndian::read_u32(&trailer[4..8]),
        });
        pos += trailer_start + RECORD_TRAILER_SIZE;
    }

    if pos != blob.len() {
        debug!(
            "Index has {} trailing bytes after {} records",
            blob.len() - pos,
            word_count
        );
    }

    Ok(WordIndex { blob, records })
}

/// Reads the index blob for dictionary `name` in `dir`.
///
/// `<name>.idx.gz` is preferred over `<name>.idx`. Exactly `idx_filesize`
/// (uncompressed) bytes are read.
pub fn load_index_blob(dir: &Path, name: &str, idx_filesize: u32) -> Result<Vec<u8>> {
    let gz_path = dir.join(format!("{}.idx.gz", name));
    let plain_path = dir.join(format!("{}.idx", name));

    let (path, reader): (PathBuf, Box<dyn Read>) = if gz_path.is_file() {
        let file = File::open(&gz_path).at("opening", &gz_path)?;
        (gz_path, Box::new(GzDecoder::new(file)) as Box<dyn Read>)
    } else {
        let file = File::open(&plain_path).at("opening", &plain_path)?;
        (plain_path, Box::new(file) as Box<dyn Read>)
    };
    info!("Loading index: {}", path.display());

    let expected = idx_filesize as usize;
    let mut blob = Vec::new();
    blob.try_reserve_exact(expected)
        .map_err(|_| StardictError::Allocation {
            bytes: idx_filesize as u64,
        })?;
    reader
        .take(expected as u64)
        .read_to_end(&mut blob)
        .at("reading index", &path)?;

    if blob.len() != expected {
        return Err(StardictError::SizeMismatch {
            context: "index file",
            expected: expected as u64,
            found: blob.len() as u64,
        });
    }

    Ok(blob)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(word: &str, offset: u32, size: u32) -> Vec<u8> {
        let mut out = word.as_bytes().to_vec();
        out.push(0);
        out.extend_from_slice(&offset.to_be_bytes());
        out.extend_from_slice(&size.to_be_bytes());
        out
    }

    #[test]
    fn parses_records_in_order() {
        let blob = [
            record("apple", 0, 10),
            record("Banana", 10, 20),
            record("band", 30, 5),
        ]
        .concat();
        let index = build_index(blob, 3).unwrap();

        assert_eq!(index.len(), 3);
        assert_eq!(index.word(1), Some("Banana"));
        assert_eq!(
            index.get(2),
            Some(IndexRecord {
                word: "band",
                data_offset: 30,
                data_size: 5
            })
        );
        assert_eq!(index.word(3), None);
        let words: Vec<_> = index.iter().map(|r| r.word).collect();
        assert_eq!(words, ["apple", "Banana", "band"]);
    }

    #[test]
    fn large_offsets_are_big_endian() {
        let index = build_index(record("x", 0x0102_0304, 0xA0B0_C0D0), 1).unwrap();
        let rec = index.get(0).unwrap();
        assert_eq!(rec.data_offset, 0x0102_0304);
        assert_eq!(rec.data_size, 0xA0B0_C0D0);
    }

    #[test]
    fn word_count_beyond_blob_is_rejected() {
        let blob = record("only", 0, 1);
        let err = build_index(blob, 2).unwrap_err();
        assert!(matches!(err, StardictError::InvalidIndex(_)));
    }

    #[test]
    fn huge_word_count_fails_on_the_blob_not_the_allocator() {
        let mut blob = record("apple", 0, 1);
        blob.extend(record("banana", 1, 1));
        let err = build_index(blob, u32::MAX).unwrap_err();
        assert!(
            matches!(err, StardictError::InvalidIndex(ref msg) if msg.starts_with("record 2 ")),
            "got {err:?}"
        );
    }

    #[test]
    fn truncated_trailer_is_rejected() {
        let mut blob = record("word", 0, 1);
        blob.truncate(blob.len() - 3);
        let err = build_index(blob, 1).unwrap_err();
        assert!(matches!(err, StardictError::InvalidIndex(msg) if msg.contains("truncated")));
    }

    #[test]
    fn non_utf8_word_is_rejected() {
        let mut blob = vec![0xff, 0xfe, 0];
        blob.extend_from_slice(&[0; 8]);
        assert!(build_index(blob, 1).is_err());
    }

    #[test]
    fn zero_words_is_an_empty_index() {
        let index = build_index(Vec::new(), 0).unwrap();
        assert!(index.is_empty());
        assert_eq!(index.search_prefix("a"), None);
    }
}
