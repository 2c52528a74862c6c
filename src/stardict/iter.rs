//! Iterators over lookup results.
//!
//! # Example
//! ```no_run
//! # use stardict_reader::StarDict;
//! let mut dict = StarDict::open("/usr/share/stardict/dic", "wordnet").unwrap();
//! if let Some(range) = dict.lookup("ban") {
//!     for result in dict.iter_range(range) {
//!         let (word, entry) = result.unwrap();
//!         println!("{}: {}", word, entry.text());
//!     }
//! }
//! ```

use std::ops::Range;

use super::reader::StarDict;
use super::types::error::Result;
use super::types::models::{Entry, LookupRange};

/// Iterator over the `(word, entry)` pairs of a [`LookupRange`].
///
/// Entries are loaded lazily, one per call to `next`. A failed entry is
/// yielded as an error and iteration continues with the next word.
///
/// Created by [`StarDict::iter_range()`](crate::StarDict::iter_range).
pub struct RangeIter<'a> {
    dict: &'a mut StarDict,
    positions: Range<usize>,
}

impl<'a> RangeIter<'a> {
    pub(super) fn new(dict: &'a mut StarDict, range: LookupRange) -> Self {
        let end = range.max.saturating_add(1).min(dict.word_count());
        Self {
            dict,
            positions: range.min.min(end)..end,
        }
    }

    /// Yields only the words, without touching the dictionary body.
    pub fn words(self) -> impl Iterator<Item = &'a str> {
        let dict: &'a StarDict = self.dict;
        self.positions.filter_map(move |idx| dict.word(idx))
    }
}

impl Iterator for RangeIter<'_> {
    type Item = Result<(String, Entry)>;

    fn next(&mut self) -> Option<Self::Item> {
        let idx = self.positions.next()?;
        let word = self.dict.word(idx)?.to_string();
        Some(self.dict.entry(idx).map(|entry| (word, entry)))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.positions.size_hint()
    }
}

impl ExactSizeIterator for RangeIter<'_> {}
